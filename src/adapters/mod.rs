pub mod api;
pub mod weatherxm;

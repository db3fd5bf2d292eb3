pub mod conditions;
pub mod models;
pub mod projections;
pub mod snapshot;

fn main() {
    if let Err(err) = weatherxm_bridge::app::run_service() {
        eprintln!("service startup failed: {err}");
        std::process::exit(1);
    }
}

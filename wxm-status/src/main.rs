fn main() {
    if let Err(err) = weatherxm_bridge::app::run_status() {
        eprintln!("status job failed: {err}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = sensor_station_api::app::run() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}

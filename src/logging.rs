/// Initialises `env_logger` for the binary.
///
/// `RUST_LOG` wins when set. Otherwise this crate logs at `level` and
/// everything else stays quiet.
pub fn init(level: log::LevelFilter) {
    let filter = format!("{}={}", env!("CARGO_CRATE_NAME"), level_name(level));
    if std::env::var("RUST_LOG").is_err() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&filter))
            .init();
    } else {
        env_logger::init();
    }
}

fn level_name(level: log::LevelFilter) -> &'static str {
    match level {
        log::LevelFilter::Off => "off",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Trace => "trace",
    }
}

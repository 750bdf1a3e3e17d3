use log::LevelFilter;

/// Initialize the process logger at `info`, letting `RUST_LOG` override it.
/// Calling it twice is harmless.
pub fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, LevelFilter::Info).format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized");
    }
}

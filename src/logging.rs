//! Logger setup shared by the command-line tools.

/// Set up `env_logger`, letting `RUST_LOG` override the level picked from
/// the number of `-v` flags.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Fails only if a logger is already installed.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

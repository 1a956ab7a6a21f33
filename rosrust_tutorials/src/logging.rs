use env_logger::Env;

/// Installs the process logger. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    if env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .try_init()
        .is_err()
    {
        log::debug!("Logger was already initialized");
    }
}

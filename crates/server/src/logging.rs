use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "salabot=warn",
        1 => "salabot=info",
        _ => "salabot=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

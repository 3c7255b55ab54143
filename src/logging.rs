use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa tracing. Nivel por `RUST_LOG` (default: info).
///
/// Los diagnósticos van a stderr para no mezclarse con los resúmenes de stdout.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

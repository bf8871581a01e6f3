use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

/// `RUST_LOG` wins when set; otherwise info, with debug for this crate.
pub fn init_logger_once() {
    INIT_LOGGER.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(Level::INFO.to_string())
                .add_directive("wishcast=debug".parse().expect("static directive"))
        });
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    });
}

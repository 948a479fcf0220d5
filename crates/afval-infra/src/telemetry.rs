use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env-filter, falling back to a sensible
/// default when `RUST_LOG` is not set.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "afval=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("Telemetry initialized");
    Ok(())
}

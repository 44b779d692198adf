//! Log subscriber setup shared by the binaries

use crate::config::ObservabilityConfig;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Formatting subscriber for `config`
///
/// `RUST_LOG` wins over `log_level`. JSON lines when `json_logging` is set,
/// human-readable text otherwise.
pub fn subscriber<W>(config: &ObservabilityConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer);

    if config.json_logging {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    }
}

/// Install the subscriber process-wide
pub fn init_tracing<W>(config: &ObservabilityConfig, writer: W) -> Result<(), SetGlobalDefaultError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber(config, writer))
}

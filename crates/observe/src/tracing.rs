use {
    crate::{config::Config, panic_hook},
    std::io::IsTerminal,
    time::macros::format_description,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        Registry,
        fmt::{time::UtcTime, writer::MakeWriterExt},
        prelude::*,
    },
};

/// Initializes the global tracing subscriber and the panic hook.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    panic_hook::install();
}

fn set_tracing_subscriber(config: &Config) {
    let stderr_threshold = config.stderr_threshold;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(
            MakeWriterExt::with_filter(std::io::stderr, move |meta| {
                stderr_threshold.is_some_and(|threshold| *meta.level() <= threshold)
            })
            .or_else(std::io::stdout),
        )
        .with_timer(UtcTime::new(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )))
        .with_ansi(std::io::stdout().is_terminal() && std::io::stderr().is_terminal());

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.use_json_format {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(EnvFilter::new(&config.env_filter)));
    // A subscriber set by the embedding process (e.g. a test harness) wins.
    if registry.try_init().is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

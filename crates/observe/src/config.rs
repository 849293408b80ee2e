use tracing::Level;

#[derive(Debug, Clone)]
pub struct Config {
    /// Filters spans and events based on a set of filter directives
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub(crate) env_filter: String,
    /// Events at this level or more severe are written to stderr, all others
    /// to stdout. `None` writes everything to stdout.
    pub(crate) stderr_threshold: Option<Level>,
    /// Output log events as JSON
    pub(crate) use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: Option<Level>, use_json_format: bool) -> Self {
        Self {
            env_filter: env_filter.into(),
            stderr_threshold,
            use_json_format,
        }
    }
}

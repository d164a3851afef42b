use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "info";

/// Install global logger.
///
/// Filter is taken from `filter` if set, otherwise from `RUST_LOG`, otherwise `info` is used.
pub fn init(filter: Option<&str>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_millis();

    if let Err(e) = builder.try_init() {
        eprintln!("logger already installed: {e}");
    }
}

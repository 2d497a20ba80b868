use std::time::{Duration as StdDuration, Instant as StdInstant};

pub type Duration = StdDuration;
pub type Instant = StdInstant;

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Route `log` records to stderr. Safe to call more than once.
pub fn init_logging(level: log::Level) {
    let _ = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
}

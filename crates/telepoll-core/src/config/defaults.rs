//! Serde default value functions.

pub(super) fn default_handler() -> String {
    "simple".to_string()
}
pub(super) fn default_limit() -> u32 {
    100
}
pub(super) fn default_timeout_secs() -> u64 {
    5
}
pub(super) fn default_max_failures() -> u32 {
    10
}
pub(super) fn default_retry_delay_ms() -> u64 {
    1000
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

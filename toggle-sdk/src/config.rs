use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "TOGGLE_HOST", default = "http://127.0.0.1:3001")]
    pub host: String,

    /// How often the polling refresh reconciles the cache against the
    /// server. The push stream usually gets there first; this is the
    /// backstop for dropped events and deletions.
    #[envconfig(from = "TOGGLE_REFRESH_INTERVAL_SECS", default = "60")]
    pub refresh_interval_secs: u64,

    /// Timeout for bulk fetches. The event-stream connection is long-lived
    /// and deliberately not covered by this.
    #[envconfig(from = "TOGGLE_REQUEST_TIMEOUT_SECS", default = "10")]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "http://127.0.0.1:3001".to_string(),
            refresh_interval_secs: 60,
            request_timeout_secs: 10,
        }
    }
}

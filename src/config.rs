use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Coordinator base URL, no trailing slash.
    pub coordinator_url: String,
    pub worker_id: String,
    pub region: String,
    /// Set when running on a deployed machine; gates the dev-only
    /// https → http target downgrade.
    pub production: bool,
    pub poll_interval_secs: u64,
    pub max_jitter_ms: u64,
    pub jobs_per_pull: u32,
    pub executor_count: usize,
    pub queue_capacity: usize,
    pub rate_limit_per_second: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://localhost:4000".to_string(),
            worker_id: "ezworker-local".to_string(),
            region: "dev".to_string(),
            production: false,
            poll_interval_secs: 5,
            max_jitter_ms: 1_000,
            jobs_per_pull: 10,
            executor_count: 4,
            queue_capacity: 256,
            rate_limit_per_second: 1.0,
        }
    }
}

impl WorkerConfig {
    /// Build the config from the environment. Identity and coordinator
    /// location are environmental; tuning knobs keep their defaults.
    pub fn from_env() -> Self {
        let coordinator_url = env_or("CLOCKWORK_URL", "http://localhost:4000")
            .trim_end_matches('/')
            .to_string();

        Self {
            coordinator_url,
            worker_id: env_or("FLY_MACHINE_ID", "ezworker-local"),
            region: env_or("FLY_REGION", "dev"),
            production: env::var("FLY_APP_NAME").is_ok(),
            ..Default::default()
        }
    }
}

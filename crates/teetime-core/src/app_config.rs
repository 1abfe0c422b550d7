use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub clubs_path: PathBuf,
    /// `None` disables the durable cache snapshot.
    pub snapshot_path: Option<PathBuf>,
    pub refresh_interval_secs: u64,
    pub window_days: u32,
    pub user_agent: String,
    pub teescanner_base_url: String,
    pub teescanner_timeout_secs: u64,
    pub golfpang_base_url: String,
    pub golfpang_accept_invalid_certs: bool,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
    pub cache_lock_timeout_ms: u64,
    /// Name substrings a Golfpang row must contain; empty keeps every row.
    pub crawl_favorites: Vec<String>,
    pub max_query_days: u32,
}

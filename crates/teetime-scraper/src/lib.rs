pub mod breaker;
pub mod error;
pub mod golfpang;
pub mod normalize;
pub mod resilient;
pub mod retry;
pub mod source;
pub mod teescanner;

pub use breaker::{BreakerConfig, BreakerStatus, CircuitBreaker, CircuitState};
pub use error::ScraperError;
pub use golfpang::GolfpangClient;
pub use resilient::ResilientSource;
pub use retry::{CallBudget, RetryPolicy};
pub use source::{FetchReport, TeeTimeSource};
pub use teescanner::TeescannerClient;

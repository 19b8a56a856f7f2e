pub mod client;
pub mod logos;
pub mod rate_limit;
pub mod retry;

pub use client::SportsDbClient;
pub use logos::{LogoCache, LogoFetcher};
pub use rate_limit::RateLimiter;
pub use retry::RetryingExecutor;

pub mod bootstrap;
pub mod queue;
pub mod warm;

pub use bootstrap::Bootstrapper;
pub use queue::PrefetchQueue;
pub use warm::{ApiSeasonProvider, MatchWarmer, SportsDbWarmer};

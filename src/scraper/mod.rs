pub mod collector;
pub mod fetcher;
pub mod traits;

pub use collector::TenderCollector;
pub use fetcher::HttpFetcher;
pub use traits::Fetcher;

pub mod aggregator;
pub mod filter;
pub mod handler;
pub mod models;

pub use aggregator::AnalyticsAggregator;
pub use filter::FilterSet;
pub use handler::create_analytics_router;

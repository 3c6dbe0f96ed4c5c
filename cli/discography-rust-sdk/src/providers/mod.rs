pub mod aggregator;
pub mod dispatch;

pub mod clob;
pub mod messages;
pub mod rtds;

pub use clob::ClobFeed;
pub use rtds::RtdsFeed;

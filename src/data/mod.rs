//! Region feed sources.

pub mod feed;

pub use feed::{FeedClient, FeedSource, StaticFeeds};

pub mod extractor;
pub mod feed;

pub use extractor::{Extractor, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use feed::{FeedItem, NewsFeed};

pub mod prelude {
    pub use super::Extractor;
    pub use nw_core::{Article, Error, Result};
}

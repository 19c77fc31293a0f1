mod error;
mod feed_key;

pub use error::{err, Error, Kind, Result};
pub use feed_key::FeedKey;

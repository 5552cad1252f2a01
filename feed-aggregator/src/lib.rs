pub mod types;
pub mod rss_utils;
pub mod extractor;
pub mod normalizer;
pub mod parser;
pub mod traits;
pub mod fetcher;
pub mod sources;
pub mod aggregator;
pub mod operations;

pub use types::*;
pub use extractor::ThumbnailExtractor;
pub use normalizer::FeedNormalizer;
pub use parser::FeedParser;
pub use traits::FeedSource;
pub use fetcher::Fetcher;
pub use sources::{SourceRouter, SyntheticSource};
pub use aggregator::Aggregator;
pub use operations::{OperationOutput, OperationRegistry, OperationSpec};

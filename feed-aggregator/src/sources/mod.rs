pub mod router;
pub mod synthetic;

pub use router::SourceRouter;
pub use synthetic::SyntheticSource;

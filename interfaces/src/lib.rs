pub mod defs;

pub use defs::{CallResult, OperationDescriptor, OperationHandler, TextContent};

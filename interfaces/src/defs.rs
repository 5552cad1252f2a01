use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    pub is_error: bool,
}

impl CallResult {
    pub fn success(structured_content: Value, content: Vec<TextContent>) -> Self {
        Self {
            content,
            structured_content: Some(structured_content),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(message)],
            structured_content: None,
            is_error: true,
        }
    }
}

// Dispatcher note:
// The transport layer owns routing and wire encoding. Whatever sits on the
// other side of this trait only ever sees descriptors and call results, and
// a failed call comes back as a `CallResult` with `is_error` set rather than
// as a Rust error.

#[async_trait]
pub trait OperationHandler: Send + Sync {
    fn descriptors(&self) -> Vec<OperationDescriptor>;
    async fn call(&self, name: &str, arguments: Value) -> CallResult;
}

//! Named, schema-described operations bound to the aggregator.
//!
//! An operation is configuration only: a typed input (deserialized and
//! validated before anything is fetched), a way to turn that input into an
//! [`AggregationRequest`], and the key its records are published under.

pub mod catalog;

use crate::aggregator::Aggregator;
use crate::rss_utils;
use crate::types::{AggregationRequest, AggregatorError, CanonicalPost, Result};
use async_trait::async_trait;
use interfaces::{CallResult, OperationDescriptor, OperationHandler, TextContent};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

const SUMMARY_DESCRIPTION_CHARS: usize = 200;

/// Sources, bound and filter derived from one validated input.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlan {
    pub sources: Vec<String>,
    pub count: usize,
    pub keyword: Option<String>,
}

/// Implemented by every operation's input type.
pub trait OperationInput: DeserializeOwned + JsonSchema {
    /// Checks serde cannot express (ranges, URL-safe identifiers).
    fn validate(&self) -> std::result::Result<(), String>;

    fn plan(self) -> SourcePlan;
}

type PlanFn = Box<dyn Fn(Value) -> Result<AggregationRequest> + Send + Sync>;

pub struct OperationSpec {
    name: String,
    description: String,
    output_key: String,
    input_schema: Value,
    plan: PlanFn,
}

impl OperationSpec {
    pub fn new<I: OperationInput + 'static>(
        name: &str,
        description: &str,
        output_key: &str,
        placeholder_title: &str,
    ) -> Self {
        let operation = name.to_string();
        let placeholder = placeholder_title.to_string();

        let plan: PlanFn = Box::new(move |arguments: Value| {
            let arguments = if arguments.is_null() {
                Value::Object(Map::new())
            } else {
                arguments
            };

            let input: I = serde_json::from_value(arguments).map_err(|e| AggregatorError::InvalidInput {
                operation: operation.clone(),
                message: e.to_string(),
            })?;
            input.validate().map_err(|message| AggregatorError::InvalidInput {
                operation: operation.clone(),
                message,
            })?;

            let plan = input.plan();
            Ok(AggregationRequest::new(plan.sources, plan.count, &placeholder).with_keyword(plan.keyword))
        });

        Self {
            name: name.to_string(),
            description: description.to_string(),
            output_key: output_key.to_string(),
            input_schema: schema_value(name, &schema_for!(I)),
            plan,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Validate `arguments` and build the request without fetching anything.
    pub fn prepare(&self, arguments: Value) -> Result<AggregationRequest> {
        (self.plan)(arguments)
    }

    pub fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: output_schema(&self.output_key),
        }
    }
}

/// Serialized JSON Schema, or `null` with a warning if it cannot be
/// serialized.
fn schema_value<T: Serialize>(label: &str, schema: &T) -> Value {
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not serialize schema for {}: {}", label, e);
            Value::Null
        }
    }
}

fn output_schema(output_key: &str) -> Value {
    let post = schema_value(output_key, &schema_for!(CanonicalPost).schema);
    json!({
        "type": "object",
        "properties": {
            output_key: { "type": "array", "items": post }
        },
        "required": [output_key]
    })
}

/// Records plus their human-readable rendering.
#[derive(Debug, Clone)]
pub struct OperationOutput {
    pub output_key: String,
    pub records: Vec<CanonicalPost>,
    pub summaries: Vec<String>,
}

impl OperationOutput {
    pub fn structured(&self) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert(self.output_key.clone(), serde_json::to_value(&self.records)?);
        Ok(Value::Object(payload))
    }
}

/// One short text block: title, truncated description, link and image.
pub fn render_summary(post: &CanonicalPost) -> String {
    let mut lines = vec![post.title.clone()];
    if !post.description.is_empty() {
        lines.push(rss_utils::text::truncate_words(&post.description, SUMMARY_DESCRIPTION_CHARS));
    }
    lines.push(format!("Link: {}", post.link));
    if let Some(thumbnail) = &post.thumbnail {
        lines.push(format!("Image: {}", thumbnail));
    }
    lines.join("\n")
}

pub struct OperationRegistry {
    aggregator: Aggregator,
    operations: Vec<OperationSpec>,
}

impl OperationRegistry {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator,
            operations: Vec::new(),
        }
    }

    /// Registry preloaded with the operations from [`catalog`].
    pub fn with_default_operations(aggregator: Aggregator) -> Self {
        let mut registry = Self::new(aggregator);
        for spec in catalog::default_operations() {
            registry.register(spec);
        }
        registry
    }

    /// Adds an operation, replacing any previous one with the same name.
    pub fn register(&mut self, spec: OperationSpec) {
        self.operations.retain(|existing| existing.name() != spec.name());
        info!("Registered operation: {}", spec.name());
        self.operations.push(spec);
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.iter().find(|op| op.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name()).collect()
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<OperationOutput> {
        let spec = self
            .get(name)
            .ok_or_else(|| AggregatorError::UnknownOperation(name.to_string()))?;

        let request = spec.prepare(arguments)?;
        info!(
            "Invoking {} over {} sources (count {})",
            name,
            request.sources.len(),
            request.count
        );

        let records = self.aggregator.aggregate(&request).await;
        let summaries = records.iter().map(render_summary).collect();

        Ok(OperationOutput {
            output_key: spec.output_key().to_string(),
            records,
            summaries,
        })
    }
}

#[async_trait]
impl OperationHandler for OperationRegistry {
    fn descriptors(&self) -> Vec<OperationDescriptor> {
        self.operations.iter().map(OperationSpec::descriptor).collect()
    }

    async fn call(&self, name: &str, arguments: Value) -> CallResult {
        let output = match self.invoke(name, arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Operation {} failed: {}", name, e);
                return CallResult::error(e.to_string());
            }
        };

        match output.structured() {
            Ok(structured) => CallResult::success(
                structured,
                output.summaries.into_iter().map(TextContent::new).collect(),
            ),
            Err(e) => {
                warn!("Operation {} produced unserializable output: {}", name, e);
                CallResult::error(e.to_string())
            }
        }
    }
}

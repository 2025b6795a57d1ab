//! Normalized JSON string attributes

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfplug::schema::{
    AttributeBuilder, SemanticEquality, Validator, ValidatorRequest, ValidatorResponse,
};
use tfplug::types::{Diagnostic, Dynamic};

pub struct JsonValidator;

impl Validator for JsonValidator {
    fn description(&self) -> String {
        "value must be a valid JSON document".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Dynamic::String(s) = &request.config_value {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(s) {
                response.diagnostics.push(
                    Diagnostic::error(
                        "Invalid JSON String Value",
                        format!(
                            "A string value was provided that is not valid JSON string format (RFC 7159).\n\nGiven Value: {}\nError: {}",
                            s, e
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

/// Whitespace and key order do not matter
pub struct JsonEquality;

impl SemanticEquality for JsonEquality {
    fn description(&self) -> String {
        "JSON documents are compared after parsing".to_string()
    }

    fn semantically_equal(&self, prior: &Dynamic, new: &Dynamic) -> bool {
        match (parse(prior), parse(new)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// String attribute carrying JSON validation and semantic equality
pub fn attribute(name: &str) -> AttributeBuilder {
    AttributeBuilder::string(name)
        .validator(Box::new(JsonValidator))
        .semantic_equality(Box::new(JsonEquality))
}

fn parse(value: &Dynamic) -> Option<serde_json::Value> {
    value.as_str().and_then(|s| serde_json::from_str(s).ok())
}

/// Decode a JSON attribute into a typed input
pub fn unmarshal<T: DeserializeOwned>(document: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(document)
}

/// Encode an API value as a compact JSON attribute value
pub fn marshal<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Whether two documents differ once parsed. Unparseable input compares as text.
pub fn changed(prior: &str, planned: &str) -> bool {
    match (
        serde_json::from_str::<serde_json::Value>(prior),
        serde_json::from_str::<serde_json::Value>(planned),
    ) {
        (Ok(a), Ok(b)) => a != b,
        _ => prior != planned,
    }
}

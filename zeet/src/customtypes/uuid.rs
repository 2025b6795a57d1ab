//! UUID string attributes
//!
//! Terraform holds these as strings. Validation rejects anything that does
//! not parse, and semantic equality keeps the configured spelling when the
//! API answers with a different case.

use tfplug::schema::{
    AttributeBuilder, SemanticEquality, Validator, ValidatorRequest, ValidatorResponse,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use uuid::Uuid;

pub struct UuidValidator;

impl Validator for UuidValidator {
    fn description(&self) -> String {
        "value must be a valid UUID".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        match &request.config_value {
            Dynamic::Null | Dynamic::Unknown => {}
            Dynamic::String(s) => {
                if let Err(e) = Uuid::parse_str(s) {
                    response.diagnostics.push(
                        Diagnostic::error("expected a valid UUID", e.to_string())
                            .with_attribute(request.path),
                    );
                }
            }
            other => response.diagnostics.push(
                Diagnostic::error(
                    "expected a string",
                    format!("got a {} value", other.type_name()),
                )
                .with_attribute(request.path),
            ),
        }
        response
    }
}

pub struct UuidEquality;

impl SemanticEquality for UuidEquality {
    fn description(&self) -> String {
        "UUIDs are compared by value".to_string()
    }

    fn semantically_equal(&self, prior: &Dynamic, new: &Dynamic) -> bool {
        match (parse(prior), parse(new)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// String attribute carrying UUID validation and semantic equality
pub fn attribute(name: &str) -> AttributeBuilder {
    AttributeBuilder::string(name)
        .validator(Box::new(UuidValidator))
        .semantic_equality(Box::new(UuidEquality))
}

/// Parsed UUID, `None` for null, unknown and malformed values
pub fn parse(value: &Dynamic) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

/// UUID at `path`, `None` for null, unknown and malformed values
pub fn uuid_value(state: &DynamicValue, path: &AttributePath) -> Option<Uuid> {
    state.get(path).and_then(parse)
}

/// Canonical hyphenated lowercase form
pub fn to_value(id: Uuid) -> Dynamic {
    Dynamic::String(id.hyphenated().to_string())
}

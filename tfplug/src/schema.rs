//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas: attribute types, nested attributes and the hooks (validators, plan
//! modifiers, defaults, semantic equality) that run against attribute values.

use crate::types::{AttributePath, Diagnostic, Dynamic};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    /// cty type constraint in its JSON form
    pub fn to_type_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(inner) => json!(["list", inner.to_type_json()]),
            AttributeType::Set(inner) => json!(["set", inner.to_type_json()]),
            AttributeType::Map(inner) => json!(["map", inner.to_type_json()]),
            AttributeType::Object(fields) => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_type_json()))
                    .collect();
                json!(["object", fields])
            }
        }
    }

    /// Reshape `value` so every object carries exactly the attributes of
    /// its type. Missing attributes become null, unexpected ones are dropped.
    pub fn conform(&self, value: Dynamic) -> Dynamic {
        match (self, value) {
            (AttributeType::Object(fields), Dynamic::Map(mut map)) => Dynamic::Map(
                fields
                    .iter()
                    .map(|(name, ty)| {
                        let v = map.remove(name).unwrap_or(Dynamic::Null);
                        (name.clone(), ty.conform(v))
                    })
                    .collect(),
            ),
            (AttributeType::List(inner) | AttributeType::Set(inner), Dynamic::List(items)) => {
                Dynamic::List(items.into_iter().map(|v| inner.conform(v)).collect())
            }
            (AttributeType::Map(inner), Dynamic::Map(map)) => Dynamic::Map(
                map.into_iter()
                    .map(|(k, v)| (k, inner.conform(v)))
                    .collect(),
            ),
            (_, value) => value,
        }
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    /// Object type of the root block
    pub fn value_type(&self) -> AttributeType {
        attributes_type(&self.block.attributes)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    pub fn conform(&self, value: Dynamic) -> Dynamic {
        self.value_type().conform(value)
    }
}

/// Block represents a configuration block
#[derive(Debug)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub description_kind: StringKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub default: Option<Box<dyn Default>>,
    pub semantic_equality: Option<Box<dyn SemanticEquality>>,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

impl Attribute {
    /// Value type, derived from the nested attributes when there are any
    pub fn value_type(&self) -> AttributeType {
        match &self.nested_type {
            Some(nested) => {
                let object = attributes_type(&nested.attributes);
                match nested.nesting {
                    ObjectNestingMode::Single => object,
                    ObjectNestingMode::List => AttributeType::List(Box::new(object)),
                    ObjectNestingMode::Set => AttributeType::Set(Box::new(object)),
                    ObjectNestingMode::Map => AttributeType::Map(Box::new(object)),
                }
            }
            None => self.r#type.clone(),
        }
    }
}

fn attributes_type(attributes: &[Attribute]) -> AttributeType {
    AttributeType::Object(
        attributes
            .iter()
            .map(|a| (a.name.clone(), a.value_type()))
            .collect(),
    )
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("default", &self.default.is_some())
            .field("semantic_equality", &self.semantic_equality.is_some())
            .field("nested_type", &self.nested_type)
            .finish()
    }
}

/// NestedType for attributes with nested structures
#[derive(Debug)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Single,
    List,
    Set,
    Map,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator checks a known, non-null configuration value
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: Dynamic,
    pub path: AttributePath,
}

/// Response from validators
#[derive(Default)]
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: Dynamic,
    pub state_value: Dynamic,
    pub plan_value: Dynamic,
    pub path: AttributePath,
    /// The whole resource has no prior state
    pub creating: bool,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifierResponse {
    pub fn unchanged(request: PlanModifierRequest) -> Self {
        Self {
            plan_value: request.plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Default provides default values for optional attributes
/// Called when attribute is not set in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Request for default values
pub struct DefaultRequest {
    pub path: AttributePath,
}

/// Response with default value
pub struct DefaultResponse {
    pub value: Dynamic,
}

/// SemanticEquality decides whether a freshly read value means the same
/// thing as the one Terraform already holds, in which case the held value
/// is kept and no diff is shown.
pub trait SemanticEquality: Send + Sync {
    fn description(&self) -> String;
    fn semantically_equal(&self, prior: &Dynamic, new: &Dynamic) -> bool;
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                description_kind: StringKind::Plain,
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
                semantic_equality: None,
                nested_type: None,
                deprecated: false,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn list(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element)))
    }

    /// Attribute holding a single object with its own attributes
    pub fn single_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::nested(name, attributes, ObjectNestingMode::Single)
    }

    /// Attribute holding a list of objects
    pub fn list_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        Self::nested(name, attributes, ObjectNestingMode::List)
    }

    fn nested(name: &str, attributes: Vec<Attribute>, nesting: ObjectNestingMode) -> Self {
        let mut builder = Self::new(name, AttributeType::Object(HashMap::new()));
        builder.attribute.nested_type = Some(NestedType {
            attributes,
            nesting,
        });
        builder.attribute.r#type = builder.attribute.value_type();
        builder
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn markdown_description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self.attribute.description_kind = StringKind::Markdown;
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    /// Add validator
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    /// Add plan modifier
    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    /// Set default
    pub fn default(mut self, default: Box<dyn Default>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    pub fn semantic_equality(mut self, equality: Box<dyn SemanticEquality>) -> Self {
        self.attribute.semantic_equality = Some(equality);
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    version: 0,
                    attributes: Vec::new(),
                    description: String::new(),
                    description_kind: StringKind::Plain,
                    deprecated: false,
                },
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    /// Add attribute
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn markdown_description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self.schema.block.description_kind = StringKind::Markdown;
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::string("name")
            .description("The name of the group.")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the group.");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Group resource")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(AttributeBuilder::string("name").required().build())
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert!(schema.attribute("name").is_some());
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn type_json_matches_cty() {
        let ty = AttributeType::List(Box::new(AttributeType::String));
        assert_eq!(ty.to_type_json(), serde_json::json!(["list", "string"]));

        let obj = AttributeType::Object(HashMap::from([(
            "port".to_string(),
            AttributeType::Number,
        )]));
        assert_eq!(
            obj.to_type_json(),
            serde_json::json!(["object", {"port": "number"}])
        );
    }

    #[test]
    fn list_nested_attribute_type() {
        let attr = AttributeBuilder::list_nested(
            "deploys",
            vec![
                AttributeBuilder::string("id").computed().build(),
                AttributeBuilder::list("default_workflow_steps", AttributeType::String)
                    .required()
                    .build(),
            ],
        )
        .optional()
        .build();

        let AttributeType::List(inner) = attr.value_type() else {
            panic!("expected list type");
        };
        let AttributeType::Object(fields) = *inner else {
            panic!("expected object element");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(attr.r#type, attr.value_type());
    }

    #[test]
    fn conform_fills_missing_attributes_with_null() {
        let schema = SchemaBuilder::new()
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(
                AttributeBuilder::single_nested(
                    "workflow",
                    vec![
                        AttributeBuilder::string("id").computed().build(),
                        AttributeBuilder::string("steps").required().build(),
                    ],
                )
                .optional()
                .build(),
            )
            .build();

        let value = Dynamic::object([(
            "workflow",
            Dynamic::object([("steps", Dynamic::from("[]"))]),
        )]);
        let conformed = schema.conform(value);

        assert!(conformed.attr("id").is_null());
        assert!(conformed.attr("workflow").attr("id").is_null());
        assert_eq!(conformed.attr("workflow").attr("steps").as_str(), Some("[]"));
        assert_eq!(conformed.attr("workflow").as_map().map(|m| m.len()), Some(2));
    }
}

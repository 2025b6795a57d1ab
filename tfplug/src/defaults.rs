//! Default value providers for attributes
//!
//! Defaults are evaluated during planning when an attribute's configuration
//! value is null. They run before unknown marking and plan modifiers, so a
//! defaulted computed attribute never shows up as "known after apply".
//!
//! ```no_run
//! use tfplug::schema::AttributeBuilder;
//! use tfplug::defaults::StaticDefault;
//!
//! let enabled = AttributeBuilder::bool("enabled")
//!     .optional()
//!     .computed()
//!     .default(StaticDefault::bool(true))
//!     .build();
//! ```

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::Dynamic;

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    /// Create a new static default provider with the given value
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    /// Create a static string default
    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    /// Create a static number default
    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    /// Create a static boolean default
    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }

    /// Object default. Attributes not listed are filled with null when the
    /// plan is conformed to the schema.
    pub fn object<I, K>(attributes: I) -> Box<dyn Default>
    where
        I: IntoIterator<Item = (K, Dynamic)>,
        K: Into<String>,
    {
        Self::create(Dynamic::object(attributes))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: self.value.clone(),
        }
    }
}

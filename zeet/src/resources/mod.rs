pub mod group;
pub mod project;
pub mod subgroup;

pub use group::GroupResource;
pub use project::ProjectResource;
pub use subgroup::GroupSubgroupResource;

use std::fmt::Display;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use uuid::Uuid;

use crate::customtypes;

/// Remote call failed
pub(crate) fn client_error(action: &str, err: impl Display) -> Diagnostic {
    Diagnostic::error(
        "Client Error",
        format!("Unable to {}, got error: {}", action, err),
    )
}

pub(crate) fn invalid_configuration(detail: impl Into<String>) -> Diagnostic {
    Diagnostic::error("Invalid Configuration", detail)
}

/// UUID attribute that must be known at this point of the lifecycle
pub(crate) fn required_uuid(state: &DynamicValue, name: &str) -> Result<Uuid, Diagnostic> {
    let path = AttributePath::new(name);
    customtypes::uuid::uuid_value(state, &path).ok_or_else(|| {
        invalid_configuration(format!("{} must be a known, valid UUID", name)).with_attribute(path)
    })
}

/// UUID attribute of a prior state, nil when absent (e.g. right after import)
pub(crate) fn state_uuid(state: &DynamicValue, name: &str) -> Uuid {
    customtypes::uuid::uuid_value(state, &AttributePath::new(name)).unwrap_or(Uuid::nil())
}

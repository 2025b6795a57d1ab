pub mod blueprint;
pub mod group;
pub mod subgroup;
pub mod team;

pub use blueprint::BlueprintDataSource;
pub use group::GroupDataSource;
pub use subgroup::GroupSubgroupDataSource;
pub use team::TeamDataSource;

use tfplug::data_source::ReadDataSourceResponse;
use tfplug::types::{Diagnostic, DynamicValue};

/// Failed reads hand the config back unchanged
pub(crate) fn read_response(
    config: DynamicValue,
    result: Result<DynamicValue, Diagnostic>,
) -> ReadDataSourceResponse {
    match result {
        Ok(state) => {
            tracing::trace!("read a data source");
            ReadDataSourceResponse {
                state,
                diagnostics: vec![],
                deferred: None,
            }
        }
        Err(diag) => ReadDataSourceResponse {
            state: config,
            diagnostics: vec![diag],
            deferred: None,
        },
    }
}

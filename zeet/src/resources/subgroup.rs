//! Subgroup resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::{client_error, required_uuid, state_uuid};
use crate::api::v1::subgroup::{CreateSubGroupInput, UpdateSubGroupInput};
use crate::customtypes;
use crate::provider_data::{self, ZeetProviderData};

#[derive(Default)]
pub struct GroupSubgroupResource {
    provider_data: Option<ZeetProviderData>,
}

impl GroupSubgroupResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ZeetProviderData, Diagnostic> {
        self.provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)
    }

    async fn create_subgroup(&self, planned: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let input = CreateSubGroupInput {
            group_id: required_uuid(planned, "group_id")?,
            name: planned
                .get_string(&AttributePath::new("name"))
                .map_err(|e| super::invalid_configuration(e.to_string()))?,
        };

        let subgroup = client
            .v1()
            .subgroups()
            .create(&input)
            .await
            .map_err(|e| client_error("create subgroup", e))?;

        let mut state = planned.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(subgroup.id));
        let _ = state.set_string(&AttributePath::new("name"), subgroup.name);
        Ok(state)
    }

    async fn update_subgroup(
        &self,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let id = required_uuid(prior, "id")?;
        let input = UpdateSubGroupInput {
            name: planned.get_string(&AttributePath::new("name")).ok(),
        };

        let subgroup = client
            .v1()
            .subgroups()
            .update(id, &input)
            .await
            .map_err(|e| client_error("update subgroup", e))?;

        let mut state = planned.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(id));
        let _ = state.set_string(&AttributePath::new("name"), subgroup.name);
        Ok(state)
    }
}

#[async_trait]
impl Resource for GroupSubgroupResource {
    fn type_name(&self) -> &str {
        "zeet_group_subgroup"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .markdown_description("Zeet Group Subgroup resource")
            .attribute(
                customtypes::uuid::attribute("team_id")
                    .markdown_description("Team identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("group_id")
                    .markdown_description("Group identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Subgroup identifier")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Subgroup name")
                    .required()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_subgroup(&request.planned_state).await {
            Ok(new_state) => {
                tracing::trace!("created a resource");
                CreateResourceResponse {
                    new_state,
                    private: vec![],
                    diagnostics: vec![],
                }
            }
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                    private: request.private,
                    deferred: None,
                };
            }
        };

        let team_id = state_uuid(&request.current_state, "team_id");
        let group_id = state_uuid(&request.current_state, "group_id");
        let id = state_uuid(&request.current_state, "id");

        match provider_data
            .client
            .v1()
            .subgroups()
            .get(team_id, group_id, id)
            .await
        {
            Ok(Some(subgroup)) => {
                let mut new_state = request.current_state.clone();
                let _ = new_state.set_value(
                    &AttributePath::new("id"),
                    customtypes::uuid::to_value(subgroup.id),
                );
                let _ = new_state.set_string(&AttributePath::new("name"), subgroup.name);

                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Ok(None) => {
                tracing::debug!(%id, "subgroup no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error("read subgroup", e)],
                private: request.private,
                deferred: None,
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .update_subgroup(&request.prior_state, &request.planned_state)
            .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = state_uuid(&request.prior_state, "id");
        if let Err(e) = provider_data.client.v1().subgroups().delete(id).await {
            diagnostics.push(client_error("delete subgroup", e));
        }

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };
        tfplug::import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for GroupSubgroupResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match provider_data::extract(request.provider_data, "Resource") {
            Ok(data) => self.provider_data = data,
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

//! Group resource implementation

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
use crate::api::v1::group::{CreateGroupInput, UpdateGroupInput};
use crate::customtypes;
use crate::provider_data::{self, ZeetProviderData};

#[derive(Default)]
pub struct GroupResource {
    provider_data: Option<ZeetProviderData>,
}

impl GroupResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ZeetProviderData, Diagnostic> {
        self.provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)
    }

    async fn create_group(&self, planned: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let input = CreateGroupInput {
            team_id: required_uuid(planned, "team_id")?,
            name: planned
                .get_string(&AttributePath::new("name"))
                .map_err(|e| super::invalid_configuration(e.to_string()))?,
        };

        let group = client
            .v1()
            .groups()
            .create(&input)
            .await
            .map_err(|e| client_error("create group", e))?;

        let mut state = planned.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(group.id));
        let _ = state.set_string(&AttributePath::new("name"), group.name);
        Ok(state)
    }

    async fn update_group(
        &self,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let id = required_uuid(prior, "id")?;
        let input = UpdateGroupInput {
            name: planned.get_string(&AttributePath::new("name")).ok(),
        };

        let group = client
            .v1()
            .groups()
            .update(id, &input)
            .await
            .map_err(|e| client_error("update group", e))?;

        let mut state = planned.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(id));
        let _ = state.set_string(&AttributePath::new("name"), group.name);
        Ok(state)
    }
}

#[async_trait]
impl Resource for GroupResource {
    fn type_name(&self) -> &str {
        "zeet_group"
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
            .markdown_description("Zeet Group resource")
            .attribute(
                customtypes::uuid::attribute("team_id")
                    .markdown_description("Team identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Group identifier")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Group name")
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
        match self.create_group(&request.planned_state).await {
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
        let id = state_uuid(&request.current_state, "id");

        match provider_data.client.v1().groups().get(team_id, id).await {
            Ok(Some(group)) => {
                let mut new_state = request.current_state.clone();
                let _ = new_state.set_value(
                    &AttributePath::new("id"),
                    customtypes::uuid::to_value(group.id),
                );
                let _ = new_state.set_string(&AttributePath::new("name"), group.name);

                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Ok(None) => {
                tracing::debug!(%id, "group no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error("read group", e)],
                private: request.private,
                deferred: None,
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .update_group(&request.prior_state, &request.planned_state)
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
        if let Err(e) = provider_data.client.v1().groups().delete(id).await {
            diagnostics.push(client_error("delete group", e));
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
impl ResourceWithConfigure for GroupResource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::types::Dynamic;

    #[tokio::test]
    async fn schema_marks_id_computed() {
        let resource = GroupResource::new();
        let schema = resource
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let id = schema.attribute("id").expect("id");
        assert!(id.computed && !id.optional);
        assert_eq!(id.plan_modifiers.len(), 1);
        assert!(schema.attribute("team_id").expect("team_id").required);
        assert!(schema.attribute("name").expect("name").required);
    }

    #[tokio::test]
    async fn create_without_provider_data_reports_error() {
        let resource = GroupResource::new();
        let planned = DynamicValue::new(Dynamic::object([
            ("team_id", Dynamic::from("99c11487-1683-4e10-9620-94d9a78a0b67")),
            ("id", Dynamic::Unknown),
            ("name", Dynamic::from("group")),
        ]));

        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "zeet_group".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut resource = GroupResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(std::sync::Arc::new("not zeet".to_string())),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Unexpected Resource Configure Type"
        );
    }

    #[tokio::test]
    async fn import_sets_id() {
        let resource = GroupResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "zeet_group".to_string(),
                    id: "ddf9093e-cc11-46a5-82c7-fc99fc44ef93".to_string(),
                    client_capabilities: Default::default(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "ddf9093e-cc11-46a5-82c7-fc99fc44ef93"
        );
    }
}

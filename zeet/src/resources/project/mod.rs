//! Project resource implementation
//!
//! A project is either a container project (v0 repo) or a workflow project
//! (v1 project with deploys). The shape is picked from which block is set
//! and cannot change after creation.

mod container;
mod model;
mod workflow;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::invalid_configuration;
use crate::customtypes::{self, json};
use crate::provider_data::{self, ZeetProviderData};
use model::ProjectModel;

const SHAPE_REQUIRED: &str = "Project must have either a container or workflow configuration";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Container,
    Workflow,
}

impl Shape {
    fn of(data: &ProjectModel) -> Option<Self> {
        if data.is_container() {
            Some(Shape::Container)
        } else if data.is_workflow() {
            Some(Shape::Workflow)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct ProjectResource {
    provider_data: Option<ZeetProviderData>,
}

impl ProjectResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ZeetProviderData, Diagnostic> {
        self.provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)
    }

    async fn create_project(&self, planned: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let mut data = ProjectModel::from_value(&planned.value);

        match Shape::of(&data) {
            Some(Shape::Container) => container::create(client, &mut data).await?,
            Some(Shape::Workflow) => workflow::create(client, &mut data).await?,
            None => return Err(invalid_configuration(SHAPE_REQUIRED)),
        }

        Ok(DynamicValue::new(data.to_value()))
    }

    async fn read_project(&self, current: &DynamicValue) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = &self.provider_data()?.client;
        let data = ProjectModel::from_value(&current.value);

        let refreshed = match Shape::of(&data) {
            Some(Shape::Container) => container::read(client, data).await?,
            Some(Shape::Workflow) => workflow::read(client, data).await?,
            None => return Err(invalid_configuration(SHAPE_REQUIRED)),
        };

        Ok(refreshed.map(|data| DynamicValue::new(data.to_value())))
    }

    async fn update_project(
        &self,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = &self.provider_data()?.client;
        let state = ProjectModel::from_value(&prior.value);
        let mut plan = ProjectModel::from_value(&planned.value);

        let shape = Shape::of(&plan)
            .filter(|shape| Shape::of(&state) == Some(*shape))
            .ok_or_else(|| {
                invalid_configuration(format!("{}, and it must not change", SHAPE_REQUIRED))
            })?;

        match shape {
            Shape::Container => container::update(client, &plan, &state).await?,
            Shape::Workflow => workflow::update(client, &plan, &state).await?,
        }

        // identifiers are assigned at creation and never change
        plan.id = state.id;
        if let (Some(planned), Some(prior)) = (plan.container.as_mut(), state.container.as_ref()) {
            planned.repo_id = prior.repo_id;
        }
        if let (Some(planned), Some(prior)) = (plan.workflow.as_mut(), state.workflow.as_ref()) {
            planned.id = prior.id;
        }
        if let Some(deploys) = plan.deploys.as_mut() {
            for (planned, prior) in deploys.iter_mut().zip(state.deploys()) {
                planned.id = prior.id;
            }
        }

        Ok(DynamicValue::new(plan.to_value()))
    }

    async fn delete_project(&self, prior: &DynamicValue) -> Result<(), Diagnostic> {
        let client = &self.provider_data()?.client;
        let state = ProjectModel::from_value(&prior.value);

        match Shape::of(&state) {
            Some(Shape::Container) => container::delete(client, &state).await,
            Some(Shape::Workflow) => workflow::delete(client, &state).await,
            None => Err(invalid_configuration(SHAPE_REQUIRED)),
        }
    }
}

fn deploy_attributes() -> Vec<Attribute> {
    vec![
        customtypes::uuid::attribute("id")
            .markdown_description("Deploy identifier")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::list("default_workflow_steps", AttributeType::String)
            .markdown_description("Steps run by the workflow for this deploy, e.g. `DRIVER_PLAN`, `DRIVER_APPLY`")
            .required()
            .build(),
        AttributeBuilder::bool("require_plan_approval")
            .markdown_description("Wait for approval after the plan step")
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build(),
        json::attribute("variables")
            .markdown_description("Blueprint variables as a JSON list of `{name, type, value}`")
            .optional()
            .build(),
        json::attribute("kubernetes")
            .markdown_description("Kubernetes deploy configuration as JSON")
            .optional()
            .build(),
        json::attribute("helm")
            .markdown_description("Helm deploy configuration as JSON")
            .optional()
            .build(),
        json::attribute("terraform")
            .markdown_description("Terraform deploy configuration as JSON")
            .optional()
            .build(),
    ]
}

fn workflow_attributes() -> Vec<Attribute> {
    vec![
        customtypes::uuid::attribute("id")
            .markdown_description("Workflow identifier")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        json::attribute("steps")
            .markdown_description("Workflow steps as a JSON list")
            .required()
            .plan_modifier(Box::new(RequiresReplace))
            .build(),
    ]
}

fn container_attributes() -> Vec<Attribute> {
    let source = vec![
        json::attribute("git")
            .markdown_description("Git source as JSON")
            .optional()
            .build(),
        json::attribute("container_registry")
            .markdown_description("Container registry source as JSON")
            .optional()
            .build(),
    ];

    let branch = vec![
        AttributeBuilder::string("production_branch")
            .markdown_description("Branch deployed to production")
            .optional()
            .computed()
            .default(StaticDefault::string("production"))
            .build(),
        AttributeBuilder::bool("auto_deploy_branch")
            .markdown_description("Deploy every pushed branch")
            .optional()
            .build(),
        AttributeBuilder::bool("auto_stop_branch")
            .markdown_description("Stop branch deployments when the branch is deleted")
            .optional()
            .build(),
        AttributeBuilder::string("branch_ignore")
            .markdown_description("Branches never deployed")
            .optional()
            .build(),
        AttributeBuilder::string("branch_stop_ignore")
            .markdown_description("Branches never stopped")
            .optional()
            .build(),
    ];

    let workflow = vec![
        AttributeBuilder::bool("auto_retry")
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build(),
        AttributeBuilder::bool("auto_rollback")
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build(),
        AttributeBuilder::bool("manual_deploy")
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build(),
        customtypes::uuid::attribute("pipeline_cluster_id")
            .markdown_description("Cluster running the build pipeline")
            .optional()
            .build(),
        AttributeBuilder::number("deploy_timeout_seconds")
            .optional()
            .build(),
    ];

    vec![
        customtypes::uuid::attribute("repo_id")
            .markdown_description("Repo identifier")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::single_nested("source", source)
            .markdown_description("Exactly one of `git` or `container_registry`")
            .required()
            .build(),
        AttributeBuilder::single_nested("branch", branch)
            .optional()
            .computed()
            .default(StaticDefault::object([(
                "production_branch",
                Dynamic::from("production"),
            )]))
            .build(),
        AttributeBuilder::single_nested("workflow", workflow)
            .optional()
            .build(),
        json::attribute("build")
            .markdown_description("Build configuration as JSON")
            .optional()
            .build(),
        json::attribute("kubernetes")
            .markdown_description("Kubernetes deploy configuration as JSON")
            .required()
            .build(),
    ]
}

fn uuid_replace(name: &str, description: &str) -> AttributeBuilder {
    customtypes::uuid::attribute(name)
        .markdown_description(description)
        .plan_modifier(Box::new(RequiresReplace))
}

#[async_trait]
impl Resource for ProjectResource {
    fn type_name(&self) -> &str {
        "zeet_project"
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
            .markdown_description("Zeet Project resource")
            .attribute(uuid_replace("team_id", "Team identifier").required().build())
            .attribute(uuid_replace("group_id", "Group identifier").required().build())
            .attribute(
                uuid_replace("subgroup_id", "Sub-group identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Project identifier")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Project name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("enabled")
                    .markdown_description("Whether the project is deployed. Disabling pauses it.")
                    .optional()
                    .computed()
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .attribute(
                uuid_replace("blueprint_id", "Blueprint the project is built from")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::list_nested("deploys", deploy_attributes())
                    .markdown_description(
                        "Deploy configurations of a workflow project. Deploys cannot be added or removed after creation.",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::single_nested("workflow", workflow_attributes())
                    .markdown_description("Workflow of a workflow project")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::single_nested("container", container_attributes())
                    .markdown_description("Container project configuration")
                    .optional()
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
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];
        let config = &request.config.value;
        let container = config.attr("container");
        let workflow = config.attr("workflow");

        // unknown blocks are only known at apply time
        if !container.is_unknown() && !workflow.is_unknown() {
            if !container.is_null() && !workflow.is_null() {
                diagnostics.push(invalid_configuration(
                    "Only one of container or workflow may be set",
                ));
            }
            let source = container.attr("source");
            if !source.attr("git").is_null() && !source.attr("container_registry").is_null() {
                diagnostics.push(
                    invalid_configuration(
                        "Container source must be either git or container registry",
                    )
                    .with_attribute(AttributePath::new("container").attribute("source")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_project(&request.planned_state).await {
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
        match self.read_project(&request.current_state).await {
            Ok(new_state) => {
                if new_state.is_none() {
                    tracing::debug!("project no longer exists, removing from state");
                }
                ReadResourceResponse {
                    new_state,
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(diag) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![diag],
                private: request.private,
                deferred: None,
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .update_project(&request.prior_state, &request.planned_state)
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
        let diagnostics = match self.delete_project(&request.prior_state).await {
            Ok(()) => vec![],
            Err(diag) => vec![diag],
        };
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
impl ResourceWithConfigure for ProjectResource {
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

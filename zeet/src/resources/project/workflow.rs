//! Workflow (IaC) projects, backed by v1 projects and deploys

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tfplug::types::Diagnostic;
use uuid::Uuid;

use super::model::{DeployModel, ProjectModel};
use crate::api::v1::project::{
    BlueprintVariableInput, CreateProjectInput, DeployConfiguration,
    DeploymentConfigurationInput, ProjectDetail, UpdateDeployInput, UpdateProjectInput,
    UpdateWorkflowInput, WorkflowDefinitionInput, PROJECT_STATUS_DRAFT, PROJECT_STATUS_PAUSED,
};
use crate::api::Client;
use crate::customtypes::json;
use crate::resources::{client_error, invalid_configuration};

fn unmarshal<T: DeserializeOwned>(document: &str, what: &str) -> Result<T, Diagnostic> {
    json::unmarshal(document).map_err(|e| {
        invalid_configuration(format!("Unable to unmarshal {}, got error: {}", what, e))
    })
}

fn unmarshal_opt<T: DeserializeOwned>(
    document: &Option<String>,
    what: &str,
) -> Result<Option<T>, Diagnostic> {
    document
        .as_deref()
        .map(|document| unmarshal(document, what))
        .transpose()
}

fn marshal<T: serde::Serialize>(value: &T) -> Result<String, Diagnostic> {
    json::marshal(value).map_err(|e| client_error("read project", e))
}

fn steps_input(steps: Option<&str>) -> Result<WorkflowDefinitionInput, Diagnostic> {
    let steps = steps.ok_or_else(|| invalid_configuration("Workflow steps must be defined"))?;
    Ok(WorkflowDefinitionInput {
        steps: unmarshal(steps, "workflow steps")?,
    })
}

fn deploy_input(deploy: &DeployModel) -> Result<DeploymentConfigurationInput, Diagnostic> {
    Ok(DeploymentConfigurationInput {
        default_workflow_steps: deploy.default_workflow_steps.clone(),
        require_plan_approval: deploy.require_plan_approval,
        variables: unmarshal_opt::<Vec<BlueprintVariableInput>>(&deploy.variables, "variables")?,
        kubernetes: unmarshal_opt(&deploy.kubernetes, "kubernetes")?,
        helm: unmarshal_opt(&deploy.helm, "helm")?,
        terraform: unmarshal_opt(&deploy.terraform, "terraform")?,
    })
}

pub(super) async fn create(client: &Client, data: &mut ProjectModel) -> Result<(), Diagnostic> {
    let team_id = data
        .team_id
        .ok_or_else(|| invalid_configuration("team_id must be set"))?;
    let workflow = steps_input(data.workflow.as_ref().and_then(|w| w.steps.as_deref()))?;
    let deploys = data
        .deploys()
        .iter()
        .map(deploy_input)
        .collect::<Result<Vec<_>, _>>()?;

    let input = CreateProjectInput {
        team_id,
        group_id: data.group_id,
        sub_group_id: data.subgroup_id,
        name: data.name.clone().unwrap_or_default(),
        blueprint_id: data.blueprint_id,
        enabled: data.enabled,
        workflow: Some(workflow),
        deploys,
    };

    let projects = client.v1().projects();
    let created = projects
        .create(&input)
        .await
        .map_err(|e| client_error("create project", e))?;
    data.id = Some(created.id);

    let detail = projects
        .detail(team_id, created.id)
        .await
        .map_err(|e| client_error("read project", e))?
        .ok_or_else(|| client_error("read project", "project not found"))?;

    data.name = Some(detail.name);
    if let (Some(workflow), Some(remote)) = (data.workflow.as_mut(), detail.workflow) {
        workflow.id = Some(remote.id);
    }
    if let Some(deploys) = data.deploys.as_mut() {
        for (deploy, node) in deploys.iter_mut().zip(detail.deploys.nodes) {
            deploy.id = Some(node.id);
        }
    }
    Ok(())
}

/// Null, `{}` or an object of nulls
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.values().all(Value::is_null),
        _ => false,
    }
}

fn object_at<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Map<String, Value>> {
    path.iter()
        .try_fold(value, |current, key| current.get_mut(*key))
        .and_then(Value::as_object_mut)
}

/// Turn the terraform configuration the API returns back into its input shape.
///
/// The provider account comes back as `{awsAccount: {id}}` or
/// `{gcpAccount: {id}}` while the input takes `awsAccountId`/`gcpAccountId`.
/// Empty output configuration and module integration objects are dropped.
fn normalize_terraform(mut terraform: Value) -> Result<Value, Diagnostic> {
    let provider = object_at(&mut terraform, &["target", "provider"]).ok_or_else(|| {
        invalid_configuration("Terraform provider must be either AWS or GCP")
    })?;

    let account = [("awsAccount", "awsAccountId"), ("gcpAccount", "gcpAccountId")]
        .into_iter()
        .find_map(|(account, id_key)| {
            let id = provider.get(account)?.get("id")?.clone();
            Some((id_key, id))
        });
    let Some((id_key, id)) = account else {
        return Err(invalid_configuration(
            "Terraform provider must be either AWS or GCP",
        ));
    };
    provider.remove("awsAccount");
    provider.remove("gcpAccount");
    provider.insert(id_key.to_string(), id);

    if let Some(blueprint) = object_at(&mut terraform, &["blueprint"]) {
        if blueprint.get("outputConfiguration").is_some_and(is_empty) {
            blueprint.remove("outputConfiguration");
        }
    }
    if let Some(module) = object_at(&mut terraform, &["blueprint", "source", "terraformModule"]) {
        if module.get("integration").is_some_and(is_empty) {
            module.remove("integration");
        }
    }

    Ok(terraform)
}

fn deploy_from_api(
    deploy: &mut DeployModel,
    id: Uuid,
    configuration: DeployConfiguration,
) -> Result<(), Diagnostic> {
    deploy.id = Some(id);
    deploy.default_workflow_steps = configuration.default_workflow_steps;
    if configuration.require_plan_approval.is_some() {
        deploy.require_plan_approval = configuration.require_plan_approval;
    }

    if let Some(variables) = configuration.variables.filter(|v| !v.is_empty()) {
        let inputs: Vec<BlueprintVariableInput> = variables.iter().map(|v| v.to_input()).collect();
        deploy.variables = Some(marshal(&inputs)?);
    }
    if let Some(kubernetes) = configuration.kubernetes {
        deploy.kubernetes = Some(marshal(&kubernetes)?);
    }
    if let Some(helm) = configuration.helm {
        deploy.helm = Some(marshal(&helm)?);
    }
    if let Some(terraform) = configuration.terraform {
        deploy.terraform = Some(marshal(&normalize_terraform(terraform)?)?);
    }
    Ok(())
}

fn apply_detail(data: &mut ProjectModel, detail: ProjectDetail) -> Result<(), Diagnostic> {
    data.name = Some(detail.name);
    // a project created disabled stays a draft until it is resumed
    let status = detail.status.as_str();
    data.enabled = Some(status != PROJECT_STATUS_PAUSED && status != PROJECT_STATUS_DRAFT);
    if let (Some(workflow), Some(remote)) = (data.workflow.as_mut(), detail.workflow) {
        workflow.id = Some(remote.id);
    }

    let deploys = data.deploys.get_or_insert_with(Vec::new);
    let count = detail.deploys.nodes.len();
    for (i, node) in detail.deploys.nodes.into_iter().enumerate() {
        if i == deploys.len() {
            deploys.push(DeployModel::default());
        }
        deploy_from_api(&mut deploys[i], node.id, node.configuration.unwrap_or_default())?;
    }
    deploys.truncate(count);
    Ok(())
}

/// Refresh `data` from the v1 project. `None` when the project is gone.
pub(super) async fn read(
    client: &Client,
    data: ProjectModel,
) -> Result<Option<ProjectModel>, Diagnostic> {
    let team_id = data.team_id.unwrap_or(Uuid::nil());
    let id = data.id.unwrap_or(Uuid::nil());

    let Some(detail) = client
        .v1()
        .projects()
        .detail(team_id, id)
        .await
        .map_err(|e| client_error("read project", e))?
    else {
        return Ok(None);
    };

    let mut data = data;
    apply_detail(&mut data, detail)?;
    Ok(Some(data))
}

/// Ids of the remote deploys the planned deploys map onto, by position
fn deploy_ids(plan: &ProjectModel, state: &ProjectModel) -> Result<Vec<Uuid>, Diagnostic> {
    let (planned, prior) = (plan.deploys(), state.deploys());
    if planned.len() < prior.len() {
        return Err(invalid_configuration(format!(
            "The project has {} deploys, deploys cannot be removed in place",
            prior.len()
        )));
    }

    planned
        .iter()
        .enumerate()
        .map(|(i, deploy)| {
            prior.get(i).and_then(|d| d.id).or(deploy.id).ok_or_else(|| {
                invalid_configuration(format!(
                    "Deploy {} does not exist on the project, deploys cannot be added in place",
                    i
                ))
            })
        })
        .collect()
}

pub(super) async fn update(
    client: &Client,
    plan: &ProjectModel,
    state: &ProjectModel,
) -> Result<(), Diagnostic> {
    let id = state.id.unwrap_or(Uuid::nil());
    let workflow_id = state
        .workflow
        .as_ref()
        .and_then(|w| w.id)
        .unwrap_or(Uuid::nil());
    let projects = client.v1().projects();

    if plan.name != state.name {
        projects
            .update(
                id,
                &UpdateProjectInput {
                    name: plan.name.clone(),
                },
            )
            .await
            .map_err(|e| client_error("update project", e))?;
    }

    for (deploy, deploy_id) in plan.deploys().iter().zip(deploy_ids(plan, state)?) {
        projects
            .update_deploy(
                deploy_id,
                &UpdateDeployInput {
                    configuration: Some(deploy_input(deploy)?),
                },
            )
            .await
            .map_err(|e| client_error("update deploy", e))?;
    }

    let planned_steps = plan.workflow.as_ref().and_then(|w| w.steps.as_deref());
    let prior_steps = state.workflow.as_ref().and_then(|w| w.steps.as_deref());
    let steps_changed = match (prior_steps, planned_steps) {
        (Some(prior), Some(planned)) => json::changed(prior, planned),
        (prior, planned) => prior != planned,
    };
    if steps_changed {
        projects
            .update_workflow(
                workflow_id,
                &UpdateWorkflowInput {
                    definition: Some(steps_input(planned_steps)?),
                },
            )
            .await
            .map_err(|e| client_error("update project", e))?;
    }

    // toggle deployment last
    if plan.enabled != state.enabled {
        if plan.enabled.unwrap_or(true) {
            projects
                .submit_workflow_run(workflow_id)
                .await
                .map_err(|e| client_error("resume project", e))?;
        } else {
            projects
                .delete_resources(id)
                .await
                .map_err(|e| client_error("pause project", e))?;
        }
    }

    Ok(())
}

pub(super) async fn delete(client: &Client, state: &ProjectModel) -> Result<(), Diagnostic> {
    client
        .v1()
        .projects()
        .delete(state.id.unwrap_or(Uuid::nil()), false)
        .await
        .map_err(|e| client_error("delete project", e))?;
    Ok(())
}

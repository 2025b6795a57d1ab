//! Container resource inputs
//!
//! These double as the JSON documents users write for the `source`, `build`
//! and `kubernetes` attributes of a container project, so they deserialize
//! as well as serialize.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CreateResourceAlphaInput {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "projectID", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(rename = "environmentID", skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "blueprintID", skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<ResourceBranchInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<ResourceWorkflowInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<ResourceBuildInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<ResourceKubernetesInput>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateResourceAlphaInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInput>,
}

/// Exactly one of the two is set
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_registry: Option<ContainerRegistrySourceInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitSourceInput {
    pub repository: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRegistrySourceInput {
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "registryID", default, skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBranchInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_deploy_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_ignore: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_stop_ignore: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceWorkflowInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rollback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_deploy: Option<bool>,
    #[serde(rename = "pipelineClusterID", skip_serializing_if = "Option::is_none")]
    pub pipeline_cluster_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_timeout_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBuildInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<ProjectBuildInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_submodules: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBuildInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodejs_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub golang_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKubernetesInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_target: Option<ProjectDeployInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<ResourceKubernetesAppInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployInput {
    pub deploy_target: String,
    #[serde(rename = "clusterID", default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKubernetesAppInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_service: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_human_readable_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ContainerResourcesSpecInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortInput {
    pub port: String,
    pub protocol: String,
    pub public: bool,
    pub https: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcesSpecInput {
    pub cpu: f64,
    pub memory: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<bool>,
}

/// Repo settings shared by `updateProjectSettings` and `updateProject`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rollback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_deploy: Option<bool>,
    #[serde(rename = "pipelineClusterID", skip_serializing_if = "Option::is_none")]
    pub pipeline_cluster_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_timeout_seconds: Option<i64>,
}

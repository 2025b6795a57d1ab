//! Container project (repo) operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inputs::{CreateResourceAlphaInput, UpdateProjectInput, UpdateResourceAlphaInput};
use crate::api::graphql::{IdInputVariables, IdVariables, InputVariables, Nodes};
use crate::api::{ApiError, Client, Endpoint};

const CREATE_RESOURCE_ALPHA_MUTATION: &str = r#"mutation createResourceAlpha($input: CreateResourceAlphaInput!) {
  createResourceAlpha(input: $input) {
    id
    name
    project {
      name
    }
    projectEnvironment {
      name
    }
  }
}"#;

const PROJECT_V3_QUERY: &str = r#"query projectV3($userId: ID!, $projectName: String!, $environmentName: String!, $repoName: String!) {
  user(id: $userId) {
    projectV3Adapters(projectName: $projectName, environmentName: $environmentName, name: $repoName) {
      nodes {
        id
        repo {
          id
        }
      }
    }
  }
}"#;

const USER_REPO_QUERY: &str = r#"query userRepo($id: ID!) {
  currentUser {
    repo(id: $id) {
      id
      name
      project {
        id
      }
      projectEnvironment {
        id
      }
      productionBranch
      githubIntegration {
        autoDeployBranch
        autoStopBranch
        branchIgnore
        branchStopIgnore
      }
      gitlabIntegration {
        autoDeployBranch
        autoStopBranch
        branchIgnore
        branchStopIgnore
      }
      autoRetry
      autoRollback
      manualDeploy
      pipelineCluster {
        id
      }
      deployTimeoutSeconds
      source {
        type
        id
      }
      buildMethod {
        type
        dockerfilePath
        workingDirectory
        buildCommand
        runCommand
        staticPath
        nodejsVersion
        pythonVersion
        golangVersion
      }
      gitSubmodules
      deployTarget
      cluster {
        id
      }
      namespace
      deployService
      ports {
        port
        protocol
        public
        https
        grpc
      }
      useHumanReadableKubernetesName
      cpu
      memory
      ephemeralStorage
      dedicated
    }
  }
}"#;

const UPDATE_PROJECT_SETTINGS_MUTATION: &str = r#"mutation updateProjectSettings($input: UpdateProjectInput!) {
  updateProject(input: $input) {
    id
    name
  }
}"#;

const UPDATE_RESOURCE_ALPHA_MUTATION: &str = r#"mutation updateResourceAlpha($id: UUID!, $input: UpdateResourceAlphaInput!) {
  updateResourceAlpha(id: $id, input: $input) {
    id
  }
}"#;

const UPDATE_PROJECT_MUTATION: &str = r#"mutation updateProject($input: UpdateProjectInput!) {
  updateProject(input: $input) {
    id
  }
}"#;

const ENABLE_PROJECT_MUTATION: &str = r#"mutation enableProject($id: ID!) {
  enableRepo(id: $id) {
    id
  }
}"#;

const DISABLE_PROJECT_MUTATION: &str = r#"mutation disableProject($id: ID!) {
  disableRepo(id: $id) {
    id
  }
}"#;

const DELETE_PROJECT_MUTATION: &str = r#"mutation deleteProject($id: ID!) {
  deleteRepo(id: $id)
}"#;

pub const SOURCE_TYPE_DOCKER: &str = "DOCKER";
pub const GIT_SOURCE_TYPES: [&str; 4] = ["GIT", "GITHUB", "GITLAB", "BITBUCKET"];
pub const DEPLOY_TARGET_KUBERNETES: &str = "KUBERNETES";

#[derive(Debug, Clone, Deserialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdRef<Id> {
    pub id: Id,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResource {
    pub id: Option<String>,
    pub name: String,
    pub project: Option<NameRef>,
    pub project_environment: Option<NameRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectV3Adapter {
    pub id: Uuid,
    pub repo: Option<IdRef<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchIntegration {
    #[serde(default)]
    pub auto_deploy_branch: bool,
    #[serde(default)]
    pub auto_stop_branch: bool,
    #[serde(default)]
    pub branch_ignore: String,
    #[serde(default)]
    pub branch_stop_ignore: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMethod {
    #[serde(rename = "type")]
    pub build_type: Option<String>,
    pub dockerfile_path: Option<String>,
    pub working_directory: Option<String>,
    pub build_command: Option<String>,
    pub run_command: Option<String>,
    pub static_path: Option<String>,
    pub nodejs_version: Option<String>,
    pub python_version: Option<String>,
    pub golang_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoPort {
    pub port: String,
    pub protocol: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub grpc: bool,
}

/// Everything the container project read needs from a repo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub id: String,
    pub name: String,
    pub project: Option<IdRef<Uuid>>,
    pub project_environment: Option<IdRef<Uuid>>,
    pub production_branch: Option<String>,
    pub github_integration: Option<BranchIntegration>,
    pub gitlab_integration: Option<BranchIntegration>,
    pub auto_retry: Option<bool>,
    pub auto_rollback: Option<bool>,
    pub manual_deploy: Option<bool>,
    pub pipeline_cluster: Option<IdRef<Uuid>>,
    pub deploy_timeout_seconds: Option<i64>,
    pub source: RepoSource,
    pub build_method: Option<BuildMethod>,
    pub git_submodules: Option<bool>,
    pub deploy_target: Option<String>,
    pub cluster: Option<IdRef<Uuid>>,
    pub namespace: Option<String>,
    pub deploy_service: Option<bool>,
    #[serde(default)]
    pub ports: Vec<RepoPort>,
    pub use_human_readable_kubernetes_name: Option<bool>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub ephemeral_storage: Option<f64>,
    pub dedicated: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectV3Variables<'a> {
    user_id: &'a str,
    project_name: &'a str,
    environment_name: &'a str,
    repo_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResourceAlphaData {
    create_resource_alpha: CreatedResource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectV3User {
    project_v3_adapters: Nodes<ProjectV3Adapter>,
}

#[derive(Deserialize)]
struct ProjectV3Data {
    user: Option<ProjectV3User>,
}

#[derive(Deserialize)]
struct CurrentUser {
    repo: Option<Repo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRepoData {
    current_user: CurrentUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectData {
    update_project: RepoRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResourceAlphaData {
    update_resource_alpha: RepoRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableRepoData {
    enable_repo: RepoRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisableRepoData {
    disable_repo: RepoRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRepoData {
    delete_repo: bool,
}

pub struct ReposApi<'a> {
    client: &'a Client,
}

impl<'a> ReposApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create_resource_alpha(
        &self,
        input: &CreateResourceAlphaInput,
    ) -> Result<CreatedResource, ApiError> {
        let data: CreateResourceAlphaData = self
            .client
            .execute(
                Endpoint::V0,
                "createResourceAlpha",
                CREATE_RESOURCE_ALPHA_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.create_resource_alpha)
    }

    /// Project adapters matching the group, subgroup and repo names
    pub async fn project_v3(
        &self,
        user_id: &str,
        project_name: &str,
        environment_name: &str,
        repo_name: &str,
    ) -> Result<Vec<ProjectV3Adapter>, ApiError> {
        let data: ProjectV3Data = self
            .client
            .execute(
                Endpoint::V0,
                "projectV3",
                PROJECT_V3_QUERY,
                &ProjectV3Variables {
                    user_id,
                    project_name,
                    environment_name,
                    repo_name,
                },
            )
            .await?;
        Ok(data
            .user
            .map(|user| user.project_v3_adapters.nodes)
            .unwrap_or_default())
    }

    /// Repo `id`, `None` when it no longer exists
    pub async fn get(&self, id: &str) -> Result<Option<Repo>, ApiError> {
        let data: UserRepoData = self
            .client
            .execute(Endpoint::V0, "userRepo", USER_REPO_QUERY, &IdVariables { id })
            .await?;
        Ok(data.current_user.repo)
    }

    /// Rename
    pub async fn update_settings(&self, input: &UpdateProjectInput) -> Result<RepoRef, ApiError> {
        let data: UpdateProjectData = self
            .client
            .execute(
                Endpoint::V0,
                "updateProjectSettings",
                UPDATE_PROJECT_SETTINGS_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.update_project)
    }

    pub async fn update_resource_alpha(
        &self,
        id: Uuid,
        input: &UpdateResourceAlphaInput,
    ) -> Result<RepoRef, ApiError> {
        let data: UpdateResourceAlphaData = self
            .client
            .execute(
                Endpoint::V0,
                "updateResourceAlpha",
                UPDATE_RESOURCE_ALPHA_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_resource_alpha)
    }

    /// Workflow settings (retry, rollback, manual deploy, pipeline, timeout)
    pub async fn update(&self, input: &UpdateProjectInput) -> Result<RepoRef, ApiError> {
        let data: UpdateProjectData = self
            .client
            .execute(
                Endpoint::V0,
                "updateProject",
                UPDATE_PROJECT_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.update_project)
    }

    pub async fn enable(&self, id: &str) -> Result<RepoRef, ApiError> {
        let data: EnableRepoData = self
            .client
            .execute(
                Endpoint::V0,
                "enableProject",
                ENABLE_PROJECT_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.enable_repo)
    }

    pub async fn disable(&self, id: &str) -> Result<RepoRef, ApiError> {
        let data: DisableRepoData = self
            .client
            .execute(
                Endpoint::V0,
                "disableProject",
                DISABLE_PROJECT_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.disable_repo)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let data: DeleteRepoData = self
            .client
            .execute(
                Endpoint::V0,
                "deleteProject",
                DELETE_PROJECT_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.delete_repo)
    }
}

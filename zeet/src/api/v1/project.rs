//! Workflow (IaC) project operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::graphql::{IdInputVariables, IdVariables, InputVariables, Nodes};
use crate::api::{ApiError, Client, Endpoint};

const PROJECT_DETAIL_QUERY: &str = r#"query projectDetail($teamId: UUID!, $id: UUID!) {
  team(id: $teamId) {
    project(id: $id) {
      id
      name
      status
      workflow {
        id
      }
      deploys {
        nodes {
          id
          configuration {
            defaultWorkflowSteps
            requirePlanApproval
            variables {
              specId
              name
              valueString
              valueInt
              valueFloat
              valueBoolean
              valueJson
            }
            kubernetes {
              blueprint {
                source {
                  git { repository ref path integration { githubInstallationId gitlabIntegrationId } }
                  helm { repositoryUrl chart version }
                }
              }
              target {
                clusterId
                namespace
              }
            }
            helm {
              blueprint {
                source {
                  git { repository ref path integration { githubInstallationId gitlabIntegrationId } }
                  helmRepository { repositoryUrl chart version }
                }
              }
              target {
                clusterId
                namespace
                releaseName
              }
              values
            }
            terraform {
              blueprint {
                source {
                  git { repository ref path integration { githubInstallationId gitlabIntegrationId } }
                  terraformModule { source version integration { githubInstallationId gitlabIntegrationId } }
                }
                outputConfiguration {
                  dataFormat
                  ttl
                }
              }
              target {
                moduleName
                stateBackend {
                  s3Bucket { awsAccountId bucketName region }
                  gcsBucket { gcpAccountId bucketName location }
                }
                provider {
                  awsAccount { id }
                  gcpAccount { id }
                  region
                }
              }
            }
          }
        }
      }
    }
  }
}"#;

const CREATE_PROJECT_MUTATION: &str = r#"mutation createProject($input: CreateProjectInput!) {
  createProject(input: $input) {
    id
    name
  }
}"#;

const UPDATE_PROJECT_MUTATION: &str = r#"mutation updateProject($id: UUID!, $input: UpdateProjectInput!) {
  updateProject(id: $id, input: $input) {
    id
    name
  }
}"#;

const UPDATE_DEPLOY_MUTATION: &str = r#"mutation updateDeploy($id: UUID!, $input: UpdateDeployInput!) {
  updateDeploy(id: $id, input: $input) {
    id
  }
}"#;

const UPDATE_WORKFLOW_MUTATION: &str = r#"mutation updateWorkflow($id: UUID!, $input: UpdateWorkflowInput!) {
  updateWorkflow(id: $id, input: $input) {
    id
  }
}"#;

const SUBMIT_WORKFLOW_RUN_MUTATION: &str = r#"mutation submitWorkflowRun($id: UUID!, $input: SubmitWorkflowRunInput) {
  submitWorkflowRun(id: $id, input: $input) {
    id
  }
}"#;

const DELETE_PROJECT_RESOURCES_MUTATION: &str = r#"mutation deleteProjectResources($id: UUID!) {
  deleteProjectResources(id: $id) {
    id
  }
}"#;

const DELETE_PROJECT_MUTATION: &str = r#"mutation deleteProject($id: UUID!, $deleteResources: Boolean) {
  deleteProject(id: $id, deleteResources: $deleteResources)
}"#;

pub const PROJECT_STATUS_PAUSED: &str = "PAUSED";
pub const PROJECT_STATUS_DRAFT: &str = "DRAFT";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub team_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_group_id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowDefinitionInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deploys: Vec<DeploymentConfigurationInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDefinitionInput {
    /// `[WorkflowStepDefinitionInput]`, passed through as given
    pub steps: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigurationInput {
    pub default_workflow_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_plan_approval: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<BlueprintVariableInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helm: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlueprintVariableType {
    String,
    Integer,
    Float,
    Boolean,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintVariableInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<BlueprintVariableType>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDeployInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<DeploymentConfigurationInput>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateWorkflowInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<WorkflowDefinitionInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDetail {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub workflow: Option<WorkflowRef>,
    pub deploys: Nodes<Deploy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deploy {
    pub id: Uuid,
    pub configuration: Option<DeployConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfiguration {
    #[serde(default)]
    pub default_workflow_steps: Vec<String>,
    pub require_plan_approval: Option<bool>,
    pub variables: Option<Vec<DeployVariable>>,
    pub kubernetes: Option<serde_json::Value>,
    pub helm: Option<serde_json::Value>,
    pub terraform: Option<serde_json::Value>,
}

/// A variable as the API stores it, one typed value slot is set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployVariable {
    pub spec_id: Option<i64>,
    pub name: Option<String>,
    pub value_string: Option<String>,
    pub value_int: Option<i64>,
    pub value_float: Option<f64>,
    pub value_boolean: Option<bool>,
    pub value_json: Option<String>,
}

impl DeployVariable {
    /// Back to the input shape, typed after whichever value slot is set
    pub fn to_input(&self) -> BlueprintVariableInput {
        let (variable_type, value) = if let Some(v) = &self.value_string {
            (Some(BlueprintVariableType::String), v.clone())
        } else if let Some(v) = self.value_int {
            (Some(BlueprintVariableType::Integer), v.to_string())
        } else if let Some(v) = self.value_float {
            (Some(BlueprintVariableType::Float), v.to_string())
        } else if let Some(v) = self.value_boolean {
            (Some(BlueprintVariableType::Boolean), v.to_string())
        } else if let Some(v) = &self.value_json {
            (Some(BlueprintVariableType::Json), v.clone())
        } else {
            (None, String::new())
        };

        BlueprintVariableInput {
            spec_id: None,
            name: self.name.clone(),
            variable_type,
            value,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDetailVariables {
    team_id: Uuid,
    id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProjectVariables {
    id: Uuid,
    delete_resources: Option<bool>,
}

#[derive(Serialize)]
struct SubmitWorkflowRunVariables {
    id: Uuid,
    input: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ProjectDetailTeam {
    project: Option<ProjectDetail>,
}

#[derive(Deserialize)]
struct ProjectDetailData {
    team: Option<ProjectDetailTeam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectData {
    create_project: ProjectSummary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectData {
    update_project: ProjectSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdOnly {
    pub id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDeployData {
    update_deploy: IdOnly,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWorkflowData {
    update_workflow: IdOnly,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitWorkflowRunData {
    submit_workflow_run: IdOnly,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProjectResourcesData {
    delete_project_resources: Option<IdOnly>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProjectData {
    delete_project: bool,
}

pub struct ProjectsApi<'a> {
    client: &'a Client,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, input: &CreateProjectInput) -> Result<ProjectSummary, ApiError> {
        let data: CreateProjectData = self
            .client
            .execute(
                Endpoint::V1,
                "createProject",
                CREATE_PROJECT_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.create_project)
    }

    /// Full project detail, `None` when the team has no such project
    pub async fn detail(&self, team_id: Uuid, id: Uuid) -> Result<Option<ProjectDetail>, ApiError> {
        let data: ProjectDetailData = self
            .client
            .execute(
                Endpoint::V1,
                "projectDetail",
                PROJECT_DETAIL_QUERY,
                &ProjectDetailVariables { team_id, id },
            )
            .await?;
        Ok(data.team.and_then(|team| team.project))
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateProjectInput,
    ) -> Result<ProjectSummary, ApiError> {
        let data: UpdateProjectData = self
            .client
            .execute(
                Endpoint::V1,
                "updateProject",
                UPDATE_PROJECT_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_project)
    }

    pub async fn update_deploy(
        &self,
        id: Uuid,
        input: &UpdateDeployInput,
    ) -> Result<IdOnly, ApiError> {
        let data: UpdateDeployData = self
            .client
            .execute(
                Endpoint::V1,
                "updateDeploy",
                UPDATE_DEPLOY_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_deploy)
    }

    pub async fn update_workflow(
        &self,
        id: Uuid,
        input: &UpdateWorkflowInput,
    ) -> Result<IdOnly, ApiError> {
        let data: UpdateWorkflowData = self
            .client
            .execute(
                Endpoint::V1,
                "updateWorkflow",
                UPDATE_WORKFLOW_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_workflow)
    }

    /// Start a run of the project workflow, which resumes a paused project
    pub async fn submit_workflow_run(&self, workflow_id: Uuid) -> Result<IdOnly, ApiError> {
        let data: SubmitWorkflowRunData = self
            .client
            .execute(
                Endpoint::V1,
                "submitWorkflowRun",
                SUBMIT_WORKFLOW_RUN_MUTATION,
                &SubmitWorkflowRunVariables {
                    id: workflow_id,
                    input: None,
                },
            )
            .await?;
        Ok(data.submit_workflow_run)
    }

    /// Tear down the deployed resources, leaving the project paused
    pub async fn delete_resources(&self, id: Uuid) -> Result<Option<IdOnly>, ApiError> {
        let data: DeleteProjectResourcesData = self
            .client
            .execute(
                Endpoint::V1,
                "deleteProjectResources",
                DELETE_PROJECT_RESOURCES_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.delete_project_resources)
    }

    pub async fn delete(&self, id: Uuid, delete_resources: bool) -> Result<bool, ApiError> {
        let data: DeleteProjectData = self
            .client
            .execute(
                Endpoint::V1,
                "deleteProject",
                DELETE_PROJECT_MUTATION,
                &DeleteProjectVariables {
                    id,
                    delete_resources: Some(delete_resources),
                },
            )
            .await?;
        Ok(data.delete_project)
    }
}

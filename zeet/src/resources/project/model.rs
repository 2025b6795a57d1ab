//! Typed view of the `zeet_project` state
//!
//! Values are read out of the raw [`Dynamic`] tree once per operation and
//! written back as a whole. Unknown values read as `None`.

use tfplug::types::Dynamic;
use uuid::Uuid;

use crate::customtypes;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectModel {
    pub team_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub subgroup_id: Option<Uuid>,
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub blueprint_id: Option<Uuid>,
    pub deploys: Option<Vec<DeployModel>>,
    pub workflow: Option<WorkflowModel>,
    pub container: Option<ContainerModel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployModel {
    pub id: Option<Uuid>,
    pub default_workflow_steps: Vec<String>,
    pub require_plan_approval: Option<bool>,
    pub variables: Option<String>,
    pub kubernetes: Option<String>,
    pub helm: Option<String>,
    pub terraform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowModel {
    pub id: Option<Uuid>,
    pub steps: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerModel {
    pub repo_id: Option<Uuid>,
    pub source: SourceModel,
    pub branch: Option<BranchModel>,
    pub workflow: Option<ContainerWorkflowModel>,
    pub build: Option<String>,
    pub kubernetes: Option<String>,
}

/// At most one of the two documents is set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceModel {
    pub git: Option<String>,
    pub container_registry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchModel {
    pub production_branch: Option<String>,
    pub auto_deploy_branch: Option<bool>,
    pub auto_stop_branch: Option<bool>,
    pub branch_ignore: Option<String>,
    pub branch_stop_ignore: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerWorkflowModel {
    pub auto_retry: Option<bool>,
    pub auto_rollback: Option<bool>,
    pub manual_deploy: Option<bool>,
    pub pipeline_cluster_id: Option<Uuid>,
    pub deploy_timeout_seconds: Option<i64>,
}

fn string(value: &Dynamic) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn uuid(value: &Dynamic) -> Option<Uuid> {
    customtypes::uuid::parse(value)
}

fn uuid_to_value(id: Option<Uuid>) -> Dynamic {
    id.map(customtypes::uuid::to_value).unwrap_or(Dynamic::Null)
}

/// Objects only; null and unknown are absent
fn object(value: &Dynamic) -> Option<&Dynamic> {
    match value {
        Dynamic::Map(_) => Some(value),
        _ => None,
    }
}

impl ProjectModel {
    pub fn from_value(value: &Dynamic) -> Self {
        Self {
            team_id: uuid(value.attr("team_id")),
            group_id: uuid(value.attr("group_id")),
            subgroup_id: uuid(value.attr("subgroup_id")),
            id: uuid(value.attr("id")),
            name: string(value.attr("name")),
            enabled: value.attr("enabled").as_bool(),
            blueprint_id: uuid(value.attr("blueprint_id")),
            deploys: value
                .attr("deploys")
                .as_list()
                .map(|deploys| deploys.iter().map(DeployModel::from_value).collect()),
            workflow: object(value.attr("workflow")).map(WorkflowModel::from_value),
            container: object(value.attr("container")).map(ContainerModel::from_value),
        }
    }

    pub fn to_value(&self) -> Dynamic {
        Dynamic::object([
            ("team_id", uuid_to_value(self.team_id)),
            ("group_id", uuid_to_value(self.group_id)),
            ("subgroup_id", uuid_to_value(self.subgroup_id)),
            ("id", uuid_to_value(self.id)),
            ("name", Dynamic::from(self.name.clone())),
            ("enabled", Dynamic::from(self.enabled)),
            ("blueprint_id", uuid_to_value(self.blueprint_id)),
            (
                "deploys",
                match &self.deploys {
                    Some(deploys) => Dynamic::List(deploys.iter().map(DeployModel::to_value).collect()),
                    None => Dynamic::Null,
                },
            ),
            (
                "workflow",
                self.workflow
                    .as_ref()
                    .map(WorkflowModel::to_value)
                    .unwrap_or(Dynamic::Null),
            ),
            (
                "container",
                self.container
                    .as_ref()
                    .map(ContainerModel::to_value)
                    .unwrap_or(Dynamic::Null),
            ),
        ])
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn is_workflow(&self) -> bool {
        self.workflow.is_some() && self.deploys.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn deploys(&self) -> &[DeployModel] {
        self.deploys.as_deref().unwrap_or_default()
    }
}

impl DeployModel {
    fn from_value(value: &Dynamic) -> Self {
        Self {
            id: uuid(value.attr("id")),
            default_workflow_steps: value
                .attr("default_workflow_steps")
                .as_list()
                .map(|steps| steps.iter().filter_map(string).collect())
                .unwrap_or_default(),
            require_plan_approval: value.attr("require_plan_approval").as_bool(),
            variables: string(value.attr("variables")),
            kubernetes: string(value.attr("kubernetes")),
            helm: string(value.attr("helm")),
            terraform: string(value.attr("terraform")),
        }
    }

    fn to_value(&self) -> Dynamic {
        Dynamic::object([
            ("id", uuid_to_value(self.id)),
            (
                "default_workflow_steps",
                Dynamic::string_list(self.default_workflow_steps.iter().cloned()),
            ),
            ("require_plan_approval", Dynamic::from(self.require_plan_approval)),
            ("variables", Dynamic::from(self.variables.clone())),
            ("kubernetes", Dynamic::from(self.kubernetes.clone())),
            ("helm", Dynamic::from(self.helm.clone())),
            ("terraform", Dynamic::from(self.terraform.clone())),
        ])
    }
}

impl WorkflowModel {
    fn from_value(value: &Dynamic) -> Self {
        Self {
            id: uuid(value.attr("id")),
            steps: string(value.attr("steps")),
        }
    }

    fn to_value(&self) -> Dynamic {
        Dynamic::object([
            ("id", uuid_to_value(self.id)),
            ("steps", Dynamic::from(self.steps.clone())),
        ])
    }
}

impl ContainerModel {
    fn from_value(value: &Dynamic) -> Self {
        let source = value.attr("source");
        Self {
            repo_id: uuid(value.attr("repo_id")),
            source: SourceModel {
                git: string(source.attr("git")),
                container_registry: string(source.attr("container_registry")),
            },
            branch: object(value.attr("branch")).map(|branch| BranchModel {
                production_branch: string(branch.attr("production_branch")),
                auto_deploy_branch: branch.attr("auto_deploy_branch").as_bool(),
                auto_stop_branch: branch.attr("auto_stop_branch").as_bool(),
                branch_ignore: string(branch.attr("branch_ignore")),
                branch_stop_ignore: string(branch.attr("branch_stop_ignore")),
            }),
            workflow: object(value.attr("workflow")).map(|workflow| ContainerWorkflowModel {
                auto_retry: workflow.attr("auto_retry").as_bool(),
                auto_rollback: workflow.attr("auto_rollback").as_bool(),
                manual_deploy: workflow.attr("manual_deploy").as_bool(),
                pipeline_cluster_id: uuid(workflow.attr("pipeline_cluster_id")),
                deploy_timeout_seconds: workflow.attr("deploy_timeout_seconds").as_i64(),
            }),
            build: string(value.attr("build")),
            kubernetes: string(value.attr("kubernetes")),
        }
    }

    fn to_value(&self) -> Dynamic {
        let branch = match &self.branch {
            Some(branch) => Dynamic::object([
                ("production_branch", Dynamic::from(branch.production_branch.clone())),
                ("auto_deploy_branch", Dynamic::from(branch.auto_deploy_branch)),
                ("auto_stop_branch", Dynamic::from(branch.auto_stop_branch)),
                ("branch_ignore", Dynamic::from(branch.branch_ignore.clone())),
                ("branch_stop_ignore", Dynamic::from(branch.branch_stop_ignore.clone())),
            ]),
            None => Dynamic::Null,
        };
        let workflow = match &self.workflow {
            Some(workflow) => Dynamic::object([
                ("auto_retry", Dynamic::from(workflow.auto_retry)),
                ("auto_rollback", Dynamic::from(workflow.auto_rollback)),
                ("manual_deploy", Dynamic::from(workflow.manual_deploy)),
                ("pipeline_cluster_id", uuid_to_value(workflow.pipeline_cluster_id)),
                ("deploy_timeout_seconds", Dynamic::from(workflow.deploy_timeout_seconds)),
            ]),
            None => Dynamic::Null,
        };

        Dynamic::object([
            ("repo_id", uuid_to_value(self.repo_id)),
            (
                "source",
                Dynamic::object([
                    ("git", Dynamic::from(self.source.git.clone())),
                    (
                        "container_registry",
                        Dynamic::from(self.source.container_registry.clone()),
                    ),
                ]),
            ),
            ("branch", branch),
            ("workflow", workflow),
            ("build", Dynamic::from(self.build.clone())),
            ("kubernetes", Dynamic::from(self.kubernetes.clone())),
        ])
    }
}

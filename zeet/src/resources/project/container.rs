//! Container projects, backed by v0 repos

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfplug::types::Diagnostic;
use uuid::Uuid;

use super::model::{BranchModel, ContainerModel, ContainerWorkflowModel, ProjectModel};
use crate::api::v0::inputs::{
    ContainerRegistrySourceInput, ContainerResourcesSpecInput, CreateResourceAlphaInput,
    GitSourceInput, PortInput, ProjectBuildInput, ProjectDeployInput, ResourceBranchInput,
    ResourceBuildInput, ResourceKubernetesAppInput, ResourceKubernetesInput,
    ResourceWorkflowInput, SourceInput, UpdateProjectInput, UpdateResourceAlphaInput,
};
use crate::api::v0::repo::{
    BranchIntegration, Repo, DEPLOY_TARGET_KUBERNETES, GIT_SOURCE_TYPES, SOURCE_TYPE_DOCKER,
};
use crate::api::Client;
use crate::customtypes::json;
use crate::resources::{client_error, invalid_configuration};

fn unmarshal<T: DeserializeOwned>(document: &str, what: &str) -> Result<T, Diagnostic> {
    json::unmarshal(document).map_err(|e| {
        invalid_configuration(format!("Unable to unmarshal {}, got error: {}", what, e))
    })
}

fn marshal<T: Serialize>(value: &T) -> Result<String, Diagnostic> {
    json::marshal(value).map_err(|e| client_error("read project", e))
}

fn source_input(container: &ContainerModel) -> Result<SourceInput, Diagnostic> {
    if let Some(git) = &container.source.git {
        Ok(SourceInput {
            git: Some(unmarshal(git, "git source")?),
            container_registry: None,
        })
    } else if let Some(registry) = &container.source.container_registry {
        Ok(SourceInput {
            git: None,
            container_registry: Some(unmarshal(registry, "container registry source")?),
        })
    } else {
        Err(invalid_configuration(
            "Container source must be either git or container registry",
        ))
    }
}

fn branch_input(branch: &BranchModel) -> ResourceBranchInput {
    ResourceBranchInput {
        production_branch: branch.production_branch.clone(),
        auto_deploy_branch: branch.auto_deploy_branch,
        auto_stop_branch: branch.auto_stop_branch,
        branch_ignore: branch.branch_ignore.clone(),
        branch_stop_ignore: branch.branch_stop_ignore.clone(),
    }
}

fn workflow_input(workflow: &ContainerWorkflowModel) -> ResourceWorkflowInput {
    ResourceWorkflowInput {
        auto_retry: workflow.auto_retry,
        auto_rollback: workflow.auto_rollback,
        manual_deploy: workflow.manual_deploy,
        pipeline_cluster_id: workflow.pipeline_cluster_id,
        deploy_timeout_seconds: workflow.deploy_timeout_seconds,
    }
}

pub(super) async fn create(client: &Client, data: &mut ProjectModel) -> Result<(), Diagnostic> {
    let team_id = data
        .team_id
        .ok_or_else(|| invalid_configuration("team_id must be set"))?;
    let Some(container) = data.container.as_mut() else {
        return Err(invalid_configuration(
            "Project must have either a container or workflow configuration",
        ));
    };

    let input = CreateResourceAlphaInput {
        user_id: team_id,
        project_id: data.group_id,
        environment_id: data.subgroup_id,
        name: data.name.clone().unwrap_or_default(),
        blueprint_id: data.blueprint_id,
        enabled: data.enabled,
        source: Some(source_input(container)?),
        branch: container.branch.as_ref().map(branch_input),
        workflow: container.workflow.as_ref().map(workflow_input),
        build: container
            .build
            .as_deref()
            .map(|build| unmarshal(build, "build"))
            .transpose()?,
        kubernetes: container
            .kubernetes
            .as_deref()
            .map(|kubernetes| unmarshal(kubernetes, "kubernetes"))
            .transpose()?,
    };

    let created = client
        .v0()
        .repos()
        .create_resource_alpha(&input)
        .await
        .map_err(|e| client_error("create project", e))?;

    // the project id only exists on the v3 adapter
    let not_found = || client_error("read project", "project not found");
    let (Some(project), Some(environment)) = (&created.project, &created.project_environment)
    else {
        return Err(not_found());
    };
    let adapters = client
        .v0()
        .repos()
        .project_v3(
            &team_id.to_string(),
            &project.name,
            &environment.name,
            &created.name,
        )
        .await
        .map_err(|e| client_error("read project", e))?;

    let [adapter] = adapters.as_slice() else {
        return Err(not_found());
    };
    let repo_id = adapter
        .repo
        .as_ref()
        .and_then(|repo| Uuid::parse_str(&repo.id).ok())
        .ok_or_else(not_found)?;

    data.id = Some(adapter.id);
    container.repo_id = Some(repo_id);
    Ok(())
}

fn branch_from_repo(repo: &Repo) -> BranchModel {
    let mut branch = BranchModel {
        production_branch: repo.production_branch.clone(),
        ..Default::default()
    };
    let integration: Option<&BranchIntegration> = repo
        .github_integration
        .as_ref()
        .or(repo.gitlab_integration.as_ref());
    if let Some(integration) = integration {
        branch.auto_deploy_branch = Some(integration.auto_deploy_branch);
        branch.auto_stop_branch = Some(integration.auto_stop_branch);
        branch.branch_ignore = Some(integration.branch_ignore.clone());
        branch.branch_stop_ignore = Some(integration.branch_stop_ignore.clone());
    }
    branch
}

fn workflow_from_repo(repo: &Repo) -> ContainerWorkflowModel {
    ContainerWorkflowModel {
        auto_retry: repo.auto_retry,
        auto_rollback: repo.auto_rollback,
        manual_deploy: repo.manual_deploy,
        pipeline_cluster_id: repo
            .pipeline_cluster
            .as_ref()
            .map(|cluster| cluster.id)
            .filter(|id| !id.is_nil()),
        deploy_timeout_seconds: repo.deploy_timeout_seconds,
    }
}

/// Docker sources are `repository[:tag]`; a registry port is not a tag
fn split_image(image: &str) -> (&str, Option<&str>) {
    match image.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') => (repository, Some(tag)),
        _ => (image, None),
    }
}

fn parse_quantity(value: &str, what: &str) -> Result<f64, Diagnostic> {
    value
        .parse::<f64>()
        .map_err(|e| client_error("read project", format!("invalid {} {:?}: {}", what, value, e)))
}

fn kubernetes_from_repo(repo: &Repo) -> Result<ResourceKubernetesInput, Diagnostic> {
    let deploy_target = match repo.deploy_target.as_deref() {
        Some(target) if target == DEPLOY_TARGET_KUBERNETES => target,
        _ => return Err(client_error("read project", "deploy target not kubernetes")),
    };

    let resources = match (repo.cpu.as_deref(), repo.memory.as_deref()) {
        (Some(cpu), Some(memory)) if !cpu.is_empty() && !memory.is_empty() => {
            Some(ContainerResourcesSpecInput {
                cpu: parse_quantity(cpu, "cpu")?,
                memory: parse_quantity(memory, "memory")?,
                ephemeral_storage: repo.ephemeral_storage,
                spot: repo.dedicated,
            })
        }
        _ => None,
    };

    Ok(ResourceKubernetesInput {
        deploy_target: Some(ProjectDeployInput {
            deploy_target: deploy_target.to_string(),
            cluster_id: repo.cluster.as_ref().map(|cluster| cluster.id),
        }),
        namespace: repo.namespace.clone(),
        app: Some(ResourceKubernetesAppInput {
            deploy_service: repo.deploy_service,
            ports: Some(
                repo.ports
                    .iter()
                    .map(|port| PortInput {
                        port: port.port.clone(),
                        protocol: port.protocol.clone(),
                        public: port.public,
                        https: port.https,
                        grpc: port.grpc.then_some(true),
                    })
                    .collect(),
            ),
            // human readable names are the default, only an opt-out is recorded
            use_human_readable_name: repo.use_human_readable_kubernetes_name.filter(|v| !v),
            resources,
        }),
    })
}

/// Refresh `data` from its repo. `None` when the repo is gone.
pub(super) async fn read(
    client: &Client,
    data: ProjectModel,
) -> Result<Option<ProjectModel>, Diagnostic> {
    let Some(prior) = data.container.clone() else {
        return Err(invalid_configuration(
            "Project must have either a container or workflow configuration",
        ));
    };
    let repo_id = prior.repo_id.unwrap_or(Uuid::nil());

    let Some(repo) = client
        .v0()
        .repos()
        .get(&repo_id.to_string())
        .await
        .map_err(|e| client_error("read project", e))?
    else {
        return Ok(None);
    };

    let mut data = data;
    if let Some(project) = &repo.project {
        data.group_id = Some(project.id);
    }
    if let Some(environment) = &repo.project_environment {
        data.subgroup_id = Some(environment.id);
    }
    data.name = Some(repo.name.clone());

    let mut container = ContainerModel {
        repo_id: Some(
            Uuid::parse_str(&repo.id).map_err(|e| client_error("read project", e))?,
        ),
        source: prior.source.clone(),
        branch: Some(branch_from_repo(&repo)),
        // an unset workflow block stays unset
        workflow: prior.workflow.as_ref().map(|_| workflow_from_repo(&repo)),
        build: prior.build.clone(),
        kubernetes: prior.kubernetes.clone(),
    };

    let source_type = repo.source.source_type.as_str();
    if source_type == SOURCE_TYPE_DOCKER {
        let (repository, tag) = split_image(&repo.source.id);
        container.source.container_registry = Some(marshal(&ContainerRegistrySourceInput {
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            registry_id: None,
        })?);
    } else if GIT_SOURCE_TYPES.contains(&source_type) {
        container.source.git = Some(marshal(&GitSourceInput {
            repository: repo.source.id.clone(),
            git_ref: None,
        })?);

        let method = repo.build_method.clone().unwrap_or_default();
        container.build = Some(marshal(&ResourceBuildInput {
            build: Some(ProjectBuildInput {
                build_type: method.build_type,
                dockerfile_path: method.dockerfile_path,
                working_directory: method.working_directory,
                build_command: method.build_command,
                run_command: method.run_command,
                static_path: method.static_path,
                nodejs_version: method.nodejs_version,
                python_version: method.python_version,
                golang_version: method.golang_version,
            }),
            git_submodules: repo.git_submodules,
        })?);
    } else {
        return Err(client_error("read project", "source type not supported"));
    }

    container.kubernetes = Some(marshal(&kubernetes_from_repo(&repo)?)?);
    data.container = Some(container);
    Ok(Some(data))
}

/// New source when it changed, an error when its kind changed
fn changed_source(
    plan: &ContainerModel,
    state: &ContainerModel,
) -> Result<Option<SourceInput>, Diagnostic> {
    match (
        (&plan.source.git, &state.source.git),
        (&plan.source.container_registry, &state.source.container_registry),
    ) {
        ((Some(planned), Some(prior)), _) | (_, (Some(planned), Some(prior))) => {
            json::changed(prior, planned)
                .then(|| source_input(plan))
                .transpose()
        }
        _ => Err(invalid_configuration(
            "Container source must be either git or container registry, and the type must not change",
        )),
    }
}

pub(super) async fn update(
    client: &Client,
    plan: &ProjectModel,
    state: &ProjectModel,
) -> Result<(), Diagnostic> {
    let (Some(planned), Some(prior)) = (&plan.container, &state.container) else {
        return Err(invalid_configuration(
            "Project must have either a container or workflow configuration, and it must not change",
        ));
    };
    let repo_id = prior.repo_id.unwrap_or(Uuid::nil());
    let repos = client.v0().repos();

    if plan.name != state.name {
        repos
            .update_settings(&UpdateProjectInput {
                id: state.id.unwrap_or(Uuid::nil()).to_string(),
                name: plan.name.clone(),
                ..Default::default()
            })
            .await
            .map_err(|e| client_error("update project", e))?;
    }

    if let Some(source) = changed_source(planned, prior)? {
        repos
            .update_resource_alpha(
                repo_id,
                &UpdateResourceAlphaInput {
                    source: Some(source),
                },
            )
            .await
            .map_err(|e| client_error("update project", e))?;
    }

    let workflow = planned
        .workflow
        .as_ref()
        .filter(|workflow| Some(*workflow) != prior.workflow.as_ref());
    if let Some(workflow) = workflow {
        repos
            .update(&UpdateProjectInput {
                id: repo_id.to_string(),
                name: None,
                auto_retry: workflow.auto_retry,
                auto_rollback: workflow.auto_rollback,
                manual_deploy: workflow.manual_deploy,
                pipeline_cluster_id: workflow.pipeline_cluster_id,
                deploy_timeout_seconds: workflow.deploy_timeout_seconds,
            })
            .await
            .map_err(|e| client_error("update project", e))?;
    }

    // toggle deployment last
    if plan.enabled != state.enabled {
        if plan.enabled.unwrap_or(true) {
            repos
                .enable(&repo_id.to_string())
                .await
                .map_err(|e| client_error("resume project", e))?;
        } else {
            repos
                .disable(&repo_id.to_string())
                .await
                .map_err(|e| client_error("pause project", e))?;
        }
    }

    Ok(())
}

pub(super) async fn delete(client: &Client, state: &ProjectModel) -> Result<(), Diagnostic> {
    let repo_id = state
        .container
        .as_ref()
        .and_then(|container| container.repo_id)
        .unwrap_or(Uuid::nil());

    client
        .v0()
        .repos()
        .delete(&repo_id.to_string())
        .await
        .map_err(|e| client_error("delete project", e))?;
    Ok(())
}

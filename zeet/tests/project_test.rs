//! Project resource against a mock API, both project shapes

mod common;

use common::{
    graphql, resource, state, Api, BLUEPRINT_ID, CLUSTER_ID, DEPLOY_ID, GROUP_ID, PROJECT_ID,
    REPO_ID, SUBGROUP_ID, TEAM_ID, WORKFLOW_ID,
};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, UpdateResourceRequest,
};
use tfplug::types::{Dynamic, DynamicValue};

const TERRAFORM: &str = r#"{
  "blueprint": {
    "source": {"terraformModule": {"source": "cloudposse/s3-bucket/aws", "version": "4.2.0"}}
  },
  "target": {
    "moduleName": "s3",
    "provider": {"awsAccountId": "5a0e108d-6df6-456d-aa3a-a89e78b57cf6", "region": "us-west-2"}
  }
}"#;

const VARIABLES: &str = r#"[{"name": "bucket_name", "type": "STRING", "value": "logs"}]"#;

fn parents() -> Vec<(&'static str, Dynamic)> {
    vec![
        ("team_id", Dynamic::from(TEAM_ID)),
        ("group_id", Dynamic::from(GROUP_ID)),
        ("subgroup_id", Dynamic::from(SUBGROUP_ID)),
        ("blueprint_id", Dynamic::from(BLUEPRINT_ID)),
    ]
}

fn workflow_plan() -> DynamicValue {
    let mut pairs = parents();
    pairs.extend([
        ("id", Dynamic::Unknown),
        ("name", Dynamic::from("logs-bucket")),
        ("enabled", Dynamic::from(true)),
        (
            "deploys",
            Dynamic::List(vec![Dynamic::object([
                ("id", Dynamic::Unknown),
                (
                    "default_workflow_steps",
                    Dynamic::string_list(["DRIVER_PLAN", "DRIVER_APPLY"]),
                ),
                ("require_plan_approval", Dynamic::from(false)),
                ("variables", Dynamic::from(VARIABLES)),
                ("kubernetes", Dynamic::Null),
                ("helm", Dynamic::Null),
                ("terraform", Dynamic::from(TERRAFORM)),
            ])]),
        ),
        (
            "workflow",
            Dynamic::object([
                ("id", Dynamic::Unknown),
                ("steps", Dynamic::from(r#"[{"action": "ORCHESTRATION_DEPLOY"}]"#)),
            ]),
        ),
        ("container", Dynamic::Null),
    ]);
    state(pairs)
}

fn project_detail(name: &str, status: &str) -> Value {
    json!({"team": {"project": {
        "id": PROJECT_ID,
        "name": name,
        "status": status,
        "workflow": {"id": WORKFLOW_ID},
        "deploys": {"nodes": [{
            "id": DEPLOY_ID,
            "configuration": {
                "defaultWorkflowSteps": ["DRIVER_PLAN", "DRIVER_APPLY"],
                "requirePlanApproval": false,
                "variables": [{
                    "specId": 12,
                    "name": "bucket_name",
                    "valueString": "logs",
                    "valueInt": null,
                    "valueFloat": null,
                    "valueBoolean": null,
                    "valueJson": null
                }],
                "kubernetes": null,
                "helm": null,
                "terraform": {
                    "blueprint": {
                        "source": {
                            "git": null,
                            "terraformModule": {
                                "source": "cloudposse/s3-bucket/aws",
                                "version": "4.2.0",
                                "integration": {"githubInstallationId": null, "gitlabIntegrationId": null}
                            }
                        },
                        "outputConfiguration": {"dataFormat": null, "ttl": null}
                    },
                    "target": {
                        "moduleName": "s3",
                        "stateBackend": null,
                        "provider": {
                            "awsAccount": {"id": CLUSTER_ID},
                            "gcpAccount": null,
                            "region": "us-west-2"
                        }
                    }
                }
            }
        }]}
    }}})
}

fn json_attr(value: &Dynamic) -> Value {
    serde_json::from_str(value.as_str().expect("json string")).expect("valid json")
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_lifecycle() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "createProject",
            "variables": {"input": {
                "teamId": TEAM_ID,
                "name": "logs-bucket",
                "workflow": {"steps": [{"action": "ORCHESTRATION_DEPLOY"}]}
            }}
        })))
        .with_body(
            json!({"data": {"createProject": {"id": PROJECT_ID, "name": "logs-bucket"}}})
                .to_string(),
        )
        .create_async()
        .await;
    let detail = graphql(
        &mut server,
        Api::V1,
        "projectDetail",
        project_detail("logs-bucket", "DEPLOYED"),
    )
    .await
    .expect(2);

    let resource = resource(&server, "zeet_project").await;
    let planned = workflow_plan();
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "zeet_project".to_string(),
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let new_state = &created.new_state.value;
    assert_eq!(new_state.attr("id").as_str(), Some(PROJECT_ID));
    assert_eq!(new_state.attr("workflow").attr("id").as_str(), Some(WORKFLOW_ID));
    assert_eq!(
        new_state.attr("deploys").element(0).attr("id").as_str(),
        Some(DEPLOY_ID)
    );

    let refreshed = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "zeet_project".to_string(),
                current_state: created.new_state.clone(),
                private: vec![],
                provider_meta: None,
                client_capabilities: Default::default(),
            },
        )
        .await;
    assert!(refreshed.diagnostics.is_empty(), "{:?}", refreshed.diagnostics);
    let refreshed = refreshed.new_state.expect("project exists");
    let deploy = refreshed.value.attr("deploys").element(0);
    assert_eq!(refreshed.value.attr("enabled").as_bool(), Some(true));
    assert_eq!(
        json_attr(deploy.attr("terraform")),
        serde_json::from_str::<Value>(TERRAFORM).unwrap()
    );
    assert_eq!(
        json_attr(deploy.attr("variables")),
        serde_json::from_str::<Value>(VARIABLES).unwrap()
    );

    create.assert_async().await;
    detail.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_rename_and_pause() {
    let mut server = Server::new_async().await;
    let rename = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "updateProject",
            "variables": {"id": PROJECT_ID, "input": {"name": "archive-bucket"}}
        })))
        .with_body(
            json!({"data": {"updateProject": {"id": PROJECT_ID, "name": "archive-bucket"}}})
                .to_string(),
        )
        .create_async()
        .await;
    let deploy = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "updateDeploy",
            "variables": {"id": DEPLOY_ID}
        })))
        .with_body(json!({"data": {"updateDeploy": {"id": DEPLOY_ID}}}).to_string())
        .create_async()
        .await;
    let workflow = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({"operationName": "updateWorkflow"})))
        .expect(0)
        .create_async()
        .await;
    let pause = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "deleteProjectResources",
            "variables": {"id": PROJECT_ID}
        })))
        .with_body(json!({"data": {"deleteProjectResources": {"id": PROJECT_ID}}}).to_string())
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;

    let prior = DynamicValue::new(with_ids(workflow_plan().value));
    let mut planned = prior.clone();
    if let Dynamic::Map(map) = &mut planned.value {
        map.insert("name".to_string(), Dynamic::from("archive-bucket"));
        map.insert("enabled".to_string(), Dynamic::from(false));
    }

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "zeet_project".to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(updated.new_state.value.attr("name").as_str(), Some("archive-bucket"));
    assert_eq!(updated.new_state.value.attr("id").as_str(), Some(PROJECT_ID));

    rename.assert_async().await;
    deploy.assert_async().await;
    workflow.assert_async().await;
    pause.assert_async().await;
}

/// Fill the computed ids the way a create would have
fn with_ids(mut value: Dynamic) -> Dynamic {
    if let Dynamic::Map(map) = &mut value {
        map.insert("id".to_string(), Dynamic::from(PROJECT_ID));
        if let Some(Dynamic::Map(workflow)) = map.get_mut("workflow") {
            workflow.insert("id".to_string(), Dynamic::from(WORKFLOW_ID));
        }
        if let Some(Dynamic::List(deploys)) = map.get_mut("deploys") {
            for deploy in deploys.iter_mut() {
                if let Dynamic::Map(deploy) = deploy {
                    deploy.insert("id".to_string(), Dynamic::from(DEPLOY_ID));
                }
            }
        }
    }
    value
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_gone_is_removed_from_state() {
    let mut server = Server::new_async().await;
    let _detail = graphql(
        &mut server,
        Api::V1,
        "projectDetail",
        json!({"team": {"project": null}}),
    )
    .await;

    let resource = resource(&server, "zeet_project").await;
    let current = DynamicValue::new(with_ids(workflow_plan().value));
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "zeet_project".to_string(),
                current_state: current,
                private: vec![],
                provider_meta: None,
                client_capabilities: Default::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_delete_keeps_resources() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "deleteProject",
            "variables": {"id": PROJECT_ID, "deleteResources": false}
        })))
        .with_body(json!({"data": {"deleteProject": true}}).to_string())
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "zeet_project".to_string(),
                prior_state: DynamicValue::new(with_ids(workflow_plan().value)),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    delete.assert_async().await;
}

fn container_plan() -> DynamicValue {
    let mut pairs = parents();
    pairs.extend([
        ("id", Dynamic::Unknown),
        ("name", Dynamic::from("web")),
        ("enabled", Dynamic::from(true)),
        ("deploys", Dynamic::Null),
        ("workflow", Dynamic::Null),
        (
            "container",
            Dynamic::object([
                ("repo_id", Dynamic::Unknown),
                (
                    "source",
                    Dynamic::object([
                        ("git", Dynamic::Null),
                        (
                            "container_registry",
                            Dynamic::from(r#"{"repository": "nginx", "tag": "1.27"}"#),
                        ),
                    ]),
                ),
                (
                    "branch",
                    Dynamic::object([
                        ("production_branch", Dynamic::from("production")),
                        ("auto_deploy_branch", Dynamic::Null),
                        ("auto_stop_branch", Dynamic::Null),
                        ("branch_ignore", Dynamic::Null),
                        ("branch_stop_ignore", Dynamic::Null),
                    ]),
                ),
                ("workflow", Dynamic::Null),
                ("build", Dynamic::Null),
                (
                    "kubernetes",
                    Dynamic::from(format!(
                        r#"{{"deployTarget": {{"deployTarget": "KUBERNETES", "clusterID": "{}"}}, "namespace": "web"}}"#,
                        CLUSTER_ID
                    )),
                ),
            ]),
        ),
    ]);
    state(pairs)
}

fn user_repo() -> Value {
    json!({"currentUser": {"repo": {
        "id": REPO_ID,
        "name": "web",
        "project": {"id": GROUP_ID},
        "projectEnvironment": {"id": SUBGROUP_ID},
        "productionBranch": "production",
        "githubIntegration": null,
        "gitlabIntegration": null,
        "autoRetry": false,
        "autoRollback": false,
        "manualDeploy": false,
        "pipelineCluster": {"id": "00000000-0000-0000-0000-000000000000"},
        "deployTimeoutSeconds": null,
        "source": {"type": "DOCKER", "id": "nginx:1.27"},
        "buildMethod": null,
        "gitSubmodules": null,
        "deployTarget": "KUBERNETES",
        "cluster": {"id": CLUSTER_ID},
        "namespace": "web",
        "deployService": true,
        "ports": [{"port": "80", "protocol": "tcp", "public": true, "https": true, "grpc": false}],
        "useHumanReadableKubernetesName": true,
        "cpu": "0.25",
        "memory": "0.5",
        "ephemeralStorage": null,
        "dedicated": false
    }}})
}

#[tokio::test(flavor = "multi_thread")]
async fn container_project_create_and_read() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "createResourceAlpha",
            "variables": {"input": {
                "userID": TEAM_ID,
                "name": "web",
                "source": {"containerRegistry": {"repository": "nginx", "tag": "1.27"}}
            }}
        })))
        .with_body(
            json!({"data": {"createResourceAlpha": {
                "id": REPO_ID,
                "name": "web",
                "project": {"name": "backend"},
                "projectEnvironment": {"name": "staging"}
            }}})
            .to_string(),
        )
        .create_async()
        .await;
    let adapters = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "projectV3",
            "variables": {
                "userId": TEAM_ID,
                "projectName": "backend",
                "environmentName": "staging",
                "repoName": "web"
            }
        })))
        .with_body(
            json!({"data": {"user": {"projectV3Adapters": {"nodes": [
                {"id": PROJECT_ID, "repo": {"id": REPO_ID}}
            ]}}}})
            .to_string(),
        )
        .create_async()
        .await;
    let repo = graphql(&mut server, Api::V0, "userRepo", user_repo()).await;

    let resource = resource(&server, "zeet_project").await;
    let planned = container_plan();
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "zeet_project".to_string(),
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(created.new_state.value.attr("id").as_str(), Some(PROJECT_ID));
    assert_eq!(
        created.new_state.value.attr("container").attr("repo_id").as_str(),
        Some(REPO_ID)
    );

    let refreshed = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "zeet_project".to_string(),
                current_state: created.new_state,
                private: vec![],
                provider_meta: None,
                client_capabilities: Default::default(),
            },
        )
        .await;
    assert!(refreshed.diagnostics.is_empty(), "{:?}", refreshed.diagnostics);
    let refreshed = refreshed.new_state.expect("project exists").value;
    let container = refreshed.attr("container");

    assert_eq!(
        json_attr(container.attr("source").attr("container_registry")),
        json!({"repository": "nginx", "tag": "1.27"})
    );
    assert!(container.attr("workflow").is_null());
    assert_eq!(
        container.attr("branch").attr("production_branch").as_str(),
        Some("production")
    );

    let kubernetes = json_attr(container.attr("kubernetes"));
    assert_eq!(kubernetes["deployTarget"]["clusterID"], CLUSTER_ID);
    assert_eq!(kubernetes["namespace"], "web");
    assert_eq!(kubernetes["app"]["resources"]["cpu"], 0.25);

    create.assert_async().await;
    adapters.assert_async().await;
    repo.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn container_project_delete_removes_repo() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "deleteProject",
            "variables": {"id": REPO_ID}
        })))
        .with_body(json!({"data": {"deleteRepo": true}}).to_string())
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;
    let mut prior = container_plan();
    if let Dynamic::Map(map) = &mut prior.value {
        map.insert("id".to_string(), Dynamic::from(PROJECT_ID));
        if let Some(Dynamic::Map(container)) = map.get_mut("container") {
            container.insert("repo_id".to_string(), Dynamic::from(REPO_ID));
        }
    }

    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "zeet_project".to_string(),
                prior_state: prior,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    delete.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_resume_runs_workflow() {
    let mut server = Server::new_async().await;
    let deploy = graphql(
        &mut server,
        Api::V1,
        "updateDeploy",
        json!({"updateDeploy": {"id": DEPLOY_ID}}),
    )
    .await;
    let resume = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "submitWorkflowRun",
            "variables": {"id": WORKFLOW_ID}
        })))
        .with_body(json!({"data": {"submitWorkflowRun": {"id": WORKFLOW_ID}}}).to_string())
        .create_async()
        .await;
    let pause = server
        .mock("POST", "/v1/graphql")
        .match_body(Matcher::PartialJson(json!({"operationName": "deleteProjectResources"})))
        .expect(0)
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;
    let planned = DynamicValue::new(with_ids(workflow_plan().value));
    let mut prior = planned.clone();
    if let Dynamic::Map(map) = &mut prior.value {
        map.insert("enabled".to_string(), Dynamic::from(false));
    }

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "zeet_project".to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(updated.new_state.value.attr("enabled").as_bool(), Some(true));

    deploy.assert_async().await;
    resume.assert_async().await;
    pause.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn workflow_project_rejects_removed_deploy() {
    let server = Server::new_async().await;
    let resource = resource(&server, "zeet_project").await;

    let planned = DynamicValue::new(with_ids(workflow_plan().value));
    let mut prior = planned.clone();
    if let Dynamic::Map(map) = &mut prior.value {
        if let Some(Dynamic::List(deploys)) = map.get_mut("deploys") {
            let second = deploys[0].clone();
            deploys.push(second);
        }
    }

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "zeet_project".to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(updated.diagnostics[0].summary, "Invalid Configuration");
    assert!(updated.diagnostics[0]
        .detail
        .contains("deploys cannot be removed in place"));
}

/// A created container project with a workflow block
fn container_state() -> DynamicValue {
    let mut value = container_plan();
    if let Dynamic::Map(map) = &mut value.value {
        map.insert("id".to_string(), Dynamic::from(PROJECT_ID));
        if let Some(Dynamic::Map(container)) = map.get_mut("container") {
            container.insert("repo_id".to_string(), Dynamic::from(REPO_ID));
            container.insert(
                "workflow".to_string(),
                Dynamic::object([
                    ("auto_retry", Dynamic::from(false)),
                    ("auto_rollback", Dynamic::from(false)),
                    ("manual_deploy", Dynamic::from(false)),
                    ("pipeline_cluster_id", Dynamic::Null),
                    ("deploy_timeout_seconds", Dynamic::from(600_i64)),
                ]),
            );
        }
    }
    value
}

fn update_request(prior: DynamicValue, planned: DynamicValue) -> UpdateResourceRequest {
    UpdateResourceRequest {
        type_name: "zeet_project".to_string(),
        prior_state: prior,
        planned_state: planned.clone(),
        config: planned,
        planned_private: vec![],
        provider_meta: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn container_project_update_sends_changes() {
    let mut server = Server::new_async().await;
    let rename = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "updateProjectSettings",
            "variables": {"input": {"id": PROJECT_ID, "name": "web-v2"}}
        })))
        .with_body(json!({"data": {"updateProject": {"id": PROJECT_ID}}}).to_string())
        .create_async()
        .await;
    let source = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "updateResourceAlpha",
            "variables": {
                "id": REPO_ID,
                "input": {"source": {"containerRegistry": {"repository": "nginx", "tag": "1.28"}}}
            }
        })))
        .with_body(json!({"data": {"updateResourceAlpha": {"id": REPO_ID}}}).to_string())
        .create_async()
        .await;
    let workflow = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "updateProject",
            "variables": {"input": {
                "id": REPO_ID,
                "autoRetry": true,
                "deployTimeoutSeconds": 600
            }}
        })))
        .with_body(json!({"data": {"updateProject": {"id": REPO_ID}}}).to_string())
        .create_async()
        .await;
    let disable = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "disableProject",
            "variables": {"id": REPO_ID}
        })))
        .with_body(json!({"data": {"disableRepo": {"id": REPO_ID}}}).to_string())
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;
    let prior = container_state();
    let mut planned = prior.clone();
    if let Dynamic::Map(map) = &mut planned.value {
        map.insert("name".to_string(), Dynamic::from("web-v2"));
        map.insert("enabled".to_string(), Dynamic::from(false));
        if let Some(Dynamic::Map(container)) = map.get_mut("container") {
            container.insert(
                "source".to_string(),
                Dynamic::object([
                    ("git", Dynamic::Null),
                    (
                        "container_registry",
                        Dynamic::from(r#"{"repository": "nginx", "tag": "1.28"}"#),
                    ),
                ]),
            );
            if let Some(Dynamic::Map(workflow)) = container.get_mut("workflow") {
                workflow.insert("auto_retry".to_string(), Dynamic::from(true));
            }
        }
    }

    let updated = resource
        .update(Context::new(), update_request(prior, planned))
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    let new_state = &updated.new_state.value;
    assert_eq!(new_state.attr("name").as_str(), Some("web-v2"));
    assert_eq!(new_state.attr("id").as_str(), Some(PROJECT_ID));
    assert_eq!(
        new_state.attr("container").attr("repo_id").as_str(),
        Some(REPO_ID)
    );

    rename.assert_async().await;
    source.assert_async().await;
    workflow.assert_async().await;
    disable.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn container_project_update_skips_unchanged_blocks() {
    let mut server = Server::new_async().await;
    let unchanged: Vec<_> = unexpected_mutations(&mut server).await;
    let enable = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "enableProject",
            "variables": {"id": REPO_ID}
        })))
        .with_body(json!({"data": {"enableRepo": {"id": REPO_ID}}}).to_string())
        .create_async()
        .await;

    let resource = resource(&server, "zeet_project").await;
    let planned = container_state();
    let mut prior = planned.clone();
    if let Dynamic::Map(map) = &mut prior.value {
        map.insert("enabled".to_string(), Dynamic::from(false));
        if let Some(Dynamic::Map(container)) = map.get_mut("container") {
            // same source, different formatting
            container.insert(
                "source".to_string(),
                Dynamic::object([
                    ("git", Dynamic::Null),
                    (
                        "container_registry",
                        Dynamic::from(r#"{"tag":"1.27","repository":"nginx"}"#),
                    ),
                ]),
            );
        }
    }

    let updated = resource
        .update(Context::new(), update_request(prior, planned))
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);

    enable.assert_async().await;
    for mock in unchanged {
        mock.assert_async().await;
    }
}

/// Mutations an update without changes must not send
async fn unexpected_mutations(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
    let mut mocks = vec![];
    for operation in ["updateProjectSettings", "updateResourceAlpha", "updateProject"] {
        mocks.push(
            server
                .mock("POST", "/graphql")
                .match_body(Matcher::PartialJson(json!({ "operationName": operation })))
                .expect(0)
                .create_async()
                .await,
        );
    }
    mocks
}

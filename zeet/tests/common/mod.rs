//! Shared fixtures for the mock server tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use tfplug::types::{ClientCapabilities, Dynamic, DynamicValue};
use zeet::ZeetProvider;

pub const TEAM_ID: &str = "99c11487-1683-4e10-9620-94d9a78a0b67";
pub const GROUP_ID: &str = "ddf9093e-cc11-46a5-82c7-fc99fc44ef93";
pub const SUBGROUP_ID: &str = "149ad8a9-cb35-477b-bbac-39a39f146074";
pub const BLUEPRINT_ID: &str = "2e9aa322-3a41-4930-9f3c-2987836d3b70";
pub const PROJECT_ID: &str = "69a5f7df-048d-4fc3-885d-178cdcb9b180";
pub const WORKFLOW_ID: &str = "2a46bfb8-914f-4351-a283-7630463f75ea";
pub const DEPLOY_ID: &str = "54adc3b5-319b-4b40-a023-36ddcba7add8";
pub const REPO_ID: &str = "17e2834e-1188-4255-ac85-8e31918e8950";
pub const CLUSTER_ID: &str = "5a0e108d-6df6-456d-aa3a-a89e78b57cf6";

pub const TOKEN: &str = "test-token";

pub enum Api {
    V0,
    V1,
}

impl Api {
    fn path(&self) -> &'static str {
        match self {
            Api::V0 => "/graphql",
            Api::V1 => "/v1/graphql",
        }
    }
}

/// Answer one GraphQL operation with `data`
pub async fn graphql(server: &mut ServerGuard, api: Api, operation: &str, data: Value) -> Mock {
    server
        .mock("POST", api.path())
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .match_body(Matcher::PartialJson(json!({ "operationName": operation })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": data }).to_string())
        .create_async()
        .await
}

/// Answer one GraphQL operation with an error
pub async fn graphql_error(
    server: &mut ServerGuard,
    api: Api,
    operation: &str,
    message: &str,
) -> Mock {
    server
        .mock("POST", api.path())
        .match_body(Matcher::PartialJson(json!({ "operationName": operation })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": null, "errors": [{ "message": message }] }).to_string())
        .create_async()
        .await
}

pub async fn provider_data(server: &ServerGuard) -> Arc<dyn Any + Send + Sync> {
    let mut provider = ZeetProvider::with_version("test");
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::new(Dynamic::object([
                    ("api_url", Dynamic::from(server.url())),
                    ("token", Dynamic::from(TOKEN)),
                ])),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    response.provider_data.expect("provider data")
}

/// Resource built by the provider factory and configured against `server`
pub async fn resource(server: &ServerGuard, type_name: &str) -> Box<dyn ResourceWithConfigure> {
    let provider_data = provider_data(server).await;
    let factories = ZeetProvider::new().resources();
    let mut resource = factories.get(type_name).expect("resource factory")();

    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

pub async fn data_source(
    server: &ServerGuard,
    type_name: &str,
) -> Box<dyn DataSourceWithConfigure> {
    let provider_data = provider_data(server).await;
    let factories = ZeetProvider::new().data_sources();
    let mut data_source = factories.get(type_name).expect("data source factory")();

    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    data_source
}

pub fn state(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
    DynamicValue::new(Dynamic::object(pairs))
}

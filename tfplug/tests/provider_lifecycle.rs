#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

//! Drives a provider through the gRPC service the way Terraform does:
//! configure, plan, apply, refresh, import and destroy.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::defaults::StaticDefault;
use tfplug::grpc::ProviderService;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::proto::{self, ProtoProvider};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{SemanticEquality, Validator, ValidatorRequest, ValidatorResponse};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::{
    import_state_passthrough_id, AttributeBuilder, AttributeType, Context, DataSource,
    DataSourceWithConfigure, Provider, ProviderMetadataRequest, ProviderMetadataResponse,
    Resource, ResourceWithConfigure, SchemaBuilder,
};
use tokio_test::{assert_err, assert_ok};
use tonic::Request;

/// Remote side shared by every resource instance
#[derive(Default)]
struct Backend {
    next_id: AtomicUsize,
    objects: std::sync::Mutex<HashMap<String, String>>,
}

struct StoreProvider {
    backend: Arc<Backend>,
}

#[async_trait]
impl Provider for StoreProvider {
    fn type_name(&self) -> &str {
        "store"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "store".to_string(),
            version: "test".to_string(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new().build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(self.backend.clone()),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "store_object".to_string(),
            Box::new(|| Box::new(ObjectResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "store_count".to_string(),
            Box::new(|| Box::new(CountDataSource::default()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources
    }
}

struct NoSpaces;

impl Validator for NoSpaces {
    fn description(&self) -> String {
        "value must not contain spaces".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if request.config_value.as_str().is_some_and(|s| s.contains(' ')) {
            response.diagnostics.push(
                Diagnostic::error("Invalid bucket", "bucket must not contain spaces")
                    .with_attribute(request.path),
            );
        }
        response
    }
}

struct IgnoreCase;

impl SemanticEquality for IgnoreCase {
    fn description(&self) -> String {
        "case-insensitive".to_string()
    }

    fn semantically_equal(&self, prior: &Dynamic, new: &Dynamic) -> bool {
        match (prior.as_str(), new.as_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

#[derive(Default)]
struct ObjectResource {
    backend: Option<Arc<Backend>>,
}

impl ObjectResource {
    fn backend(&self) -> Result<&Backend, Diagnostic> {
        self.backend.as_deref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }
}

#[async_trait]
impl Resource for ObjectResource {
    fn type_name(&self) -> &str {
        "store_object"
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

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::string("id")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("bucket")
                    .required()
                    .validator(Box::new(NoSpaces))
                    .plan_modifier(Box::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("content")
                    .required()
                    .semantic_equality(Box::new(IgnoreCase))
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("public")
                    .optional()
                    .computed()
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::list_nested(
                    "tags",
                    vec![
                        AttributeBuilder::string("key").required().build(),
                        AttributeBuilder::list("values", AttributeType::String)
                            .optional()
                            .build(),
                    ],
                )
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
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut new_state = request.planned_state;
        let backend = match self.backend() {
            Ok(backend) => backend,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state,
                    private: vec![],
                    diagnostics: vec![diag],
                }
            }
        };

        let id = format!("obj-{}", backend.next_id.fetch_add(1, Ordering::SeqCst));
        let content = new_state
            .get_string(&AttributePath::new("content"))
            .unwrap_or_default();
        backend.objects.lock().unwrap().insert(id.clone(), content);
        new_state.set_string(&AttributePath::new("id"), id).unwrap();

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let backend = self.backend().unwrap();
        let id = request
            .current_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        let stored = backend.objects.lock().unwrap().get(&id).cloned();

        let new_state = stored.map(|content| {
            let mut state = request.current_state.clone();
            // The backend shouts
            state
                .set_string(&AttributePath::new("content"), content.to_uppercase())
                .unwrap();
            state
        });

        ReadResourceResponse {
            new_state,
            diagnostics: vec![],
            private: request.private,
            deferred: None,
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let backend = self.backend().unwrap();
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        let content = request
            .planned_state
            .get_string(&AttributePath::new("content"))
            .unwrap();
        backend.objects.lock().unwrap().insert(id, content);

        UpdateResourceResponse {
            new_state: request.planned_state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let backend = self.backend().unwrap();
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        backend.objects.lock().unwrap().remove(&id);

        DeleteResourceResponse {
            diagnostics: vec![],
        }
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
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for ObjectResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        if let Some(data) = request.provider_data {
            self.backend = data.downcast::<Backend>().ok();
        }
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[derive(Default)]
struct CountDataSource {
    backend: Option<Arc<Backend>>,
}

#[async_trait]
impl DataSource for CountDataSource {
    fn type_name(&self) -> &str {
        "store_count"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(AttributeBuilder::number("count").computed().build())
                .build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let count = self
            .backend
            .as_ref()
            .map(|b| b.objects.lock().unwrap().len())
            .unwrap_or_default();
        ReadDataSourceResponse {
            state: DynamicValue::new(Dynamic::object([("count", Dynamic::from(count as i64))])),
            diagnostics: vec![],
            deferred: None,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CountDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        if let Some(data) = request.provider_data {
            self.backend = data.downcast::<Backend>().ok();
        }
        ConfigureDataSourceResponse {
            diagnostics: vec![],
        }
    }
}

fn wire(value: Dynamic) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: DynamicValue::new(value).encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn unwire(value: Option<proto::DynamicValue>) -> Dynamic {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack)
        .unwrap()
        .value
}

fn object_config(bucket: &str, content: &str) -> Dynamic {
    Dynamic::object([
        ("id", Dynamic::Null),
        ("bucket", Dynamic::from(bucket)),
        ("content", Dynamic::from(content)),
        ("public", Dynamic::Null),
        (
            "tags",
            Dynamic::List(vec![Dynamic::object([
                ("key", Dynamic::from("env")),
                ("values", Dynamic::string_list(["dev"])),
            ])]),
        ),
    ])
}

/// Terraform's proposed new state: config with computed values carried over
fn proposed(config: &Dynamic, prior: &Dynamic) -> Dynamic {
    let mut proposed = config.clone();
    if let (Dynamic::Map(p), Some(prior)) = (&mut proposed, prior.as_map()) {
        for key in ["id", "public"] {
            if p.get(key).is_some_and(Dynamic::is_null) {
                p.insert(key.to_string(), prior.get(key).cloned().unwrap_or(Dynamic::Null));
            }
        }
    }
    proposed
}

async fn configured() -> (ProviderService<StoreProvider>, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let service = ProviderService::new(StoreProvider {
        backend: backend.clone(),
    });
    let response = service
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: wire(Dynamic::Map(HashMap::new())),
            client_capabilities: None,
        }))
        .await;
    assert_ok!(&response);
    (service, backend)
}

async fn plan(
    service: &ProviderService<StoreProvider>,
    prior: &Dynamic,
    config: &Dynamic,
) -> proto::plan_resource_change::Response {
    service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "store_object".to_string(),
            prior_state: wire(prior.clone()),
            proposed_new_state: wire(proposed(config, prior)),
            config: wire(config.clone()),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner()
}

async fn apply(
    service: &ProviderService<StoreProvider>,
    prior: &Dynamic,
    planned: Option<proto::DynamicValue>,
    config: &Dynamic,
) -> proto::apply_resource_change::Response {
    service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "store_object".to_string(),
            prior_state: wire(prior.clone()),
            planned_state: planned,
            config: wire(config.clone()),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner()
}

#[tokio::test]
async fn full_lifecycle_through_grpc_service() {
    let (service, backend) = configured().await;
    let config = object_config("assets", "hello");

    // Create
    let planned = plan(&service, &Dynamic::Null, &config).await;
    assert!(planned.diagnostics.is_empty());
    let planned_value = unwire(planned.planned_state.clone());
    assert!(planned_value.attr("id").is_unknown());
    assert_eq!(planned_value.attr("public").as_bool(), Some(false));
    assert!(planned.requires_replace.is_empty());

    let applied = apply(&service, &Dynamic::Null, planned.planned_state, &config).await;
    assert!(applied.diagnostics.is_empty());
    let state = unwire(applied.new_state);
    assert_eq!(state.attr("id").as_str(), Some("obj-0"));
    assert_eq!(
        state.attr("tags").element(0).attr("values").element(0).as_str(),
        Some("dev")
    );

    // Refresh: "HELLO" is semantically equal to "hello", so state keeps the prior spelling
    let read = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "store_object".to_string(),
            current_state: wire(state.clone()),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    let refreshed = unwire(read.new_state);
    assert_eq!(refreshed.attr("content").as_str(), Some("hello"));

    // In-place update keeps the id
    let config = object_config("assets", "world");
    let planned = plan(&service, &refreshed, &config).await;
    assert!(planned.requires_replace.is_empty());
    let planned_value = unwire(planned.planned_state.clone());
    assert_eq!(planned_value.attr("id").as_str(), Some("obj-0"));

    let applied = apply(&service, &refreshed, planned.planned_state, &config).await;
    let state = unwire(applied.new_state);
    assert_eq!(state.attr("content").as_str(), Some("world"));
    assert_eq!(
        backend.objects.lock().unwrap().get("obj-0").map(String::as_str),
        Some("world")
    );

    // Changing the bucket forces replacement
    let replaced = plan(&service, &state, &object_config("archive", "world")).await;
    assert_eq!(replaced.requires_replace.len(), 1);

    // Destroy
    let destroyed = apply(&service, &state, None, &Dynamic::Null).await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(unwire(destroyed.new_state).is_null());
    assert!(backend.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn refresh_removes_objects_deleted_remotely() {
    let (service, backend) = configured().await;
    let config = object_config("assets", "hello");
    let planned = plan(&service, &Dynamic::Null, &config).await;
    let state = unwire(apply(&service, &Dynamic::Null, planned.planned_state, &config).await.new_state);

    backend.objects.lock().unwrap().clear();

    let read = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "store_object".to_string(),
            current_state: wire(state),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(unwire(read.new_state).is_null());
}

#[tokio::test]
async fn validation_reports_nested_paths() {
    let (service, _) = configured().await;
    let mut config = object_config("my bucket", "hello");
    if let Dynamic::Map(map) = &mut config {
        map.insert(
            "tags".to_string(),
            Dynamic::List(vec![Dynamic::object([
                ("key", Dynamic::Null),
                ("values", Dynamic::Null),
            ])]),
        );
    }

    let response = service
        .validate_resource_config(Request::new(proto::validate_resource_config::Request {
            type_name: "store_object".to_string(),
            config: wire(config),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let summaries: Vec<_> = response.diagnostics.iter().map(|d| d.summary.as_str()).collect();
    assert!(summaries.contains(&"Invalid bucket"));
    assert!(summaries.contains(&"Missing required argument"));
}

#[tokio::test]
async fn import_returns_id_only_state() {
    let (service, _) = configured().await;
    let response = service
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "store_object".to_string(),
            id: "obj-42".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.imported_resources.len(), 1);
    let state = unwire(response.imported_resources[0].state.clone());
    assert_eq!(state.attr("id").as_str(), Some("obj-42"));
    // Conformed to the schema
    assert!(state.attr("bucket").is_null());
    assert_eq!(state.as_map().map(|m| m.len()), Some(5));
}

#[tokio::test]
async fn concurrent_data_source_reads() {
    let (service, backend) = configured().await;
    backend
        .objects
        .lock()
        .unwrap()
        .insert("obj-0".to_string(), "x".to_string());
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .read_data_source(Request::new(proto::read_data_source::Request {
                        type_name: "store_count".to_string(),
                        config: wire(Dynamic::object([("count", Dynamic::Null)])),
                        provider_meta: None,
                        client_capabilities: None,
                    }))
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let response = result.unwrap().unwrap().into_inner();
        assert_eq!(unwire(response.state).attr("count").as_i64(), Some(1));
    }
}

#[tokio::test]
async fn unknown_data_source_is_an_error() {
    let (service, _) = configured().await;
    let result = service
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "store_missing".to_string(),
            config: None,
            provider_meta: None,
            client_capabilities: None,
        }))
        .await;
    assert_err!(&result);
}

//! gRPC service implementation of the Terraform Plugin Protocol v6
//!
//! Resources and data sources are created per call from the provider's
//! factories and configured with the data returned by ConfigureProvider.
//! Schema-level planning, validation and semantic equality run here, so
//! resource implementations only see values that already conform to their
//! schema.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::planning;
use crate::proto;
use crate::proto::ProtoProvider;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderSchemaRequest,
    ResourceFactory, StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ModifyPlanRequest, ReadResourceRequest, ResourceSchemaRequest,
    ResourceWithConfigure, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Attribute, ObjectNestingMode, Schema, StringKind};
use crate::types::{
    AttributePath, AttributePathStep, ClientCapabilities, Deferred, DeferredReason, Diagnostic,
    DiagnosticSeverity, DiagnosticsExt, DynamicValue, ServerCapabilities,
};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tonic::{Request, Response, Status};
use tracing::{debug, Instrument};

type RpcResult<T> = std::result::Result<Response<T>, Status>;

/// Serves a [`Provider`] over the tfplugin6 Provider service
pub struct ProviderService<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    resources: HashMap<String, ResourceFactory>,
    data_sources: HashMap<String, DataSourceFactory>,
    ctx: Context,
    shutdown: Arc<Notify>,
}

impl<P: Provider + 'static> ProviderService<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();
        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: RwLock::new(None),
            resources,
            data_sources,
            ctx: Context::new(),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Notified on GRPCController.Shutdown
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Controller service sharing this provider's shutdown signal
    pub fn controller(&self) -> ControllerService {
        ControllerService {
            shutdown: self.shutdown.clone(),
        }
    }

    fn unconfigured_resource(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, TfplugError> {
        let factory = self
            .resources
            .get(type_name)
            .ok_or_else(|| TfplugError::UnknownResourceType(type_name.to_string()))?;
        Ok(factory())
    }

    fn unconfigured_data_source(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, TfplugError> {
        let factory = self
            .data_sources
            .get(type_name)
            .ok_or_else(|| TfplugError::UnknownDataSourceType(type_name.to_string()))?;
        Ok(factory())
    }

    async fn resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>), TfplugError> {
        let mut resource = self.unconfigured_resource(type_name)?;
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        Ok((resource, response.diagnostics))
    }

    async fn data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>), TfplugError> {
        let mut data_source = self.unconfigured_data_source(type_name)?;
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        Ok((data_source, response.diagnostics))
    }

    async fn resource_schema(
        &self,
        ctx: &Context,
        resource: &dyn ResourceWithConfigure,
    ) -> (Schema, Vec<Diagnostic>) {
        let response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
        (response.schema, response.diagnostics)
    }
}

/// Runs `future` under the context's span, aborting if the provider stops
async fn run<F: Future>(ctx: &Context, future: F) -> Result<F::Output, Status> {
    ctx.run(future)
        .instrument(ctx.span())
        .await
        .ok_or_else(|| Status::cancelled("provider is stopping"))
}

#[tonic::async_trait]
impl<P: Provider + 'static> ProtoProvider for ProviderService<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> RpcResult<proto::get_metadata::Response> {
        debug!(rpc = "GetMetadata", "handling request");

        let mut resources: Vec<_> = self.resources.keys().cloned().collect();
        let mut data_sources: Vec<_> = self.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities_to_proto(&server_capabilities())),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> RpcResult<proto::get_provider_schema::Response> {
        let ctx = self.ctx.with_rpc("GetProviderSchema", "");
        debug!(rpc = "GetProviderSchema", "handling request");

        let provider = self.provider.read().await;
        let provider_schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        let mut diagnostics = provider_schema.diagnostics;

        let mut resource_schemas = HashMap::new();
        for type_name in self.resources.keys() {
            let resource = self.unconfigured_resource(type_name)?;
            let (schema, diags) = self.resource_schema(&ctx, resource.as_ref()).await;
            diagnostics.extend(diags);
            resource_schemas.insert(type_name.clone(), schema_to_proto(&schema));
        }

        let mut data_source_schemas = HashMap::new();
        for type_name in self.data_sources.keys() {
            let data_source = self.unconfigured_data_source(type_name)?;
            let response = data_source
                .schema(ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(type_name.clone(), schema_to_proto(&response.schema));
        }

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities_to_proto(&server_capabilities())),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> RpcResult<proto::validate_provider_config::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ValidateProviderConfig", "");
        debug!(rpc = "ValidateProviderConfig", "handling request");

        let config = decode_value(req.config)?;
        let provider = self.provider.read().await;
        let schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;

        let mut diagnostics = planning::validate_config(&schema.schema, &config.value);
        let response = run(
            &ctx,
            provider.validate(ctx.clone(), ValidateProviderConfigRequest { config }),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> RpcResult<proto::validate_resource_config::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ValidateResourceConfig", &req.type_name);
        debug!(rpc = "ValidateResourceConfig", type_name = %req.type_name, "handling request");

        let resource = self.unconfigured_resource(&req.type_name)?;
        let config = decode_value(req.config)?;
        let (schema, mut diagnostics) = self.resource_schema(&ctx, resource.as_ref()).await;

        diagnostics.extend(planning::validate_config(&schema, &config.value));
        let response = run(
            &ctx,
            resource.validate(
                ctx.clone(),
                ValidateResourceConfigRequest {
                    type_name: req.type_name,
                    config,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            ),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> RpcResult<proto::validate_data_resource_config::Response> {
        let req = request.into_inner();
        let ctx = self
            .ctx
            .with_rpc("ValidateDataResourceConfig", &req.type_name);
        debug!(rpc = "ValidateDataResourceConfig", type_name = %req.type_name, "handling request");

        let data_source = self.unconfigured_data_source(&req.type_name)?;
        let config = decode_value(req.config)?;
        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await;

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(planning::validate_config(&schema.schema, &config.value));
        let response = run(
            &ctx,
            data_source.validate(
                ctx.clone(),
                ValidateDataSourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            ),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> RpcResult<proto::upgrade_resource_state::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("UpgradeResourceState", &req.type_name);
        debug!(
            rpc = "UpgradeResourceState",
            type_name = %req.type_name,
            version = req.version,
            "handling request"
        );

        let resource = self.unconfigured_resource(&req.type_name)?;
        let (schema, mut diagnostics) = self.resource_schema(&ctx, resource.as_ref()).await;
        let raw_state = req.raw_state.unwrap_or_default();

        if raw_state.json.is_empty() && !raw_state.flatmap.is_empty() {
            diagnostics.push(Diagnostic::error(
                "Unable to Upgrade Resource State",
                "Flatmap state from Terraform 0.11 and earlier is not supported.",
            ));
        } else if req.version > schema.version {
            diagnostics.push(Diagnostic::error(
                "Unable to Upgrade Resource State",
                format!(
                    "The stored state version {} is newer than the resource schema version {}. \
                     Upgrade the provider to read this state.",
                    req.version, schema.version
                ),
            ));
        }

        if diagnostics.has_errors() {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        }

        let state = DynamicValue::decode_json(&raw_state.json)?;
        let upgraded = DynamicValue::new(schema.conform(state.value));

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_value(&upgraded)?),
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> RpcResult<proto::configure_provider::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ConfigureProvider", "");
        debug!(
            rpc = "ConfigureProvider",
            terraform_version = %req.terraform_version,
            "handling request"
        );

        let config = decode_value(req.config)?;
        let mut provider = self.provider.write().await;
        let response = run(
            &ctx,
            provider.configure(
                ctx.clone(),
                ConfigureProviderRequest {
                    terraform_version: req.terraform_version,
                    config,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            ),
        )
        .await?;

        if !response.diagnostics.has_errors() {
            *self.provider_data.write().await = response.provider_data;
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> RpcResult<proto::read_resource::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ReadResource", &req.type_name);
        debug!(rpc = "ReadResource", type_name = %req.type_name, "handling request");

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let current_state = decode_value(req.current_state)?;

        if diagnostics.has_errors() {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: Some(encode_value(&current_state)?),
                diagnostics: diagnostics_to_proto(diagnostics),
                private: req.private,
                deferred: None,
            }));
        }

        let (schema, schema_diags) = self.resource_schema(&ctx, resource.as_ref()).await;
        diagnostics.extend(schema_diags);

        let response = run(
            &ctx,
            resource.read(
                ctx.clone(),
                ReadResourceRequest {
                    type_name: req.type_name,
                    current_state: current_state.clone(),
                    private: req.private,
                    provider_meta: decode_meta(req.provider_meta)?,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            ),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        // None means the remote object is gone: a null state drops it
        let new_state = match response.new_state {
            Some(state) => {
                let value =
                    planning::apply_semantic_equality(&schema, &current_state.value, state.value);
                DynamicValue::new(schema.conform(value))
            }
            None => DynamicValue::null(),
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_value(&new_state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
            private: response.private,
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> RpcResult<proto::plan_resource_change::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("PlanResourceChange", &req.type_name);
        debug!(rpc = "PlanResourceChange", type_name = %req.type_name, "handling request");

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let (schema, schema_diags) = self.resource_schema(&ctx, resource.as_ref()).await;
        diagnostics.extend(schema_diags);

        let prior_state = decode_value(req.prior_state)?;
        let proposed = decode_value(req.proposed_new_state)?;
        let config = decode_value(req.config)?;

        let output =
            planning::plan_resource_change(&schema, &prior_state.value, proposed.value, &config.value);
        diagnostics.extend(output.diagnostics);
        let mut requires_replace = output.requires_replace;
        let mut planned_state = DynamicValue::new(output.planned_state);
        let mut planned_private = req.prior_private.clone();

        if !planned_state.is_null() && !diagnostics.has_errors() {
            let response = run(
                &ctx,
                resource.modify_plan(
                    ctx.clone(),
                    ModifyPlanRequest {
                        type_name: req.type_name,
                        config,
                        prior_state,
                        planned_state,
                        prior_private: req.prior_private,
                        provider_meta: decode_meta(req.provider_meta)?,
                    },
                ),
            )
            .await?;
            diagnostics.extend(response.diagnostics);
            requires_replace.extend(response.requires_replace);
            planned_private = response.planned_private;
            planned_state = DynamicValue::new(schema.conform(response.planned_state.value));
        }

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_value(&planned_state)?),
            requires_replace: requires_replace.iter().map(attribute_path_to_proto).collect(),
            planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
            deferred: None,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> RpcResult<proto::apply_resource_change::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ApplyResourceChange", &req.type_name);

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let prior_state = decode_value(req.prior_state)?;
        let planned_state = decode_value(req.planned_state)?;
        let config = decode_value(req.config)?;
        let provider_meta = decode_meta(req.provider_meta)?;

        if diagnostics.has_errors() {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_value(&prior_state)?),
                private: req.planned_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
            }));
        }

        let (schema, schema_diags) = self.resource_schema(&ctx, resource.as_ref()).await;
        diagnostics.extend(schema_diags);

        let (new_state, private) = if planned_state.is_null() {
            debug!(rpc = "ApplyResourceChange", type_name = %req.type_name, operation = "delete");
            let response = run(
                &ctx,
                resource.delete(
                    ctx.clone(),
                    DeleteResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_private: req.planned_private.clone(),
                        provider_meta,
                    },
                ),
            )
            .await?;
            let failed = response.diagnostics.has_errors();
            diagnostics.extend(response.diagnostics);
            if failed {
                (prior_state, req.planned_private)
            } else {
                (DynamicValue::null(), vec![])
            }
        } else if prior_state.is_null() {
            debug!(rpc = "ApplyResourceChange", type_name = %req.type_name, operation = "create");
            let response = run(
                &ctx,
                resource.create(
                    ctx.clone(),
                    CreateResourceRequest {
                        type_name: req.type_name,
                        planned_state: planned_state.clone(),
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                ),
            )
            .await?;
            let failed = response.diagnostics.has_errors();
            diagnostics.extend(response.diagnostics);
            // A partially created object is only recorded when fully known
            if failed && !response.new_state.value.is_fully_known() {
                (DynamicValue::null(), response.private)
            } else {
                (response.new_state, response.private)
            }
        } else {
            debug!(rpc = "ApplyResourceChange", type_name = %req.type_name, operation = "update");
            let response = run(
                &ctx,
                resource.update(
                    ctx.clone(),
                    UpdateResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_state: planned_state.clone(),
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                ),
            )
            .await?;
            let failed = response.diagnostics.has_errors();
            diagnostics.extend(response.diagnostics);
            if failed && !response.new_state.value.is_fully_known() {
                (prior_state, response.private)
            } else {
                (response.new_state, response.private)
            }
        };

        let new_state = if new_state.is_null() {
            new_state
        } else {
            let value =
                planning::apply_semantic_equality(&schema, &planned_state.value, new_state.value);
            DynamicValue::new(schema.conform(value))
        };

        if !new_state.value.is_fully_known() {
            diagnostics.push(Diagnostic::error(
                "Provider returned invalid result object after apply",
                "After the apply operation, the provider still indicated an unknown value. \
                 All values must be known after apply, so this is always a bug in the provider.",
            ));
        }

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_value(&new_state)?),
            private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> RpcResult<proto::import_resource_state::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ImportResourceState", &req.type_name);
        debug!(rpc = "ImportResourceState", type_name = %req.type_name, id = %req.id, "handling request");

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        if diagnostics.has_errors() {
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }

        let (schema, schema_diags) = self.resource_schema(&ctx, resource.as_ref()).await;
        diagnostics.extend(schema_diags);

        let response = run(
            &ctx,
            resource.import_state(
                ctx.clone(),
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            ),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        let mut imported_resources = Vec::with_capacity(response.imported_resources.len());
        for imported in response.imported_resources {
            let state = DynamicValue::new(schema.conform(imported.state.value));
            imported_resources.push(proto::import_resource_state::ImportedResource {
                type_name: imported.type_name,
                state: Some(encode_value(&state)?),
                private: imported.private,
            });
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> RpcResult<proto::read_data_source::Response> {
        let req = request.into_inner();
        let ctx = self.ctx.with_rpc("ReadDataSource", &req.type_name);
        debug!(rpc = "ReadDataSource", type_name = %req.type_name, "handling request");

        let (data_source, mut diagnostics) = self.data_source(&ctx, &req.type_name).await?;
        let config = decode_value(req.config)?;

        if diagnostics.has_errors() {
            return Ok(Response::new(proto::read_data_source::Response {
                state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }

        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await;
        diagnostics.extend(schema.diagnostics);
        let schema = schema.schema;

        let response = run(
            &ctx,
            data_source.read(
                ctx.clone(),
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config: config.clone(),
                    provider_meta: decode_meta(req.provider_meta)?,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            ),
        )
        .await?;
        diagnostics.extend(response.diagnostics);

        let state = if diagnostics.has_errors() && !response.state.value.is_fully_known() {
            None
        } else {
            let value =
                planning::apply_semantic_equality(&schema, &config.value, response.state.value);
            Some(encode_value(&DynamicValue::new(schema.conform(value)))?)
        };

        Ok(Response::new(proto::read_data_source::Response {
            state,
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> RpcResult<proto::stop_provider::Response> {
        let ctx = self.ctx.with_rpc("StopProvider", "");
        debug!(rpc = "StopProvider", "handling request");

        let response = self
            .provider
            .read()
            .await
            .stop(ctx.clone(), StopProviderRequest)
            .await;
        // In-flight calls observe this through their derived contexts
        self.ctx.cancel();

        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

/// go-plugin's controller: Terraform calls Shutdown when it is done with
/// the plugin
pub struct ControllerService {
    shutdown: Arc<Notify>,
}

#[tonic::async_trait]
impl proto::GrpcController for ControllerService {
    async fn shutdown(
        &self,
        _request: Request<proto::plugin::Empty>,
    ) -> RpcResult<proto::plugin::Empty> {
        debug!(rpc = "Shutdown", "handling request");
        self.shutdown.notify_one();
        Ok(Response::new(proto::plugin::Empty {}))
    }
}

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        plan_destroy: true,
        ..ServerCapabilities::default()
    }
}

#[allow(clippy::result_large_err)]
fn decode_value(value: Option<proto::DynamicValue>) -> Result<DynamicValue, Status> {
    let value = match value {
        Some(value) => value,
        None => return Ok(DynamicValue::null()),
    };

    if !value.msgpack.is_empty() {
        Ok(DynamicValue::decode_msgpack(&value.msgpack)?)
    } else if !value.json.is_empty() {
        Ok(DynamicValue::decode_json(&value.json)?)
    } else {
        Ok(DynamicValue::null())
    }
}

#[allow(clippy::result_large_err)]
fn decode_meta(value: Option<proto::DynamicValue>) -> Result<Option<DynamicValue>, Status> {
    value.map(|v| decode_value(Some(v))).transpose()
}

#[allow(clippy::result_large_err)]
fn encode_value(value: &DynamicValue) -> Result<proto::DynamicValue, Status> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| {
            let severity = match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            };
            proto::Diagnostic {
                severity: severity as i32,
                summary: diag.summary,
                detail: diag.detail,
                attribute: diag.attribute.as_ref().map(attribute_path_to_proto),
            }
        })
        .collect()
}

fn attribute_path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn client_capabilities_from_proto(
    capabilities: Option<proto::ClientCapabilities>,
) -> ClientCapabilities {
    capabilities
        .map(|c| ClientCapabilities {
            deferral_allowed: c.deferral_allowed,
            write_only_attributes_allowed: c.write_only_attributes_allowed,
        })
        .unwrap_or_default()
}

fn server_capabilities_to_proto(capabilities: &ServerCapabilities) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: capabilities.plan_destroy,
        get_provider_schema_optional: capabilities.get_provider_schema_optional,
        move_resource_state: capabilities.move_resource_state,
    }
}

fn deferred_to_proto(deferred: &Deferred) -> proto::Deferred {
    let reason = match deferred.reason {
        DeferredReason::Unknown => proto::deferred::Reason::Unknown,
        DeferredReason::ResourceConfigUnknown => proto::deferred::Reason::ResourceConfigUnknown,
        DeferredReason::ProviderConfigUnknown => proto::deferred::Reason::ProviderConfigUnknown,
        DeferredReason::AbsentPrereq => proto::deferred::Reason::AbsentPrereq,
    };
    proto::Deferred {
        reason: reason as i32,
    }
}

fn string_kind_to_proto(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: string_kind_to_proto(schema.block.description_kind),
            deprecated: schema.block.deprecated,
        }),
    }
}

fn attribute_to_proto(attr: &Attribute) -> proto::schema::Attribute {
    // Nested attributes describe their type through nested_type only
    let (r#type, nested_type) = match &attr.nested_type {
        Some(nested) => {
            let nesting = match nested.nesting {
                ObjectNestingMode::Single => proto::schema::object::NestingMode::Single,
                ObjectNestingMode::List => proto::schema::object::NestingMode::List,
                ObjectNestingMode::Set => proto::schema::object::NestingMode::Set,
                ObjectNestingMode::Map => proto::schema::object::NestingMode::Map,
            };
            #[allow(deprecated)]
            let object = proto::schema::Object {
                attributes: nested.attributes.iter().map(attribute_to_proto).collect(),
                nesting: nesting as i32,
                min_items: 0,
                max_items: 0,
            };
            (vec![], Some(object))
        }
        None => (
            serde_json::to_vec(&attr.r#type.to_type_json()).unwrap_or_default(),
            None,
        ),
    };

    proto::schema::Attribute {
        name: attr.name.clone(),
        r#type,
        nested_type,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: string_kind_to_proto(attr.description_kind),
        deprecated: attr.deprecated,
        write_only: false,
    }
}

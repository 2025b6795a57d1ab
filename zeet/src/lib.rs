pub mod api;
pub mod customtypes;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::ZeetProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::Provider;

const API_URL_ENV: &str = "ZEET_API_URL";
const TOKEN_ENV: &str = "ZEET_TOKEN";

pub struct ZeetProvider {
    version: String,
}

impl Default for ZeetProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeetProvider {
    pub fn new() -> Self {
        Self::with_version(env!("CARGO_PKG_VERSION"))
    }

    /// Version reported to Terraform and sent in the user agent
    pub fn with_version(version: &str) -> Self {
        Self {
            version: version.to_string(),
        }
    }
}

/// Config value first, then the environment
fn setting(config: &DynamicValue, name: &str, env_var: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl Provider for ZeetProvider {
    fn type_name(&self) -> &str {
        "zeet"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            version: self.version.clone(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Interact with the Zeet platform")
            .attribute(
                AttributeBuilder::string("api_url")
                    .markdown_description("The URL of the Zeet API Server.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("token")
                    .markdown_description("The Zeet API token.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let api_url = setting(&request.config, "api_url", API_URL_ENV)
            .unwrap_or_else(|| api::DEFAULT_API_URL.to_string());
        let token = setting(&request.config, "token", TOKEN_ENV);
        let user_agent = format!("terraform-{}", self.version);

        match api::Client::new(&api_url, token.as_deref(), &user_agent) {
            Ok(client) => {
                tracing::debug!(api_url = %api_url, "configured zeet client");
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(ZeetProviderData::new(client))),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Unable to create Zeet API client",
                    format!("An unexpected error occurred when creating the Zeet API client: {}", e),
                )
                .with_attribute(AttributePath::new("api_url"))],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "zeet_group".to_string(),
            Box::new(|| {
                Box::new(crate::resources::GroupResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        resources.insert(
            "zeet_group_subgroup".to_string(),
            Box::new(|| {
                Box::new(crate::resources::GroupSubgroupResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        resources.insert(
            "zeet_project".to_string(),
            Box::new(|| {
                Box::new(crate::resources::ProjectResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "zeet_team".to_string(),
            Box::new(|| {
                Box::new(crate::data_sources::TeamDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        data_sources.insert(
            "zeet_group".to_string(),
            Box::new(|| {
                Box::new(crate::data_sources::GroupDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        data_sources.insert(
            "zeet_group_subgroup".to_string(),
            Box::new(|| {
                Box::new(crate::data_sources::GroupSubgroupDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        data_sources.insert(
            "zeet_blueprint".to_string(),
            Box::new(|| {
                Box::new(crate::data_sources::BlueprintDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        data_sources
    }
}

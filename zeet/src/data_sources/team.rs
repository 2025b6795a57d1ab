//! Team data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::read_response;
use crate::customtypes;
use crate::provider_data::{self, ZeetProviderData};
use crate::resources::{client_error, required_uuid};

#[derive(Default)]
pub struct TeamDataSource {
    provider_data: Option<ZeetProviderData>,
}

impl TeamDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_team(&self, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let provider_data = self
            .provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)?;
        let id = required_uuid(config, "id")?;

        let team = provider_data
            .client
            .v1()
            .teams()
            .get(id)
            .await
            .map_err(|e| client_error("read team", e))?;

        let mut state = config.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(team.id));
        let _ = state.set_string(&AttributePath::new("name"), team.name);
        Ok(state)
    }
}

#[async_trait]
impl DataSource for TeamDataSource {
    fn type_name(&self) -> &str {
        "zeet_team"
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
        let schema = SchemaBuilder::new()
            .version(0)
            .markdown_description("Zeet Team data source")
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Team identifier")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Team name")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let result = self.read_team(&request.config).await;
        read_response(request.config, result)
    }
}

#[async_trait]
impl DataSourceWithConfigure for TeamDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match provider_data::extract(request.provider_data, "Data Source") {
            Ok(data) => self.provider_data = data,
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::types::Dynamic;

    #[tokio::test]
    async fn read_without_provider_data_reports_error() {
        let config = DynamicValue::new(Dynamic::object([
            ("id", Dynamic::from("99c11487-1683-4e10-9620-94d9a78a0b67")),
            ("name", Dynamic::Null),
        ]));

        let response = TeamDataSource::new()
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "zeet_team".to_string(),
                    config: config.clone(),
                    provider_meta: None,
                    client_capabilities: Default::default(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
        assert_eq!(response.state, config);
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut data_source = TeamDataSource::new();
        let response = data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(std::sync::Arc::new(42u32)),
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "Unexpected Data Source Configure Type"
        );
    }
}

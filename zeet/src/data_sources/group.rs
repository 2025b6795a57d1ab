//! Group data source implementation

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
pub struct GroupDataSource {
    provider_data: Option<ZeetProviderData>,
}

impl GroupDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_group(&self, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let provider_data = self
            .provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)?;
        let team_id = required_uuid(config, "team_id")?;
        let id = required_uuid(config, "id")?;

        let group = provider_data
            .client
            .v1()
            .groups()
            .get(team_id, id)
            .await
            .map_err(|e| client_error("read group", e))?
            .ok_or_else(|| client_error("read group", "group not found"))?;

        let mut state = config.clone();
        let _ = state.set_value(&AttributePath::new("id"), customtypes::uuid::to_value(group.id));
        let _ = state.set_string(&AttributePath::new("name"), group.name);
        Ok(state)
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
    fn type_name(&self) -> &str {
        "zeet_group"
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
            .markdown_description("Zeet Group data source")
            .attribute(
                customtypes::uuid::attribute("team_id")
                    .markdown_description("Team identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Group identifier")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Group name")
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
        let result = self.read_group(&request.config).await;
        read_response(request.config, result)
    }
}

#[async_trait]
impl DataSourceWithConfigure for GroupDataSource {
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

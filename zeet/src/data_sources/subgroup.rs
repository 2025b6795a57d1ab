//! Group subgroup data source implementation

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
pub struct GroupSubgroupDataSource {
    provider_data: Option<ZeetProviderData>,
}

impl GroupSubgroupDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_subgroup(&self, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let provider_data = self
            .provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)?;
        let team_id = required_uuid(config, "team_id")?;
        let group_id = required_uuid(config, "group_id")?;
        let id = required_uuid(config, "id")?;

        let subgroup = provider_data
            .client
            .v1()
            .subgroups()
            .get(team_id, group_id, id)
            .await
            .map_err(|e| client_error("read subgroup", e))?
            .ok_or_else(|| client_error("read subgroup", "subgroup not found"))?;

        let mut state = config.clone();
        let _ = state.set_value(
            &AttributePath::new("id"),
            customtypes::uuid::to_value(subgroup.id),
        );
        let _ = state.set_string(&AttributePath::new("name"), subgroup.name);
        Ok(state)
    }
}

#[async_trait]
impl DataSource for GroupSubgroupDataSource {
    fn type_name(&self) -> &str {
        "zeet_group_subgroup"
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
            .markdown_description("Zeet Group Subgroup data source")
            .attribute(
                customtypes::uuid::attribute("team_id")
                    .markdown_description("Team identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("group_id")
                    .markdown_description("Group identifier")
                    .required()
                    .build(),
            )
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Sub-group identifier")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .markdown_description("Sub-group name")
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
        let result = self.read_subgroup(&request.config).await;
        read_response(request.config, result)
    }
}

#[async_trait]
impl DataSourceWithConfigure for GroupSubgroupDataSource {
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

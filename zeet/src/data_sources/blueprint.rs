//! Blueprint data source implementation
//!
//! Looks a blueprint up by id, or by slug among the official blueprints.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::read_response;
use crate::api::v0::blueprint::OFFICIAL_OWNER;
use crate::api::v1::blueprint::Blueprint;
use crate::customtypes::{self, json};
use crate::provider_data::{self, ZeetProviderData};
use crate::resources::{client_error, invalid_configuration};

const ID_OR_SLUG: &str = "Either id or slug must be set";

#[derive(Default)]
pub struct BlueprintDataSource {
    provider_data: Option<ZeetProviderData>,
}

impl BlueprintDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_blueprint(&self, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let provider_data = self
            .provider_data
            .as_ref()
            .ok_or_else(provider_data::not_configured)?;
        let client = &provider_data.client;

        let id = match customtypes::uuid::uuid_value(config, &AttributePath::new("id")) {
            Some(id) => id,
            None => {
                let slug = config
                    .get(&AttributePath::new("slug"))
                    .and_then(Dynamic::as_str)
                    .ok_or_else(|| invalid_configuration(ID_OR_SLUG))?;
                client
                    .v0()
                    .marketplace()
                    .blueprint_id(OFFICIAL_OWNER, slug)
                    .await
                    .map_err(|e| client_error("read blueprint", e))?
            }
        };

        let blueprint = client
            .v1()
            .blueprints()
            .get(id)
            .await
            .map_err(|e| client_error("read blueprint", e))?;

        blueprint_state(blueprint)
    }
}

fn blueprint_state(blueprint: Blueprint) -> Result<DynamicValue, Diagnostic> {
    let configuration = blueprint.configuration;
    let variables = configuration
        .variables
        .as_ref()
        .map(json::marshal)
        .transpose()
        .map_err(|e| client_error("read blueprint", e))?;

    Ok(DynamicValue::new(Dynamic::object([
        ("id", customtypes::uuid::to_value(blueprint.id)),
        ("slug", Dynamic::from(configuration.slug.clone())),
        ("is_official", Dynamic::from(blueprint.is_official)),
        ("type", Dynamic::from(blueprint.blueprint_type)),
        (
            "configuration",
            Dynamic::object([
                ("slug", Dynamic::from(configuration.slug)),
                ("display_name", Dynamic::from(configuration.display_name)),
                ("description", Dynamic::from(configuration.description)),
                ("tags", Dynamic::string_list(configuration.tags)),
                ("enabled", Dynamic::from(blueprint.enabled)),
                ("published", Dynamic::from(configuration.published)),
                ("driver_configuration", Dynamic::Null),
                ("rich_input_schema", Dynamic::from(configuration.rich_input_schema)),
                ("variables", Dynamic::from(variables)),
            ]),
        ),
    ])))
}

#[async_trait]
impl DataSource for BlueprintDataSource {
    fn type_name(&self) -> &str {
        "zeet_blueprint"
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
        let configuration = vec![
            AttributeBuilder::string("slug").computed().build(),
            AttributeBuilder::string("display_name").computed().build(),
            AttributeBuilder::string("description").computed().build(),
            AttributeBuilder::list("tags", AttributeType::String)
                .computed()
                .build(),
            AttributeBuilder::bool("enabled").computed().build(),
            AttributeBuilder::bool("published").computed().build(),
            json::attribute("driver_configuration").computed().build(),
            json::attribute("rich_input_schema").computed().build(),
            json::attribute("variables").computed().build(),
        ];

        let schema = SchemaBuilder::new()
            .version(0)
            .markdown_description("Zeet Blueprint data source")
            .attribute(
                customtypes::uuid::attribute("id")
                    .markdown_description("Blueprint identifier")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("slug")
                    .markdown_description("Slug of an official blueprint, used when `id` is not set")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("is_official")
                    .markdown_description("Whether Zeet publishes the blueprint")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("type")
                    .markdown_description("Blueprint type")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::single_nested("configuration", configuration)
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let config = &request.config.value;
        let (id, slug) = (config.attr("id"), config.attr("slug"));
        let mut diagnostics = vec![];
        if id.is_null() && slug.is_null() {
            diagnostics.push(invalid_configuration(ID_OR_SLUG));
        }
        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let result = self.read_blueprint(&request.config).await;
        read_response(request.config, result)
    }
}

#[async_trait]
impl DataSourceWithConfigure for BlueprintDataSource {
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
    use serde_json::json;

    #[tokio::test]
    async fn validate_requires_id_or_slug() {
        let response = BlueprintDataSource::new()
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: "zeet_blueprint".to_string(),
                    config: DynamicValue::new(Dynamic::object([
                        ("id", Dynamic::Null),
                        ("slug", Dynamic::Null),
                    ])),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].detail, ID_OR_SLUG);
    }

    #[test]
    fn state_carries_configuration() {
        let blueprint: Blueprint = serde_json::from_value(json!({
            "id": "2e9aa322-3a41-4930-9f3c-2987836d3b70",
            "type": "TERRAFORM",
            "isOfficial": true,
            "enabled": true,
            "configuration": {
                "slug": "aws-s3-bucket",
                "displayName": "AWS S3 Bucket",
                "published": true,
                "description": null,
                "tags": ["aws", "s3"],
                "richInputSchema": "[]",
                "variables": [{"id": 1, "name": "bucket_name", "type": "STRING"}]
            }
        }))
        .unwrap();

        let state = blueprint_state(blueprint).unwrap().value;
        assert_eq!(state.attr("type").as_str(), Some("TERRAFORM"));
        assert_eq!(state.attr("slug").as_str(), Some("aws-s3-bucket"));

        let configuration = state.attr("configuration");
        assert_eq!(configuration.attr("display_name").as_str(), Some("AWS S3 Bucket"));
        assert!(configuration.attr("description").is_null());
        assert!(configuration.attr("driver_configuration").is_null());
        assert_eq!(
            configuration.attr("tags"),
            &Dynamic::string_list(["aws", "s3"])
        );
        assert_eq!(
            configuration.attr("variables").as_str(),
            Some(r#"[{"id":1,"name":"bucket_name","type":"STRING"}]"#)
        );
    }
}

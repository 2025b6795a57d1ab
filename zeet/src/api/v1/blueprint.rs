//! Blueprint lookup

use serde::Deserialize;
use uuid::Uuid;

use crate::api::graphql::IdVariables;
use crate::api::{ApiError, Client, Endpoint};

const BLUEPRINT_QUERY: &str = r#"query blueprint($id: UUID!) {
  blueprint(id: $id) {
    id
    type
    isOfficial
    enabled
    configuration {
      slug
      displayName
      published
      description
      tags
      richInputSchema
      variables {
        id
        identifier
        name
        description
        type
        required
        defaultValue
      }
    }
  }
}"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub blueprint_type: String,
    pub is_official: Option<bool>,
    pub enabled: Option<bool>,
    pub configuration: BlueprintConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintConfiguration {
    pub slug: String,
    pub display_name: String,
    pub published: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// JSON document, sent as a string
    pub rich_input_schema: Option<String>,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct BlueprintData {
    blueprint: Option<Blueprint>,
}

pub struct BlueprintsApi<'a> {
    client: &'a Client,
}

impl<'a> BlueprintsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: Uuid) -> Result<Blueprint, ApiError> {
        let data: BlueprintData = self
            .client
            .execute(
                Endpoint::V1,
                "blueprint",
                BLUEPRINT_QUERY,
                &IdVariables { id },
            )
            .await?;
        data.blueprint
            .ok_or_else(|| ApiError::NotFound("blueprint".to_string()))
    }
}

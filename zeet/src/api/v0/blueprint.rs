//! Blueprint marketplace lookup

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiError, Client, Endpoint};

/// Owner of the official blueprints
pub const OFFICIAL_OWNER: &str = "zeet";

const MARKETPLACE_BLUEPRINT_QUERY: &str = r#"query marketplaceBlueprint($owner: String!, $slug: String!) {
  blueprintsMarketplace {
    blueprint(owner: $owner, slug: $slug) {
      id
    }
  }
}"#;

#[derive(Serialize)]
struct MarketplaceVariables<'a> {
    owner: &'a str,
    slug: &'a str,
}

#[derive(Deserialize)]
struct BlueprintId {
    id: Uuid,
}

#[derive(Deserialize)]
struct Marketplace {
    blueprint: Option<BlueprintId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketplaceData {
    blueprints_marketplace: Marketplace,
}

pub struct MarketplaceApi<'a> {
    client: &'a Client,
}

impl<'a> MarketplaceApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Id of the blueprint `owner/slug`
    pub async fn blueprint_id(&self, owner: &str, slug: &str) -> Result<Uuid, ApiError> {
        let data: MarketplaceData = self
            .client
            .execute(
                Endpoint::V0,
                "marketplaceBlueprint",
                MARKETPLACE_BLUEPRINT_QUERY,
                &MarketplaceVariables { owner, slug },
            )
            .await?;

        data.blueprints_marketplace
            .blueprint
            .map(|b| b.id)
            .ok_or_else(|| ApiError::NotFound(format!("blueprint {}/{}", owner, slug)))
    }
}

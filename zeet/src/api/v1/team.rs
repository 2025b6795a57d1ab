//! Team lookup

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiError, Client, Endpoint};

const TEAM_QUERY: &str = r#"query team($id: UUID!) {
  team(id: $id) {
    id
    name
  }
}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
struct TeamVariables {
    id: Uuid,
}

#[derive(Deserialize)]
struct TeamData {
    team: Option<Team>,
}

pub struct TeamsApi<'a> {
    client: &'a Client,
}

impl<'a> TeamsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: Uuid) -> Result<Team, ApiError> {
        let data: TeamData = self
            .client
            .execute(Endpoint::V1, "team", TEAM_QUERY, &TeamVariables { id })
            .await?;
        data.team.ok_or_else(|| ApiError::NotFound("team".to_string()))
    }
}

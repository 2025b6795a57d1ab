//! Group operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::graphql::{IdInputVariables, IdVariables, InputVariables, Nodes};
use crate::api::{ApiError, Client, Endpoint};

const GROUP_QUERY: &str = r#"query group($teamId: UUID!, $id: UUID!) {
  team(id: $teamId) {
    groups(input: { filter: { id: { value: $id } } }) {
      nodes {
        id
        name
      }
    }
  }
}"#;

const CREATE_GROUP_MUTATION: &str = r#"mutation createGroup($input: CreateGroupInput!) {
  createGroup(input: $input) {
    id
    name
  }
}"#;

const UPDATE_GROUP_MUTATION: &str = r#"mutation updateGroup($id: UUID!, $input: UpdateGroupInput!) {
  updateGroup(id: $id, input: $input) {
    id
    name
  }
}"#;

const DELETE_GROUP_MUTATION: &str = r#"mutation deleteGroup($id: UUID!) {
  deleteGroup(id: $id)
}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    pub team_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupVariables {
    team_id: Uuid,
    id: Uuid,
}

#[derive(Deserialize)]
struct GroupTeam {
    groups: Nodes<Group>,
}

#[derive(Deserialize)]
struct GroupData {
    team: Option<GroupTeam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupData {
    create_group: Group,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateGroupData {
    update_group: Group,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteGroupData {
    delete_group: bool,
}

pub struct GroupsApi<'a> {
    client: &'a Client,
}

impl<'a> GroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Group `id` within the team, `None` when the team has no such group
    pub async fn get(&self, team_id: Uuid, id: Uuid) -> Result<Option<Group>, ApiError> {
        let data: GroupData = self
            .client
            .execute(
                Endpoint::V1,
                "group",
                GROUP_QUERY,
                &GroupVariables { team_id, id },
            )
            .await?;

        Ok(data
            .team
            .and_then(|team| team.groups.nodes.into_iter().next()))
    }

    pub async fn create(&self, input: &CreateGroupInput) -> Result<Group, ApiError> {
        let data: CreateGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "createGroup",
                CREATE_GROUP_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.create_group)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateGroupInput) -> Result<Group, ApiError> {
        let data: UpdateGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "updateGroup",
                UPDATE_GROUP_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_group)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let data: DeleteGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "deleteGroup",
                DELETE_GROUP_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.delete_group)
    }
}

//! Subgroup operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::graphql::{IdInputVariables, IdVariables, InputVariables, Nodes};
use crate::api::{ApiError, Client, Endpoint};

const SUBGROUP_QUERY: &str = r#"query subGroup($teamId: UUID!, $groupId: UUID!, $id: UUID!) {
  team(id: $teamId) {
    groups(input: { filter: { id: { value: $groupId } } }) {
      nodes {
        id
        subGroup(id: $id) {
          id
          name
        }
      }
    }
  }
}"#;

const CREATE_SUBGROUP_MUTATION: &str = r#"mutation createSubGroup($input: CreateSubGroupInput!) {
  createSubGroup(input: $input) {
    id
    name
  }
}"#;

const UPDATE_SUBGROUP_MUTATION: &str = r#"mutation updateSubGroup($id: UUID!, $input: UpdateSubGroupInput!) {
  updateSubGroup(id: $id, input: $input) {
    id
    name
  }
}"#;

const DELETE_SUBGROUP_MUTATION: &str = r#"mutation deleteSubGroup($id: UUID!) {
  deleteSubGroup(id: $id)
}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct SubGroup {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubGroupInput {
    pub group_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubGroupInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubGroupVariables {
    team_id: Uuid,
    group_id: Uuid,
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupNode {
    sub_group: Option<SubGroup>,
}

#[derive(Deserialize)]
struct SubGroupTeam {
    groups: Nodes<GroupNode>,
}

#[derive(Deserialize)]
struct SubGroupData {
    team: Option<SubGroupTeam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubGroupData {
    create_sub_group: SubGroup,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSubGroupData {
    update_sub_group: SubGroup,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSubGroupData {
    delete_sub_group: bool,
}

pub struct SubGroupsApi<'a> {
    client: &'a Client,
}

impl<'a> SubGroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Subgroup `id` of the group, `None` when either does not exist
    pub async fn get(
        &self,
        team_id: Uuid,
        group_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SubGroup>, ApiError> {
        let data: SubGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "subGroup",
                SUBGROUP_QUERY,
                &SubGroupVariables {
                    team_id,
                    group_id,
                    id,
                },
            )
            .await?;

        Ok(data
            .team
            .and_then(|team| team.groups.nodes.into_iter().next())
            .and_then(|group| group.sub_group))
    }

    pub async fn create(&self, input: &CreateSubGroupInput) -> Result<SubGroup, ApiError> {
        let data: CreateSubGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "createSubGroup",
                CREATE_SUBGROUP_MUTATION,
                &InputVariables { input },
            )
            .await?;
        Ok(data.create_sub_group)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateSubGroupInput,
    ) -> Result<SubGroup, ApiError> {
        let data: UpdateSubGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "updateSubGroup",
                UPDATE_SUBGROUP_MUTATION,
                &IdInputVariables { id, input },
            )
            .await?;
        Ok(data.update_sub_group)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let data: DeleteSubGroupData = self
            .client
            .execute(
                Endpoint::V1,
                "deleteSubGroup",
                DELETE_SUBGROUP_MUTATION,
                &IdVariables { id },
            )
            .await?;
        Ok(data.delete_sub_group)
    }
}

//! Operations against the v1 GraphQL schema

pub mod blueprint;
pub mod group;
pub mod project;
pub mod subgroup;
pub mod team;

use crate::api::Client;

/// v1 API view
pub struct V1Api<'a> {
    client: &'a Client,
}

impl<'a> V1Api<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn teams(&self) -> team::TeamsApi<'a> {
        team::TeamsApi::new(self.client)
    }

    pub fn groups(&self) -> group::GroupsApi<'a> {
        group::GroupsApi::new(self.client)
    }

    pub fn subgroups(&self) -> subgroup::SubGroupsApi<'a> {
        subgroup::SubGroupsApi::new(self.client)
    }

    pub fn blueprints(&self) -> blueprint::BlueprintsApi<'a> {
        blueprint::BlueprintsApi::new(self.client)
    }

    pub fn projects(&self) -> project::ProjectsApi<'a> {
        project::ProjectsApi::new(self.client)
    }
}

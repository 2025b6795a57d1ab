//! Operations against the legacy v0 GraphQL schema

pub mod blueprint;
pub mod inputs;
pub mod repo;

use crate::api::Client;

/// v0 API view
pub struct V0Api<'a> {
    client: &'a Client,
}

impl<'a> V0Api<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn marketplace(&self) -> blueprint::MarketplaceApi<'a> {
        blueprint::MarketplaceApi::new(self.client)
    }

    pub fn repos(&self) -> repo::ReposApi<'a> {
        repo::ReposApi::new(self.client)
    }
}

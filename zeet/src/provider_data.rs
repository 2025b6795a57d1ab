//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct ZeetProviderData {
    pub client: Arc<Client>,
}

impl ZeetProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Reported when a lifecycle method runs before the provider was configured
pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

/// Downcast the opaque provider data handed out by `ZeetProvider::configure`.
///
/// Missing data is tolerated here, Terraform configures resources before the
/// provider during validation. The lifecycle methods report it instead.
pub(crate) fn extract(
    provider_data: Option<Arc<dyn std::any::Any + Send + Sync>>,
    kind: &str,
) -> Result<Option<ZeetProviderData>, Diagnostic> {
    let Some(data) = provider_data else {
        return Ok(None);
    };

    match data.downcast_ref::<ZeetProviderData>() {
        Some(provider_data) => Ok(Some(provider_data.clone())),
        None => Err(Diagnostic::error(
            format!("Unexpected {} Configure Type", kind),
            "Expected ZeetProviderData. Please report this issue to the provider developers.",
        )),
    }
}

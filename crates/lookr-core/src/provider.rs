// ── Provider ──
//
// Owns one CRUD engine and routes attribute-map calls to the right resource
// by kind. This is the entry point a host drives.

use strum::{Display, EnumIter, EnumString};
use tokio_util::sync::CancellationToken;
use tracing::info;

use lookr_api::{Alerts, CrudEngine, HttpTransport, Themes, Transport};

use crate::attr::AttrMap;
use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::sync::{Inventory, Observed, ResourceSync};

/// Resource types this provider manages.
///
/// Parses the short name, the plural, or the `looker_`-prefixed block name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ResourceKind {
    #[strum(to_string = "theme", serialize = "themes", serialize = "looker_theme")]
    Theme,
    #[strum(to_string = "alert", serialize = "alerts", serialize = "looker_alert")]
    Alert,
}

impl ResourceKind {
    /// Parse a resource name, mapping failure into [`CoreError`].
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        name.parse().map_err(|_| CoreError::UnknownResource {
            name: name.to_owned(),
        })
    }

    /// Attribute that best labels an entity in listings.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Theme => "name",
            Self::Alert => "custom_title",
        }
    }
}

pub struct Provider<T> {
    engine: CrudEngine<T>,
}

impl Provider<HttpTransport> {
    /// Build the HTTP transport and engine from a config.
    pub fn connect(config: &ProviderConfig) -> Result<Self, CoreError> {
        let transport = HttpTransport::new(
            config.url.as_str(),
            config.credentials.clone(),
            &config.api_version,
            &config.transport_config(),
        )?;
        info!(
            url = %transport.base_url(),
            api_version = %config.api_version,
            "provider configured"
        );
        Ok(Self::new(CrudEngine::with_api_version(
            transport,
            config.api_version.clone(),
        )))
    }

    /// Revoke the session token, if one was obtained.
    pub async fn close(&self) -> Result<(), CoreError> {
        Ok(self.engine.transport().logout().await?)
    }
}

impl<T: Transport> Provider<T> {
    pub fn new(engine: CrudEngine<T>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CrudEngine<T> {
        &self.engine
    }

    pub fn themes(&self) -> ResourceSync<'_, Themes, T> {
        ResourceSync::new(self.engine.themes())
    }

    pub fn alerts(&self) -> ResourceSync<'_, Alerts, T> {
        ResourceSync::new(self.engine.alerts())
    }

    pub async fn create(
        &self,
        kind: ResourceKind,
        desired: &AttrMap,
        cancel: &CancellationToken,
    ) -> Result<Observed, CoreError> {
        match kind {
            ResourceKind::Theme => self.themes().create(desired, cancel).await,
            ResourceKind::Alert => self.alerts().create(desired, cancel).await,
        }
    }

    pub async fn read(
        &self,
        kind: ResourceKind,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observed>, CoreError> {
        match kind {
            ResourceKind::Theme => self.themes().read(id, cancel).await,
            ResourceKind::Alert => self.alerts().read(id, cancel).await,
        }
    }

    pub async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        desired: &AttrMap,
        cancel: &CancellationToken,
    ) -> Result<Observed, CoreError> {
        match kind {
            ResourceKind::Theme => self.themes().update(id, desired, cancel).await,
            ResourceKind::Alert => self.alerts().update(id, desired, cancel).await,
        }
    }

    pub async fn delete(
        &self,
        kind: ResourceKind,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observed>, CoreError> {
        match kind {
            ResourceKind::Theme => self.themes().delete(id, cancel).await,
            ResourceKind::Alert => self.alerts().delete(id, cancel).await,
        }
    }

    pub async fn list(
        &self,
        kind: ResourceKind,
        cancel: &CancellationToken,
    ) -> Result<Inventory, CoreError> {
        match kind {
            ResourceKind::Theme => self.themes().list(cancel).await,
            ResourceKind::Alert => self.alerts().list(cancel).await,
        }
    }
}

// Resource descriptors and the typed adapter built on them.
//
// A descriptor is configuration only: a path, an update method and a
// read/write model pair. `Resources` narrows the engine to one descriptor and
// applies read-after-write, so callers always see the canonical read
// representation rather than whatever the write endpoint echoed back.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::{CrudEngine, Listing, UpdateMethod};
use crate::error::{DecodeError, Error};
use crate::models::{Alert, Theme, WriteAlert, WriteTheme};
use crate::transport::Transport;

/// Binds one REST collection to its model types.
pub trait Resource: Send + Sync + 'static {
    /// Singular, human-readable name (`"theme"`).
    const NAME: &'static str;
    /// Collection path relative to the API version.
    const PATH: &'static str;
    /// Path listed by `list`; some collections are only listable via search.
    const LIST_PATH: &'static str = Self::PATH;
    const UPDATE: UpdateMethod;

    type Model: DeserializeOwned + Send;
    type Write: Serialize + Sync;

    fn id_of(model: &Self::Model) -> Option<&str>;
}

pub struct Themes;

impl Resource for Themes {
    const NAME: &'static str = "theme";
    const PATH: &'static str = "themes";
    const UPDATE: UpdateMethod = UpdateMethod::Patch;

    type Model = Theme;
    type Write = WriteTheme;

    fn id_of(model: &Theme) -> Option<&str> {
        model.id.as_deref()
    }
}

pub struct Alerts;

impl Resource for Alerts {
    const NAME: &'static str = "alert";
    const PATH: &'static str = "alerts";
    const LIST_PATH: &'static str = "alerts/search";
    const UPDATE: UpdateMethod = UpdateMethod::Put;

    type Model = Alert;
    type Write = WriteAlert;

    fn id_of(model: &Alert) -> Option<&str> {
        model.id.as_deref()
    }
}

// ── Adapter ──────────────────────────────────────────────────────────

/// The engine narrowed to one resource.
pub struct Resources<'a, R, T> {
    engine: &'a CrudEngine<T>,
    _resource: PhantomData<fn() -> R>,
}

impl<T: Transport> CrudEngine<T> {
    pub fn resource<R: Resource>(&self) -> Resources<'_, R, T> {
        Resources {
            engine: self,
            _resource: PhantomData,
        }
    }

    pub fn themes(&self) -> Resources<'_, Themes, T> {
        self.resource()
    }

    pub fn alerts(&self) -> Resources<'_, Alerts, T> {
        self.resource()
    }
}

impl<R: Resource, T: Transport> Resources<'_, R, T> {
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Listing<R::Model>, Error> {
        self.engine.list(R::LIST_PATH, cancel).await
    }

    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<R::Model, Error> {
        self.engine.get(R::PATH, id, cancel).await
    }

    /// Create, then re-read the new entity by the id the server assigned.
    pub async fn create(
        &self,
        body: &R::Write,
        cancel: &CancellationToken,
    ) -> Result<R::Model, Error> {
        let created: R::Model = self.engine.create(R::PATH, body, cancel).await?;
        let Some(id) = R::id_of(&created) else {
            return Err(DecodeError::InvalidValue {
                field: "id".into(),
                message: format!("create {} response carries no id", R::NAME),
            }
            .into());
        };
        debug!(resource = R::NAME, id, "created, re-reading");
        self.get(id, cancel).await
    }

    /// Update, then re-read.
    pub async fn update(
        &self,
        id: &str,
        body: &R::Write,
        cancel: &CancellationToken,
    ) -> Result<R::Model, Error> {
        let _: R::Model = self
            .engine
            .update(R::PATH, id, R::UPDATE, body, cancel)
            .await?;
        debug!(resource = R::NAME, id, "updated, re-reading");
        self.get(id, cancel).await
    }

    /// Delete, then confirm with a read.
    ///
    /// `Ok(None)` means the entity is gone. `Ok(Some(_))` means the server
    /// accepted the delete but still serves the entity.
    pub async fn delete(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<R::Model>, Error> {
        self.engine.delete(R::PATH, id, cancel).await?;
        match self.get(id, cancel).await {
            Err(e) if e.is_not_found() => Ok(None),
            Ok(survivor) => {
                warn!(resource = R::NAME, id, "entity still present after delete");
                Ok(Some(survivor))
            }
            Err(e) => Err(e),
        }
    }
}

// ── Host-facing synchronization ──
//
// Takes desired state as an attribute map, drives one resource adapter and
// hands observed state back as an attribute map. Typed models exist only
// inside a single call.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use lookr_api::{Resource, Resources, Transport};

use crate::attr::AttrMap;
use crate::bridge::{self, Decoded, Record};
use crate::error::CoreError;

/// Observed state of one entity after a synchronization call.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub id: String,
    pub state: AttrMap,
    /// Desired-state keys that matched no writable field.
    pub ignored: Vec<String>,
}

/// Result of listing a collection.
#[derive(Debug)]
pub struct Inventory {
    pub items: Vec<Observed>,
    /// Set when the listing was cancelled after some pages arrived.
    pub interrupted: Option<CoreError>,
}

/// One resource adapter behind an attribute-map interface.
pub struct ResourceSync<'a, R, T> {
    resources: Resources<'a, R, T>,
}

impl<'a, R, T> ResourceSync<'a, R, T>
where
    R: Resource,
    R::Model: Record,
    R::Write: Record,
    T: Transport,
{
    pub fn new(resources: Resources<'a, R, T>) -> Self {
        Self { resources }
    }

    pub async fn create(
        &self,
        desired: &AttrMap,
        cancel: &CancellationToken,
    ) -> Result<Observed, CoreError> {
        let Decoded { value, ignored } = desired_state::<R>(desired)?;
        let model = self.resources.create(&value, cancel).await?;
        observe::<R>(&model, ignored)
    }

    /// `Ok(None)` means the entity no longer exists and should leave state.
    pub async fn read(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observed>, CoreError> {
        match self.resources.get(id, cancel).await {
            Ok(model) => observe::<R>(&model, Vec::new()).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(
        &self,
        id: &str,
        desired: &AttrMap,
        cancel: &CancellationToken,
    ) -> Result<Observed, CoreError> {
        let Decoded { value, ignored } = desired_state::<R>(desired)?;
        let model = self.resources.update(id, &value, cancel).await?;
        observe::<R>(&model, ignored)
    }

    /// `Ok(None)` once removal is confirmed; otherwise the state the server
    /// still reports.
    pub async fn delete(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observed>, CoreError> {
        match self.resources.delete(id, cancel).await? {
            None => Ok(None),
            Some(survivor) => observe::<R>(&survivor, Vec::new()).map(Some),
        }
    }

    /// Entities the server lists without an id are skipped.
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Inventory, CoreError> {
        let listing = self.resources.list(cancel).await?;
        let items = listing
            .items
            .iter()
            .filter_map(|model| match observe::<R>(model, Vec::new()) {
                Ok(observed) => Some(observed),
                Err(err) => {
                    warn!(resource = R::NAME, error = %err, "skipping listed entity");
                    None
                }
            })
            .collect();
        Ok(Inventory {
            items,
            interrupted: listing.interrupted.map(CoreError::from),
        })
    }
}

fn desired_state<R>(attrs: &AttrMap) -> Result<Decoded<R::Write>, CoreError>
where
    R: Resource,
    R::Write: Record,
{
    let decoded = bridge::decode::<R::Write>(attrs)?;
    for key in &decoded.ignored {
        warn!(resource = R::NAME, key = %key, "attribute is not writable, ignoring");
    }
    Ok(decoded)
}

fn observe<R>(model: &R::Model, ignored: Vec<String>) -> Result<Observed, CoreError>
where
    R: Resource,
    R::Model: Record,
{
    let id = R::id_of(model)
        .ok_or(CoreError::MissingId { resource: R::NAME })?
        .to_owned();
    Ok(Observed {
        id,
        state: bridge::encode(model),
        ignored,
    })
}

// lookr-core: attribute-map bridge and resource synchronization on top of lookr-api.

pub mod attr;
pub mod bridge;
pub mod config;
pub mod error;
pub mod provider;
mod records;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use attr::{AttrMap, AttrValue, attr_map_from_json, attr_map_to_json};
pub use bridge::{AttrCodec, Decoded, FieldDef, Record, Schema, normalize_key};
pub use config::{ProviderConfig, TlsVerification};
pub use error::CoreError;
pub use provider::{Provider, ResourceKind};
pub use sync::{Inventory, Observed, ResourceSync};

pub use lookr_api::{Credentials, DEFAULT_API_VERSION, FieldError, Transport};

// lookr-api: Async Rust client for the Looker REST API
//
// One generic CRUD engine serves every resource collection. Resource
// descriptors (`Themes`, `Alerts`) bind a path and a read/write model pair
// to it; nothing below this crate knows about individual resources.

pub mod auth;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod field;
pub mod models;
pub mod resource;
pub mod transport;

pub use auth::Credentials;
pub use engine::{CrudEngine, DEFAULT_API_VERSION, Listing, UpdateMethod};
pub use envelope::{Cursor, Envelope, RateLimit};
pub use error::{ApiError, DecodeError, Error, FieldError, TransportError};
pub use field::Field;
pub use resource::{Alerts, Resource, Resources, Themes};
pub use transport::{HttpTransport, RawResponse, Request, TlsMode, Transport, TransportConfig};

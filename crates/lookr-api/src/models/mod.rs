//! Wire models for the Looker resources this crate manages.
//!
//! Each resource has a read model (everything the server may return) and a
//! write model (the subset a client may submit). Server-managed fields such
//! as `id` and `can` exist only on the read model, so a write model that
//! carries them cannot be constructed:
//!
//! ```compile_fail
//! let _ = lookr_api::models::WriteTheme {
//!     id: "42".into(),
//!     ..Default::default()
//! };
//! ```
//!
//! ```compile_fail
//! let _ = lookr_api::models::WriteAlert {
//!     followed: true.into(),
//!     ..Default::default()
//! };
//! ```
//!
//! Every field is a [`Field`](crate::Field) so that "not returned" and
//! "explicitly null" stay distinct through a decode/encode cycle.

mod alert;
mod theme;

pub use alert::{
    Alert, AlertAppliedDashboardFilter, AlertDestination, AlertField, ComparisonType, WriteAlert,
};
pub use theme::{Theme, ThemeSettings, WriteTheme};

// Theme models: `GET/POST {ver}/themes`, `PATCH {ver}/themes/{id}`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::field::Field;

/// A theme as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Operations the current user may perform on this theme.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub can: Field<BTreeMap<String, bool>>,
    /// When the theme becomes active. Null means always.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub begin_at: Field<DateTime<FixedOffset>>,
    /// When the theme expires. Null means never.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub end_at: Field<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    /// Alphanumerics and underscores only.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub settings: Field<ThemeSettings>,
}

/// The client-settable subset of [`Theme`].
///
/// Server-managed fields such as `id` are rejected rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteTheme {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub begin_at: Field<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub end_at: Field<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub settings: Field<ThemeSettings>,
}

impl From<Theme> for WriteTheme {
    fn from(theme: Theme) -> Self {
        Self {
            begin_at: theme.begin_at,
            end_at: theme.end_at,
            name: theme.name,
            settings: theme.settings,
        }
    }
}

/// Visual settings shared by the read and write models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub background_color: Field<String>,
    /// CSS size, e.g. `"12px"`.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub base_font_size: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub color_collection_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub font_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub font_family: Field<String>,
    /// URL of a custom font. Older instances send it as `font-source`.
    #[serde(alias = "font-source", skip_serializing_if = "Field::is_absent")]
    pub font_source: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub info_button_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub primary_button_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub show_filters_bar: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub show_title: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub text_tile_text_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub tile_background_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub tile_text_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub tile_color: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub warn_button_color: Field<String>,
    /// `"left"`, `"center"` or `"right"`.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub tile_title_alignment: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub tile_shadow: Field<bool>,
}

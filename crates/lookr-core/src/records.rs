// Field registries for the Looker wire models.
//
// Keys are the wire names. The registry is the only place a model's
// attribute surface is declared; decoding and encoding both read it.

use std::sync::LazyLock;

use lookr_api::models::{
    Alert, AlertAppliedDashboardFilter, AlertDestination, AlertField, Theme, ThemeSettings,
    WriteAlert, WriteTheme,
};

use crate::bridge::{FieldDef, Record, Schema};

// ── Theme ────────────────────────────────────────────────────────────

impl Record for Theme {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Theme>> = LazyLock::new(|| {
            type F = FieldDef<Theme>;
            Schema::new(vec![
                F::scalar("id", |t| &t.id, |t| &mut t.id),
                F::scalar("name", |t| &t.name, |t| &mut t.name),
                F::scalar("begin_at", |t| &t.begin_at, |t| &mut t.begin_at),
                F::scalar("end_at", |t| &t.end_at, |t| &mut t.end_at),
                F::scalar("can", |t| &t.can, |t| &mut t.can),
                F::nested("settings", |t| &t.settings, |t| &mut t.settings),
            ])
        });
        &SCHEMA
    }
}

impl Record for WriteTheme {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<WriteTheme>> = LazyLock::new(|| {
            type F = FieldDef<WriteTheme>;
            Schema::new(vec![
                F::scalar("name", |t| &t.name, |t| &mut t.name),
                F::scalar("begin_at", |t| &t.begin_at, |t| &mut t.begin_at),
                F::scalar("end_at", |t| &t.end_at, |t| &mut t.end_at),
                F::nested("settings", |t| &t.settings, |t| &mut t.settings),
            ])
        });
        &SCHEMA
    }
}

impl Record for ThemeSettings {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<ThemeSettings>> = LazyLock::new(|| {
            type F = FieldDef<ThemeSettings>;
            Schema::new(vec![
                F::scalar("background_color", |s| &s.background_color, |s| &mut s.background_color),
                F::scalar("base_font_size", |s| &s.base_font_size, |s| &mut s.base_font_size),
                F::scalar(
                    "color_collection_id",
                    |s| &s.color_collection_id,
                    |s| &mut s.color_collection_id,
                ),
                F::scalar("font_color", |s| &s.font_color, |s| &mut s.font_color),
                F::scalar("font_family", |s| &s.font_family, |s| &mut s.font_family),
                F::scalar("font_source", |s| &s.font_source, |s| &mut s.font_source),
                F::scalar(
                    "info_button_color",
                    |s| &s.info_button_color,
                    |s| &mut s.info_button_color,
                ),
                F::scalar(
                    "primary_button_color",
                    |s| &s.primary_button_color,
                    |s| &mut s.primary_button_color,
                ),
                F::scalar("show_filters_bar", |s| &s.show_filters_bar, |s| &mut s.show_filters_bar),
                F::scalar("show_title", |s| &s.show_title, |s| &mut s.show_title),
                F::scalar(
                    "text_tile_text_color",
                    |s| &s.text_tile_text_color,
                    |s| &mut s.text_tile_text_color,
                ),
                F::scalar(
                    "tile_background_color",
                    |s| &s.tile_background_color,
                    |s| &mut s.tile_background_color,
                ),
                F::scalar("tile_text_color", |s| &s.tile_text_color, |s| &mut s.tile_text_color),
                F::scalar("tile_color", |s| &s.tile_color, |s| &mut s.tile_color),
                F::scalar(
                    "warn_button_color",
                    |s| &s.warn_button_color,
                    |s| &mut s.warn_button_color,
                ),
                F::scalar(
                    "tile_title_alignment",
                    |s| &s.tile_title_alignment,
                    |s| &mut s.tile_title_alignment,
                ),
                F::scalar("tile_shadow", |s| &s.tile_shadow, |s| &mut s.tile_shadow),
            ])
        });
        &SCHEMA
    }
}

// ── Alert ────────────────────────────────────────────────────────────

impl Record for AlertAppliedDashboardFilter {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<AlertAppliedDashboardFilter>> = LazyLock::new(|| {
            type F = FieldDef<AlertAppliedDashboardFilter>;
            Schema::new(vec![
                F::scalar("filter_title", |f| &f.filter_title, |f| &mut f.filter_title),
                F::scalar("field_name", |f| &f.field_name, |f| &mut f.field_name)
                    .alias("filter_name"),
                F::scalar("filter_value", |f| &f.filter_value, |f| &mut f.filter_value),
                F::scalar(
                    "filter_description",
                    |f| &f.filter_description,
                    |f| &mut f.filter_description,
                ),
            ])
        });
        &SCHEMA
    }
}

impl Record for AlertDestination {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<AlertDestination>> = LazyLock::new(|| {
            type F = FieldDef<AlertDestination>;
            Schema::new(vec![
                F::scalar("destination_type", |d| &d.destination_type, |d| &mut d.destination_type),
                F::scalar("email_address", |d| &d.email_address, |d| &mut d.email_address),
                F::scalar(
                    "action_hub_integration_id",
                    |d| &d.action_hub_integration_id,
                    |d| &mut d.action_hub_integration_id,
                ),
                F::scalar(
                    "action_hub_form_params_json",
                    |d| &d.action_hub_form_params_json,
                    |d| &mut d.action_hub_form_params_json,
                ),
            ])
        });
        &SCHEMA
    }
}

impl Record for AlertField {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<AlertField>> = LazyLock::new(|| {
            type F = FieldDef<AlertField>;
            Schema::new(vec![
                F::scalar("title", |f| &f.title, |f| &mut f.title),
                F::scalar("name", |f| &f.name, |f| &mut f.name),
            ])
        });
        &SCHEMA
    }
}

impl Record for Alert {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Alert>> = LazyLock::new(|| {
            type F = FieldDef<Alert>;
            Schema::new(vec![
                F::scalar("id", |a| &a.id, |a| &mut a.id),
                F::nested_list(
                    "applied_dashboard_filters",
                    |a| &a.applied_dashboard_filters,
                    |a| &mut a.applied_dashboard_filters,
                ),
                F::scalar("comparison_type", |a| &a.comparison_type, |a| &mut a.comparison_type),
                F::scalar("cron", |a| &a.cron, |a| &mut a.cron),
                F::scalar("custom_title", |a| &a.custom_title, |a| &mut a.custom_title),
                F::scalar(
                    "dashboard_element_id",
                    |a| &a.dashboard_element_id,
                    |a| &mut a.dashboard_element_id,
                ),
                F::scalar("description", |a| &a.description, |a| &mut a.description),
                F::nested_list("destinations", |a| &a.destinations, |a| &mut a.destinations),
                F::nested("field", |a| &a.field, |a| &mut a.field),
                F::scalar("followed", |a| &a.followed, |a| &mut a.followed),
                F::scalar("followable", |a| &a.followable, |a| &mut a.followable),
                F::scalar(
                    "investigative_content_title",
                    |a| &a.investigative_content_title,
                    |a| &mut a.investigative_content_title,
                ),
                F::scalar("is_disabled", |a| &a.is_disabled, |a| &mut a.is_disabled),
                F::scalar("disabled_reason", |a| &a.disabled_reason, |a| &mut a.disabled_reason),
                F::scalar("is_public", |a| &a.is_public, |a| &mut a.is_public),
                F::scalar(
                    "lookml_dashboard_id",
                    |a| &a.lookml_dashboard_id,
                    |a| &mut a.lookml_dashboard_id,
                ),
                F::scalar("owner_id", |a| &a.owner_id, |a| &mut a.owner_id),
                F::scalar(
                    "owner_display_name",
                    |a| &a.owner_display_name,
                    |a| &mut a.owner_display_name,
                ),
                F::scalar("threshold", |a| &a.threshold, |a| &mut a.threshold),
            ])
        });
        &SCHEMA
    }
}

impl Record for WriteAlert {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<WriteAlert>> = LazyLock::new(|| {
            type F = FieldDef<WriteAlert>;
            Schema::new(vec![
                F::nested_list(
                    "applied_dashboard_filters",
                    |a| &a.applied_dashboard_filters,
                    |a| &mut a.applied_dashboard_filters,
                ),
                F::scalar("comparison_type", |a| &a.comparison_type, |a| &mut a.comparison_type),
                F::scalar("cron", |a| &a.cron, |a| &mut a.cron),
                F::scalar("custom_title", |a| &a.custom_title, |a| &mut a.custom_title),
                F::scalar(
                    "dashboard_element_id",
                    |a| &a.dashboard_element_id,
                    |a| &mut a.dashboard_element_id,
                ),
                F::scalar("description", |a| &a.description, |a| &mut a.description),
                F::nested_list("destinations", |a| &a.destinations, |a| &mut a.destinations),
                F::nested("field", |a| &a.field, |a| &mut a.field),
                F::scalar("is_disabled", |a| &a.is_disabled, |a| &mut a.is_disabled),
                F::scalar("disabled_reason", |a| &a.disabled_reason, |a| &mut a.disabled_reason),
                F::scalar("is_public", |a| &a.is_public, |a| &mut a.is_public),
                F::scalar(
                    "lookml_dashboard_id",
                    |a| &a.lookml_dashboard_id,
                    |a| &mut a.lookml_dashboard_id,
                ),
                F::scalar("owner_id", |a| &a.owner_id, |a| &mut a.owner_id),
                F::scalar("threshold", |a| &a.threshold, |a| &mut a.threshold),
            ])
        });
        &SCHEMA
    }
}

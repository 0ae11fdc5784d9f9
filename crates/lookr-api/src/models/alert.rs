// Alert models: `POST {ver}/alerts`, `PUT {ver}/alerts/{id}`,
// listed through `GET {ver}/alerts/search`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::field::Field;

/// What kind of check an alert performs.
///
/// Only some comparisons are valid for time-series alerts; the server
/// enforces that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonType {
    EqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    IncreasesBy,
    DecreasesBy,
    ChangesBy,
}

/// A dashboard filter captured when the alert was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertAppliedDashboardFilter {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub filter_title: Field<String>,
    /// Dimension the filter applies to. Also accepted as `filter_name`.
    #[serde(alias = "filter_name", skip_serializing_if = "Field::is_absent")]
    pub field_name: Field<String>,
    /// Looker filter expression.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub filter_value: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub filter_description: Field<String>,
}

/// Where a triggered alert is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertDestination {
    /// `EMAIL` or `ACTION_HUB`.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub destination_type: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub email_address: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub action_hub_integration_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub action_hub_form_params_json: Field<String>,
}

/// The measure an alert watches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertField {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
}

/// An alert as returned by the server.
///
/// `comparison_type` stays a plain string here so that a value this crate
/// does not know yet still decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub applied_dashboard_filters: Field<Vec<AlertAppliedDashboardFilter>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub comparison_type: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub cron: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub custom_title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub dashboard_element_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub destinations: Field<Vec<AlertDestination>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub field: Field<AlertField>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub followed: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub followable: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub investigative_content_title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub is_disabled: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub disabled_reason: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub is_public: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub lookml_dashboard_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub owner_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub owner_display_name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub threshold: Field<f64>,
}

/// The client-settable subset of [`Alert`]. Unknown keys are an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteAlert {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub applied_dashboard_filters: Field<Vec<AlertAppliedDashboardFilter>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub comparison_type: Field<ComparisonType>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub cron: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub custom_title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub dashboard_element_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub destinations: Field<Vec<AlertDestination>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub field: Field<AlertField>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub is_disabled: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub disabled_reason: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub is_public: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub lookml_dashboard_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub owner_id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub threshold: Field<f64>,
}

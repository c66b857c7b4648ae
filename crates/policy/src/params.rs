//! Policy configuration: service defaults, request overrides, resolved parameters.

use serde::{Deserialize, Serialize};

use restock_core::{FieldError, ValidationError};

/// Extra days of coverage bought beyond the target window.
pub const DEFAULT_REVIEW_HORIZON_DAYS: f64 = 14.0;

/// Upper bound accepted for any configured number of days.
pub const MAX_POLICY_DAYS: f64 = 3650.0;

/// Service-level defaults (environment / deployment configuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefaults {
    pub review_horizon_days: f64,
    /// Service-wide target window; `None` means per item (lead time + safety stock).
    pub target_window_days: Option<f64>,
    /// Project current stock from consumption since the last replenishment.
    pub project_consumption: bool,
    /// Persist the projected current stock as the new quantity.
    pub update_calculated_quantities: bool,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            review_horizon_days: DEFAULT_REVIEW_HORIZON_DAYS,
            target_window_days: None,
            project_consumption: false,
            update_calculated_quantities: false,
        }
    }
}

impl PolicyDefaults {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        check_days(&mut errors, "reviewHorizonDays", Some(self.review_horizon_days));
        check_days(&mut errors, "targetWindowDays", self.target_window_days);
        ValidationError::from_collected(errors)
    }
}

/// Per-request overrides of the policy window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOverrides {
    pub review_horizon_days: Option<f64>,
    pub override_target_window_days: Option<f64>,
}

impl PolicyOverrides {
    /// Merge these overrides over `defaults` into a fully resolved parameter set.
    ///
    /// Every offending field (overrides and defaults alike) is reported.
    pub fn resolve(&self, defaults: &PolicyDefaults) -> Result<PolicyParams, ValidationError> {
        let mut errors = Vec::new();
        check_days(&mut errors, "policyOverrides.reviewHorizonDays", self.review_horizon_days);
        check_days(
            &mut errors,
            "policyOverrides.overrideTargetWindowDays",
            self.override_target_window_days,
        );
        check_days(&mut errors, "defaults.reviewHorizonDays", Some(defaults.review_horizon_days));
        check_days(&mut errors, "defaults.targetWindowDays", defaults.target_window_days);
        ValidationError::from_collected(errors)?;

        Ok(PolicyParams {
            review_horizon_days: self.review_horizon_days.unwrap_or(defaults.review_horizon_days),
            target_window_override: self.override_target_window_days.or(defaults.target_window_days),
            project_consumption: defaults.project_consumption,
            update_calculated_quantities: defaults.update_calculated_quantities,
        })
    }
}

/// Fully resolved policy parameters consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyParams {
    pub review_horizon_days: f64,
    pub target_window_override: Option<f64>,
    pub project_consumption: bool,
    pub update_calculated_quantities: bool,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            review_horizon_days: DEFAULT_REVIEW_HORIZON_DAYS,
            target_window_override: None,
            project_consumption: false,
            update_calculated_quantities: false,
        }
    }
}

impl PolicyParams {
    pub fn with_target_window_override(mut self, days: f64) -> Self {
        self.target_window_override = Some(days);
        self
    }

    pub fn with_projection(mut self, enabled: bool) -> Self {
        self.project_consumption = enabled;
        self
    }
}

fn check_days(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>) {
    let Some(v) = value else { return };
    if !v.is_finite() {
        errors.push(FieldError::new(field, "must be a finite number"));
    } else if !(0.0..=MAX_POLICY_DAYS).contains(&v) {
        errors.push(FieldError::new(
            field,
            format!("must be between 0 and {MAX_POLICY_DAYS} days (got {v})"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_resolve_to_defaults() {
        let params = PolicyOverrides::default()
            .resolve(&PolicyDefaults::default())
            .unwrap();
        assert_eq!(params, PolicyParams::default());
    }

    #[test]
    fn overrides_win_over_defaults() {
        let defaults = PolicyDefaults {
            review_horizon_days: 7.0,
            target_window_days: Some(4.0),
            project_consumption: true,
            update_calculated_quantities: true,
        };
        let overrides = PolicyOverrides {
            review_horizon_days: Some(21.0),
            override_target_window_days: Some(10.0),
        };

        let params = overrides.resolve(&defaults).unwrap();
        assert_eq!(params.review_horizon_days, 21.0);
        assert_eq!(params.target_window_override, Some(10.0));
        assert!(params.project_consumption);
        assert!(params.update_calculated_quantities);
    }

    #[test]
    fn service_window_applies_without_request_override() {
        let defaults = PolicyDefaults {
            target_window_days: Some(6.0),
            ..PolicyDefaults::default()
        };
        let params = PolicyOverrides::default().resolve(&defaults).unwrap();
        assert_eq!(params.target_window_override, Some(6.0));
    }

    #[test]
    fn every_offending_field_is_reported() {
        let overrides = PolicyOverrides {
            review_horizon_days: Some(-1.0),
            override_target_window_days: Some(f64::NAN),
        };

        let err = overrides.resolve(&PolicyDefaults::default()).unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "policyOverrides.reviewHorizonDays",
                "policyOverrides.overrideTargetWindowDays"
            ]
        );
    }

    #[test]
    fn defaults_validation_rejects_huge_horizon() {
        let defaults = PolicyDefaults {
            review_horizon_days: 10_000.0,
            ..PolicyDefaults::default()
        };
        assert!(defaults.validate().is_err());
        assert!(PolicyDefaults::default().validate().is_ok());
    }

    #[test]
    fn overrides_deserialize_from_camel_case() {
        let overrides: PolicyOverrides =
            serde_json::from_str(r#"{"reviewHorizonDays": 30, "overrideTargetWindowDays": 2.5}"#).unwrap();
        assert_eq!(overrides.review_horizon_days, Some(30.0));
        assert_eq!(overrides.override_target_window_days, Some(2.5));
    }
}

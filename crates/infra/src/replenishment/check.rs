use std::time::Instant;

use tracing::{error, info, warn};

use restock_core::{RunId, ValidationError};
use restock_policy::{DecisionEngine, PolicyDefaults, PolicyOverrides, PolicyParams};

use super::report::build_report;
use super::summary::{CheckRow, CheckSummary, NotificationOutcome, PolicyWindowSummary, TargetWindowSummary};
use super::{CheckError, DEFAULT_SUBJECT_PREFIX, NotificationOptions};
use crate::ports::{Clock, InventorySource, NotificationSink, SaveOptions};

/// One full replenishment check cycle over the whole inventory.
///
/// Per run: at most one `list`, one batched `save` and one `send`. Adapter
/// errors abort the run and propagate unchanged; nothing is retried here.
#[derive(Debug, Clone)]
pub struct ReplenishmentCheck<I, N, C> {
    inventory: I,
    notifier: N,
    clock: C,
    defaults: PolicyDefaults,
    subject_prefix: String,
}

impl<I, N, C> ReplenishmentCheck<I, N, C>
where
    I: InventorySource,
    N: NotificationSink,
    C: Clock,
{
    pub fn new(inventory: I, notifier: N, clock: C) -> Self {
        Self {
            inventory,
            notifier,
            clock,
            defaults: PolicyDefaults::default(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        }
    }

    pub fn with_defaults(mut self, defaults: PolicyDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Subject prefix used when a request does not bring its own.
    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    pub fn defaults(&self) -> &PolicyDefaults {
        &self.defaults
    }

    /// Resolve request configuration, reporting every offending field at once.
    pub fn resolve(
        &self,
        overrides: &PolicyOverrides,
        notification: &NotificationOptions,
    ) -> Result<PolicyParams, ValidationError> {
        match (overrides.resolve(&self.defaults), notification.validate()) {
            (Ok(params), Ok(())) => Ok(params),
            (Err(policy), Err(notify)) => Err(policy.merge(notify)),
            (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
        }
    }

    /// Run one check. Either a complete summary or an error, never both.
    pub async fn execute(
        &self,
        overrides: &PolicyOverrides,
        notification: &NotificationOptions,
    ) -> Result<CheckSummary, CheckError> {
        let run_id = RunId::new();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            dry_run = notification.dry_run,
            notification_enabled = notification.enabled,
            "replenishment check started"
        );

        let result = self.run(overrides, notification).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(summary) => info!(
                run_id = %run_id,
                checked = summary.checked_count,
                needs_replenishment = summary.notified_count,
                notified = matches!(summary.notification, NotificationOutcome::Sent { .. }),
                persisted = summary.persisted_count,
                duration_ms,
                "replenishment check finished"
            ),
            Err(CheckError::Adapter(e)) => error!(
                run_id = %run_id,
                collaborator = %e.collaborator,
                operation = e.operation,
                kind = %e.kind,
                duration_ms,
                error = %e,
                "replenishment check failed"
            ),
            Err(CheckError::Validation(e)) => warn!(
                run_id = %run_id,
                fields = e.fields().len(),
                duration_ms,
                error = %e,
                "replenishment check rejected"
            ),
        }

        result
    }

    async fn run(
        &self,
        overrides: &PolicyOverrides,
        notification: &NotificationOptions,
    ) -> Result<CheckSummary, CheckError> {
        let params = self.resolve(overrides, notification)?;
        let now = self.clock.now();

        let items = self.inventory.list().await?;
        let engine = DecisionEngine::new(params.clone());

        let mut rows = Vec::with_capacity(items.len());
        let mut updates = Vec::with_capacity(items.len());
        for item in &items {
            let decision = engine.evaluate(item, now);
            updates.push(decision.to_update(item, now));
            rows.push(CheckRow::new(item, decision));
        }

        let persisted_count = if notification.dry_run || updates.is_empty() {
            0
        } else {
            let options = SaveOptions {
                update_quantities: params.update_calculated_quantities,
            };
            self.inventory.save(&updates, options).await?;
            updates.len()
        };

        let notifiable: Vec<&CheckRow> = rows.iter().filter(|r| r.needs_replenishment()).collect();
        let notified_count = notifiable.len();

        let notification_outcome = if !notification.enabled {
            NotificationOutcome::Disabled
        } else if notifiable.is_empty() {
            NotificationOutcome::NothingToReport
        } else {
            let prefix = notification
                .subject_prefix
                .as_deref()
                .unwrap_or(&self.subject_prefix);
            let message = build_report(&notifiable, now, prefix, notification.dry_run);
            if notification.dry_run {
                NotificationOutcome::DryRun { preview: message }
            } else {
                self.notifier.send(&message).await?;
                NotificationOutcome::Sent {
                    subject: message.subject,
                }
            }
        };

        Ok(CheckSummary {
            generated_at: now,
            dry_run: notification.dry_run,
            checked_count: rows.len(),
            notified_count,
            persisted_count,
            notification: notification_outcome,
            policy: PolicyWindowSummary {
                review_horizon_days: params.review_horizon_days,
                target_window: TargetWindowSummary::for_batch(&params, &items),
            },
            rows,
        })
    }
}

//! Batch reconciliation: upsert, then police the missing ratio.
//!
//! A bulk upsert can silently lose rows to conflicts the policy absorbs.
//! [`BulkReconciler`] runs the upsert through the registry's engine for the
//! session's dialect, compares the driver-reported affected count against
//! the batch size, and fails loudly when too large a fraction went missing.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use smelter_core::{Batch, ConflictPolicy, Session, TableDescriptor};

use crate::engine::UpsertRequest;
use crate::error::UpsertError;
use crate::registry::DialectRegistry;

/// Fraction of a batch allowed to go missing before reconciliation fails.
const DEFAULT_TOLERANCE: f64 = 0.01;

/// The tolerance range a reconciler can be configured with.
const TOLERANCE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=0.5;

/// One reconciliation invocation.
///
/// `policy` and `tolerance` override the reconciler's configured defaults
/// for this call only. A per-call tolerance is trusted as given; the
/// supported range is `[0.0, 0.5]`.
#[derive(Debug, Clone)]
pub struct ReconcileRequest<'a> {
    /// Descriptor of the target table.
    pub table: &'a TableDescriptor,
    /// Rows to reconcile.
    pub batch: &'a Batch,
    /// Optional schema qualifying the table name.
    pub schema: Option<&'a str>,
    /// Conflict-target columns; `None` uses the descriptor's primary keys.
    pub key_columns: Option<&'a [String]>,
    /// Per-call conflict policy override.
    pub policy: Option<ConflictPolicy>,
    /// Per-call tolerance override.
    pub tolerance: Option<f64>,
}

impl<'a> ReconcileRequest<'a> {
    /// A request against `table` using the reconciler's defaults.
    #[must_use]
    pub fn new(table: &'a TableDescriptor, batch: &'a Batch) -> Self {
        Self {
            table,
            batch,
            schema: None,
            key_columns: None,
            policy: None,
            tolerance: None,
        }
    }

    /// Qualifies the table name with a schema.
    #[must_use]
    pub fn schema(mut self, schema: &'a str) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Overrides the conflict policy for this call.
    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Overrides the conflict-target columns.
    #[must_use]
    pub fn key_columns(mut self, columns: &'a [String]) -> Self {
        self.key_columns = Some(columns);
        self
    }

    /// Overrides the missing tolerance for this call.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Service-style configuration for building a [`BulkReconciler`].
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Fraction of a batch allowed to go missing, in `[0.0, 0.5]`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Conflict policy applied when a request does not override it.
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            on_conflict: ConflictPolicy::default(),
        }
    }
}

/// Reconciles tabular batches against relational tables.
#[derive(Debug, Clone)]
pub struct BulkReconciler {
    registry: Arc<DialectRegistry>,
    tolerance: f64,
    policy: ConflictPolicy,
}

impl BulkReconciler {
    /// A reconciler with the default tolerance (`0.01`) and policy
    /// (`nothing`).
    #[must_use]
    pub fn new(registry: Arc<DialectRegistry>) -> Self {
        Self {
            registry,
            tolerance: DEFAULT_TOLERANCE,
            policy: ConflictPolicy::default(),
        }
    }

    /// Starts building a reconciler; `build` validates the tolerance.
    #[must_use]
    pub fn builder(registry: Arc<DialectRegistry>) -> BulkReconcilerBuilder {
        BulkReconcilerBuilder {
            registry,
            tolerance: DEFAULT_TOLERANCE,
            policy: ConflictPolicy::default(),
        }
    }

    /// Builds a reconciler from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::InvalidTolerance`] when the configured
    /// tolerance falls outside `[0.0, 0.5]`.
    pub fn from_config(
        registry: Arc<DialectRegistry>,
        config: &ReconcilerConfig,
    ) -> Result<Self, UpsertError> {
        Self::builder(registry)
            .tolerance(config.tolerance)
            .on_conflict(config.on_conflict)
            .build()
    }

    /// The tolerance applied when a request does not override it.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The policy applied when a request does not override it.
    #[must_use]
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Upserts the batch and checks the missing ratio against the
    /// tolerance.
    ///
    /// The missing ratio is `1 - affected / batch_len`, `0.0` for an empty
    /// batch; a ratio strictly greater than the tolerance fails. Engine
    /// resolution happens before the empty-batch short-circuit, so a
    /// session with an unregistered dialect errors even when there is
    /// nothing to write.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::UnsupportedDialect`] when no engine matches
    /// the session, [`UpsertError::Execution`] when the session fails, and
    /// [`UpsertError::ToleranceExceeded`] when too many rows went missing.
    pub fn reconcile(
        &self,
        request: &ReconcileRequest<'_>,
        session: &mut dyn Session,
    ) -> Result<u64, UpsertError> {
        let engine = self.registry.engine_for(session)?;
        let policy = request.policy.unwrap_or(self.policy);
        let tolerance = request.tolerance.unwrap_or(self.tolerance);
        let total = request.batch.len();

        let upsert = UpsertRequest {
            table: request.table,
            batch: request.batch,
            schema: request.schema,
            key_columns: request.key_columns,
            policy,
        };
        let affected = engine.upsert(&upsert, session)?;

        let missing_ratio = missing_ratio(affected, total);
        if missing_ratio > tolerance {
            warn!(
                affected,
                total,
                missing_ratio,
                tolerance,
                table = request.table.name(),
                "Reconciliation exceeded missing tolerance"
            );
            return Err(UpsertError::ToleranceExceeded {
                affected,
                total,
                missing_ratio,
                tolerance,
            });
        }

        info!(
            affected,
            total,
            missing_ratio,
            table = request.table.name(),
            "Reconciled batch"
        );
        Ok(affected)
    }
}

/// Builder for [`BulkReconciler`].
#[derive(Debug, Clone)]
pub struct BulkReconcilerBuilder {
    registry: Arc<DialectRegistry>,
    tolerance: f64,
    policy: ConflictPolicy,
}

impl BulkReconcilerBuilder {
    /// Sets the default missing tolerance, validated by `build`.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the default conflict policy.
    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validates the configuration and produces the reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::InvalidTolerance`] when the tolerance falls
    /// outside `[0.0, 0.5]`.
    pub fn build(self) -> Result<BulkReconciler, UpsertError> {
        if !TOLERANCE_RANGE.contains(&self.tolerance) {
            return Err(UpsertError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        Ok(BulkReconciler {
            registry: self.registry,
            tolerance: self.tolerance,
            policy: self.policy,
        })
    }
}

/// `1 - affected / total`, clamped at zero, `0.0` for an empty batch.
fn missing_ratio(affected: u64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = 1.0 - (affected as f64) / (total as f64);
    ratio.max(0.0)
}

//! Example: Reconciling account batches into DuckDB
//!
//! This example walks through the whole upsert pipeline: describe a table,
//! build batches, reconcile them into an in-memory DuckDB store under both
//! conflict policies, and watch the tolerance check catch silently dropped
//! rows.
//!
//! Run with: cargo run --example reconcile_duckdb -p smelter-upsert
//!
//! Set `RUST_LOG=smelter_upsert=trace` to see the rendered SQL.

use std::sync::Arc;

use smelter_core::{Batch, ConflictPolicy, Row, TableDescriptor};
use smelter_duckdb::DuckDbSession;
use smelter_upsert::{BulkReconciler, DialectRegistry, ReconcileRequest, UpsertError};

fn account(id: i64, name: &str, balance: f64) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("balance", balance)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smelter_upsert=debug,smelter_duckdb=debug".into()),
        )
        .init();

    let mut session = DuckDbSession::open_in_memory()?;
    session.connection().execute_batch(
        "CREATE TABLE accounts (id BIGINT PRIMARY KEY, name VARCHAR, balance DOUBLE)",
    )?;

    let accounts = TableDescriptor::builder("accounts")
        .column("id")
        .column("name")
        .column("balance")
        .primary_key("id")
        .build()?;

    let registry = Arc::new(DialectRegistry::with_default_engines());
    let reconciler = BulkReconciler::builder(Arc::clone(&registry))
        .tolerance(0.0)
        .on_conflict(ConflictPolicy::Update)
        .build()?;

    // First load: three fresh accounts, every row lands.
    let batch: Batch = vec![
        account(1, "Alice", 10.5),
        account(2, "Bob", 0.0),
        account(3, "Cleo", -3.25),
    ]
    .into();
    let affected = reconciler.reconcile(&ReconcileRequest::new(&accounts, &batch), &mut session)?;
    println!("initial load: {affected} of {} rows affected", batch.len());

    // Second load under UPDATE: Bob's balance changes, the rest rewrite in
    // place. DuckDB counts rewritten rows, so the reconciler stays happy.
    let batch: Batch = vec![
        account(1, "Alice", 10.5),
        account(2, "Bob", 42.0),
        account(3, "Cleo", -3.25),
    ]
    .into();
    let affected = reconciler.reconcile(&ReconcileRequest::new(&accounts, &batch), &mut session)?;
    println!("update load: {affected} of {} rows affected", batch.len());

    // Replay under NOTHING with zero tolerance: every row conflicts, every
    // row is skipped, and the reconciler reports the drop rate.
    let result = reconciler.reconcile(
        &ReconcileRequest::new(&accounts, &batch).on_conflict(ConflictPolicy::Nothing),
        &mut session,
    );
    match result {
        Err(UpsertError::ToleranceExceeded {
            affected,
            total,
            missing_ratio,
            ..
        }) => println!(
            "replay under NOTHING kept {affected}/{total} rows (missing ratio \
             {missing_ratio:.2}), tolerance check failed as expected",
        ),
        other => println!("unexpected outcome: {other:?}"),
    }

    let balance: f64 = session.connection().query_row(
        "SELECT balance FROM accounts WHERE id = 2",
        [],
        |row| row.get(0),
    )?;
    println!("Bob's balance after all loads: {balance}");

    Ok(())
}

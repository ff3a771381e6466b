use std::sync::Arc;

use qaflow_contract::{RunHistory, TerminalRunEvent};
use qaflow_core::{current_unix_timestamp_ms, normalize_failure_signature};
use tokio::sync::mpsc;

use crate::store::HistoryStore;

/// Drains `rx` for terminal run events, appending a `RunHistory` row and
/// upserting the corresponding `FailurePattern` for every failure (§4.G).
/// Runs until the channel closes (the orchestrator dropping its sender).
pub async fn run_history_consumer(mut rx: mpsc::Receiver<TerminalRunEvent>, store: Arc<HistoryStore>) {
    while let Some(event) = rx.recv().await {
        record(&store, event);
    }
}

fn record(store: &HistoryStore, event: TerminalRunEvent) {
    let executed_at_unix_ms = event.run.end_ts_ms.unwrap_or_else(current_unix_timestamp_ms);
    let row = RunHistory {
        run_id: event.run.id.clone(),
        test_name: event.test_name.clone(),
        status: event.run.status,
        duration_ms: event.run.duration_ms.unwrap_or(0),
        failure_type: event.run.failure_category,
        browser: event.run.browser,
        environment: event.run.environment.clone(),
        executed_at_unix_ms,
    };

    if let (Some(category), Some(summary)) = (event.run.failure_category, event.run.error_summary.as_ref()) {
        let signature = normalize_failure_signature(summary);
        store.upsert_pattern(&event.test_name, &signature, category, executed_at_unix_ms);
    }

    tracing::debug!(run_id = %row.run_id, test_name = %row.test_name, status = ?row.status, "history recorded");
    store.append_run(row);
}

use tracing::info;

pub fn proposal_rejected(reason: &str) {
    info!(target: "telemetry.gui", reason, event = "proposal_rejected");
}

pub fn proposal_started(title: &str) {
    info!(target: "telemetry.gui", title, event = "proposal_started");
}

pub fn proposal_completed(run_id: &str, elapsed_ms: u128, result_chars: usize) {
    info!(
        target: "telemetry.gui",
        run_id,
        elapsed_ms = elapsed_ms as u64,
        result_chars,
        event = "proposal_completed"
    );
}

pub fn proposal_failed(elapsed_ms: u128, error: &str) {
    info!(
        target: "telemetry.gui",
        elapsed_ms = elapsed_ms as u64,
        error,
        event = "proposal_failed"
    );
}

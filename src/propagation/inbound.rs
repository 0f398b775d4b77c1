//! Inbound half: extract from call metadata and scope around the handler.
//!
//! Per inbound call the sequence is extract → scope → handler. Extraction
//! happens once, immediately before the application handler runs, for
//! unary and streaming calls alike; the decoded envelope lives in
//! task-local storage for exactly that invocation, so concurrent calls
//! never observe each other's context.

use tonic::metadata::MetadataMap;
use tracing::warn;

use crate::envelope::TraceEnvelope;
use crate::metrics::ENVELOPES_EXTRACTED;

use super::CALLER_CONTEXT_KEY;

tokio::task_local! {
    static CALLER_ENVELOPE: TraceEnvelope;
}

/// Read the caller's envelope out of inbound call metadata.
///
/// Missing key, undecodable value and tampered magic all resolve to the
/// absent sentinel; this never fails and never touches the call's outcome.
pub fn extract_envelope(metadata: &MetadataMap) -> TraceEnvelope {
    let Some(value) = metadata.get_bin(CALLER_CONTEXT_KEY) else {
        ENVELOPES_EXTRACTED.with_label_values(&["absent"]).inc();
        return TraceEnvelope::default();
    };

    let bytes = match value.to_bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "caller-context metadata is not decodable; ignoring");
            ENVELOPES_EXTRACTED.with_label_values(&["corrupt"]).inc();
            return TraceEnvelope::default();
        }
    };

    let envelope = TraceEnvelope::decode(&bytes);
    let outcome = if envelope.is_valid() { "valid" } else { "corrupt" };
    ENVELOPES_EXTRACTED.with_label_values(&[outcome]).inc();
    envelope
}

/// Run a handler with the caller's envelope scoped to that invocation.
///
/// The envelope (possibly the absent sentinel) is visible through
/// [`current_caller`] for the duration of `handler` and nowhere else; the
/// handler's output is returned unchanged, whatever the envelope held.
pub async fn with_caller_context<F>(envelope: TraceEnvelope, handler: F) -> F::Output
where
    F: std::future::Future,
{
    CALLER_ENVELOPE.scope(envelope, handler).await
}

/// The caller context of the call currently being handled.
///
/// `None` outside a [`with_caller_context`] scope and when the call
/// carried no valid envelope.
pub fn current_caller() -> Option<TraceEnvelope> {
    CALLER_ENVELOPE
        .try_with(|envelope| *envelope)
        .ok()
        .filter(TraceEnvelope::is_valid)
}

//! Prometheus metrics for the propagation paths.
//!
//! Counters only: the subsystem's whole job is fire-and-forget metadata,
//! so attach volume and extraction outcomes are the signals worth having.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Envelopes attached to outbound calls.
    pub static ref ENVELOPES_ATTACHED: IntCounter = register_int_counter!(
        "callsight_envelopes_attached_total",
        "Caller-context envelopes attached to outbound calls"
    ).expect("failed to register ENVELOPES_ATTACHED metric");

    /// Inbound extractions, by outcome.
    ///
    /// Labels:
    /// - outcome: "valid" (envelope decoded), "absent" (no reserved key),
    ///   "corrupt" (key present but undecodable or magic mismatch)
    pub static ref ENVELOPES_EXTRACTED: IntCounterVec = register_int_counter_vec!(
        "callsight_envelopes_extracted_total",
        "Inbound caller-context extractions by outcome",
        &["outcome"]
    ).expect("failed to register ENVELOPES_EXTRACTED metric");
}

//! Outbound half: capture at the call site and attach to call metadata.

use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::context::capture;
use crate::envelope::TraceEnvelope;
use crate::metrics::ENVELOPES_ATTACHED;
use crate::process::{self, ProcessMeta};

use super::CALLER_CONTEXT_KEY;

/// Capture the caller's context and attach it to outbound call metadata.
///
/// Runs exactly once per call, before the metadata is frozen and sent. It
/// writes only the reserved key and leaves every other key and the request
/// payload alone.
///
/// Inlined so the captured pc points at the frame that initiated the call,
/// not at a frame inside this crate.
#[inline(always)]
pub fn attach_caller_context(meta: &ProcessMeta, metadata: &mut MetadataMap) {
    let envelope = TraceEnvelope::new(meta.caller_identity(), capture());
    let encoded = envelope.encode();
    metadata.insert_bin(CALLER_CONTEXT_KEY, MetadataValue::from_bytes(&encoded));
    ENVELOPES_ATTACHED.inc();
}

/// Client interceptor that attaches the caller context to every request.
///
/// Constructed from the process-wide metadata: if propagation was never
/// enabled for this process, the interceptor is a pass-through and calls
/// proceed unmodified. Attachment itself cannot fail a call - the only
/// fallible step, capture, is infallible by contract.
#[derive(Debug, Clone, Copy)]
pub struct CallerContextInterceptor {
    meta: Option<&'static ProcessMeta>,
}

impl CallerContextInterceptor {
    /// Interceptor bound to the process-wide metadata, pass-through if
    /// [`crate::process::init_with_ip`] (or the interface variant) was
    /// never called.
    pub fn from_process() -> Self {
        Self {
            meta: process::get(),
        }
    }

    /// Pass-through interceptor, for callers that disable propagation.
    pub fn disabled() -> Self {
        Self { meta: None }
    }

    /// Whether this interceptor will attach envelopes.
    pub fn is_enabled(&self) -> bool {
        self.meta.is_some()
    }
}

impl Interceptor for CallerContextInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if let Some(meta) = self.meta {
            attach_caller_context(meta, request.metadata_mut());
        }
        Ok(request)
    }
}

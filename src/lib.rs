//! Callsight - one-hop caller-context propagation for gRPC services
//!
//! When a client issues a remote call, callsight snapshots the native
//! execution context of the call site (program counter, stack pointer,
//! frame pointer), wraps it in a compact validated envelope together with
//! the caller's identity, and rides it to the server as out-of-band call
//! metadata. The server-side handler can then correlate its execution back
//! to the exact client frame that triggered it - for crash reports and
//! slow-call investigation - without the request/response contract ever
//! noticing.
//!
//! # Modules
//!
//! - `context` - architecture-level capture of pc/sp/fp (and lr)
//! - `envelope` - the trace envelope and its fixed binary codec
//! - `buildid` - binary identity fingerprinting (ELF build id, hash fallback)
//! - `propagation` - outbound attach / inbound extract over gRPC metadata
//! - `process` - process-wide caller metadata, initialized once at startup
//! - `reporter` - the service-identity payload a discovery registry publishes
//! - `metrics` - Prometheus counters for attach/extract outcomes
//! - `logging` - tracing-subscriber setup for binaries and demos
//!
//! # Quick Start
//!
//! ```ignore
//! // once, at startup, before serving or issuing calls:
//! callsight::process::init_from_interface("eth0")?;
//!
//! // client side - attach to every outbound request:
//! let client = FooClient::with_interceptor(channel, CallerContextInterceptor::from_process());
//!
//! // server side - wrap the handler body:
//! let envelope = callsight::extract_envelope(request.metadata());
//! callsight::with_caller_context(envelope, async {
//!     if let Some(caller) = callsight::current_caller() {
//!         tracing::debug!(pc = caller.context.pc, "call from {}", caller.identity.source_ipv4());
//!     }
//!     // ... application logic, unchanged ...
//! }).await
//! ```
//!
//! Everything here is best-effort instrumentation: no capture, codec or
//! metadata failure ever becomes a call-level error.

pub mod buildid;
pub mod context;
pub mod envelope;
pub mod logging;
pub mod metrics;
pub mod process;
pub mod propagation;
pub mod reporter;

// Re-export the types that make up the public call-path surface.
pub use context::{capture, CallerContext};
pub use envelope::{CallerIdentity, TraceEnvelope, ENCODED_LEN, TRACE_MAGIC};
pub use propagation::{
    attach_caller_context, current_caller, extract_envelope, with_caller_context,
    CallerContextInterceptor, CALLER_CONTEXT_KEY,
};

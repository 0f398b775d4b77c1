//! Envelope propagation over gRPC call metadata.
//!
//! Two independent halves, one reserved key:
//!
//! ```text
//! caller                                          callee
//! ──────                                          ──────
//! capture ─▶ envelope ─▶ encode ─▶ attach   ...   extract ─▶ decode ─▶ scope ─▶ handler
//!                         (outbound metadata)      (inbound metadata)
//! ```
//!
//! The outbound side runs before the call's metadata is sent; the inbound
//! side runs immediately before the application handler, for unary and
//! streaming shapes alike. Neither side can fail the call: a missing key,
//! undecodable bytes or a disabled process all degrade to the absent
//! sentinel, and the handler's own result is passed through untouched.

pub mod inbound;
pub mod outbound;

/// Reserved metadata key carrying the encoded envelope.
///
/// gRPC transports binary metadata only under keys with the `-bin` suffix
/// (the transport base64s the value transparently); both sides of the
/// channel use this constant, and application metadata must not.
pub const CALLER_CONTEXT_KEY: &str = "bt-meta-bin";

pub use inbound::{current_caller, extract_envelope, with_caller_context};
pub use outbound::{attach_caller_context, CallerContextInterceptor};

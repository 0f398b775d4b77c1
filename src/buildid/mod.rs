//! Binary identity resolution.
//!
//! Produces a stable fingerprint for an executable so a captured context can
//! be matched to the exact build that produced it. Two strategies run in
//! order, first success wins:
//!
//! 1. [`elf::extract_build_id`] - the linker-embedded GNU build id
//! 2. [`hash::partial_sha256`] - content hash of the binary's head, tail
//!    and size
//!
//! Resolution is best-effort end to end: an unreadable or mangled binary
//! yields the empty string and a logged warning, never an error on the
//! caller. The identity of the running executable is computed at most once
//! per process and cached.

pub mod elf;
pub mod hash;

use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, warn};

static SELF_IDENTITY: OnceLock<String> = OnceLock::new();

/// Resolve the identity fingerprint of the binary at `path`.
///
/// Returns the empty string when every strategy fails; the caller decides
/// whether to omit the identity or report without it.
pub fn resolve_build_identity(path: &Path) -> String {
    let mut binary = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not open binary for identity resolution");
            return String::new();
        }
    };

    let strategies: [(&str, fn(&mut File) -> Option<String>); 2] = [
        ("elf-build-id", elf::extract_build_id),
        ("partial-hash", hash::partial_sha256),
    ];

    for (name, strategy) in strategies {
        if let Some(identity) = strategy(&mut binary) {
            debug!(path = %path.display(), strategy = name, "resolved build identity");
            return identity;
        }
    }

    warn!(path = %path.display(), "no strategy produced a build identity");
    String::new()
}

/// Identity of the currently running executable, resolved once and cached.
///
/// Call this during process startup so the file reads happen before any
/// call handling begins; later calls are a plain load.
pub fn build_identity_of_self() -> &'static str {
    SELF_IDENTITY.get_or_init(|| match std::env::current_exe() {
        Ok(path) => resolve_build_identity(&path),
        Err(err) => {
            warn!(error = %err, "could not resolve own executable path");
            String::new()
        }
    })
}

//! Service-identity payload for the discovery registry.
//!
//! A process announces itself to the service-discovery registry with one
//! line describing who it is and which build it runs. This module only
//! produces that payload; the registry connection and wire protocol are
//! the surrounding application's business.
//!
//! Payload format:
//!
//! ```text
//! ip:tag:pid:hash=alias[:{key=value,...}]
//! ```
//!
//! The user-data suffix appears only when there is user data, and entries
//! are joined without a trailing separator. Keys are kept sorted so the
//! payload for a given service is deterministic.

use std::collections::BTreeMap;

use crate::buildid;
use crate::process::ProcessMeta;

/// Everything the registry needs to know about one service process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceInfo {
    /// Host IPv4 address, numeric form.
    pub ip: u32,
    /// Service tag, e.g. the role name.
    pub tag: String,
    /// OS pid of the service process.
    pub pid: libc::pid_t,
    /// Build identity of the running binary.
    pub hash: String,
    /// Human-readable alias for the binary.
    pub alias: String,
    /// Free-form key-value pairs, sorted by key.
    pub user_data: BTreeMap<String, String>,
}

impl ServiceInfo {
    /// Assemble the info this process would publish: address and pid from
    /// the process metadata, hash from the identity resolver.
    pub fn for_current_process(meta: &ProcessMeta, tag: &str, alias: &str) -> Self {
        Self {
            ip: meta.comm_ip,
            tag: tag.to_owned(),
            pid: meta.pid,
            hash: buildid::build_identity_of_self().to_owned(),
            alias: alias.to_owned(),
            user_data: BTreeMap::new(),
        }
    }

    /// Render the registry payload line.
    pub fn registry_payload(&self) -> String {
        let mut payload = format!(
            "{}:{}:{}:{}={}",
            self.ip, self.tag, self.pid, self.hash, self.alias
        );
        if !self.user_data.is_empty() {
            let entries: Vec<String> = self
                .user_data
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            payload.push_str(&format!(":{{{}}}", entries.join(",")));
        }
        payload
    }
}

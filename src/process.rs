//! Process-wide caller metadata.
//!
//! Every outbound call reuses the same identity: the host's IPv4 address
//! and this process's pid. Both are resolved once, during process startup,
//! and held in a write-once cell. Initialization must happen before the
//! first call is issued or served; after that the read path is a plain
//! load with no locking.
//!
//! Propagation is considered *enabled* exactly when this metadata has been
//! initialized. A process that never calls one of the init functions sends
//! and expects no envelopes.

use std::net::Ipv4Addr;
use std::sync::OnceLock;

use tracing::info;

use crate::envelope::CallerIdentity;

static PROCESS_META: OnceLock<ProcessMeta> = OnceLock::new();

/// Identity of this process, shared by every call it makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMeta {
    /// Numeric (host-order) form of the host's IPv4 address.
    pub comm_ip: u32,
    /// The same address in structured form.
    pub ipv4: Ipv4Addr,
    /// This process's OS pid.
    pub pid: libc::pid_t,
}

impl ProcessMeta {
    /// Metadata for this process with an explicitly chosen address.
    pub fn with_ip(ipv4: Ipv4Addr) -> Self {
        Self {
            comm_ip: u32::from(ipv4),
            ipv4,
            pid: unsafe { libc::getpid() },
        }
    }

    /// The per-call identity derived from this metadata.
    pub fn caller_identity(&self) -> CallerIdentity {
        CallerIdentity {
            source_ip: self.comm_ip,
            process_id: self.pid,
        }
    }
}

/// Initialize process metadata with an explicit IPv4 address.
///
/// Errors if metadata was already initialized; the cached value never
/// changes after the first successful init.
pub fn init_with_ip(ipv4: Ipv4Addr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let meta = ProcessMeta::with_ip(ipv4);
    PROCESS_META
        .set(meta)
        .map_err(|_| "process metadata already initialized")?;
    info!(ip = %ipv4, pid = meta.pid, "caller-context propagation enabled");
    Ok(())
}

/// Initialize process metadata from a named network interface, e.g. `eth0`.
pub fn init_from_interface(name: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ipv4 = interface_ipv4(name)
        .ok_or_else(|| format!("interface {name} has no IPv4 address"))?;
    init_with_ip(ipv4)
}

/// The process metadata, or `None` while propagation is disabled.
pub fn get() -> Option<&'static ProcessMeta> {
    PROCESS_META.get()
}

/// Whether propagation was enabled for this process.
pub fn initialized() -> bool {
    PROCESS_META.get().is_some()
}

/// IPv4 address of a named interface.
pub fn interface_ipv4(name: &str) -> Option<Ipv4Addr> {
    let addrs = nix::ifaddrs::getifaddrs().ok()?;
    for ifaddr in addrs {
        if ifaddr.interface_name != name {
            continue;
        }
        if let Some(ip) = ifaddr
            .address
            .as_ref()
            .and_then(|addr| addr.as_sockaddr_in())
            .map(|sin| Ipv4Addr::from(sin.ip()))
        {
            return Some(ip);
        }
    }
    None
}

/// First IPv4 address that is not loopback, across all interfaces.
pub fn first_non_loopback_ipv4() -> Option<Ipv4Addr> {
    let addrs = nix::ifaddrs::getifaddrs().ok()?;
    for ifaddr in addrs {
        if let Some(ip) = ifaddr
            .address
            .as_ref()
            .and_then(|addr| addr.as_sockaddr_in())
            .map(|sin| Ipv4Addr::from(sin.ip()))
        {
            if !ip.is_loopback() {
                return Some(ip);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_ip_numeric_form() {
        let meta = ProcessMeta::with_ip(Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(meta.comm_ip, 0xc0a8_010a);
        assert_eq!(meta.pid, unsafe { libc::getpid() });
    }

    #[test]
    fn test_caller_identity_mirrors_meta() {
        let meta = ProcessMeta::with_ip(Ipv4Addr::new(10, 0, 0, 7));
        let identity = meta.caller_identity();
        assert_eq!(identity.source_ip, meta.comm_ip);
        assert_eq!(identity.process_id, meta.pid);
        assert_eq!(identity.source_ipv4(), meta.ipv4);
    }

    #[test]
    fn test_discovery_skips_loopback() {
        // No interface is guaranteed in CI; only the loopback filter is.
        if let Some(ip) = first_non_loopback_ipv4() {
            assert!(!ip.is_loopback());
        }
    }

    #[test]
    fn test_unknown_interface_is_none() {
        assert_eq!(interface_ipv4("callsight-does-not-exist0"), None);
    }
}

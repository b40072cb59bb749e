use crate::ping_error::{PingError, PingErrorKind};
use std::net::{IpAddr, Ipv4Addr};
use std::result::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Resolve `hostname` to its first IPv4 address. Dotted-quad input is returned without a lookup.
pub fn lookup_host_v4(hostname: &str) -> Result<Ipv4Addr, PingError> {
    if let Ok(ip) = hostname.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(hostname)
        .map_err(|e| PingError::new(PingErrorKind::Resolve, format!("{hostname}: {e}")))?;
    ips.into_iter()
        .find_map(|e| match e {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| PingError::new(PingErrorKind::Resolve, format!("could not resolve {hostname} to IPv4")))
}

// The shared statistics and report output stay usable after a panicking holder; every update
// leaves them consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

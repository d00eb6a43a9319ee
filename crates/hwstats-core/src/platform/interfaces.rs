//! Network interface enumeration.
//!
//! `getifaddrs` yields one record per (interface, address family). On macOS
//! the `AF_LINK` record carries the interface's byte counters in its
//! `if_data`; on Linux the counters come from `/proc/net/dev` instead.

use std::net::{Ipv4Addr, Ipv6Addr};

/// What a single interface record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceAddress {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Link-layer byte counters since boot.
    Link { tx_bytes: u64, rx_bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub address: InterfaceAddress,
}

pub trait InterfaceSource: Send + Sync {
    /// `None` when enumeration fails.
    fn interfaces(&self) -> Option<Vec<InterfaceRecord>>;
}

/// [`InterfaceSource`] backed by `getifaddrs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Option<Vec<InterfaceRecord>> {
        let records = getifaddrs_records()?;

        #[cfg(target_os = "linux")]
        let records = {
            let mut records = records;
            match std::fs::read_to_string("/proc/net/dev") {
                Ok(text) => records.extend(parse_proc_net_dev(&text)),
                Err(e) => log::warn!("cannot read /proc/net/dev: {e}"),
            }
            records
        };

        Some(records)
    }
}

/// No interfaces at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterfaces;

impl InterfaceSource for NoInterfaces {
    fn interfaces(&self) -> Option<Vec<InterfaceRecord>> {
        None
    }
}

#[cfg(unix)]
fn getifaddrs_records() -> Option<Vec<InterfaceRecord>> {
    use std::ffi::CStr;

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: getifaddrs writes a heap-allocated list head into `head`, which
    // is released with freeifaddrs below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        log::warn!("getifaddrs failed: {}", std::io::Error::last_os_error());
        return None;
    }

    let mut records = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: `cursor` is a node of the list returned by getifaddrs, which
        // stays valid until freeifaddrs.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        if entry.ifa_addr.is_null() || entry.ifa_name.is_null() {
            continue;
        }
        // SAFETY: ifa_name is a NUL-terminated string owned by the list.
        let name = unsafe { CStr::from_ptr(entry.ifa_name) }
            .to_string_lossy()
            .into_owned();
        // SAFETY: ifa_addr was checked non-null and points to a sockaddr
        // whose concrete layout is given by sa_family.
        let address = unsafe { decode_address(entry) };
        if let Some(address) = address {
            records.push(InterfaceRecord { name, address });
        }
    }

    // SAFETY: `head` came from a successful getifaddrs and is freed once.
    unsafe { libc::freeifaddrs(head) };
    Some(records)
}

#[cfg(not(unix))]
fn getifaddrs_records() -> Option<Vec<InterfaceRecord>> {
    None
}

/// # Safety
/// `entry.ifa_addr` must be non-null and point to a valid sockaddr.
#[cfg(unix)]
unsafe fn decode_address(entry: &libc::ifaddrs) -> Option<InterfaceAddress> {
    // SAFETY: guaranteed by the caller.
    let family = i32::from(unsafe { (*entry.ifa_addr).sa_family });
    match family {
        libc::AF_INET => {
            // SAFETY: AF_INET addresses are sockaddr_in.
            let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
            Some(InterfaceAddress::Ipv4(Ipv4Addr::from(u32::from_be(
                sin.sin_addr.s_addr,
            ))))
        }
        libc::AF_INET6 => {
            // SAFETY: AF_INET6 addresses are sockaddr_in6.
            let sin6 = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in6) };
            Some(InterfaceAddress::Ipv6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)))
        }
        #[cfg(target_os = "macos")]
        libc::AF_LINK => {
            if entry.ifa_data.is_null() {
                return None;
            }
            // SAFETY: for AF_LINK entries ifa_data points to the interface's
            // if_data statistics block.
            let data = unsafe { &*(entry.ifa_data as *const libc::if_data) };
            Some(InterfaceAddress::Link {
                tx_bytes: u64::from(data.ifi_obytes),
                rx_bytes: u64::from(data.ifi_ibytes),
            })
        }
        _ => None,
    }
}

/// Parse `/proc/net/dev` into link-counter records.
pub fn parse_proc_net_dev(text: &str) -> Vec<InterfaceRecord> {
    text.lines()
        .filter_map(|line| {
            let (name, counters) = line.split_once(':')?;
            let fields: Vec<u64> = counters
                .split_whitespace()
                .map(|f| f.parse().ok())
                .collect::<Option<_>>()?;
            // rx: bytes packets errs drop fifo frame compressed multicast
            // tx: bytes ...
            let rx_bytes = *fields.first()?;
            let tx_bytes = *fields.get(8)?;
            Some(InterfaceRecord {
                name: name.trim().to_string(),
                address: InterfaceAddress::Link { tx_bytes, rx_bytes },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  104892     812    0    0    0     0          0         0   104892     812    0    0    0     0       0          0
  eth0: 98237412   71234    0    3    0     0          0        12  5521330   40122    0    0    0     0       0          0
";

    #[test]
    fn proc_net_dev_counters() {
        let records = parse_proc_net_dev(PROC_NET_DEV);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "eth0");
        assert_eq!(
            records[1].address,
            InterfaceAddress::Link {
                tx_bytes: 5_521_330,
                rx_bytes: 98_237_412
            }
        );
    }

    #[test]
    fn proc_net_dev_skips_garbage() {
        assert!(parse_proc_net_dev("eth0: 1 2 three").is_empty());
        assert!(parse_proc_net_dev("eth0: 1 2").is_empty());
        assert!(parse_proc_net_dev("").is_empty());
    }

    #[test]
    #[cfg(unix)]
    #[ignore] // Requires a configured loopback interface
    fn enumerates_loopback() {
        let records = SystemInterfaces.interfaces().unwrap();
        assert!(records.iter().any(|r| matches!(
            r.address,
            InterfaceAddress::Ipv4(addr) if addr.is_loopback()
        )));
    }
}

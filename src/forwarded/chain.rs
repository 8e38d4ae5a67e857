//! Forwarded header chain resolution.
//!
//! Both `X-Forwarded-For` and `X-Forwarded-Port` carry a comma separated
//! list appended to by each proxy, oldest hop first. The first acceptable
//! entry, scanning left to right, wins. Entries that fail to parse are
//! skipped rather than treated as errors.

use std::net::IpAddr;

use crate::forwarded::classify::classify;

/// Return the first entry of an `X-Forwarded-For` chain that parses as an
/// address and classifies as public.
pub fn resolve_ip(header: &str) -> Option<IpAddr> {
    first_match(header, |token| {
        token
            .parse::<IpAddr>()
            .ok()
            .filter(|ip| classify(*ip).is_public())
    })
}

/// Return the first entry of an `X-Forwarded-Port` chain that is a valid,
/// non-zero port number.
pub fn resolve_port(header: &str) -> Option<u16> {
    first_match(header, |token| token.parse::<u16>().ok().filter(|port| *port != 0))
}

fn first_match<T>(header: &str, accept: impl Fn(&str) -> Option<T>) -> Option<T> {
    header
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .find_map(accept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(header: &str) -> Option<String> {
        resolve_ip(header).map(|ip| ip.to_string())
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(ip(""), None);
        assert_eq!(ip(" , ,"), None);
    }

    #[test]
    fn test_resolve_single() {
        assert_eq!(ip("127.0.0.1"), None);
        assert_eq!(ip("68.45.152.220"), Some("68.45.152.220".into()));
        assert_eq!(ip("102.3.2.1"), Some("102.3.2.1".into()));
        assert_eq!(
            ip("2604:2000:71a9:bf00:f178:a500:9a2d:670d"),
            Some("2604:2000:71a9:bf00:f178:a500:9a2d:670d".into())
        );
    }

    #[test]
    fn test_resolve_malformed() {
        assert_eq!(ip("invalid"), None);
        assert_eq!(ip("123#1#2#3"), None);
        assert_eq!(ip("1.2.3"), None);
        assert_eq!(ip("1.2.3.4.5"), None);
        assert_eq!(ip("300.1.1.1"), None);
        assert_eq!(ip("68.45.152.220:8080"), None);
    }

    #[test]
    fn test_resolve_multi() {
        assert_eq!(ip("12.13.14.15, 68.45.152.220"), Some("12.13.14.15".into()));
        assert_eq!(ip("192.168.110.162, 190.57.149.90"), Some("190.57.149.90".into()));
        assert_eq!(ip("192.168.110.162, invalid, 190.57.149.90"), Some("190.57.149.90".into()));
        assert_eq!(ip("192.168.110.162, 190.57.149.90, invalid"), Some("190.57.149.90".into()));
        assert_eq!(ip("192.168.110.162, 190.57.149.90, 123#1#2#3"), Some("190.57.149.90".into()));
        assert_eq!(ip("  fd00::1 ,2001:db8::5,1.1.1.1"), Some("2001:db8::5".into()));
    }

    #[test]
    fn test_resolve_all_private() {
        assert_eq!(ip("10.0.0.1, 192.168.1.1, 172.16.4.4, ::1"), None);
        assert_eq!(ip("invalid, 127.0.0.1"), None);
    }

    #[test]
    fn test_resolve_port() {
        assert_eq!(resolve_port(""), None);
        assert_eq!(resolve_port("443"), Some(443));
        assert_eq!(resolve_port(" 8080 , 443"), Some(8080));
        assert_eq!(resolve_port("http, 99999, 0, 8443"), Some(8443));
        assert_eq!(resolve_port("-1"), None);
        assert_eq!(resolve_port("65535"), Some(65535));
        assert_eq!(resolve_port("65536"), None);
    }
}

/// Prefix Cloudflare uses when it reports an IPv4 client over an IPv6 socket
const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Extracts the candidate address from a request path
///
/// The leading `/` is dropped, then bracket and port decoration is stripped:
/// `1.2.3.4:443` -> `1.2.3.4`, `[::1]:443` -> `::1`.
///
/// Unbracketed IPv6 literals are cut at their first colon, so callers must
/// bracket them. Returns `None` when nothing usable is left.
pub fn extract_address(path: &str) -> Option<String> {
    let path = path.strip_prefix('/').unwrap_or(path);

    let address = match path.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        Some((inside, _port)) => inside,
        None => {
            let head = path.split(']').next().unwrap_or_default();
            let head = head.strip_prefix('[').unwrap_or(head);
            head.split(':').next().unwrap_or_default()
        }
    };

    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// Outcome of comparing the tested address with the one the trace reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressComparison {
    pub equivalent: bool,
    /// Tested address when equivalent, raw reported value otherwise
    pub displayed_reported: String,
}

/// Compares addresses, treating `::ffff:a.b.c.d` as `a.b.c.d` when the tested
/// address was given in IPv4 form
pub fn compare_addresses(tested: &str, reported: &str) -> AddressComparison {
    let normalized = match reported.strip_prefix(IPV4_MAPPED_PREFIX) {
        Some(embedded) if !tested.contains(':') && embedded.contains('.') => embedded,
        _ => reported,
    };

    let equivalent = normalized == tested;
    let displayed_reported = if equivalent { tested } else { reported };

    AddressComparison {
        equivalent,
        displayed_reported: displayed_reported.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ipv4_is_unchanged() {
        for ip in ["1.2.3.4", "104.16.123.96", "0.0.0.0", "255.255.255.255"] {
            assert_eq!(extract_address(ip).as_deref(), Some(ip));
            assert_eq!(extract_address(&format!("/{}", ip)).as_deref(), Some(ip));
        }
    }

    #[test]
    fn test_ipv4_port_is_stripped() {
        assert_eq!(extract_address("/1.2.3.4:443").as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_bracketed_ipv6_is_unwrapped() {
        assert_eq!(extract_address("/[::1]:443").as_deref(), Some("::1"));
        assert_eq!(
            extract_address("[2606:4700::6810:7b60]").as_deref(),
            Some("2606:4700::6810:7b60")
        );
    }

    #[test]
    fn test_bracketed_ipv6_keeps_every_group() {
        assert_eq!(
            extract_address("/[2606:4700::1]:443").as_deref(),
            Some("2606:4700::1")
        );
        assert_eq!(
            extract_address("/[::ffff:1.2.3.4]").as_deref(),
            Some("::ffff:1.2.3.4")
        );
    }

    #[test]
    fn test_unbracketed_ipv6_is_truncated() {
        assert_eq!(extract_address("/2606:4700::1").as_deref(), Some("2606"));
    }

    #[test]
    fn test_empty_paths_yield_nothing() {
        assert_eq!(extract_address(""), None);
        assert_eq!(extract_address("/"), None);
        assert_eq!(extract_address("/:443"), None);
        assert_eq!(extract_address("/[]"), None);
    }

    #[test]
    fn test_mapped_ipv6_matches_ipv4() {
        let cmp = compare_addresses("1.2.3.4", "::ffff:1.2.3.4");
        assert!(cmp.equivalent);
        assert_eq!(cmp.displayed_reported, "1.2.3.4");
    }

    #[test]
    fn test_different_addresses_keep_reported_value() {
        let cmp = compare_addresses("1.2.3.4", "5.6.7.8");
        assert!(!cmp.equivalent);
        assert_eq!(cmp.displayed_reported, "5.6.7.8");

        let cmp = compare_addresses("1.2.3.4", "::ffff:5.6.7.8");
        assert!(!cmp.equivalent);
        assert_eq!(cmp.displayed_reported, "::ffff:5.6.7.8");
    }

    #[test]
    fn test_no_normalization_for_ipv6_candidate() {
        let cmp = compare_addresses("::1", "::ffff:1.2.3.4");
        assert!(!cmp.equivalent);
        assert_eq!(cmp.displayed_reported, "::ffff:1.2.3.4");
    }

    #[test]
    fn test_exact_ipv6_match() {
        let cmp = compare_addresses("2606:4700::1", "2606:4700::1");
        assert!(cmp.equivalent);
        assert_eq!(cmp.displayed_reported, "2606:4700::1");
    }
}

use indexmap::IndexMap;
use serde::Serialize;

/// Path of Cloudflare's diagnostic endpoint, served on every proxied zone
pub const TRACE_PATH: &str = "/cdn-cgi/trace";

/// Key/value pairs returned by `/cdn-cgi/trace`, in upstream line order
///
/// The body is plain text, one `key=value` pair per line:
///
/// ```text
/// fl=29f12
/// h=www.cloudflare.com
/// ip=203.0.113.7
/// colo=FRA
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraceRecord(IndexMap<String, String>);

impl TraceRecord {
    /// Parses a trace body. Never fails: lines without `=` are skipped, so a
    /// malformed body just produces an empty record.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .trim()
            .lines()
            .filter_map(|line| line.trim_end_matches('\r').split_once('='))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        TraceRecord(entries)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Client address as seen by the edge, if reported
    pub fn ip(&self) -> Option<&str> {
        self.get("ip").filter(|ip| !ip.is_empty())
    }

    /// Three-letter datacenter code (e.g. "FRA")
    pub fn colo(&self) -> Option<&str> {
        self.get("colo").filter(|colo| !colo.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_trace() {
        let record = TraceRecord::parse("ip=9.9.9.9\ncolo=ABC\n");
        assert_eq!(record.len(), 2);
        assert_eq!(record.ip(), Some("9.9.9.9"));
        assert_eq!(record.colo(), Some("ABC"));
    }

    #[test]
    fn test_parse_full_cloudflare_trace() {
        let body = "fl=29f12\r\nh=www.cloudflare.com\r\nip=2a01:4f8::1\r\nts=1718000000.123\r\n\
                    visit_scheme=https\r\nuag=Mozilla/5.0\r\ncolo=FRA\r\nsliver=none\r\n\
                    http=http/2\r\nloc=DE\r\ntls=TLSv1.3\r\nsni=plaintext\r\nwarp=off\r\n\
                    gateway=off\r\nrbi=off\r\nkex=X25519\r\n";
        let record = TraceRecord::parse(body);

        assert_eq!(record.len(), 16);
        assert_eq!(record.ip(), Some("2a01:4f8::1"));
        assert_eq!(record.get("h"), Some("www.cloudflare.com"));
        assert_eq!(record.get("kex"), Some("X25519"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let record = TraceRecord::parse("uag=curl/8.0 (a=b)\n");
        assert_eq!(record.get("uag"), Some("curl/8.0 (a=b)"));
    }

    #[test]
    fn test_malformed_bodies_yield_empty_record() {
        assert!(TraceRecord::parse("").is_empty());
        assert!(TraceRecord::parse("   \n\n").is_empty());
        assert!(TraceRecord::parse("<html><body>Not Found</body></html>").is_empty());
    }

    #[test]
    fn test_empty_ip_is_treated_as_missing() {
        let record = TraceRecord::parse("ip=\ncolo=\n");
        assert_eq!(record.len(), 2);
        assert_eq!(record.ip(), None);
        assert_eq!(record.colo(), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record = TraceRecord::parse("ip=1.2.3.4\ncolo=SJC");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"colo": "SJC", "ip": "1.2.3.4"}));
    }

    #[test]
    fn test_serialization_keeps_line_order() {
        let record = TraceRecord::parse("fl=1f\nip=1.2.3.4\ncolo=SJC\nh=a.com\n");
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"fl":"1f","ip":"1.2.3.4","colo":"SJC","h":"a.com"}"#
        );
    }

    #[test]
    fn test_duplicate_key_keeps_first_position_and_last_value() {
        let record = TraceRecord::parse("ip=1.1.1.1\ncolo=SJC\nip=2.2.2.2\n");
        assert_eq!(record.ip(), Some("2.2.2.2"));
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"ip":"2.2.2.2","colo":"SJC"}"#
        );
    }
}

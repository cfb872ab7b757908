use tracing::debug;

use super::core::RawRequest;

/// Trusted forwarded-protocol value that marks every request secure
pub const TRUSTED_SECURE_PROTOCOL: &str = "https";

/// De-facto proxy headers checked in order, with the value meaning "secure".
///
/// Values are compared case-sensitively.
pub const FORWARDED_PROTO_HEADERS: [(&str, &str); 4] = [
    ("x-forwarded-proto", "https"),
    ("x-forwarded-ssl", "on"),
    ("front-end-https", "on"),
    ("x-url-scheme", "https"),
];

/// Decide whether a request arrived over TLS.
///
/// `trusted_forwarded_proto` is the deployment's configured forwarded protocol
/// (see `AppConfig::x_forwarded_protocol`). When it is exactly `https` the
/// request headers are not consulted at all.
pub fn is_secure<R: RawRequest + ?Sized>(req: &R, trusted_forwarded_proto: Option<&str>) -> bool {
    if trusted_forwarded_proto == Some(TRUSTED_SECURE_PROTOCOL) {
        debug!("Request secure via trusted forwarded protocol");
        return true;
    }

    for (header, expected) in FORWARDED_PROTO_HEADERS {
        if req.header(header) == Some(expected) {
            debug!(header = header, "Request secure via forwarded header");
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ActionRequest;
    use http::Method;

    fn get() -> ActionRequest {
        ActionRequest::new(Method::GET, "/")
    }

    #[test]
    fn test_trusted_protocol_short_circuits() {
        let req = get().with_header("X-Forwarded-Proto", "http");
        assert!(is_secure(&req, Some("https")));
    }

    #[test]
    fn test_trusted_protocol_must_match_exactly() {
        assert!(!is_secure(&get(), Some("HTTPS")));
        assert!(!is_secure(&get(), Some("http")));
    }

    #[test]
    fn test_each_forwarded_header() {
        let cases = [
            ("X-Forwarded-Proto", "https"),
            ("X-Forwarded-Ssl", "on"),
            ("Front-End-Https", "on"),
            ("X-Url-Scheme", "https"),
        ];
        for (name, value) in cases {
            let req = get().with_header(name, value);
            assert!(is_secure(&req, None), "{name}: {value}");
        }
    }

    #[test]
    fn test_values_are_case_sensitive() {
        let req = get()
            .with_header("X-Forwarded-Proto", "HTTPS")
            .with_header("X-Forwarded-Ssl", "ON");
        assert!(!is_secure(&req, None));
    }

    #[test]
    fn test_later_header_matches_after_earlier_mismatch() {
        let req = get()
            .with_header("X-Forwarded-Proto", "http")
            .with_header("X-Url-Scheme", "https");
        assert!(is_secure(&req, Some("http")));
    }

    #[test]
    fn test_no_headers_is_insecure() {
        assert!(!is_secure(&get(), None));
    }
}

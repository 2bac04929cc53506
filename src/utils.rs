use std::net::IpAddr;

use axum::http::HeaderMap;

/// Extracts the client IP address from request headers.
///
/// Checks in order of priority:
/// 1. X-Forwarded-For (first IP in the chain, if present)
/// 2. X-Real-IP (single IP, if present)
/// 3. Falls back to the direct connection IP
///
/// X-Forwarded-For can be spoofed by clients; in production the reverse
/// proxy in front of the gateway must set these headers and strip inbound
/// ones from untrusted sources.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    // X-Forwarded-For can contain multiple IPs: "client, proxy1, proxy2"
    if let Some(forwarded_for) = headers.get("x-forwarded-for")
        && let Ok(forwarded_str) = forwarded_for.to_str()
        && let Some(ip) = parse_ip(forwarded_str.split(',').next().unwrap_or(""))
    {
        return ip.to_string();
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(real_ip_str) = real_ip.to_str()
        && let Some(ip) = parse_ip(real_ip_str)
    {
        return ip.to_string();
    }

    if let Some(ip) = direct_ip {
        return ip.to_string();
    }

    "unknown".to_string()
}

/// Accepts bare and bracketed forms ("2001:db8::1" and "[2001:db8::1]").
fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_for_takes_first_ip() {
        let headers = headers_with("x-forwarded-for", "203.0.113.9, 10.0.0.1, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None), "203.0.113.9");
    }

    #[test]
    fn test_forwarded_for_trims_whitespace() {
        let headers = headers_with("x-forwarded-for", "  203.0.113.9  ");
        assert_eq!(extract_client_ip(&headers, None), "203.0.113.9");
    }

    #[test]
    fn test_invalid_forwarded_for_falls_through_to_real_ip() {
        let mut headers = headers_with("x-forwarded-for", "not-an-ip");
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(extract_client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_real_ip_used_when_no_forwarded_for() {
        let headers = headers_with("x-real-ip", "198.51.100.4");
        assert_eq!(extract_client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_direct_ip_fallback() {
        let headers = HeaderMap::new();
        let direct = "192.0.2.33".parse::<IpAddr>().unwrap();
        assert_eq!(extract_client_ip(&headers, Some(direct)), "192.0.2.33");
    }

    #[test]
    fn test_unknown_when_nothing_available() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers, None), "unknown");
    }

    #[test]
    fn test_ipv6_accepted_bare_and_bracketed() {
        let headers = headers_with("x-forwarded-for", "2001:db8::1");
        assert_eq!(extract_client_ip(&headers, None), "2001:db8::1");

        let headers = headers_with("x-forwarded-for", "[2001:db8::1]");
        assert_eq!(extract_client_ip(&headers, None), "2001:db8::1");

        let direct = "::1".parse::<IpAddr>().unwrap();
        assert_eq!(extract_client_ip(&HeaderMap::new(), Some(direct)), "::1");
    }
}

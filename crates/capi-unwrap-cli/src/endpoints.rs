//! Known endpoints and query-string building.

use url::Url;

use crate::fetch::FetchResult;

/// Base URL of the obfuscated API.
pub const API_BASE: &str = "https://capi.coinglass.com";

/// Endpoints known to return envelopes, with a short description.
pub const KNOWN_ENDPOINTS: &[(&str, &str)] = &[
    ("/api/openInterest/v3/chart", "Open interest chart for a symbol"),
    ("/api/futures/home/statistics", "Futures home page statistics"),
    ("/api/derivative/exchange/list", "Derivative exchange list"),
    ("/api/home/v2/coinMarkets", "Coin market rankings"),
    ("/api/exchange/futures/pairInfo", "Futures pair info per exchange"),
    ("/api/spot/support/coin", "Supported spot coins"),
];

/// Build the request URL. A bare path is resolved against [`API_BASE`];
/// `params` are appended in order as query pairs.
pub fn build_url(target: &str, params: &[(String, String)]) -> FetchResult<Url> {
    let mut url = if target.starts_with('/') {
        Url::parse(API_BASE)?.join(target)?
    } else {
        Url::parse(target)?
    };

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Parse a `key=value` argument. The value may be empty.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_path_uses_api_base() {
        let url = build_url("/api/spot/support/coin", &[]).unwrap();
        assert_eq!(url.as_str(), "https://capi.coinglass.com/api/spot/support/coin");
    }

    #[test]
    fn test_params_appended_in_order() {
        let params = vec![
            ("symbol".to_string(), "BTC".to_string()),
            ("exchangeName".to_string(), String::new()),
            ("currency".to_string(), "USD".to_string()),
        ];
        let url = build_url("/api/openInterest/v3/chart", &params).unwrap();
        assert_eq!(url.query(), Some("symbol=BTC&exchangeName=&currency=USD"));
    }

    #[test]
    fn test_existing_query_kept() {
        let params = vec![("pageNum".to_string(), "1".to_string())];
        let url = build_url("https://example.com/x?ex=all", &params).unwrap();
        assert_eq!(url.query(), Some("ex=all&pageNum=1"));
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("a=b").unwrap(), ("a".into(), "b".into()));
        assert_eq!(parse_param("keyword=").unwrap(), ("keyword".into(), "".into()));
        assert!(parse_param("=x").is_err());
        assert!(parse_param("novalue").is_err());
    }
}

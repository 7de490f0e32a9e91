//! Builds a proxied stream URL: the API URL behind the proxy base, with the
//! access token and forwarded headers carried as query parameters.
//!
//! ```ignore
//! use patchstream::proxy_url::ProxyUrlConfig;
//!
//! let url = ProxyUrlConfig::new("https://api.example.com/prices", "tok")
//!     .with_header("Accept", "application/json")
//!     .build()?;
//! // https://streamdata.motwin.net/https://api.example.com/prices?X-Sd-Token=tok&X-Sd-Header=Accept:application%2Fjson
//! ```

use reqwest::Url;

pub const DEFAULT_PROXY_BASE: &str = "https://streamdata.motwin.net/";

pub const TOKEN_PARAM: &str = "X-Sd-Token";
pub const HEADER_PARAM: &str = "X-Sd-Header";

pub const ENV_API_URL: &str = "PATCHSTREAM_API_URL";
pub const ENV_TOKEN: &str = "PATCHSTREAM_TOKEN";
pub const ENV_PROXY_BASE: &str = "PATCHSTREAM_PROXY_BASE";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyUrlError {
    #[error("API URL is not an absolute URL: {url} ({message})")]
    InvalidApiUrl { url: String, message: String },

    #[error("Proxy token is missing")]
    MissingToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyUrlConfig {
    pub api_url: String,
    pub token: String,
    /// Forwarded headers, in insertion order
    pub headers: Vec<(String, String)>,
    pub proxy_base: String,
}

impl ProxyUrlConfig {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            headers: Vec::new(),
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
        }
    }

    /// Forward `name: value` to the upstream API.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_proxy_base(mut self, base: impl Into<String>) -> Self {
        self.proxy_base = base.into();
        self
    }

    /// Read API URL, token and proxy base from the environment.
    ///
    /// Returns `None` when neither the API URL nor the token is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL);
        let token = lookup(ENV_TOKEN);
        if api_url.is_none() && token.is_none() {
            return None;
        }

        let mut config = Self::new(api_url.unwrap_or_default(), token.unwrap_or_default());
        if let Some(base) = lookup(ENV_PROXY_BASE) {
            config.proxy_base = base;
        }
        Some(config)
    }

    /// Assemble the proxied URL.
    pub fn build(&self) -> Result<String, ProxyUrlError> {
        let parsed = Url::parse(&self.api_url).map_err(|e| ProxyUrlError::InvalidApiUrl {
            url: self.api_url.clone(),
            message: e.to_string(),
        })?;
        if self.token.is_empty() {
            return Err(ProxyUrlError::MissingToken);
        }

        let separator = match parsed.query() {
            Some(query) if !query.is_empty() => '&',
            _ => '?',
        };

        let mut url = format!(
            "{}{}{}{}={}",
            self.proxy_base,
            self.api_url,
            separator,
            TOKEN_PARAM,
            urlencoding::encode(&self.token)
        );
        for (name, value) in &self.headers {
            url.push_str(&format!(
                "&{}={}:{}",
                HEADER_PARAM,
                urlencoding::encode(name),
                urlencoding::encode(value)
            ));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_without_query() {
        let url = ProxyUrlConfig::new("http://stockmarket.streamdata.io/prices", "abc")
            .build()
            .unwrap();
        assert_eq!(
            url,
            "https://streamdata.motwin.net/http://stockmarket.streamdata.io/prices?X-Sd-Token=abc"
        );
    }

    #[test]
    fn test_build_with_query_uses_ampersand() {
        let url = ProxyUrlConfig::new("http://api.example.com/v1?limit=5", "abc")
            .build()
            .unwrap();
        assert!(url.ends_with("/v1?limit=5&X-Sd-Token=abc"));
    }

    #[test]
    fn test_empty_query_uses_question_mark() {
        let url = ProxyUrlConfig::new("http://api.example.com/v1?", "abc")
            .build()
            .unwrap();
        assert!(url.ends_with("/v1??X-Sd-Token=abc"));
    }

    #[test]
    fn test_headers_in_order_and_encoded() {
        let url = ProxyUrlConfig::new("http://api.example.com/v1", "a b")
            .with_header("Accept", "application/json")
            .with_header("X-Custom", "1")
            .with_proxy_base("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/http://api.example.com/v1?X-Sd-Token=a%20b\
             &X-Sd-Header=Accept:application%2Fjson&X-Sd-Header=X-Custom:1"
        );
    }

    #[test]
    fn test_relative_api_url_rejected() {
        let err = ProxyUrlConfig::new("/prices", "abc").build().unwrap_err();
        assert!(matches!(err, ProxyUrlError::InvalidApiUrl { .. }));
    }

    #[test]
    fn test_missing_token() {
        let err = ProxyUrlConfig::new("http://api.example.com", "").build().unwrap_err();
        assert_eq!(err, ProxyUrlError::MissingToken);
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://api.example.com"),
            (ENV_TOKEN, "t"),
            (ENV_PROXY_BASE, "http://proxy/"),
        ]
        .into_iter()
        .collect();
        let config = ProxyUrlConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_url, "http://api.example.com");
        assert_eq!(config.token, "t");
        assert_eq!(config.proxy_base, "http://proxy/");
    }

    #[test]
    fn test_from_lookup_unset() {
        assert!(ProxyUrlConfig::from_lookup(|_| None).is_none());
    }
}

//! Query-string based URL transformation.

use url::Url;

use crate::domain::entities::{Dimension, OutputFormat};
use crate::domain::ports::UrlTransformerPort;
use crate::infrastructure::config::TransformConfig;

/// Transforms URLs by setting query parameters, e.g.
/// `img/a.jpg?format=webp&quality=80&width=320&height=240`.
///
/// Existing parameters are preserved unless a stage overrides the same key.
/// With a non-empty host allow-list, URLs on other hosts (and relative URLs)
/// pass through untouched.
#[derive(Debug, Clone)]
pub struct QueryUrlTransformer {
    format_key: String,
    quality_key: String,
    width_key: String,
    height_key: String,
    hosts: Vec<String>,
}

impl QueryUrlTransformer {
    /// Creates a transformer from configuration.
    #[must_use]
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            format_key: config.format_param.clone(),
            quality_key: config.quality_param.clone(),
            width_key: config.width_param.clone(),
            height_key: config.height_param.clone(),
            hosts: config
                .hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Returns true if URLs on this host should be transformed.
    #[must_use]
    pub fn applies_to(&self, url: &str) -> bool {
        if self.hosts.is_empty() {
            return true;
        }

        let Some(host) = host_of(url) else {
            return false;
        };
        self.hosts
            .iter()
            .any(|allowed| host == *allowed || host.ends_with(&format!(".{allowed}")))
    }
}

impl UrlTransformerPort for QueryUrlTransformer {
    fn with_format(&self, url: &str, format: OutputFormat) -> String {
        if !self.applies_to(url) {
            return url.to_string();
        }
        set_query_param(url, &self.format_key, format.as_str())
    }

    fn with_quality(&self, url: &str, quality: u8) -> String {
        if !self.applies_to(url) {
            return url.to_string();
        }
        set_query_param(url, &self.quality_key, &quality.to_string())
    }

    fn with_dimension(&self, url: &str, dimension: Dimension) -> String {
        if !self.applies_to(url) {
            return url.to_string();
        }
        let url = set_query_param(url, &self.width_key, &dimension.width.to_string());
        set_query_param(&url, &self.height_key, &dimension.height.to_string())
    }
}

/// Sets `key=value` in the query of `url`, replacing any previous value for
/// the key and keeping the fragment in place.
#[must_use]
pub fn set_query_param(url: &str, key: &str, value: &str) -> String {
    let (without_fragment, fragment) = match url.find('#') {
        Some(idx) => (&url[..idx], Some(&url[idx + 1..])),
        None => (url, None),
    };

    let (base_url, existing_params) = match without_fragment.find('?') {
        Some(idx) => (&without_fragment[..idx], Some(&without_fragment[idx + 1..])),
        None => (without_fragment, None),
    };

    let mut params: Vec<String> = Vec::new();
    if let Some(existing) = existing_params {
        for param in existing.split('&') {
            let existing_key = param.split('=').next().unwrap_or("");
            if !param.is_empty() && existing_key != key {
                params.push(param.to_string());
            }
        }
    }
    params.push(format!("{key}={value}"));

    let mut result = format!("{}?{}", base_url, params.join("&"));
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}

/// Extracts the lowercased host of an absolute or protocol-relative URL.
/// IPv6 hosts keep their brackets.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) if url.starts_with("//") => {
            Url::parse(&format!("https:{url}")).ok()?
        }
        Err(_) => return None,
    };
    parsed.host_str().map(str::to_string)
}

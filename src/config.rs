//! Runtime Configuration
//!
//! Where the backend lives and which project is being edited.

use percent_encoding::percent_decode_str;

/// API base when `STRUCTURE_API_BASE` is not set at build time
const DEFAULT_API_BASE: &str = "/api";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    /// From the page's `?project=` query parameter
    pub project_id: Option<u32>,
}

impl AppConfig {
    /// Read configuration from the build environment and the current URL
    pub fn from_env() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::from_parts(option_env!("STRUCTURE_API_BASE"), &search)
    }

    pub fn from_parts(api_base: Option<&str>, search: &str) -> Self {
        let api_base = api_base
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .to_string();
        Self {
            api_base,
            project_id: project_id_from_query(search),
        }
    }
}

/// Extract `project` from a query string such as `?project=12&tab=2`
pub fn project_id_from_query(search: &str) -> Option<u32> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "project")
        .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_query() {
        assert_eq!(project_id_from_query("?project=12"), Some(12));
        assert_eq!(project_id_from_query("?tab=2&project=%2042"), Some(42));
        assert_eq!(project_id_from_query("?project=abc"), None);
        assert_eq!(project_id_from_query(""), None);
    }

    #[test]
    fn test_default_api_base() {
        let config = AppConfig::from_parts(Some("  "), "?project=3");
        assert_eq!(config.api_base, "/api");
        assert_eq!(config.project_id, Some(3));
        let config = AppConfig::from_parts(Some("https://backend.local/api"), "");
        assert_eq!(config.api_base, "https://backend.local/api");
    }
}

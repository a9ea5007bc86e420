//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    /// URL directory for per-post pages (`/post/<uid>/`)
    pub post_dir: String,
    /// URL directory for paginated listing pages (`/page/2/` ...)
    pub pagination_dir: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Listing
    /// Posts per listing page; also the page size requested from the CMS
    pub per_page: usize,

    // Date / Time format
    pub date_format: String,

    // CMS
    pub cms: CmsConfig,

    // Preview mode
    pub preview: PreviewConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Astra".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            post_dir: "post".to_string(),
            pagination_dir: "page".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            per_page: 20,

            date_format: "DD MMM YYYY".to_string(),

            cms: CmsConfig::default(),
            preview: PreviewConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Repository API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub api_url: String,
    /// Document type queried for posts
    pub document_type: String,
    /// Access token; prefer the environment variable over committing it here
    pub access_token: Option<String>,
    /// Environment variable consulted when `access_token` is unset
    pub token_env: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            document_type: "posts".to_string(),
            access_token: None,
            token_env: "CMS_ACCESS_TOKEN".to_string(),
        }
    }
}

impl CmsConfig {
    /// Resolve the access token from config or the environment
    pub fn resolve_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok())
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Where the exit-preview aside points
    pub exit_link: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            exit_link: "/api/exit-preview".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Astra");
        assert_eq!(config.per_page, 20);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.preview.exit_link, "/api/exit-preview");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
per_page: 5
cms:
  api_url: https://my-repo.cdn.prismic.io/api/v2
  document_type: articles
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 5);
        assert_eq!(config.cms.api_url, "https://my-repo.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.document_type, "articles");
    }

    #[test]
    fn test_token_falls_back_to_config_value() {
        let mut cms = CmsConfig::default();
        cms.token_env = "ASTRA_TEST_TOKEN_UNSET".to_string();
        assert_eq!(cms.resolve_token(), None);

        cms.access_token = Some("abc".to_string());
        assert_eq!(cms.resolve_token(), Some("abc".to_string()));
    }
}

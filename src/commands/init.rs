//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Blog
subtitle: ''
description: ''
author: John Doe
language: en
timezone: UTC

# URL
url: http://example.com
root: /

# Listing
per_page: 20

# Date format (Moment.js tokens)
date_format: DD MMM YYYY

# Headless CMS
cms:
  api_url: https://your-repo.cdn.prismic.io/api/v2
  document_type: posts
  # access_token: ''        # or export CMS_ACCESS_TOKEN
  token_env: CMS_ACCESS_TOKEN

# Preview mode
preview:
  exit_link: /api/exit-preview
"#;

const DEFAULT_STYLE: &str = r#"body {
  margin: 0 auto;
  max-width: 44rem;
  padding: 0 1rem;
  font-family: sans-serif;
  line-height: 1.6;
  color: #1a1a1a;
}

.post-card {
  display: block;
  margin: 2rem 0;
  text-decoration: none;
  color: inherit;
}

.info {
  display: flex;
  gap: 1rem;
  font-size: 0.875rem;
  color: #666;
}

.banner img {
  width: 100%;
}

.load-more {
  font-weight: bold;
}

.preview-exit a {
  display: inline-block;
  padding: 0.5rem 1rem;
  background: #1a1a1a;
  color: #fff;
  border-radius: 1rem;
}
"#;

/// Scaffold a new site directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("_config.yml already exists in {:?}", target_dir);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let css_dir = target_dir.join("static").join("css");
    fs::create_dir_all(&css_dir)?;
    fs::write(css_dir.join("style.css"), DEFAULT_STYLE)?;

    Ok(())
}

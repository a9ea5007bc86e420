//! Generator module - renders fetched posts with the built-in Tera templates

use anyhow::Result;
use std::fs;
use std::path::Path;
use tera::Context;
use walkdir::WalkDir;

use crate::cache::ChangeSet;
use crate::cms::richtext;
use crate::content::{reading_time, PostDetail};
use crate::helpers::{
    edited_note, encode_segment, format_date, html_escape, in_timezone, url_for,
};
use crate::templates::{
    NavLink, PaginationData, PostCard, PostView, SectionView, SiteData, TemplateRenderer,
};
use crate::Astra;

/// Static site generator using the embedded templates
pub struct Generator {
    astra: Astra,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(astra: &Astra) -> Result<Self> {
        Ok(Self {
            astra: astra.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[PostDetail], preview: bool) -> Result<()> {
        fs::create_dir_all(&self.astra.public_dir)?;

        self.copy_static_assets()?;
        self.generate_index_pages(posts, preview)?;

        for post in posts {
            self.generate_post_page(post, posts, preview)?;
        }

        Ok(())
    }

    /// Re-render only what a changeset marks dirty
    pub fn generate_incremental(
        &self,
        posts: &[PostDetail],
        changeset: &ChangeSet,
        preview: bool,
    ) -> Result<()> {
        if changeset.full_rebuild {
            return self.generate(posts, preview);
        }

        fs::create_dir_all(&self.astra.public_dir)?;

        for (uid, output_path) in &changeset.deleted_posts {
            let dir = self.astra.public_dir.join(output_path);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
                tracing::info!("Removed stale post {}", uid);
            }
        }

        // A changed post also appears in its neighbors' navigation links,
        // so those neighbors are re-rendered with it.
        let mut dirty = vec![false; posts.len()];
        for (i, post) in posts.iter().enumerate() {
            if changeset.changed_posts.contains(&post.uid) {
                dirty[i] = true;
                if i > 0 {
                    dirty[i - 1] = true;
                }
                if i + 1 < posts.len() {
                    dirty[i + 1] = true;
                }
            }
        }

        for (i, post) in posts.iter().enumerate() {
            if dirty[i] {
                self.generate_post_page(post, posts, preview)?;
            }
        }

        if changeset.rebuild_index {
            self.generate_index_pages(posts, preview)?;
        }

        Ok(())
    }

    /// Output path of a post page, relative to the public dir
    pub fn post_output_path(&self, uid: &str) -> String {
        format!("{}/{}", self.astra.config.post_dir, encode_segment(uid))
    }

    fn post_url(&self, uid: &str) -> String {
        url_for(
            &self.astra.config,
            &format!("{}/{}/", self.astra.config.post_dir, encode_segment(uid)),
        )
    }

    fn site_data(&self) -> SiteData {
        let config = &self.astra.config;
        SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            language: config.language.clone(),
        }
    }

    /// Create a base context with common variables
    fn base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("page_title", "");
        context.insert("preview", &preview);
        context.insert("exit_preview_url", &self.astra.config.preview.exit_link);
        context.insert(
            "current_year",
            &chrono::Utc::now().format("%Y").to_string(),
        );
        context
    }

    fn display_date(&self, date: &chrono::DateTime<chrono::Utc>) -> String {
        let config = &self.astra.config;
        format_date(
            &in_timezone(date, &config.timezone),
            &config.date_format,
            &config.language,
        )
    }

    fn post_card(&self, post: &PostDetail) -> PostCard {
        PostCard {
            url: self.post_url(&post.uid),
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date: post
                .first_publication_date
                .as_ref()
                .map(|d| self.display_date(d)),
        }
    }

    fn nav_link(&self, post: &PostDetail) -> NavLink {
        NavLink {
            title: html_escape(&post.title),
            url: self.post_url(&post.uid),
        }
    }

    fn post_view(&self, post: &PostDetail, all_posts: &[PostDetail]) -> PostView {
        let config = &self.astra.config;

        PostView {
            url: self.post_url(&post.uid),
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date: post
                .first_publication_date
                .as_ref()
                .map(|d| self.display_date(d)),
            edited: post.last_publication_date.as_ref().map(|d| {
                edited_note(
                    &in_timezone(d, &config.timezone),
                    &config.date_format,
                    &config.language,
                )
            }),
            banner_url: post.banner_url.clone(),
            reading_time: reading_time::estimate(&post.content),
            sections: post
                .content
                .iter()
                .map(|s| SectionView {
                    heading: html_escape(&s.heading),
                    body_html: richtext::as_html(&s.body),
                })
                .collect(),
            prev: post.prev(all_posts).map(|p| self.nav_link(p)),
            next: post.next(all_posts).map(|p| self.nav_link(p)),
        }
    }

    /// Generate listing pages with pagination
    fn generate_index_pages(&self, posts: &[PostDetail], preview: bool) -> Result<()> {
        let config = &self.astra.config;
        let per_page = config.per_page.max(1);
        let total_pages = posts.len().div_ceil(per_page).max(1);

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let cards: Vec<PostCard> = posts[start..end]
                .iter()
                .map(|p| self.post_card(p))
                .collect();

            let pagination = PaginationData {
                current: page_num,
                total: total_pages,
                newer_url: match page_num {
                    1 => None,
                    2 => Some(url_for(config, "")),
                    n => Some(url_for(
                        config,
                        &format!("{}/{}/", config.pagination_dir, n - 1),
                    )),
                },
                older_url: if page_num < total_pages {
                    Some(url_for(
                        config,
                        &format!("{}/{}/", config.pagination_dir, page_num + 1),
                    ))
                } else {
                    None
                },
            };

            let mut context = self.base_context(preview);
            context.insert("posts", &cards);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("index.html", &context)?;

            let output_path = if page_num == 1 {
                self.astra.public_dir.join("index.html")
            } else {
                self.astra
                    .public_dir
                    .join(&config.pagination_dir)
                    .join(page_num.to_string())
                    .join("index.html")
            };
            write_page(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(())
    }

    /// Generate a single post page
    fn generate_post_page(
        &self,
        post: &PostDetail,
        all_posts: &[PostDetail],
        preview: bool,
    ) -> Result<()> {
        let view = self.post_view(post, all_posts);

        let mut context = self.base_context(preview);
        context.insert("page_title", &view.title);
        context.insert("post", &view);

        let html = self.renderer.render("post.html", &context)?;

        let output_path = self
            .astra
            .public_dir
            .join(self.post_output_path(&post.uid))
            .join("index.html");
        write_page(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(())
    }

    /// Copy static assets (logo, css, ...) to the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.astra.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.astra.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, html).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}

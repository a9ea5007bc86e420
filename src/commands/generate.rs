//! Generate static files from CMS content

use anyhow::{Context as _, Result};

use crate::cache::{self, CacheDb, ChangeSet};
use crate::cms::{CmsClient, Document};
use crate::content::{Feed, PostDetail};
use crate::generator::Generator;
use crate::Astra;

/// Options for a generation pass
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Regenerate everything, ignoring the cache
    pub force: bool,
    /// Preview ref; set to render draft content
    pub preview_ref: Option<String>,
}

/// Fetch all posts and render the site.
///
/// Returns whether any output was (re)written. A fetch failure here is fatal
/// for the whole pass; nothing half-rendered is left behind.
pub async fn run(astra: &Astra, options: &GenerateOptions) -> Result<bool> {
    let start = std::time::Instant::now();
    let preview = options.preview_ref.is_some();

    let client = CmsClient::connect(&astra.config.cms, options.preview_ref.clone())
        .await
        .context("failed to connect to the CMS")?;

    let posts = fetch_posts(astra, &client).await?;
    tracing::info!("Fetched {} posts", posts.len());

    let config_hash = cache::hash_content(&serde_yaml::to_string(&astra.config)?);
    let current = hash_posts(&posts)?;

    let cached = CacheDb::load(&astra.base_dir);
    let changeset = if options.force || preview {
        ChangeSet::full_rebuild()
    } else {
        cache::detect_changes(&cached, config_hash, &current)
    };

    if !changeset.has_changes() {
        tracing::info!("No changes detected, skipping generation");
        return Ok(false);
    }
    tracing::info!("Changes detected: {}", changeset.summary());

    let generator = Generator::new(astra)?;
    if changeset.full_rebuild {
        generator.generate(&posts, preview)?;
    } else {
        generator.generate_incremental(&posts, &changeset, preview)?;
    }

    // a preview pass must not poison the cache used by normal builds
    if !preview {
        let entries: Vec<(String, u64, String)> = posts
            .iter()
            .zip(&current)
            .map(|(post, (_, hash))| {
                (
                    post.uid.clone(),
                    *hash,
                    generator.post_output_path(&post.uid),
                )
            })
            .collect();
        CacheDb::from_posts(config_hash, &entries).save(&astra.base_dir)?;
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(true)
}

/// Walk the whole listing, then fetch each post document by uid
async fn fetch_posts(astra: &Astra, client: &CmsClient) -> Result<Vec<PostDetail>> {
    let first = client.first_page(astra.config.per_page).await?;
    let mut feed = Feed::new(first);
    feed.load_all(client).await?;

    let mut posts = Vec::with_capacity(feed.posts().len());
    for summary in feed.posts() {
        tracing::debug!("Fetching post {}", summary.uid);
        let document: Document = client.get_by_uid(&summary.uid).await?;
        posts.push(PostDetail::from(document));
    }

    Ok(posts)
}

/// `(uid, content hash)` per post, in listing order
fn hash_posts(posts: &[PostDetail]) -> Result<Vec<(String, u64)>> {
    posts
        .iter()
        .map(|post| {
            let json = serde_json::to_string(post)?;
            Ok((post.uid.clone(), cache::hash_content(&json)))
        })
        .collect()
}

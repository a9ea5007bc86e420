//! List posts from the CMS

use anyhow::Result;

use crate::cms::CmsClient;
use crate::content::Feed;
use crate::helpers::{format_date, in_timezone};
use crate::Astra;

/// Print every post in the listing, newest first
pub async fn run(astra: &Astra) -> Result<()> {
    let client = CmsClient::connect(&astra.config.cms, None).await?;

    let mut feed = Feed::new(client.first_page(astra.config.per_page).await?);
    feed.load_all(&client).await?;

    let posts = feed.posts();
    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .first_publication_date
            .map(|d| {
                format_date(
                    &in_timezone(&d, &astra.config.timezone),
                    "YYYY-MM-DD",
                    &astra.config.language,
                )
            })
            .unwrap_or_else(|| "----------".to_string());
        println!("  {} - {} by {} [{}]", date, post.title, post.author, post.uid);
    }

    Ok(())
}

//! Normalized post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cms::document::Document;
use crate::cms::richtext::RichTextBlock;

/// A post as it appears in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Stable document identity
    pub uid: String,

    /// Publication timestamp; drafts may not have one
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

impl From<&Document> for PostSummary {
    fn from(doc: &Document) -> Self {
        Self {
            uid: doc.uid.clone().unwrap_or_else(|| doc.id.clone()),
            first_publication_date: doc.first_publication_date,
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
        }
    }
}

/// One titled section of a post body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// A fully fetched post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,

    pub first_publication_date: Option<DateTime<Utc>>,

    /// Last edit timestamp, shown as an "edited on" note
    pub last_publication_date: Option<DateTime<Utc>>,

    pub title: String,

    pub subtitle: String,

    pub author: String,

    /// Banner image shown above the post
    pub banner_url: Option<String>,

    /// Ordered sections of the post body
    pub content: Vec<Section>,
}

impl From<Document> for PostDetail {
    fn from(doc: Document) -> Self {
        Self {
            uid: doc.uid.unwrap_or(doc.id),
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
            banner_url: doc.data.banner.and_then(|b| b.url),
            content: doc
                .data
                .content
                .into_iter()
                .map(|s| Section {
                    heading: s.heading.unwrap_or_default(),
                    body: s.body,
                })
                .collect(),
        }
    }
}

impl PostDetail {
    /// The listing view of this post
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// The older neighbor in a newest-first listing
    pub fn prev<'a>(&self, posts: &'a [PostDetail]) -> Option<&'a PostDetail> {
        let pos = posts.iter().position(|p| p.uid == self.uid)?;
        posts.get(pos + 1)
    }

    /// The newer neighbor in a newest-first listing
    pub fn next<'a>(&self, posts: &'a [PostDetail]) -> Option<&'a PostDetail> {
        let pos = posts.iter().position(|p| p.uid == self.uid)?;
        if pos > 0 {
            posts.get(pos - 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(uid: &str) -> PostDetail {
        PostDetail {
            uid: uid.to_string(),
            first_publication_date: None,
            last_publication_date: None,
            title: format!("Post {}", uid),
            subtitle: String::new(),
            author: "Ana".to_string(),
            banner_url: None,
            content: Vec::new(),
        }
    }

    #[test]
    fn test_normalize_document() {
        let json = r#"{
            "id": "Yx1",
            "uid": "hello-world",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+00:00",
            "last_publication_date": null,
            "data": {
                "title": "Hello",
                "subtitle": "World",
                "author": "Ana",
                "banner": { "url": "https://images.example/b.png" },
                "content": [
                    { "heading": "Intro", "body": [{ "type": "paragraph", "text": "hi" }] },
                    { "body": [] }
                ]
            }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let post = PostDetail::from(doc);

        assert_eq!(post.uid, "hello-world");
        assert_eq!(post.banner_url.as_deref(), Some("https://images.example/b.png"));
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].heading, "Intro");
        // a section without a heading normalizes to an empty one
        assert_eq!(post.content[1].heading, "");
        assert!(post.last_publication_date.is_none());
    }

    #[test]
    fn test_document_without_uid_falls_back_to_id() {
        let json = r#"{ "id": "Yx2", "uid": null, "type": "posts" }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(PostDetail::from(doc).uid, "Yx2");
    }

    #[test]
    fn test_prev_next_are_positional() {
        // newest first
        let posts = vec![detail("c"), detail("b"), detail("a")];

        assert_eq!(posts[1].prev(&posts).map(|p| p.uid.as_str()), Some("a"));
        assert_eq!(posts[1].next(&posts).map(|p| p.uid.as_str()), Some("c"));

        // ends of the listing have no neighbor
        assert!(posts[0].next(&posts).is_none());
        assert!(posts[2].prev(&posts).is_none());
    }
}

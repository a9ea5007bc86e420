//! Wire-format documents returned by the CMS API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::richtext::RichTextBlock;

/// Repository metadata returned by the API root endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub refs: Vec<ApiRef>,
}

/// One queryable ref (master, release, or preview)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub token: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

/// One page of query results
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub results_per_page: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: usize,
    /// Complete URL of the following page; absent on the last page
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

/// A single CMS document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: DocumentData,
}

/// The post-shaped payload of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<Banner>,
    pub content: Vec<SectionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
}

/// A heading plus its rich-text body, as stored in the CMS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionData {
    pub heading: Option<String>,
    pub body: Vec<RichTextBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "total_results_size": 3,
            "total_pages": 3,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?ref=X&page=2",
            "prev_page": null,
            "results": [{
                "id": "Yx1",
                "uid": "first-post",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+00:00",
                "last_publication_date": "2021-03-16T10:00:00+00:00",
                "data": {
                    "title": "First post",
                    "subtitle": "It begins",
                    "author": "Ana",
                    "banner": { "url": "https://images.example/banner.png" },
                    "content": [{
                        "heading": "Intro",
                        "body": [{ "type": "paragraph", "text": "hello", "spans": [] }]
                    }]
                }
            }]
        }"#;

        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_pages, 3);
        assert!(response.next_page.is_some());

        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("first-post"));
        assert_eq!(doc.data.title, "First post");
        assert_eq!(doc.data.content[0].heading.as_deref(), Some("Intro"));
        assert_eq!(doc.data.content[0].body[0].text, "hello");
    }

    #[test]
    fn test_parse_last_page_without_cursor() {
        let json = r#"{ "results": [], "next_page": null }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.next_page.is_none());
        assert!(response.results.is_empty());
    }
}

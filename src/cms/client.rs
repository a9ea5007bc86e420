//! HTTP client for the headless CMS API

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::document::{Document, QueryResponse, Repository};
use crate::config::CmsConfig;
use crate::content::{PageFetcher, PostPage};

/// Errors from the CMS layer
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("CMS repository exposes no master ref")]
    NoMasterRef,

    #[error("no document with uid {0:?}")]
    NotFound(String),
}

/// Client for a Prismic-style repository.
///
/// Connected once from configuration and read-only afterwards. All queries
/// are scoped to the ref resolved at connect time: the repository's master
/// ref, or a preview ref when one was supplied.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    api_url: String,
    document_type: String,
    access_token: Option<String>,
    query_ref: String,
}

impl CmsClient {
    /// Resolve the repository ref and build a connected client
    pub async fn connect(
        config: &CmsConfig,
        preview_ref: Option<String>,
    ) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("astra-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api_url = config.api_url.trim_end_matches('/').to_string();
        let access_token = config.resolve_token();

        let query_ref = match preview_ref {
            Some(preview) => {
                tracing::debug!("Querying with preview ref");
                preview
            }
            None => {
                let repo: Repository =
                    get_json(&http, &api_url, &[], access_token.as_deref()).await?;
                repo.refs
                    .into_iter()
                    .find(|r| r.is_master)
                    .map(|r| r.token)
                    .ok_or(CmsError::NoMasterRef)?
            }
        };

        Ok(Self {
            http,
            api_url,
            document_type: config.document_type.clone(),
            access_token,
            query_ref,
        })
    }

    /// First page of the post listing, newest first
    pub async fn first_page(&self, page_size: usize) -> Result<PostPage, CmsError> {
        let response = self
            .search(&[
                ("q", type_predicate(&self.document_type)),
                (
                    "orderings",
                    "[document.first_publication_date desc]".to_string(),
                ),
                ("pageSize", page_size.to_string()),
            ])
            .await?;
        Ok(PostPage::from(response))
    }

    /// Fetch a single document by its uid
    pub async fn get_by_uid(&self, uid: &str) -> Result<Document, CmsError> {
        let mut response = self
            .search(&[
                ("q", uid_predicate(&self.document_type, uid)),
                ("pageSize", "1".to_string()),
            ])
            .await?;
        if response.results.is_empty() {
            return Err(CmsError::NotFound(uid.to_string()));
        }
        Ok(response.results.remove(0))
    }

    async fn search(&self, params: &[(&str, String)]) -> Result<QueryResponse, CmsError> {
        let url = format!("{}/documents/search", self.api_url);
        let mut query: Vec<(&str, String)> = vec![("ref", self.query_ref.clone())];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));
        get_json(&self.http, &url, &query, self.access_token.as_deref()).await
    }
}

impl PageFetcher for CmsClient {
    /// Follow a `next_page` cursor URL verbatim.
    ///
    /// Cursor URLs already carry the ref and any token the API handed out;
    /// the token is only topped up when absent.
    async fn fetch_page(&self, url: &str) -> Result<PostPage, CmsError> {
        let token = if url.contains("access_token=") {
            None
        } else {
            self.access_token.as_deref()
        };
        let response: QueryResponse = get_json(&self.http, url, &[], token).await?;
        Ok(PostPage::from(response))
    }
}

fn type_predicate(document_type: &str) -> String {
    format!("[[at(document.type,\"{}\")]]", document_type)
}

fn uid_predicate(document_type: &str, uid: &str) -> String {
    format!("[[at(my.{}.uid,\"{}\")]]", document_type, uid)
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    access_token: Option<&str>,
) -> Result<T, CmsError> {
    let mut request = http.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }
    if let Some(token) = access_token {
        request = request.query(&[("access_token", token)]);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(CmsError::Status {
            status: response.status(),
            url: url.to_string(),
        });
    }

    Ok(response.json().await?)
}

//! CMS module - HTTP client and wire formats for the headless CMS API

pub mod client;
pub mod document;
pub mod richtext;

pub use client::{CmsClient, CmsError};
pub use document::Document;

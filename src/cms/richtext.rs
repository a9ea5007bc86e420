//! Rich text - the CMS's structured document content
//!
//! Posts arrive as sequences of typed blocks (headings, paragraphs, lists)
//! with style spans over the text. This module flattens blocks to plain text
//! for word counting and renders them to HTML for the templates.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// One block of rich text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub spans: Vec<Span>,
    /// Image blocks carry a url instead of text
    pub url: Option<String>,
    pub alt: Option<String>,
}

impl RichTextBlock {
    /// A plain paragraph block
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// A style span over `[start, end)` in a block's text (char offsets)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Option<serde_json::Value>,
}

/// Flatten blocks to plain text, one line per block
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render blocks to HTML
///
/// Consecutive list-item blocks are grouped under a single `<ul>`/`<ol>`.
/// Spans are assumed non-overlapping, which holds for editor-produced
/// content.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match block.kind.as_str() {
            "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
                let level = &block.kind[7..8];
                html.push_str(&format!(
                    "<h{}>{}</h{}>",
                    level,
                    spanned_text(block),
                    level
                ));
            }
            "preformatted" => {
                html.push_str(&format!("<pre>{}</pre>", html_escape(&block.text)));
            }
            "image" => {
                let src = block.url.as_deref().unwrap_or("");
                let alt = block.alt.as_deref().unwrap_or("");
                html.push_str(&format!(
                    r#"<img src="{}" alt="{}">"#,
                    src,
                    html_escape(alt)
                ));
            }
            "list-item" | "o-list-item" => {
                html.push_str(&format!("<li>{}</li>", spanned_text(block)));
            }
            _ => {
                html.push_str(&format!("<p>{}</p>", spanned_text(block)));
            }
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

/// Escape a block's text and weave its style spans in as tags
fn spanned_text(block: &RichTextBlock) -> String {
    let mut opens: Vec<(usize, String)> = Vec::new();
    let mut closes: Vec<(usize, String)> = Vec::new();

    for span in &block.spans {
        let (open, close) = match span.kind.as_str() {
            "strong" => ("<strong>".to_string(), "</strong>"),
            "em" => ("<em>".to_string(), "</em>"),
            "hyperlink" => {
                let url = span
                    .data
                    .as_ref()
                    .and_then(|d| d.get("url"))
                    .and_then(|u| u.as_str())
                    .unwrap_or("#");
                (format!(r#"<a href="{}">"#, url), "</a>")
            }
            _ => continue,
        };
        opens.push((span.start, open));
        closes.push((span.end, close.to_string()));
    }

    let char_count = block.text.chars().count();
    let mut out = String::with_capacity(block.text.len());

    for (i, c) in block.text.chars().enumerate() {
        for (pos, tag) in &closes {
            if *pos == i {
                out.push_str(tag);
            }
        }
        for (pos, tag) in &opens {
            if *pos == i {
                out.push_str(tag);
            }
        }
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }

    for (pos, tag) in &closes {
        if *pos >= char_count {
            out.push_str(tag);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, text: &str) -> RichTextBlock {
        RichTextBlock {
            kind: kind.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let blocks = vec![block("paragraph", "hello"), block("paragraph", "world")];
        assert_eq!(as_text(&blocks), "hello\nworld");
    }

    #[test]
    fn test_as_html_paragraph_and_heading() {
        let blocks = vec![block("heading2", "Intro"), block("paragraph", "hello")];
        assert_eq!(as_html(&blocks), "<h2>Intro</h2><p>hello</p>");
    }

    #[test]
    fn test_as_html_groups_list_items() {
        let blocks = vec![
            block("list-item", "one"),
            block("list-item", "two"),
            block("paragraph", "after"),
        ];
        assert_eq!(
            as_html(&blocks),
            "<ul><li>one</li><li>two</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_as_html_applies_spans() {
        let mut b = block("paragraph", "hello world");
        b.spans.push(Span {
            start: 0,
            end: 5,
            kind: "strong".to_string(),
            data: None,
        });
        assert_eq!(as_html(&[b]), "<p><strong>hello</strong> world</p>");
    }

    #[test]
    fn test_as_html_escapes_text() {
        let blocks = vec![block("paragraph", "a < b")];
        assert_eq!(as_html(&blocks), "<p>a &lt; b</p>");
    }

    #[test]
    fn test_span_to_end_of_text() {
        let mut b = block("paragraph", "tail");
        b.spans.push(Span {
            start: 0,
            end: 4,
            kind: "em".to_string(),
            data: None,
        });
        assert_eq!(as_html(&[b]), "<p><em>tail</em></p>");
    }
}

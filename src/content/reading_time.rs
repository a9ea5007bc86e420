//! Estimated reading time
//!
//! The estimate is the sum of per-section estimates: each section's rich
//! text is stripped to plain words and divided by a fixed reading speed,
//! rounding up. Rounding happens per section, so every non-empty section
//! contributes at least a minute.

use lazy_static::lazy_static;
use regex::Regex;

use super::Section;
use crate::cms::richtext;

/// Assumed reading speed
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Estimated minutes to read the given sections
pub fn estimate(content: &[Section]) -> usize {
    content.iter().map(section_minutes).sum()
}

fn section_minutes(section: &Section) -> usize {
    let words = word_count(&richtext::as_text(&section.body));
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Count plain-text words, ignoring any markup embedded in the text
pub fn word_count(text: &str) -> usize {
    MARKUP.replace_all(text, " ").split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::richtext::RichTextBlock;

    fn section(text: &str) -> Section {
        Section {
            heading: String::new(),
            body: vec![RichTextBlock::paragraph(text)],
        }
    }

    fn words(n: usize) -> String {
        (1..=n)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_no_sections_read_in_zero_minutes() {
        assert_eq!(estimate(&[]), 0);
    }

    #[test]
    fn test_empty_section_contributes_nothing() {
        assert_eq!(estimate(&[section("")]), 0);
    }

    #[test]
    fn test_two_hundred_words_read_in_one_minute() {
        assert_eq!(estimate(&[section(&words(200))]), 1);
        assert_eq!(estimate(&[section(&words(201))]), 2);
    }

    // Rounding is per section: the same 200 words split across two sections
    // cost a minute each.
    #[test]
    fn test_minutes_round_up_per_section() {
        assert_eq!(estimate(&[section(&words(100)), section(&words(100))]), 2);
    }

    #[test]
    fn test_markup_is_not_counted() {
        assert_eq!(word_count("<p>hello</p> <p>world</p>"), 2);
        assert_eq!(estimate(&[section("<p>hello</p> <p>world</p>")]), 1);
    }

    #[test]
    fn test_counts_words_across_blocks_of_one_section() {
        let sec = Section {
            heading: "Intro".to_string(),
            body: vec![
                RichTextBlock::paragraph(&words(150)),
                RichTextBlock::paragraph(&words(60)),
            ],
        };
        // 210 words in one section round up once
        assert_eq!(estimate(&[sec]), 2);
    }
}

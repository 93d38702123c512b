//! Splitting extracted page text into reading units
//!
//! A reading unit is the amount of text handed to the speech backend in one
//! request: either one sentence or one whole page.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A sentence boundary: a run of terminal punctuation followed by
/// whitespace. This is a heuristic, not a sentence grammar; abbreviations
/// ("e.g. so") and spaced decimals mis-split, and that behavior is kept.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary regex"));

/// How page text is divided into reading units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// One unit per sentence
    Sentence,
    /// One unit per page
    Page,
}

impl SegmentMode {
    /// Parse a mode name as it appears in config and commands
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sentence" => Some(SegmentMode::Sentence),
            "page" => Some(SegmentMode::Page),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentMode::Sentence => "sentence",
            SegmentMode::Page => "page",
        }
    }
}

/// One indivisible piece of text queued for speech output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingUnit {
    /// Index into the owning sequence
    pub index: usize,

    /// Unit text; may be empty in Page mode (readers skip it silently)
    pub text: String,
}

impl ReadingUnit {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// True when there is nothing to speak
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split page texts into an ordered sequence of reading units
///
/// Sentence mode splits each page on the boundary heuristic and skips pages
/// with no text. Page mode yields exactly one trimmed unit per page, empty
/// pages included as empty-content units. Unit indices run sequentially
/// across the whole result.
pub fn segment(page_texts: &[&str], mode: SegmentMode) -> Vec<ReadingUnit> {
    let mut units = Vec::new();
    for text in page_texts {
        match mode {
            SegmentMode::Sentence => {
                for sentence in split_sentences(text) {
                    units.push(ReadingUnit::new(units.len(), sentence));
                }
            }
            SegmentMode::Page => {
                units.push(ReadingUnit::new(units.len(), text.trim().to_string()));
            }
        }
    }
    units
}

/// Split text on runs of `.`, `!` or `?` followed by whitespace
///
/// The punctuation run stays with the sentence; the whitespace is dropped.
/// A trailing fragment without terminal punctuation is still a sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // End of the punctuation run, before the matched whitespace
        let end = boundary.start() + boundary.as_str().trim_end().len();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_sentences() {
        let sentences = split_sentences("Hello world. This is a test! Is it working?");
        assert_eq!(
            sentences,
            vec!["Hello world.", "This is a test!", "Is it working?"]
        );
    }

    #[test]
    fn test_trailing_fragment_kept() {
        let sentences = split_sentences("Complete sentence. And a fragment");
        assert_eq!(sentences, vec!["Complete sentence.", "And a fragment"]);
    }

    #[test]
    fn test_punctuation_run_stays_together() {
        let sentences = split_sentences("Really?! Yes.");
        assert_eq!(sentences, vec!["Really?!", "Yes."]);
    }

    #[test]
    fn test_decimal_number_not_split() {
        // No whitespace after the dot, so no boundary
        let sentences = split_sentences("Pi is 3.14 roughly.");
        assert_eq!(sentences, vec!["Pi is 3.14 roughly."]);
    }

    #[test]
    fn test_abbreviation_mis_split_is_kept() {
        // Known limitation of the heuristic, preserved on purpose
        let sentences = split_sentences("See e.g. the manual.");
        assert_eq!(sentences, vec!["See e.g.", "the manual."]);
    }

    #[test]
    fn test_empty_page_sentence_mode() {
        let units = segment(&["", "   \n  "], SegmentMode::Sentence);
        assert!(units.is_empty());
    }

    #[test]
    fn test_empty_page_page_mode() {
        let units = segment(&[""], SegmentMode::Page);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "");
        assert!(units[0].is_blank());
    }

    #[test]
    fn test_indices_run_across_pages() {
        let units = segment(&["One. Two.", "Three."], SegmentMode::Sentence);
        let indices: Vec<usize> = units.iter().map(|u| u.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(units[2].text, "Three.");
    }

    #[test]
    fn test_page_mode_trims() {
        let units = segment(&["  first page \n", "second page"], SegmentMode::Page);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "first page");
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(SegmentMode::parse("Sentence"), Some(SegmentMode::Sentence));
        assert_eq!(SegmentMode::parse(" page "), Some(SegmentMode::Page));
        assert_eq!(SegmentMode::parse("word"), None);
    }
}

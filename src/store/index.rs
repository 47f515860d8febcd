//! Per-document full-text index with field-weighted scoring.
//!
//! Relevance is a weighted term-count over the indexed fields, title counting
//! highest, then abstract, keywords and content (10:5:3:1).

use std::collections::HashMap;

pub(crate) const WEIGHT_TITLE: u32 = 10;
pub(crate) const WEIGHT_ABSTRACT: u32 = 5;
pub(crate) const WEIGHT_KEYWORDS: u32 = 3;
pub(crate) const WEIGHT_CONTENT: u32 = 1;

/// Token counts per field: [title, abstract, keywords, content].
type FieldCounts = [u32; 4];

#[derive(Debug, Default, Clone)]
pub(crate) struct DocumentIndex {
    terms: HashMap<String, FieldCounts>,
}

impl DocumentIndex {
    pub(crate) fn build(
        title: &str,
        abstract_text: &str,
        keywords: &[String],
        content: &str,
    ) -> Self {
        let mut terms: HashMap<String, FieldCounts> = HashMap::new();
        let mut count = |text: &str, field: usize| {
            for token in tokenize(text) {
                terms.entry(token).or_default()[field] += 1;
            }
        };
        count(title, 0);
        count(abstract_text, 1);
        for keyword in keywords {
            count(keyword, 2);
        }
        count(content, 3);
        Self { terms }
    }

    /// Weighted relevance of this document for the given query terms.
    /// Zero means no field matched any term.
    pub(crate) fn score(&self, terms: &[String]) -> u32 {
        terms
            .iter()
            .filter_map(|term| self.terms.get(term))
            .map(|counts| {
                counts[0] * WEIGHT_TITLE
                    + counts[1] * WEIGHT_ABSTRACT
                    + counts[2] * WEIGHT_KEYWORDS
                    + counts[3] * WEIGHT_CONTENT
            })
            .sum()
    }
}

/// Lowercased alphanumeric tokens longer than two characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 2)
        .map(|word| word.to_string())
        .collect()
}

/// Query tokens, deduplicated so a repeated word cannot inflate relevance.
pub(crate) fn tokenize_query(query: &str) -> Vec<String> {
    let mut tokens = tokenize(query);
    tokens.sort();
    tokens.dedup();
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_drops_short_words_and_punctuation() {
        let tokens = tokenize("On the QED of a-b: quantum, fields!");
        assert_eq!(tokens, vec!["the", "qed", "quantum", "fields"]);
    }

    #[test]
    fn query_tokens_are_deduplicated() {
        let tokens = tokenize_query("quantum quantum fields");
        assert_eq!(tokens, vec!["fields", "quantum"]);
    }

    #[test]
    fn title_outweighs_all_other_fields() {
        let title_hit = DocumentIndex::build("quantum computing", "", &[], "");
        let everywhere_else = DocumentIndex::build(
            "other topic",
            "quantum",
            &["quantum".into()],
            "quantum",
        );
        let terms = vec!["quantum".to_string()];
        assert_eq!(title_hit.score(&terms), WEIGHT_TITLE);
        assert_eq!(
            everywhere_else.score(&terms),
            WEIGHT_ABSTRACT + WEIGHT_KEYWORDS + WEIGHT_CONTENT
        );
        assert!(title_hit.score(&terms) > everywhere_else.score(&terms));
    }

    #[test]
    fn unmatched_terms_score_zero() {
        let index = DocumentIndex::build("stellar formation", "", &[], "dust clouds");
        assert_eq!(index.score(&["quantum".to_string()]), 0);
    }
}

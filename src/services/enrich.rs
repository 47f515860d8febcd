//! Text enrichment pipeline.
//!
//! Derives semantic data (term frequencies, keywords, entities, readability,
//! related domains) from an article's content and persists it. Runs detached
//! after create; runs synchronously only for the explicit analyze operation.

use crate::errors::Result;
use crate::model::{Entity, SemanticData};
use crate::store::ArticleStore;
use chrono::Utc;
use regex_lite::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

const MAX_KEYWORDS: usize = 10;
const MAX_ENTITIES: usize = 10;

const STOPWORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "because", "been", "before", "being",
    "between", "both", "but", "can", "could", "did", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "her", "here", "him", "his",
    "how", "into", "its", "itself", "just", "more", "most", "not", "now", "off", "once", "only",
    "other", "our", "out", "over", "own", "same", "she", "should", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "too",
    "under", "until", "very", "was", "were", "what", "when", "where", "which", "while", "who",
    "why", "will", "with", "would", "you", "your",
];

/// Seed terms used to infer domains related to an article's vocabulary.
const DOMAIN_VOCABULARY: &[(&str, &[&str])] = &[
    (
        "computer-science",
        &["algorithm", "software", "computing", "network", "database", "compiler"],
    ),
    (
        "machine-learning",
        &["learning", "neural", "model", "training", "classifier", "gradient"],
    ),
    (
        "physics",
        &["quantum", "particle", "energy", "relativity", "photon", "entanglement"],
    ),
    (
        "biology",
        &["gene", "cell", "protein", "genome", "organism", "enzyme"],
    ),
    (
        "mathematics",
        &["theorem", "proof", "algebra", "topology", "manifold", "conjecture"],
    ),
    (
        "medicine",
        &["clinical", "patient", "treatment", "disease", "therapy", "diagnosis"],
    ),
];

/// Analyze article content into semantic data. Pure and deterministic apart
/// from the `analyzed_at` stamp.
pub fn analyze_text(content: &str, domain: &str) -> SemanticData {
    let term_frequency = term_frequency(content);
    let extracted_keywords = top_keywords(&term_frequency);
    let entities = extract_entities(content);
    let readability_score = readability(content);
    let related_domains = related_domains(&term_frequency, domain);

    SemanticData {
        term_frequency,
        extracted_keywords,
        entities,
        readability_score,
        related_domains,
        analyzed_at: Some(Utc::now()),
    }
}

fn term_frequency(content: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for word in content
        .to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
    {
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

fn top_keywords(term_frequency: &BTreeMap<String, u32>) -> Vec<String> {
    let mut terms: Vec<(&String, &u32)> = term_frequency.iter().collect();
    // Count descending, term ascending; BTreeMap iteration already yields
    // terms sorted, so the sort only has to be stable on the count.
    terms.sort_by(|a, b| b.1.cmp(a.1));
    terms
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(term, _)| term.clone())
        .collect()
}

fn extract_entities(content: &str) -> Vec<Entity> {
    // Capitalized multi-word phrases and acronyms.
    let pattern = Regex::new(r"[A-Z][a-z]+(?: [A-Z][a-z]+)+|[A-Z]{2,}")
        .expect("entity pattern is a valid regex");

    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut total = 0u32;
    for found in pattern.find_iter(content) {
        *counts.entry(found.as_str().to_string()).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }

    let mut entities: Vec<Entity> = counts
        .into_iter()
        .map(|(name, count)| {
            let kind = if name.contains(' ') { "topic" } else { "term" };
            Entity {
                name,
                kind: kind.to_string(),
                relevance: f64::from(count) / f64::from(total),
            }
        })
        .collect();
    entities.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    entities.truncate(MAX_ENTITIES);
    entities
}

/// Flesch reading ease, clamped to [0, 100].
fn readability(content: &str) -> f64 {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let sentences = content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let syllables: u32 = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = f64::from(syllables) / words.len() as f64;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    score.clamp(0.0, 100.0)
}

/// Vowel-group approximation; every word counts at least one syllable.
fn count_syllables(word: &str) -> u32 {
    let mut syllables = 0u32;
    let mut in_vowel_group = false;
    for c in word.to_lowercase().chars() {
        let is_vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !in_vowel_group {
            syllables += 1;
        }
        in_vowel_group = is_vowel;
    }
    syllables.max(1)
}

fn related_domains(term_frequency: &BTreeMap<String, u32>, own_domain: &str) -> Vec<String> {
    DOMAIN_VOCABULARY
        .iter()
        .filter(|(domain, seeds)| {
            *domain != own_domain && seeds.iter().any(|seed| term_frequency.contains_key(*seed))
        })
        .map(|(domain, _)| domain.to_string())
        .collect()
}

/// Runs the analysis against the store.
pub struct EnrichService {
    store: Arc<dyn ArticleStore>,
}

impl EnrichService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Analyze and persist. Last writer wins if two runs race; the stored
    /// document is always internally consistent because the store swaps the
    /// whole semantic block at once.
    pub async fn enrich(&self, id: Uuid) -> Result<crate::model::Article> {
        let article = self.store.get_by_id(id).await?;
        let data = analyze_text(&article.content, &article.domain);
        let updated = self.store.update_semantic_data(id, data).await?;
        metrics::counter!("article_enrichment_runs_total").increment(1);
        tracing::info!(article_id = %id, "article content enriched");
        Ok(updated)
    }

    /// Fire-and-forget enrichment for the create path. The create response
    /// never waits on this; failures are logged and counted only.
    pub fn enrich_detached(self: &Arc<Self>, id: Uuid) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service.enrich(id).await {
                metrics::counter!("article_enrichment_failures_total").increment(1);
                tracing::error!(article_id = %id, error = %err, "detached enrichment failed");
            }
        });
    }
}

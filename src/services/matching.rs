//! Fuzzy matching of sample labels against registered standard aliquots
//!
//! Export sheets carry free-typed sample labels (the `Sample Depth` column);
//! the database carries canonical aliquot names. Labels are matched by a
//! normalized similarity score on a 0-100 scale, and a candidate is accepted
//! only at or above the configured threshold. A threshold of 100 degrades to
//! case-insensitive exact matching, which is how analysis presence checks run.

use std::collections::BTreeMap;

use strsim::normalized_levenshtein;

/// Similarity score between two strings on a 0-100 scale, case-insensitive.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    normalized_levenshtein(&a, &b) * 100.0
}

/// Result of matching a set of labels against candidates.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// label → best-matching candidate (score >= threshold)
    pub matched: BTreeMap<String, String>,
    /// labels with no candidate at or above the threshold
    pub unmatched: Vec<String>,
}

impl MatchOutcome {
    pub fn all_matched(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Match each label to its best-scoring candidate.
///
/// Duplicate labels are collapsed first; label order in `unmatched` follows
/// first appearance. Ties pick the earliest candidate with the top score.
pub fn match_labels(labels: &[String], candidates: &[String], threshold: f64) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut seen: Vec<&str> = Vec::new();

    for label in labels {
        if seen.contains(&label.as_str()) {
            continue;
        }
        seen.push(label.as_str());

        let mut best: Option<(&String, f64)> = None;
        for candidate in candidates {
            let score = similarity_score(label, candidate);
            let better = match best {
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) if score >= threshold => {
                outcome.matched.insert(label.clone(), candidate.clone());
            }
            _ => outcome.unmatched.push(label.clone()),
        }
    }

    outcome
}

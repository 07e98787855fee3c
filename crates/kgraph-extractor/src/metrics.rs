//! Quality Metrics module
//!
//! Precision, recall and F1 of extracted triplets against a gold standard.
//! Matching is exact on subject, relation and object; duplicates count once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kgraph_core::Triplet;

/// Errors while reading a gold standard file
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GoldFormatError {
    #[error("Invalid gold triplet at line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}

/// Metrics for triplet extraction evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripletMetrics {
    /// Triplets found in both predicted and gold sets
    pub true_positives: usize,
    /// Predicted triplets absent from the gold set
    pub false_positives: usize,
    /// Gold triplets that were missed
    pub false_negatives: usize,
    /// Distinct gold triplets
    pub gold_total: usize,
    /// Distinct predicted triplets
    pub predicted_total: usize,
}

impl TripletMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl std::fmt::Display for TripletMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "precision {:.3}, recall {:.3}, f1 {:.3} (tp {}, fp {}, fn {})",
            self.precision(),
            self.recall(),
            self.f1_score(),
            self.true_positives,
            self.false_positives,
            self.false_negatives
        )
    }
}

/// Compare predicted triplets with the gold standard
pub fn evaluate(predicted: &[Triplet], gold: &[Triplet]) -> TripletMetrics {
    let predicted: HashSet<&Triplet> = predicted.iter().collect();
    let gold: HashSet<&Triplet> = gold.iter().collect();

    let true_positives = predicted.intersection(&gold).count();

    TripletMetrics {
        true_positives,
        false_positives: predicted.len() - true_positives,
        false_negatives: gold.len() - true_positives,
        gold_total: gold.len(),
        predicted_total: predicted.len(),
    }
}

/// Parse a tab-separated gold file: `subject<TAB>relation<TAB>object`.
///
/// The object column may be empty or omitted for degenerate triplets. Blank
/// lines and `#` comments are skipped.
pub fn parse_gold(input: &str) -> Result<Vec<Triplet>, GoldFormatError> {
    let mut triplets = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let invalid = |message: &str| GoldFormatError::InvalidLine {
            line: i + 1,
            message: message.to_string(),
        };

        let triplet = match fields.as_slice() {
            [subject, relation] => Triplet::degenerate(*subject, *relation),
            [subject, relation, object] => Triplet::new(*subject, *relation, *object),
            _ => return Err(invalid("expected 2 or 3 tab-separated columns")),
        };
        if triplet.subject.is_empty() || triplet.relation.is_empty() {
            return Err(invalid("subject and relation must not be empty"));
        }
        triplets.push(triplet);
    }

    Ok(triplets)
}

//! Dependency-tree triplet extraction
//!
//! Every verb-like token is a candidate predicate. Its subject comes from the
//! first subject child, falling back to the last subject seen in the
//! sentence; its object from the first object-like child, looking one level
//! below a prepositional modifier. Relative and clausal modifiers attached to
//! the subject or object are processed recursively with that phrase as the
//! clause's antecedent.

use std::collections::HashSet;

use tracing::debug;

use kgraph_core::{
    AnnotatedSentence, DegeneratePolicy, DepLabel, ExtractionConfig, ExtractionMode, KgError,
    Result, Token, Triplet,
};

use crate::adapter::{adapt, DependencyTree, SentenceShape};
use crate::TripletExtractor;

const RELATIVE_PRONOUNS: &[&str] = &["that", "which", "who", "whom", "whose"];

/// Triplets found under one predicate, plus every predicate visited
#[derive(Debug, Default)]
struct ClauseOutput {
    triplets: Vec<Triplet>,
    visited: Vec<usize>,
}

impl ClauseOutput {
    fn append(&mut self, other: ClauseOutput) {
        self.triplets.extend(other.triplets);
        self.visited.extend(other.visited);
    }
}

/// Extractor for dependency-parsed sentences
#[derive(Debug, Clone)]
pub struct DependencyExtractor {
    policy: DegeneratePolicy,
    resolve_relative_pronouns: bool,
}

impl Default for DependencyExtractor {
    fn default() -> Self {
        Self {
            policy: DegeneratePolicy::default(),
            resolve_relative_pronouns: true,
        }
    }
}

impl DependencyExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            policy: config.degenerate_policy,
            resolve_relative_pronouns: config.resolve_relative_pronouns,
        }
    }

    /// Set when an object-less triplet is emitted
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve `that`/`which`/`who` clause subjects to the antecedent
    pub fn with_relative_pronouns(mut self, resolve: bool) -> Self {
        self.resolve_relative_pronouns = resolve;
        self
    }

    /// Extract triplets from a validated tree.
    ///
    /// Predicates are visited in sentence order. Clause predicates are only
    /// reached through their antecedent; those whose antecedent never matched
    /// are processed afterwards, shallowest first, seeded with their head's
    /// phrase.
    pub fn extract_tree(&self, tree: &DependencyTree<'_>) -> Vec<Triplet> {
        let mut output = ClauseOutput::default();
        let mut running_subject: Option<&str> = None;

        for (idx, token) in tree.tokens().iter().enumerate() {
            if tree.has_label(idx, DepLabel::is_subject) && !self.is_clause_pronoun(tree, idx) {
                running_subject = Some(tree.phrase(idx));
            }
            if token.pos.is_verb_like() && !tree.has_label(idx, DepLabel::is_clause) {
                output.append(self.process_predicate(tree, idx, running_subject, false));
            }
        }

        let mut visited: HashSet<usize> = output.visited.iter().copied().collect();
        let mut orphans: Vec<usize> = (0..tree.len())
            .filter(|&idx| {
                tree.has_label(idx, DepLabel::is_clause) && tree.token(idx).pos.is_verb_like()
            })
            .collect();
        orphans.sort_by_key(|&idx| (tree.depth(idx), idx));

        for idx in orphans {
            if visited.contains(&idx) {
                continue;
            }
            let seed = tree.token(idx).head.map(|head| tree.phrase(head));
            debug!(sentence = tree.index(), predicate = idx, "clause without matched antecedent");
            let clause = self.process_predicate(tree, idx, seed, true);
            visited.extend(clause.visited.iter().copied());
            output.triplets.extend(clause.triplets);
        }

        output.triplets
    }

    /// Apply the predicate rules at `idx`.
    ///
    /// `fallback` is the running subject in a main clause and the antecedent
    /// inside a subordinate one.
    fn process_predicate(
        &self,
        tree: &DependencyTree<'_>,
        idx: usize,
        fallback: Option<&str>,
        in_clause: bool,
    ) -> ClauseOutput {
        let mut output = ClauseOutput {
            triplets: Vec::new(),
            visited: vec![idx],
        };
        let predicate = tree.token(idx);
        if !predicate.pos.is_verb_like() {
            return output;
        }
        let children = tree.children(idx);

        let mut subject = fallback.map(str::to_string);
        if let Some(&child) = children
            .iter()
            .find(|&&c| tree.has_label(c, DepLabel::is_subject))
        {
            let resolved = match fallback {
                Some(antecedent)
                    if in_clause
                        && self.resolve_relative_pronouns
                        && is_relative_pronoun(tree.token(child)) =>
                {
                    antecedent.to_string()
                }
                _ => tree.phrase(child).to_string(),
            };
            output.append(self.process_clauses(tree, child, &resolved));
            subject = Some(resolved);
        }

        let mut object = None;
        if let Some(&child) = children
            .iter()
            .find(|&&c| tree.has_label(c, DepLabel::is_object_candidate))
        {
            let source = if tree.has_label(child, |l| *l == DepLabel::PrepModifier) {
                tree.children(child)
                    .iter()
                    .copied()
                    .find(|&g| tree.has_label(g, DepLabel::is_nested_object))
                    .unwrap_or(child)
            } else {
                child
            };
            let phrase = tree.phrase(source);
            output.append(self.process_clauses(tree, source, phrase));
            object = Some(phrase);
        }

        let relation = predicate.text.as_str();
        let subject = subject.filter(|s| !s.trim().is_empty());
        match (subject, object) {
            (Some(subject), Some(object)) => {
                let triplet = Triplet::new(subject, relation, object);
                debug!(sentence = tree.index(), %triplet, "accepted triplet");
                output.triplets.push(triplet);
            }
            (Some(subject), None) if self.allows_degenerate(children) => {
                let triplet = Triplet::degenerate(subject, relation);
                debug!(sentence = tree.index(), %triplet, "accepted degenerate triplet");
                output.triplets.push(triplet);
            }
            (None, _) => {
                debug!(sentence = tree.index(), relation, "no subject for predicate");
            }
            (Some(_), None) => {
                debug!(sentence = tree.index(), relation, "no object for predicate");
            }
        }

        output
    }

    /// Recurse into clause dependents of `antecedent_idx`
    fn process_clauses(
        &self,
        tree: &DependencyTree<'_>,
        antecedent_idx: usize,
        antecedent: &str,
    ) -> ClauseOutput {
        let mut output = ClauseOutput::default();
        for &clause in tree.children(antecedent_idx) {
            if tree.has_label(clause, DepLabel::is_clause) {
                output.append(self.process_predicate(tree, clause, Some(antecedent), true));
            }
        }
        output
    }

    fn allows_degenerate(&self, children: &[usize]) -> bool {
        match self.policy {
            DegeneratePolicy::NoObject => true,
            DegeneratePolicy::Childless => children.is_empty(),
        }
    }

    /// A relative pronoun whose clause will be resolved to its antecedent
    fn is_clause_pronoun(&self, tree: &DependencyTree<'_>, idx: usize) -> bool {
        self.resolve_relative_pronouns
            && is_relative_pronoun(tree.token(idx))
            && tree
                .token(idx)
                .head
                .is_some_and(|head| tree.has_label(head, DepLabel::is_clause))
    }
}

fn is_relative_pronoun(token: &Token) -> bool {
    RELATIVE_PRONOUNS.contains(&token.lower.as_str())
}

impl TripletExtractor for DependencyExtractor {
    fn extract_sentence(&self, index: usize, sentence: &AnnotatedSentence) -> Result<Vec<Triplet>> {
        match adapt(sentence, index, ExtractionMode::Tree)? {
            SentenceShape::Tree(tree) => Ok(self.extract_tree(&tree)),
            SentenceShape::Flat(flat) if flat.tokens().is_empty() => Ok(Vec::new()),
            SentenceShape::Flat(_) => {
                Err(KgError::invalid(index, "sentence has no dependency tree"))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

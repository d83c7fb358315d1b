//! Knowledge fusion engine.
//!
//! Deduplicates, re-scores, and merges the three raw result sets into a
//! single ranked list. Scores are first normalized into `[0, 1]` per
//! source, candidates are grouped under a merge key, and every group's
//! final score is the weighted sum of its per-source normalized scores.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use trident_stores::{CandidateResult, Payload, SourceKind};

use crate::config::FusionWeights;
use crate::engine::SourceResults;
use crate::error::Result;

/// How candidates from different sources are recognized as the same
/// underlying entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKeyMode {
    /// The stores share an identifier space: merge on the native id.
    SharedId,

    /// The stores disagree on ids: merge on a content hash of the
    /// normalized primary text. A heuristic, not a guarantee; colliding
    /// native ids are logged so operators can spot bad merges.
    ContentHash,
}

/// One entry in the fused ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    /// Merge key: the native id in shared-id mode, a content hash otherwise.
    pub id: String,

    /// Weighted sum of normalized per-source scores.
    pub final_score: f32,

    /// Sources that produced a match for this id. Never empty.
    pub contributing_sources: BTreeSet<SourceKind>,

    /// Payload from the contributing source with the highest weighted
    /// contribution. Fields are never mixed across sources.
    pub payload: Payload,
}

/// The knowledge fusion engine.
#[derive(Debug, Clone)]
pub struct KnowledgeFusion {
    weights: FusionWeights,
    merge_key_mode: MergeKeyMode,
}

impl KnowledgeFusion {
    /// Create a fusion engine with the given weights.
    pub fn new(weights: FusionWeights) -> Self {
        Self {
            weights,
            merge_key_mode: MergeKeyMode::SharedId,
        }
    }

    /// Set the merge-key mode.
    pub fn with_merge_key_mode(mut self, mode: MergeKeyMode) -> Self {
        self.merge_key_mode = mode;
        self
    }

    /// Fuse the three result sets into one ranked list of at most
    /// `top_k` entries.
    ///
    /// Fails with `InvalidQuery` when the weights do not sum to 1.0.
    /// Empty input produces an empty output; `top_k` beyond the number
    /// of distinct merge keys returns everything available, no padding.
    pub fn fuse(&self, results: &SourceResults, top_k: usize) -> Result<Vec<FusedResult>> {
        self.weights.validate()?;

        let mut slots: HashMap<String, Slot> = HashMap::new();

        // Vector scores are already similarities in [0, 1]; graph and
        // document scores are min-max normalized across their batch.
        self.accumulate(&mut slots, &results.vector, &clamped(&results.vector));
        self.accumulate(&mut slots, &results.graph, &min_max(&results.graph));
        self.accumulate(&mut slots, &results.document, &min_max(&results.document));

        let mut fused: Vec<FusedResult> = slots
            .into_iter()
            .filter_map(|(id, slot)| slot.into_fused(id, &self.weights))
            .collect();

        fused.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.contributing_sources.len().cmp(&a.contributing_sources.len()))
                .then_with(|| best_priority(a).cmp(&best_priority(b)))
                .then_with(|| a.id.cmp(&b.id))
        });

        fused.truncate(top_k);

        debug!("fused {} results (top_k: {top_k})", fused.len());
        Ok(fused)
    }

    fn accumulate(
        &self,
        slots: &mut HashMap<String, Slot>,
        candidates: &[CandidateResult],
        normalized: &[f32],
    ) {
        for (candidate, &score) in candidates.iter().zip(normalized) {
            let key = self.merge_key(candidate);
            let slot = slots.entry(key.clone()).or_default();

            if self.merge_key_mode == MergeKeyMode::ContentHash
                && slot
                    .native_ids
                    .iter()
                    .any(|known| known != &candidate.id)
            {
                warn!(
                    "merge key {key} joins distinct native ids: {:?} + {:?}",
                    slot.native_ids, candidate.id
                );
            }
            slot.native_ids.insert(candidate.id.clone());

            slot.observe(candidate, score, &self.weights);
        }
    }

    fn merge_key(&self, candidate: &CandidateResult) -> String {
        match self.merge_key_mode {
            MergeKeyMode::SharedId => candidate.id.clone(),
            MergeKeyMode::ContentHash => {
                let text = normalize_text(candidate.payload.display_text());
                if text.is_empty() {
                    return candidate.id.clone();
                }
                let digest = Sha256::digest(text.as_bytes());
                format!("{digest:x}")
            }
        }
    }
}

impl Default for KnowledgeFusion {
    fn default() -> Self {
        Self::new(FusionWeights::default())
    }
}

/// Lowercase and collapse whitespace before hashing, so formatting
/// differences between sources do not defeat the merge.
fn normalize_text(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn best_priority(result: &FusedResult) -> u8 {
    result
        .contributing_sources
        .iter()
        .map(|kind| kind.priority())
        .min()
        .unwrap_or(u8::MAX)
}

/// Vector similarities are contractually in [0, 1] already; clamp to be
/// safe against a misbehaving index.
fn clamped(candidates: &[CandidateResult]) -> Vec<f32> {
    candidates
        .iter()
        .map(|c| c.raw_score.clamp(0.0, 1.0))
        .collect()
}

/// Min-max normalize a batch of raw scores into [0, 1]. A batch where
/// every score is equal (including a single result) normalizes to 1.0.
fn min_max(candidates: &[CandidateResult]) -> Vec<f32> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for c in candidates {
        min = min.min(c.raw_score);
        max = max.max(c.raw_score);
    }

    let range = max - min;
    if range <= f32::EPSILON {
        return vec![1.0; candidates.len()];
    }

    candidates
        .iter()
        .map(|c| (c.raw_score - min) / range)
        .collect()
}

/// Per-merge-key accumulator.
#[derive(Default)]
struct Slot {
    /// Best normalized score per source, indexed by source priority.
    scores: [Option<f32>; 3],

    /// Payload of the strongest contribution seen so far.
    payload: Option<(f32, u8, Payload)>,

    /// Native ids merged into this slot, for collision monitoring.
    native_ids: BTreeSet<String>,
}

impl Slot {
    fn observe(&mut self, candidate: &CandidateResult, normalized: f32, weights: &FusionWeights) {
        let idx = candidate.source_kind.priority() as usize;

        // The same source can return one entity twice (over-fetch); keep
        // its best score rather than double counting.
        let entry = &mut self.scores[idx];
        *entry = Some(entry.map_or(normalized, |existing| existing.max(normalized)));

        let contribution = normalized * weights.weight(candidate.source_kind);
        let priority = candidate.source_kind.priority();
        let stronger = match &self.payload {
            None => true,
            Some((best, best_prio, _)) => {
                contribution > *best || (contribution == *best && priority < *best_prio)
            }
        };
        if stronger {
            self.payload = Some((contribution, priority, candidate.payload.clone()));
        }
    }

    fn into_fused(self, id: String, weights: &FusionWeights) -> Option<FusedResult> {
        let kinds = [SourceKind::Vector, SourceKind::Graph, SourceKind::Document];

        let mut final_score = 0.0;
        let mut contributing = BTreeSet::new();
        for kind in kinds {
            if let Some(score) = self.scores[kind.priority() as usize] {
                final_score += score * weights.weight(kind);
                contributing.insert(kind);
            }
        }

        let (_, _, payload) = self.payload?;
        if contributing.is_empty() {
            return None;
        }

        Some(FusedResult {
            id,
            final_score,
            contributing_sources: contributing,
            payload,
        })
    }
}

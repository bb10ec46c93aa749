//! Reciprocal Rank Fusion (RRF) for combining ranked retrieval lists.

use std::collections::HashMap;

use support_core::{Chunk, ScoredChunk};

/// RRF smoothing constant (commonly 60).
/// Higher values discount low ranks less steeply.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// Fuse multiple ranked chunk lists using Reciprocal Rank Fusion.
///
/// RRF score = Σ 1 / (rank + k) over every list the chunk appears in,
/// with zero-based ranks. Chunk content is the identity key: the same text
/// retrieved by several sub-queries accumulates one combined score, and a
/// chunk appearing twice within one list is summed as well, not collapsed
/// to its best rank.
///
/// The output is sorted by descending score; ties are broken by the order
/// in which a content key was first encountered, so identical inputs always
/// produce identical output. The representative chunk for each key is the
/// first occurrence seen.
///
/// Empty input (no lists, or only empty lists) yields an empty result.
pub fn reciprocal_rank_fusion(ranked_lists: Vec<Vec<Chunk>>, k: f32) -> Vec<ScoredChunk> {
    // Score table keyed by content; entries stay in first-seen order so the
    // final sort never depends on map iteration order.
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<(f32, Chunk)> = Vec::new();

    for list in ranked_lists {
        for (rank, chunk) in list.into_iter().enumerate() {
            let score = 1.0 / (rank as f32 + k);
            match index.get(&chunk.content) {
                Some(&idx) => entries[idx].0 += score,
                None => {
                    index.insert(chunk.content.clone(), entries.len());
                    entries.push((score, chunk));
                }
            }
        }
    }

    let mut fused: Vec<(usize, f32, Chunk)> = entries
        .into_iter()
        .enumerate()
        .map(|(idx, (score, chunk))| (idx, score, chunk))
        .collect();

    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    fused
        .into_iter()
        .map(|(_, score, chunk)| ScoredChunk { chunk, score })
        .collect()
}

//! Entropy-based routing confidence.
//!
//! Confidence is a deterministic function of the embedding alone, plus an
//! explicit, capped context adjustment. The squared components are
//! renormalized into a probability distribution; its Shannon entropy,
//! normalized by the maximum `ln(dim)`, is inverted so that a
//! concentrated embedding scores near 1 and a flat one scores 0.

use apex_core::Embedding;

/// Additive confidence boost applied when the decision context names a
/// sector that the static store actually contains. The boosted value is
/// capped at 1.0.
pub const CONTEXT_BOOST: f64 = 0.05;

/// Confidence that the frame matches a known, well-cached situation,
/// in `[0, 1]`.
///
/// The all-zero embedding carries no information and scores 0.0. A
/// one-component embedding is degenerate: any non-zero value scores 1.0.
pub fn embedding_confidence(embedding: &Embedding) -> f64 {
    let components = embedding.components();
    let dim = components.len();

    let total: f64 = components.iter().map(|&c| f64::from(c) * f64::from(c)).sum();
    if total <= 0.0 {
        return 0.0;
    }
    if dim == 1 {
        return 1.0;
    }

    let mut entropy = 0.0;
    for &c in components {
        let p = f64::from(c) * f64::from(c) / total;
        if p > 0.0 {
            entropy -= p * p.ln();
        }
    }
    let max_entropy = (dim as f64).ln();
    (1.0 - entropy / max_entropy).clamp(0.0, 1.0)
}

/// Apply the context boost for a hint the static store resolves.
///
/// The adjustment is a flat [`CONTEXT_BOOST`], capped at 1.0; no boost is
/// applied for unknown or missing hints.
pub fn boosted(confidence: f64, hint_known: bool) -> f64 {
    if hint_known {
        (confidence + CONTEXT_BOOST).min(1.0)
    } else {
        confidence
    }
}

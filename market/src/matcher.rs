//! Fuzzy runner-name matcher.
//!
//! Two independently-scraped sources format competitor names
//! differently (barrier numbers, abbreviations), so exact keying would
//! drop most of the data. This is an intentionally approximate,
//! tunable scoring heuristic, not a formal string distance; the knobs
//! in `MatcherConfig` are configuration, and the whole scorer could be
//! swapped for an edit-distance or n-gram matcher without changing the
//! contract.

/// Tuning knobs for the matcher.
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Minimum normalized token-overlap score to accept a candidate.
    pub min_score: f64,
    /// Tokens this short or shorter are ignored when scoring.
    pub min_token_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            min_token_len: 2,
        }
    }
}

/// Find the candidate value best matching `target`, or `None`.
///
/// Candidates are an ordered slice so that score ties resolve to the
/// first-seen candidate (the scan uses strictly-greater comparison).
///
/// Order of attempts, first hit wins:
/// 1. exact equality,
/// 2. case-insensitive equality,
/// 3. token-overlap scoring: each whitespace token of `target` longer
///    than `min_token_len` contributes its length when it appears as a
///    substring of the candidate; the sum is normalized by the total
///    token length and accepted iff `>= min_score`.
///
/// `None` means "odds not yet available", not an error; callers must
/// not treat it as one.
pub fn find_best_match<'a, V>(
    target: &str,
    candidates: &'a [(String, V)],
    cfg: &MatcherConfig,
) -> Option<&'a V> {
    if let Some((_, v)) = candidates.iter().find(|(name, _)| name == target) {
        return Some(v);
    }

    let target_lower = target.to_lowercase();
    if let Some((_, v)) = candidates
        .iter()
        .find(|(name, _)| name.to_lowercase() == target_lower)
    {
        return Some(v);
    }

    let tokens: Vec<&str> = target_lower
        .split_whitespace()
        .filter(|t| t.len() > cfg.min_token_len)
        .collect();
    let total_len: usize = tokens.iter().map(|t| t.len()).sum();
    if total_len == 0 {
        return None;
    }

    let mut best: Option<&V> = None;
    let mut best_score = 0.0_f64;

    for (name, value) in candidates {
        let name_lower = name.to_lowercase();
        let overlap: usize = tokens
            .iter()
            .filter(|t| name_lower.contains(**t))
            .map(|t| t.len())
            .sum();

        let score = overlap as f64 / total_len as f64;
        if score > best_score {
            best_score = score;
            best = Some(value);
        }
    }

    if best_score >= cfg.min_score {
        best
    } else {
        tracing::debug!(target, best_score, "no candidate above match threshold");
        None
    }
}

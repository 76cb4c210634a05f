//! Context compression strategies applied after retrieval

use super::SearchHit;

/// Reduce retrieved hits to fit a token budget
pub trait ContextCompressor: Send + Sync {
    fn compress(&self, hits: Vec<SearchHit>, budget_tokens: usize) -> Vec<SearchHit>;

    fn name(&self) -> &'static str;
}

/// Returns hits unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ContextCompressor for PassThrough {
    fn compress(&self, hits: Vec<SearchHit>, _budget_tokens: usize) -> Vec<SearchHit> {
        hits
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Keeps leading hits while their approximate token count fits the budget.
/// The first hit is always kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBudget;

/// Rough token count of a hit: a quarter of its text length, at least one
pub fn approx_tokens(hit: &SearchHit) -> usize {
    let chars = hit
        .metadata
        .get("text")
        .map(|t| t.chars().count())
        .unwrap_or(0);
    (chars / 4).max(1)
}

impl ContextCompressor for TokenBudget {
    fn compress(&self, hits: Vec<SearchHit>, budget_tokens: usize) -> Vec<SearchHit> {
        let mut used = 0;
        let mut kept = Vec::with_capacity(hits.len());
        for hit in hits {
            let cost = approx_tokens(&hit);
            if !kept.is_empty() && used + cost > budget_tokens {
                break;
            }
            used += cost;
            kept.push(hit);
        }
        kept
    }

    fn name(&self) -> &'static str {
        "token-budget"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectors::Metadata;

    fn hit(id: &str, text_len: usize) -> SearchHit {
        let mut metadata = Metadata::new();
        metadata.insert("text".to_string(), "x".repeat(text_len));
        SearchHit {
            id: id.to_string(),
            score: 0.5,
            metadata,
            rank: 0,
        }
    }

    #[test]
    fn test_passthrough_unchanged() {
        let hits = vec![hit("a", 10), hit("b", 10)];
        assert_eq!(PassThrough.compress(hits.clone(), 0), hits);
    }

    #[test]
    fn test_budget_truncates() {
        let hits = vec![hit("a", 40), hit("b", 40), hit("c", 40)];
        let kept = TokenBudget.compress(hits, 20);
        let ids: Vec<_> = kept.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_budget_keeps_first_hit() {
        let kept = TokenBudget.compress(vec![hit("a", 4000)], 10);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_missing_text_costs_one() {
        let mut h = hit("a", 0);
        h.metadata.clear();
        assert_eq!(approx_tokens(&h), 1);
    }
}

//! Smart-mode rank tiers
//!
//! Relevance is an ordered table of positional string checks against the raw
//! name, not a tokenizer: six fixed tiers, first matching rule wins. The
//! tier scores are part of the wire contract.

/// Rank tier for a containment match, highest priority first.
///
/// Variant order doubles as sort order: deriving `Ord` makes the smart-mode
/// sort total and deterministic without comparing floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RankTier {
    /// Name equals the query exactly
    Exact,
    /// Name starts with the query followed by a space
    LeadingWord,
    /// Name contains the query as a whole word, spaces on both sides
    InnerWord,
    /// Name ends with the query
    Suffix,
    /// Name starts with the query, no trailing space required
    Prefix,
    /// Plain containment, the fallback tier
    Contains,
}

impl RankTier {
    /// Classify a candidate whose name is already known to contain the query.
    /// Both arguments must be lower-cased.
    pub fn classify(name: &str, query: &str) -> RankTier {
        if name == query {
            RankTier::Exact
        } else if name.starts_with(&format!("{} ", query)) {
            RankTier::LeadingWord
        } else if name.contains(&format!(" {} ", query)) {
            RankTier::InnerWord
        } else if name.ends_with(query) {
            RankTier::Suffix
        } else if name.starts_with(query) {
            RankTier::Prefix
        } else {
            RankTier::Contains
        }
    }

    /// The fixed relevance score carried on the wire
    pub fn score(self) -> f64 {
        match self {
            RankTier::Exact => 1.0,
            RankTier::LeadingWord => 0.9,
            RankTier::InnerWord => 0.8,
            RankTier::Suffix => 0.7,
            RankTier::Prefix => 0.6,
            RankTier::Contains => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        // the five positional patterns plus the containment fallback
        let cases = [
            ("abc", RankTier::Exact, 1.0),
            ("abc def", RankTier::LeadingWord, 0.9),
            ("xx abc yy", RankTier::InnerWord, 0.8),
            ("xyz abc", RankTier::Suffix, 0.7),
            ("xyzabc", RankTier::Suffix, 0.7),
            ("abcxyz", RankTier::Prefix, 0.6),
            ("zabcz", RankTier::Contains, 0.5),
        ];

        for (name, tier, score) in cases {
            let got = RankTier::classify(name, "abc");
            assert_eq!(got, tier, "name {:?}", name);
            assert_eq!(got.score(), score, "name {:?}", name);
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "abc abc" starts with "abc " even though it also ends with " abc"
        assert_eq!(RankTier::classify("abc abc", "abc"), RankTier::LeadingWord);
    }

    #[test]
    fn test_sort_order_matches_score_order() {
        let mut tiers = vec![
            RankTier::Contains,
            RankTier::Exact,
            RankTier::Prefix,
            RankTier::InnerWord,
        ];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![
                RankTier::Exact,
                RankTier::InnerWord,
                RankTier::Prefix,
                RankTier::Contains,
            ]
        );
    }
}

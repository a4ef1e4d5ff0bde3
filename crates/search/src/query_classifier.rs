use once_cell::sync::Lazy;
use regex::RegexSet;
use vana_protocol::{QueryClassification, QueryType, SearchSource};

const VANA_SPECIFIC_PATTERNS: &[&str] = &[
    r"\bvana\b",
    r"\bagents?\b",
    r"\btools?\b",
    r"\bcapabilit(?:y|ies)\b",
    r"\bfeatures?\b",
    r"\borchestrat",
    r"\bspecialists?\b",
    r"\bwhat\b.*\bvana\b",
    r"\bhow\b.*\bagents?\b.*\bwork",
];

const USER_CONTEXT_PATTERNS: &[&str] = &[
    r"\bprefer",
    r"\busual",
    r"\btypical",
    r"\blast time\b",
    r"\bremember",
    r"\bmy\b.*\bsettings?\b",
    r"\bmy\b.*\bchoices?\b",
    r"\bhow\b.*\bi\b.*\blike\b",
    r"\bwhat\b.*\bi\b.*\bprefer",
];

const CURRENT_INFO_PATTERNS: &[&str] = &[
    r"\bcurrent",
    r"\bnow\b",
    r"\btoday\b",
    r"\blatest\b",
    r"\brecent",
    r"\bweather\b",
    r"\bnews\b",
    r"\bprices?\b",
    r"\bstocks?\b",
    r"\btime\b",
    r"\bwhat\b.*\btime\b",
    r"\bwhat\b.*\bweather\b",
];

const TECHNICAL_PATTERNS: &[&str] = &[
    r"\bhow to\b",
    r"\bwhat is\b",
    r"\bexplain",
    r"\bimplement",
    r"\bcode\b",
    r"\balgorithms?\b",
    r"\bfunctions?\b",
    r"\bmethods?\b",
    r"\bpatterns?\b",
];

static VANA_SPECIFIC: Lazy<RegexSet> = Lazy::new(|| compile(VANA_SPECIFIC_PATTERNS));
static USER_CONTEXT: Lazy<RegexSet> = Lazy::new(|| compile(USER_CONTEXT_PATTERNS));
static CURRENT_INFO: Lazy<RegexSet> = Lazy::new(|| compile(CURRENT_INFO_PATTERNS));
static TECHNICAL: Lazy<RegexSet> = Lazy::new(|| compile(TECHNICAL_PATTERNS));

fn compile(patterns: &[&str]) -> RegexSet {
    RegexSet::new(patterns).expect("built-in query patterns are valid")
}

/// Routes a query to a tier order.
///
/// Pattern groups are checked in a fixed order and the first match wins:
/// vana-specific, user-context, current-info, technical. Anything else is `general`.
/// A query mentioning both VANA and something time-sensitive ("What's VANA's current
/// status?") is therefore vana-specific; the precedence is part of the routing contract.
pub struct QueryClassifier;

impl QueryClassifier {
    #[must_use]
    pub fn classify(query: &str) -> QueryClassification {
        let lowered = query.to_lowercase();
        let mut classification = QueryClassification::default();

        if VANA_SPECIFIC.is_match(&lowered) {
            // Answerable locally; web is never consulted.
            return QueryClassification {
                kind: QueryType::VanaSpecific,
                priority: vec![SearchSource::Memory, SearchSource::Vector],
                is_vana_specific: true,
                confidence: 0.9,
                ..classification
            };
        }

        if USER_CONTEXT.is_match(&lowered) {
            return QueryClassification {
                kind: QueryType::UserContext,
                priority: vec![SearchSource::Memory],
                is_user_context: true,
                confidence: 0.95,
                ..classification
            };
        }

        if CURRENT_INFO.is_match(&lowered) {
            // Vector content is assumed stale for time-sensitive questions.
            return QueryClassification {
                kind: QueryType::CurrentInfo,
                priority: vec![SearchSource::Memory, SearchSource::Web],
                requires_current: true,
                confidence: 0.85,
                ..classification
            };
        }

        if TECHNICAL.is_match(&lowered) {
            classification.kind = QueryType::Technical;
            classification.priority =
                vec![SearchSource::Memory, SearchSource::Vector, SearchSource::Web];
            classification.confidence = 0.8;
        }

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::QueryClassifier;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use vana_protocol::{QueryType, SearchSource};

    #[test]
    fn classify_vana_specific() {
        let c = QueryClassifier::classify("What is VANA's orchestrator?");
        assert_eq!(c.kind, QueryType::VanaSpecific);
        assert_eq!(c.priority, vec![SearchSource::Memory, SearchSource::Vector]);
        assert_eq!(c.confidence, 0.9);
        assert!(c.is_vana_specific);
        assert!(!c.requires_current);

        assert_eq!(
            QueryClassifier::classify("How do the agents work together?").kind,
            QueryType::VanaSpecific
        );
        assert_eq!(
            QueryClassifier::classify("list every specialist").kind,
            QueryType::VanaSpecific
        );
    }

    #[test]
    fn classify_user_context() {
        let c = QueryClassifier::classify("Which editor do I usually prefer?");
        assert_eq!(c.kind, QueryType::UserContext);
        assert_eq!(c.priority, vec![SearchSource::Memory]);
        assert_eq!(c.confidence, 0.95);
        assert!(c.is_user_context);

        assert_eq!(
            QueryClassifier::classify("what did we pick last time").kind,
            QueryType::UserContext
        );
        assert_eq!(
            QueryClassifier::classify("change my notification settings").kind,
            QueryType::UserContext
        );
    }

    #[test]
    fn classify_current_info() {
        let c = QueryClassifier::classify("What's the weather today?");
        assert_eq!(c.kind, QueryType::CurrentInfo);
        assert!(c.requires_current);
        assert_eq!(c.priority, vec![SearchSource::Memory, SearchSource::Web]);
        assert_eq!(c.confidence, 0.85);

        assert_eq!(
            QueryClassifier::classify("latest rust release notes").kind,
            QueryType::CurrentInfo
        );
    }

    #[test]
    fn classify_technical() {
        let c = QueryClassifier::classify("How do I implement quicksort?");
        assert_eq!(c.kind, QueryType::Technical);
        assert_eq!(
            c.priority,
            vec![SearchSource::Memory, SearchSource::Vector, SearchSource::Web]
        );
        assert_eq!(c.confidence, 0.8);
        assert!(!c.requires_current);
    }

    #[test]
    fn classify_general_by_default() {
        let c = QueryClassifier::classify("Summarize the quarterly report");
        assert_eq!(c.kind, QueryType::General);
        assert_eq!(
            c.priority,
            vec![SearchSource::Memory, SearchSource::Vector, SearchSource::Web]
        );
        assert_eq!(c.confidence, 0.7);

        assert_eq!(QueryClassifier::classify("").kind, QueryType::General);
    }

    #[test]
    fn word_boundaries_avoid_substring_hits() {
        // "know" must not trigger the "now" current-info pattern.
        assert_eq!(
            QueryClassifier::classify("I know the answer").kind,
            QueryType::General
        );
    }

    #[test]
    fn precedence_follows_group_order() {
        // Known ambiguity: a time-sensitive VANA question still routes as vana-specific.
        assert_eq!(
            QueryClassifier::classify("What's VANA's current status?").kind,
            QueryType::VanaSpecific
        );
        assert_eq!(
            QueryClassifier::classify("remember the latest news for me").kind,
            QueryType::UserContext
        );
        assert_eq!(
            QueryClassifier::classify("explain the current algorithm").kind,
            QueryType::CurrentInfo
        );
    }

    fn fragment() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "vana",
            "agent",
            "prefer",
            "remember",
            "today",
            "weather",
            "implement",
            "algorithm",
            "quarterly",
            "report",
            "penguins",
            "summary",
        ])
    }

    fn group_rank(word: &str) -> u8 {
        match word {
            "vana" | "agent" => 0,
            "prefer" | "remember" => 1,
            "today" | "weather" => 2,
            "implement" | "algorithm" => 3,
            _ => 4,
        }
    }

    proptest! {
        #[test]
        fn proptest_classification_is_deterministic(query in ".{0,80}") {
            prop_assert_eq!(
                QueryClassifier::classify(&query),
                QueryClassifier::classify(&query)
            );
        }

        #[test]
        fn proptest_highest_precedence_group_wins(
            words in prop::collection::vec(fragment(), 1..6)
        ) {
            let query = words.join(" ");
            let best = words.iter().map(|w| group_rank(w)).min().unwrap_or(4);
            let expected = match best {
                0 => QueryType::VanaSpecific,
                1 => QueryType::UserContext,
                2 => QueryType::CurrentInfo,
                3 => QueryType::Technical,
                _ => QueryType::General,
            };
            prop_assert_eq!(QueryClassifier::classify(&query).kind, expected);
        }

        #[test]
        fn proptest_priority_exclusions_hold(query in "[a-z ]{0,60}") {
            let c = QueryClassifier::classify(&query);
            match c.kind {
                QueryType::VanaSpecific => prop_assert!(!c.priority.contains(&SearchSource::Web)),
                QueryType::CurrentInfo => prop_assert!(!c.priority.contains(&SearchSource::Vector)),
                QueryType::UserContext => prop_assert_eq!(c.priority, vec![SearchSource::Memory]),
                _ => prop_assert_eq!(c.priority.len(), 3),
            }
        }
    }
}

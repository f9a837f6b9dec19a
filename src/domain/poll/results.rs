//! Kind-shaped aggregate result types.
//!
//! `PollResults` serializes to the broadcast wire payload
//! `{poll_id, question, type, results}`; `results` takes the shape of the
//! poll kind.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{OptionId, PollId};

use super::model::PollKind;

/// Aggregate view of a poll at some ledger length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResults {
    pub poll_id: PollId,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: PollKind,
    pub results: ResultsPayload,
    /// Number of ledger entries this view was computed from. Monotonic per
    /// poll, so consumers can discard anything older than what they hold.
    #[serde(skip)]
    pub version: u64,
}

/// Result payload, one variant per result shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultsPayload {
    Choice(ChoiceTally),
    WordCloud(WordCloudTally),
    Rating(RatingSummary),
    OpenText(Vec<String>),
}

/// Vote count for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub option_id: OptionId,
    pub text: String,
    pub votes: u64,
}

/// Per-option counts, in option order, zero-count options included.
///
/// Serializes as a JSON object `{option text: count}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceTally {
    pub entries: Vec<OptionCount>,
}

impl ChoiceTally {
    /// Count for an option text, if the option exists.
    pub fn count_for(&self, text: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.text == text).map(|e| e.votes)
    }
}

impl Serialize for ChoiceTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.text, &entry.votes)?;
        }
        map.end()
    }
}

/// Occurrence count per distinct trimmed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WordCloudTally(pub BTreeMap<String, u64>);

impl WordCloudTally {
    pub fn count_for(&self, word: &str) -> Option<u64> {
        self.0.get(word).copied()
    }
}

/// Mean rating and number of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tally(counts: &[(i64, &str, u64)]) -> ChoiceTally {
        ChoiceTally {
            entries: counts
                .iter()
                .map(|(id, text, votes)| OptionCount {
                    option_id: OptionId::new(*id),
                    text: text.to_string(),
                    votes: *votes,
                })
                .collect(),
        }
    }

    #[test]
    fn choice_tally_serializes_as_text_to_count_map() {
        let value = serde_json::to_value(tally(&[(1, "A", 2), (2, "B", 0)])).unwrap();
        assert_eq!(value, json!({"A": 2, "B": 0}));
    }

    #[test]
    fn count_for_unknown_option_is_none() {
        let t = tally(&[(1, "A", 2)]);
        assert_eq!(t.count_for("A"), Some(2));
        assert_eq!(t.count_for("Z"), None);
    }

    #[test]
    fn poll_results_wire_shape() {
        let results = PollResults {
            poll_id: PollId::new(5),
            question: "How was it?".into(),
            kind: PollKind::Rating,
            results: ResultsPayload::Rating(RatingSummary { average: 0.0, count: 0 }),
            version: 3,
        };
        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(
            value,
            json!({
                "poll_id": 5,
                "question": "How was it?",
                "type": "rating",
                "results": {"average": 0.0, "count": 0}
            })
        );
    }

    #[test]
    fn open_text_serializes_as_list() {
        let payload = ResultsPayload::OpenText(vec!["first".into(), "second".into()]);
        assert_eq!(serde_json::to_value(payload).unwrap(), json!(["first", "second"]));
    }
}

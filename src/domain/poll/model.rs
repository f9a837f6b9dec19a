//! Poll aggregate: question, kind, and (for option-bearing kinds) options.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{OptionId, PollId, Timestamp, UserId, ValidationError};

/// The closed set of poll kinds.
///
/// Wire names follow the established client protocol, so single-choice
/// polls travel as `multiple_choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
    #[serde(rename = "multiple_choice", alias = "single_choice")]
    SingleChoice,
    Quiz,
    Ranking,
    WordCloud,
    Rating,
    OpenText,
}

impl PollKind {
    pub const ALL: [PollKind; 6] = [
        PollKind::SingleChoice,
        PollKind::Quiz,
        PollKind::Ranking,
        PollKind::WordCloud,
        PollKind::Rating,
        PollKind::OpenText,
    ];

    /// Whether votes reference an option rather than carry a free-form value.
    pub fn is_option_bearing(&self) -> bool {
        match self {
            PollKind::SingleChoice | PollKind::Quiz | PollKind::Ranking => true,
            PollKind::WordCloud | PollKind::Rating | PollKind::OpenText => false,
        }
    }

    /// Stable string form, used for storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::SingleChoice => "multiple_choice",
            PollKind::Quiz => "quiz",
            PollKind::Ranking => "ranking",
            PollKind::WordCloud => "word_cloud",
            PollKind::Rating => "rating",
            PollKind::OpenText => "open_text",
        }
    }
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" | "single_choice" => Ok(PollKind::SingleChoice),
            "quiz" => Ok(PollKind::Quiz),
            "ranking" => Ok(PollKind::Ranking),
            "word_cloud" => Ok(PollKind::WordCloud),
            "rating" => Ok(PollKind::Rating),
            "open_text" => Ok(PollKind::OpenText),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown poll type '{}'", other),
            )),
        }
    }
}

/// A selectable choice. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
    #[serde(skip)]
    pub poll_id: PollId,
}

/// A poll as held by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub kind: PollKind,
    /// Ordered by ascending option id. Empty for free-form kinds.
    pub options: Vec<PollOption>,
    pub is_active: bool,
    pub created_by: Option<UserId>,
    pub created_at: Timestamp,
}

impl Poll {
    /// Finds an option owned by this poll.
    pub fn option(&self, id: OptionId) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// Limits applied when drafting a poll.
#[derive(Debug, Clone, Copy)]
pub struct PollLimits {
    pub max_options: usize,
    pub max_text_length: usize,
}

impl Default for PollLimits {
    fn default() -> Self {
        Self {
            max_options: 50,
            max_text_length: 255,
        }
    }
}

/// A validated poll that has not been assigned ids yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoll {
    pub question: String,
    pub kind: PollKind,
    pub option_texts: Vec<String>,
    pub created_by: Option<UserId>,
}

impl NewPoll {
    /// Validates and normalizes a poll draft.
    ///
    /// Free-form kinds drop any supplied options so the catalog invariant
    /// (options present iff option-bearing) always holds.
    pub fn draft(
        question: impl Into<String>,
        kind: PollKind,
        options: Vec<String>,
        created_by: Option<UserId>,
        limits: &PollLimits,
    ) -> Result<Self, ValidationError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        if question.chars().count() > limits.max_text_length {
            return Err(ValidationError::invalid_format(
                "question",
                format!("longer than {} characters", limits.max_text_length),
            ));
        }

        let option_texts = if kind.is_option_bearing() {
            normalize_options(options, limits)?
        } else {
            Vec::new()
        };

        Ok(Self {
            question,
            kind,
            option_texts,
            created_by,
        })
    }
}

fn normalize_options(
    options: Vec<String>,
    limits: &PollLimits,
) -> Result<Vec<String>, ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::empty_field("options"));
    }
    if options.len() > limits.max_options {
        return Err(ValidationError::invalid_format(
            "options",
            format!("at most {} options are allowed", limits.max_options),
        ));
    }

    let mut seen = HashSet::new();
    let mut texts = Vec::with_capacity(options.len());
    for text in options {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("options"));
        }
        if text.chars().count() > limits.max_text_length {
            return Err(ValidationError::invalid_format(
                "options",
                format!("option longer than {} characters", limits.max_text_length),
            ));
        }
        // Results are keyed by option text, so texts must be distinct.
        if !seen.insert(text.clone()) {
            return Err(ValidationError::invalid_format(
                "options",
                format!("duplicate option '{}'", text),
            ));
        }
        texts.push(text);
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: PollKind, options: &[&str]) -> Result<NewPoll, ValidationError> {
        NewPoll::draft(
            "Favourite colour?",
            kind,
            options.iter().map(|s| s.to_string()).collect(),
            None,
            &PollLimits::default(),
        )
    }

    #[test]
    fn kind_wire_names_round_trip() {
        for kind in PollKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<PollKind>().unwrap(), kind);
        }
    }

    #[test]
    fn single_choice_accepts_alias() {
        let kind: PollKind = serde_json::from_str("\"single_choice\"").unwrap();
        assert_eq!(kind, PollKind::SingleChoice);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("survey".parse::<PollKind>().is_err());
    }

    #[test]
    fn option_bearing_kinds() {
        assert!(PollKind::SingleChoice.is_option_bearing());
        assert!(PollKind::Quiz.is_option_bearing());
        assert!(PollKind::Ranking.is_option_bearing());
        assert!(!PollKind::WordCloud.is_option_bearing());
        assert!(!PollKind::Rating.is_option_bearing());
        assert!(!PollKind::OpenText.is_option_bearing());
    }

    #[test]
    fn draft_trims_question_and_options() {
        let poll = draft(PollKind::SingleChoice, &[" A ", "B"]).unwrap();
        assert_eq!(poll.question, "Favourite colour?");
        assert_eq!(poll.option_texts, vec!["A", "B"]);
    }

    #[test]
    fn draft_rejects_blank_question() {
        let err = NewPoll::draft("  ", PollKind::Rating, vec![], None, &PollLimits::default())
            .unwrap_err();
        assert_eq!(err.field(), "question");
    }

    #[test]
    fn option_bearing_draft_requires_options() {
        assert!(draft(PollKind::Quiz, &[]).is_err());
        assert!(draft(PollKind::Ranking, &["A", " "]).is_err());
    }

    #[test]
    fn draft_rejects_duplicate_option_text() {
        let err = draft(PollKind::SingleChoice, &["A", "A "]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn draft_rejects_too_many_options() {
        let limits = PollLimits {
            max_options: 2,
            ..PollLimits::default()
        };
        let result = NewPoll::draft(
            "Q",
            PollKind::SingleChoice,
            vec!["A".into(), "B".into(), "C".into()],
            None,
            &limits,
        );
        assert!(result.is_err());
    }

    #[test]
    fn free_form_draft_drops_options() {
        let poll = draft(PollKind::WordCloud, &["ignored"]).unwrap();
        assert!(poll.option_texts.is_empty());
    }
}

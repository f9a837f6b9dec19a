//! Pure results aggregation.
//!
//! `compute_results` is a function of the poll and the full list of its
//! votes in ledger order. It holds no state, so a cached view can always be
//! checked against a fresh recompute.

use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::OptionId;

use super::model::{Poll, PollKind};
use super::results::{
    ChoiceTally, OptionCount, PollResults, RatingSummary, ResultsPayload, WordCloudTally,
};
use super::vote::Vote;

/// Computes the kind-shaped aggregate for `poll` over `votes`.
pub fn compute_results(poll: &Poll, votes: &[Vote]) -> PollResults {
    let results = match poll.kind {
        PollKind::SingleChoice | PollKind::Quiz | PollKind::Ranking => {
            ResultsPayload::Choice(tally_options(poll, votes))
        }
        PollKind::WordCloud => ResultsPayload::WordCloud(tally_words(votes)),
        PollKind::Rating => ResultsPayload::Rating(summarize_ratings(votes)),
        PollKind::OpenText => ResultsPayload::OpenText(collect_texts(votes)),
    };

    PollResults {
        poll_id: poll.id,
        question: poll.question.clone(),
        kind: poll.kind,
        results,
        version: votes.len() as u64,
    }
}

fn tally_options(poll: &Poll, votes: &[Vote]) -> ChoiceTally {
    let mut counts: HashMap<OptionId, u64> = HashMap::new();
    for option_id in votes.iter().filter_map(Vote::option_id) {
        *counts.entry(option_id).or_insert(0) += 1;
    }

    let mut entries: Vec<OptionCount> = poll
        .options
        .iter()
        .map(|option| OptionCount {
            option_id: option.id,
            text: option.text.clone(),
            votes: counts.get(&option.id).copied().unwrap_or(0),
        })
        .collect();
    entries.sort_by_key(|e| e.option_id);

    ChoiceTally { entries }
}

fn tally_words(votes: &[Vote]) -> WordCloudTally {
    let mut words = BTreeMap::new();
    for word in votes.iter().filter_map(Vote::value).map(str::trim) {
        if word.is_empty() {
            continue;
        }
        *words.entry(word.to_string()).or_insert(0) += 1;
    }
    WordCloudTally(words)
}

fn summarize_ratings(votes: &[Vote]) -> RatingSummary {
    let ratings: Vec<i64> = votes
        .iter()
        .filter_map(Vote::value)
        .filter_map(|v| v.trim().parse().ok())
        .collect();

    if ratings.is_empty() {
        return RatingSummary::default();
    }

    let sum: i64 = ratings.iter().sum();
    RatingSummary {
        average: sum as f64 / ratings.len() as f64,
        count: ratings.len() as u64,
    }
}

fn collect_texts(votes: &[Vote]) -> Vec<String> {
    votes
        .iter()
        .filter_map(Vote::value)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect()
}

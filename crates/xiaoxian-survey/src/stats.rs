//! Aggregate statistics over survey responses.
//!
//! Every function here is a pure reduction over a borrowed slice of
//! responses. Empty input yields zeros and empty lists, never an error.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::{ScaleField, SurveyResponse};

/// Maximum score on the rating scale, used as the radar chart's full mark.
pub const FULL_MARK: u8 = 5;

/// A group label with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    /// Group label.
    pub name: String,
    /// Number of responses in the group.
    pub value: usize,
}

/// Count responses per key, in first-seen key order.
///
/// The counts always sum to `responses.len()`.
pub fn count_by<F>(responses: &[SurveyResponse], key: F) -> Vec<GroupCount>
where
    F: Fn(&SurveyResponse) -> &str,
{
    tally(responses.iter().map(key))
}

/// Count occurrences of each label, in first-seen order.
fn tally<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::new();
    for label in labels {
        match groups.iter_mut().find(|g| g.name == label) {
            Some(group) => group.value += 1,
            None => groups.push(GroupCount {
                name: label.to_string(),
                value: 1,
            }),
        }
    }
    groups
}

/// Mean of `fields` across all responses, rounded to one decimal place.
///
/// Returns `0.0` when there are no responses or no fields. Halves round up,
/// so a mean of 4.25 reports as 4.3.
#[must_use]
pub fn average(responses: &[SurveyResponse], fields: &[ScaleField]) -> f64 {
    let count = (responses.len() * fields.len()) as u64;
    if count == 0 {
        return 0.0;
    }
    let total: u64 = responses
        .iter()
        .flat_map(|r| fields.iter().map(move |&f| u64::from(r.rating(f).get())))
        .sum();
    // Round half up in integer tenths to avoid binary float ties
    let tenths = (20 * total + count) / (2 * count);
    #[allow(clippy::cast_precision_loss)]
    let tenths = tenths as f64;
    tenths / 10.0
}

/// One axis of the experience radar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    /// Axis label.
    pub subject: &'static str,
    /// Fields averaged for this axis.
    #[serde(skip)]
    pub fields: &'static [ScaleField],
}

/// The five experience dimensions, in radar order.
pub const DIMENSIONS: [Dimension; 5] = [
    Dimension {
        subject: "沉浸趣味",
        fields: &[ScaleField::C4Immersion, ScaleField::C5FunFactor],
    },
    Dimension {
        subject: "历史叙事",
        fields: &[ScaleField::D1PlotHook, ScaleField::D2HistorySense],
    },
    Dimension {
        subject: "情感共鸣",
        fields: &[ScaleField::E1Resonance, ScaleField::E2Empathy],
    },
    Dimension {
        subject: "价值认同",
        fields: &[ScaleField::E3Values],
    },
    Dimension {
        subject: "消费意愿",
        fields: &[ScaleField::F3BuyIntent],
    },
];

/// A dimension score ready for a radar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    /// Axis label.
    pub subject: &'static str,
    /// Mean score.
    pub score: f64,
    /// Maximum possible score.
    pub full_mark: u8,
}

/// Score every experience dimension.
#[must_use]
pub fn dimension_scores(responses: &[SurveyResponse]) -> Vec<DimensionScore> {
    DIMENSIONS
        .iter()
        .map(|dim| DimensionScore {
            subject: dim.subject,
            score: average(responses, dim.fields),
            full_mark: FULL_MARK,
        })
        .collect()
}

/// Count of each overall satisfaction rating, 1 through 5, zero-filled.
#[must_use]
pub fn satisfaction_distribution(responses: &[SurveyResponse]) -> Vec<GroupCount> {
    let mut buckets = [0usize; FULL_MARK as usize];
    for response in responses {
        let rating = response.rating(ScaleField::G1OverallSatisfaction).get();
        buckets[usize::from(rating) - 1] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .map(|(i, &value)| GroupCount {
            name: format!("{}分", i + 1),
            value,
        })
        .collect()
}

/// Offline activity tags by popularity, most chosen first.
///
/// Ties keep the order in which the tags were first seen.
#[must_use]
pub fn activity_ranking(responses: &[SurveyResponse]) -> Vec<GroupCount> {
    let mut ranking = tally(
        responses
            .iter()
            .flat_map(|r| r.answers().f4_offline_activities.iter().map(String::as_str)),
    );
    ranking.sort_by(|a, b| b.value.cmp(&a.value));
    ranking
}

/// A recent respondent comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Respondent age group.
    pub age_group: String,
    /// Respondent identity, with the free text substituted for "其他".
    pub identity: String,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
    /// What the respondent liked.
    pub liked_point: String,
    /// What the respondent would improve.
    pub improvement_point: String,
}

/// The `limit` most recent comments, newest first.
#[must_use]
pub fn latest_comments(responses: &[SurveyResponse], limit: usize) -> Vec<Comment> {
    responses
        .iter()
        .rev()
        .take(limit)
        .map(|r| {
            let answers = r.answers();
            let identity = answers
                .identity_other
                .as_ref()
                .filter(|_| answers.identity == crate::questionnaire::OTHER_VALUE)
                .unwrap_or(&answers.identity)
                .clone();
            Comment {
                age_group: answers.age_group.clone(),
                identity,
                timestamp: r.timestamp(),
                liked_point: answers.g2_liked_point.clone(),
                improvement_point: answers.g3_improvement_point.clone(),
            }
        })
        .collect()
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    /// Total number of responses.
    pub total: usize,
    /// Average overall satisfaction (G1).
    pub satisfaction: f64,
    /// Average purchase intent (F3).
    pub buy_intent: f64,
    /// Average recommendation intent (E4).
    pub recommend: f64,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Headline numbers.
    pub headline: Headline,
    /// Experience radar.
    pub dimensions: Vec<DimensionScore>,
    /// Respondents per age group.
    pub age_distribution: Vec<GroupCount>,
    /// Overall satisfaction histogram.
    pub satisfaction_distribution: Vec<GroupCount>,
    /// Offline activity interest ranking.
    pub activity_ranking: Vec<GroupCount>,
    /// Most recent comments.
    pub latest_comments: Vec<Comment>,
}

impl Dashboard {
    /// Compute all dashboard statistics.
    #[must_use]
    pub fn from_responses(responses: &[SurveyResponse], comment_limit: usize) -> Self {
        Self {
            headline: Headline {
                total: responses.len(),
                satisfaction: average(responses, &[ScaleField::G1OverallSatisfaction]),
                buy_intent: average(responses, &[ScaleField::F3BuyIntent]),
                recommend: average(responses, &[ScaleField::E4Recommend]),
            },
            dimensions: dimension_scores(responses),
            age_distribution: count_by(responses, |r| r.answers().age_group.as_str()),
            satisfaction_distribution: satisfaction_distribution(responses),
            activity_ranking: activity_ranking(responses),
            latest_comments: latest_comments(responses, comment_limit),
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headline.total == 0
    }
}

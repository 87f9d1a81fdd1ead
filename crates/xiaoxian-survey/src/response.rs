//! Survey response records.
//!
//! A [`SurveyResponse`] is one completed questionnaire submission. Its JSON
//! form uses the questionnaire's wire keys (`ageGroup`, `c1_easyToPlay`, ...)
//! so that exported browser data loads unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::questionnaire::{self, OTHER_VALUE};

/// An agreement rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ScaleRating(u8);

impl ScaleRating {
    /// Lowest rating.
    pub const MIN: u8 = 1;
    /// Highest rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RatingOutOfRange`] for values outside the scale.
    pub fn new(value: u8) -> Result<Self> {
        Self::try_from(i64::from(value))
    }

    /// Create a rating, clamping `value` into 1-5.
    #[must_use]
    pub fn saturating(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// The rating as an integer.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ScaleRating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(Error::RatingOutOfRange(value)),
        }
    }
}

impl From<ScaleRating> for u8 {
    fn from(rating: ScaleRating) -> Self {
        rating.0
    }
}

impl fmt::Display for ScaleRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every scale-valued field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleField {
    /// B: interest in red-history topics and red tourism.
    RedInterest,
    /// C1: easy to pick up.
    C1EasyToPlay,
    /// C2: smooth interface.
    C2SmoothUi,
    /// C3: suitable play length.
    C3Duration,
    /// C4: immersed in the story.
    C4Immersion,
    /// C5: feels like play rather than a test.
    C5FunFactor,
    /// D1: the plot makes the player want to keep deducing.
    D1PlotHook,
    /// D2: senses the real events behind the story.
    D2HistorySense,
    /// D3: balance between fun and the solemn red theme.
    D3Balance,
    /// D4: more curious about the real history than before.
    D4Curiosity,
    /// E1: resonance with the characters.
    E1Resonance,
    /// E2: understands the choices people made then.
    E2Empathy,
    /// E3: agrees with the values conveyed.
    E3Values,
    /// E4: would recommend to others.
    E4Recommend,
    /// F1: wants to see the real exhibits at the venue.
    F1VisitIntent,
    /// F2: would complete offline check-in points.
    F2CheckinIntent,
    /// F3: urge to buy game merchandise.
    F3BuyIntent,
    /// G1: overall satisfaction.
    G1OverallSatisfaction,
}

impl ScaleField {
    /// All scale fields in questionnaire order.
    pub const ALL: [Self; 18] = [
        Self::RedInterest,
        Self::C1EasyToPlay,
        Self::C2SmoothUi,
        Self::C3Duration,
        Self::C4Immersion,
        Self::C5FunFactor,
        Self::D1PlotHook,
        Self::D2HistorySense,
        Self::D3Balance,
        Self::D4Curiosity,
        Self::E1Resonance,
        Self::E2Empathy,
        Self::E3Values,
        Self::E4Recommend,
        Self::F1VisitIntent,
        Self::F2CheckinIntent,
        Self::F3BuyIntent,
        Self::G1OverallSatisfaction,
    ];

    /// The wire key of this field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::RedInterest => "redInterest",
            Self::C1EasyToPlay => "c1_easyToPlay",
            Self::C2SmoothUi => "c2_smoothUI",
            Self::C3Duration => "c3_duration",
            Self::C4Immersion => "c4_immersion",
            Self::C5FunFactor => "c5_funFactor",
            Self::D1PlotHook => "d1_plotHook",
            Self::D2HistorySense => "d2_historySense",
            Self::D3Balance => "d3_balance",
            Self::D4Curiosity => "d4_curiosity",
            Self::E1Resonance => "e1_resonance",
            Self::E2Empathy => "e2_empathy",
            Self::E3Values => "e3_values",
            Self::E4Recommend => "e4_recommend",
            Self::F1VisitIntent => "f1_visitIntent",
            Self::F2CheckinIntent => "f2_checkinIntent",
            Self::F3BuyIntent => "f3_buyIntent",
            Self::G1OverallSatisfaction => "g1_overallSatisfaction",
        }
    }

    /// Read this field from a set of answers.
    #[must_use]
    pub fn value(self, answers: &SurveyAnswers) -> ScaleRating {
        match self {
            Self::RedInterest => answers.red_interest,
            Self::C1EasyToPlay => answers.c1_easy_to_play,
            Self::C2SmoothUi => answers.c2_smooth_ui,
            Self::C3Duration => answers.c3_duration,
            Self::C4Immersion => answers.c4_immersion,
            Self::C5FunFactor => answers.c5_fun_factor,
            Self::D1PlotHook => answers.d1_plot_hook,
            Self::D2HistorySense => answers.d2_history_sense,
            Self::D3Balance => answers.d3_balance,
            Self::D4Curiosity => answers.d4_curiosity,
            Self::E1Resonance => answers.e1_resonance,
            Self::E2Empathy => answers.e2_empathy,
            Self::E3Values => answers.e3_values,
            Self::E4Recommend => answers.e4_recommend,
            Self::F1VisitIntent => answers.f1_visit_intent,
            Self::F2CheckinIntent => answers.f2_checkin_intent,
            Self::F3BuyIntent => answers.f3_buy_intent,
            Self::G1OverallSatisfaction => answers.g1_overall_satisfaction,
        }
    }
}

impl fmt::Display for ScaleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ScaleField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// The answers of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    // Section B
    /// Age bracket.
    #[serde(rename = "ageGroup")]
    pub age_group: String,
    /// Identity option, or [`OTHER_VALUE`].
    pub identity: String,
    /// Free-text identity when `identity` is [`OTHER_VALUE`].
    #[serde(rename = "identityOther", default, skip_serializing_if = "Option::is_none")]
    pub identity_other: Option<String>,
    /// Interest in red-history topics.
    #[serde(rename = "redInterest")]
    pub red_interest: ScaleRating,
    /// First scan-to-play experience at a venue, `是` or `否`.
    #[serde(rename = "firstTime")]
    pub first_time: String,

    // Section C
    /// Easy to pick up.
    #[serde(rename = "c1_easyToPlay")]
    pub c1_easy_to_play: ScaleRating,
    /// Smooth interface.
    #[serde(rename = "c2_smoothUI")]
    pub c2_smooth_ui: ScaleRating,
    /// Suitable play length.
    pub c3_duration: ScaleRating,
    /// Immersed in the story.
    pub c4_immersion: ScaleRating,
    /// Feels like play rather than a test.
    #[serde(rename = "c5_funFactor")]
    pub c5_fun_factor: ScaleRating,

    // Section D
    /// The plot makes the player want to keep deducing.
    #[serde(rename = "d1_plotHook")]
    pub d1_plot_hook: ScaleRating,
    /// Senses the real events behind the story.
    #[serde(rename = "d2_historySense")]
    pub d2_history_sense: ScaleRating,
    /// Balance between fun and the solemn red theme.
    pub d3_balance: ScaleRating,
    /// More curious about the real history than before.
    pub d4_curiosity: ScaleRating,

    // Section E
    /// Resonance with the characters.
    pub e1_resonance: ScaleRating,
    /// Understands the choices people made then.
    pub e2_empathy: ScaleRating,
    /// Agrees with the values conveyed.
    pub e3_values: ScaleRating,
    /// Would recommend to others.
    pub e4_recommend: ScaleRating,

    // Section F
    /// Wants to see the real exhibits at the venue.
    #[serde(rename = "f1_visitIntent")]
    pub f1_visit_intent: ScaleRating,
    /// Would complete offline check-in points.
    #[serde(rename = "f2_checkinIntent")]
    pub f2_checkin_intent: ScaleRating,
    /// Urge to buy game merchandise.
    #[serde(rename = "f3_buyIntent")]
    pub f3_buy_intent: ScaleRating,
    /// Offline activities of interest, in selection order.
    #[serde(rename = "f4_offlineActivities", default)]
    pub f4_offline_activities: Vec<String>,
    /// Free-text offline activity.
    #[serde(
        rename = "f4_offlineActivitiesOther",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub f4_offline_activities_other: Option<String>,

    // Section G
    /// Overall satisfaction.
    #[serde(rename = "g1_overallSatisfaction")]
    pub g1_overall_satisfaction: ScaleRating,
    /// What the player liked most.
    #[serde(rename = "g2_likedPoint", default)]
    pub g2_liked_point: String,
    /// What should improve.
    #[serde(rename = "g3_improvementPoint", default)]
    pub g3_improvement_point: String,
    /// Content wanted in future.
    #[serde(rename = "g4_futureContent", default)]
    pub g4_future_content: String,
}

impl SurveyAnswers {
    /// Check categorical answers against the questionnaire vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAnswer`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_choice("ageGroup", &self.age_group, None)?;
        check_choice("identity", &self.identity, self.identity_other.as_deref())?;
        check_choice("firstTime", &self.first_time, None)?;

        let mut seen = Vec::with_capacity(self.f4_offline_activities.len());
        for activity in &self.f4_offline_activities {
            if seen.contains(&activity) {
                return Err(Error::invalid_answer(
                    "f4_offlineActivities",
                    format!("'{activity}' selected twice"),
                ));
            }
            check_choice(
                "f4_offlineActivities",
                activity,
                self.f4_offline_activities_other.as_deref(),
            )?;
            seen.push(activity);
        }
        Ok(())
    }
}

fn check_choice(id: &'static str, value: &str, other: Option<&str>) -> Result<()> {
    let Some(question) = questionnaire::find(id) else {
        return Err(Error::UnknownField(id.to_string()));
    };
    if question.has_text_option(value) {
        return Ok(());
    }
    if question.allow_other && value == OTHER_VALUE {
        return match other.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(()),
            _ => Err(Error::invalid_answer(id, "'其他' needs a description")),
        };
    }
    Err(Error::invalid_answer(id, format!("'{value}' is not an option")))
}

/// One completed questionnaire submission.
///
/// Fields are private: a response is created once and read thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    id: Uuid,
    #[serde(with = "timestamp_ms")]
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    answers: SurveyAnswers,
}

impl SurveyResponse {
    /// Create a response stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(answers: SurveyAnswers) -> Self {
        Self::with_timestamp(answers, Utc::now())
    }

    /// Create a response with an explicit creation time.
    ///
    /// The timestamp is truncated to whole milliseconds, the persisted
    /// resolution.
    #[must_use]
    pub fn with_timestamp(answers: SurveyAnswers, timestamp: DateTime<Utc>) -> Self {
        let timestamp =
            DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp);
        Self {
            id: Uuid::new_v4(),
            timestamp,
            answers,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Creation time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The submitted answers.
    #[must_use]
    pub fn answers(&self) -> &SurveyAnswers {
        &self.answers
    }

    /// Read one scale field.
    #[must_use]
    pub fn rating(&self, field: ScaleField) -> ScaleRating {
        field.value(&self.answers)
    }
}

/// Millisecond epoch timestamps. Fractional input is truncated.
mod timestamp_ms {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(timestamp.timestamp_millis())
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let millis = f64::deserialize(deserializer)?;
        if !millis.is_finite() {
            return Err(de::Error::custom("timestamp is not a finite number"));
        }
        DateTime::from_timestamp_millis(millis.trunc() as i64)
            .ok_or_else(|| de::Error::custom("timestamp out of range"))
    }
}

#[cfg(test)]
pub(crate) fn sample_answers(rating: u8) -> SurveyAnswers {
    let r = ScaleRating::new(rating).expect("valid rating");
    SurveyAnswers {
        age_group: "19-25岁".to_string(),
        identity: "高校学生".to_string(),
        identity_other: None,
        red_interest: r,
        first_time: "是".to_string(),
        c1_easy_to_play: r,
        c2_smooth_ui: r,
        c3_duration: r,
        c4_immersion: r,
        c5_fun_factor: r,
        d1_plot_hook: r,
        d2_history_sense: r,
        d3_balance: r,
        d4_curiosity: r,
        e1_resonance: r,
        e2_empathy: r,
        e3_values: r,
        e4_recommend: r,
        f1_visit_intent: r,
        f2_checkin_intent: r,
        f3_buy_intent: r,
        f4_offline_activities: vec!["打卡路线".to_string()],
        f4_offline_activities_other: None,
        g1_overall_satisfaction: r,
        g2_liked_point: "剧情反转很精彩".to_string(),
        g3_improvement_point: String::new(),
        g4_future_content: String::new(),
    }
}

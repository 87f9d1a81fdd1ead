//! Demonstration data.
//!
//! Generates plausible responses so the dashboard has something to show
//! before real submissions arrive. Ratings skew high the way real playtest
//! answers tend to.

use std::ops::RangeInclusive;

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::questionnaire::{OptionValue, QuestionOption, AGE_GROUPS, IDENTITIES};
use crate::response::{ScaleRating, SurveyAnswers, SurveyResponse};

/// Timestamps are spread over this many milliseconds before now.
const TIME_SPREAD_MS: i64 = 100_000_000;

const ACTIVITIES: [&str; 2] = ["打卡路线", "文创纪念品"];
const LIKED: &str = "剧情反转很精彩，代入感很强。";
const IMPROVE: &str = "有时候加载稍微有点慢。";
const FUTURE: &str = "希望有更多角色视角。";

/// Generate `count` demonstration responses.
#[must_use]
pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<SurveyResponse> {
    (0..count).map(|_| generate_one(rng)).collect()
}

fn generate_one<R: Rng + ?Sized>(rng: &mut R) -> SurveyResponse {
    let answers = SurveyAnswers {
        age_group: pick(AGE_GROUPS, rng),
        identity: pick(IDENTITIES, rng),
        identity_other: None,
        red_interest: rating(rng, 1..=5),
        first_time: if rng.gen_bool(0.5) { "是" } else { "否" }.to_string(),
        c1_easy_to_play: rating(rng, 4..=5),
        c2_smooth_ui: rating(rng, 3..=5),
        c3_duration: rating(rng, 4..=5),
        c4_immersion: rating(rng, 3..=5),
        c5_fun_factor: rating(rng, 4..=5),
        d1_plot_hook: rating(rng, 4..=5),
        d2_history_sense: rating(rng, 3..=5),
        d3_balance: rating(rng, 4..=5),
        d4_curiosity: rating(rng, 3..=5),
        e1_resonance: rating(rng, 3..=5),
        e2_empathy: rating(rng, 4..=5),
        e3_values: ScaleRating::saturating(5),
        e4_recommend: rating(rng, 3..=5),
        f1_visit_intent: rating(rng, 3..=5),
        f2_checkin_intent: rating(rng, 4..=5),
        f3_buy_intent: rating(rng, 2..=5),
        f4_offline_activities: ACTIVITIES.iter().map(ToString::to_string).collect(),
        f4_offline_activities_other: None,
        g1_overall_satisfaction: if rng.gen_bool(0.2) {
            ScaleRating::saturating(5)
        } else {
            ScaleRating::saturating(4)
        },
        g2_liked_point: LIKED.to_string(),
        g3_improvement_point: IMPROVE.to_string(),
        g4_future_content: FUTURE.to_string(),
    };

    let offset = Duration::milliseconds(rng.gen_range(0..TIME_SPREAD_MS));
    SurveyResponse::with_timestamp(answers, Utc::now() - offset)
}

fn pick<R: Rng + ?Sized>(options: &[QuestionOption], rng: &mut R) -> String {
    match options.choose(rng).map(|opt| &opt.value) {
        Some(OptionValue::Text(value)) => (*value).to_string(),
        Some(OptionValue::Number(n)) => n.to_string(),
        None => String::new(),
    }
}

fn rating<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<u8>) -> ScaleRating {
    ScaleRating::saturating(rng.gen_range(range))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::response::ScaleField;

    fn seeded(count: usize) -> Vec<SurveyResponse> {
        generate(count, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_generates_requested_count() {
        assert_eq!(seeded(50).len(), 50);
        assert!(seeded(0).is_empty());
    }

    #[test]
    fn test_generated_answers_validate() {
        for response in seeded(30) {
            response.answers().validate().unwrap();
        }
    }

    #[test]
    fn test_values_fixed_at_five() {
        for response in seeded(30) {
            assert_eq!(response.rating(ScaleField::E3Values).get(), 5);
        }
    }

    #[test]
    fn test_skewed_ranges() {
        for response in seeded(100) {
            assert!(response.rating(ScaleField::C1EasyToPlay).get() >= 4);
            assert!(response.rating(ScaleField::C2SmoothUi).get() >= 3);
            assert!(response.rating(ScaleField::F3BuyIntent).get() >= 2);
            let g1 = response.rating(ScaleField::G1OverallSatisfaction).get();
            assert!(g1 == 4 || g1 == 5);
        }
    }

    #[test]
    fn test_timestamps_in_past_window() {
        let responses = seeded(30);
        let now = Utc::now();
        for response in responses {
            assert!(response.timestamp() <= now);
            let age = now - response.timestamp();
            assert!(age <= Duration::milliseconds(TIME_SPREAD_MS + 1_000));
        }
    }

    #[test]
    fn test_ids_unique() {
        let responses = seeded(20);
        let mut ids: Vec<_> = responses.iter().map(SurveyResponse::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_same_seed_same_answers() {
        let a = seeded(5);
        let b = seeded(5);
        let answers = |v: &[SurveyResponse]| {
            v.iter().map(|r| r.answers().clone()).collect::<Vec<_>>()
        };
        assert_eq!(answers(&a), answers(&b));
    }
}

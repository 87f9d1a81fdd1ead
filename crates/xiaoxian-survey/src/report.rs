//! Text and JSON renderings of the dashboard and response list.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use crate::error::Result;
use crate::questionnaire::OTHER_VALUE;
use crate::response::SurveyResponse;
use crate::stats::{Dashboard, GroupCount, FULL_MARK};

/// Shown in place of the dashboard when nothing has been collected.
pub const EMPTY_NOTICE: &str = "暂无数据，请先提交几份问卷。";

const BAR_WIDTH: usize = 30;

/// Render the dashboard for a terminal.
#[must_use]
pub fn render_plain(dashboard: &Dashboard) -> String {
    if dashboard.is_empty() {
        return format!("{EMPTY_NOTICE}\n");
    }

    let mut out = String::new();
    let headline = &dashboard.headline;
    let _ = writeln!(out, "啸仙丹心 · 调研数据分析");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out);
    let _ = writeln!(out, "总样本量          {}", headline.total);
    let _ = writeln!(out, "平均满意度 (G1)   {:.1} / 5.0", headline.satisfaction);
    let _ = writeln!(out, "购买转化意向 (F3) {:.1} / 5.0", headline.buy_intent);
    let _ = writeln!(out, "净推荐倾向 (E4)   {:.1} / 5.0", headline.recommend);

    section(&mut out, "体验维度");
    for dim in &dashboard.dimensions {
        let _ = writeln!(
            out,
            "  {}  {:.1} / {}  {}",
            dim.subject,
            dim.score,
            dim.full_mark,
            score_bar(dim.score)
        );
    }

    section(&mut out, "年龄分布");
    bars(&mut out, &dashboard.age_distribution);

    section(&mut out, "满意度分布");
    bars(&mut out, &dashboard.satisfaction_distribution);

    section(&mut out, "线下活动兴趣");
    if dashboard.activity_ranking.is_empty() {
        let _ = writeln!(out, "  (无)");
    } else {
        bars(&mut out, &dashboard.activity_ranking);
    }

    section(&mut out, "最新反馈");
    for comment in &dashboard.latest_comments {
        let _ = writeln!(
            out,
            "  {}  {} · {}",
            local_date(comment.timestamp),
            comment.age_group,
            comment.identity
        );
        let _ = writeln!(out, "    喜欢：{}", or_dash(&comment.liked_point));
        let _ = writeln!(out, "    建议：{}", or_dash(&comment.improvement_point));
    }

    out
}

/// Render the dashboard as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(dashboard: &Dashboard) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// Render responses one per line, newest last.
#[must_use]
pub fn render_list_plain(responses: &[SurveyResponse]) -> String {
    if responses.is_empty() {
        return format!("{EMPTY_NOTICE}\n");
    }

    let mut out = String::new();
    for response in responses {
        let answers = response.answers();
        let identity = match (&answers.identity_other, answers.identity.as_str()) {
            (Some(other), OTHER_VALUE) => other.as_str(),
            (_, identity) => identity,
        };
        let _ = writeln!(
            out,
            "{}  {}  {} · {}  满意度 {}",
            local_time(response.timestamp()),
            short_id(response),
            answers.age_group,
            identity,
            answers.g1_overall_satisfaction
        );
    }
    out
}

/// Render responses as a JSON array in the persisted format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_list_json(responses: &[SurveyResponse]) -> Result<String> {
    Ok(serde_json::to_string_pretty(responses)?)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "[{title}]");
}

fn bars(out: &mut String, groups: &[GroupCount]) {
    let max = groups.iter().map(|g| g.value).max().unwrap_or(0);
    for group in groups {
        let _ = writeln!(
            out,
            "  {}  {:>3}  {}",
            group.name,
            group.value,
            count_bar(group.value, max)
        );
    }
}

fn count_bar(value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(value * BAR_WIDTH / max)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn score_bar(score: f64) -> String {
    let filled = (score / f64::from(FULL_MARK) * BAR_WIDTH as f64).round();
    "█".repeat(filled.clamp(0.0, BAR_WIDTH as f64) as usize)
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}

fn short_id(response: &SurveyResponse) -> String {
    response.id().simple().to_string()[..8].to_string()
}

fn local_date(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn local_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::sample_answers;

    fn dashboard(ratings: &[u8]) -> Dashboard {
        let responses: Vec<_> = ratings
            .iter()
            .map(|&r| SurveyResponse::new(sample_answers(r)))
            .collect();
        Dashboard::from_responses(&responses, 5)
    }

    #[test]
    fn test_empty_dashboard_notice() {
        let out = render_plain(&dashboard(&[]));
        assert_eq!(out.trim(), EMPTY_NOTICE);
    }

    #[test]
    fn test_plain_headline() {
        let out = render_plain(&dashboard(&[5, 4, 3, 4, 5]));
        assert!(out.contains("总样本量          5"));
        assert!(out.contains("平均满意度 (G1)   4.2 / 5.0"));
        assert!(out.contains("[体验维度]"));
        assert!(out.contains("沉浸趣味  4.2 / 5"));
    }

    #[test]
    fn test_plain_comments() {
        let out = render_plain(&dashboard(&[4]));
        assert!(out.contains("喜欢：剧情反转很精彩"));
        assert!(out.contains("建议：-"));
        assert!(out.contains("19-25岁 · 高校学生"));
    }

    #[test]
    fn test_plain_bars_scale_to_max() {
        let out = render_plain(&dashboard(&[5, 5, 4]));
        let five = out.lines().find(|l| l.trim_start().starts_with("5分")).unwrap();
        let four = out.lines().find(|l| l.trim_start().starts_with("4分")).unwrap();
        assert_eq!(five.matches('█').count(), BAR_WIDTH);
        assert_eq!(four.matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_json_field_names() {
        let json = render_json(&dashboard(&[3])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["headline"]["total"], 1);
        assert_eq!(value["dimensions"][0]["fullMark"], 5);
        assert!(value["latestComments"][0]["likedPoint"].is_string());
    }

    #[test]
    fn test_list_plain() {
        let responses = vec![SurveyResponse::new(sample_answers(4))];
        let out = render_list_plain(&responses);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("满意度 4"));
        assert_eq!(render_list_plain(&[]).trim(), EMPTY_NOTICE);
    }

    #[test]
    fn test_list_json_reloads() {
        let responses = vec![SurveyResponse::new(sample_answers(2))];
        let json = render_list_json(&responses).unwrap();
        let back: Vec<SurveyResponse> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, responses);
    }

    #[test]
    fn test_bar_helpers() {
        assert_eq!(count_bar(0, 0), "");
        assert_eq!(count_bar(3, 3).chars().count(), BAR_WIDTH);
        assert_eq!(score_bar(5.0).chars().count(), BAR_WIDTH);
        assert_eq!(score_bar(0.0), "");
    }
}

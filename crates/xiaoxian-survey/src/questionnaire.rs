//! The questionnaire definition.
//!
//! Sections B through G of the 《啸仙丹心》 experience survey. Question ids
//! are the wire keys used in persisted response records.

use serde::Serialize;

/// Value written into a record when the "其他" escape is chosen.
pub const OTHER_VALUE: &str = "Other";

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option.
    Radio,
    /// A 1-5 agreement rating.
    Scale,
    /// Any number of options.
    Checkbox,
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    TextArea,
}

impl QuestionKind {
    /// Whether the form refuses to submit without an answer.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Radio | Self::Scale)
    }
}

/// The value an option stores in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A categorical string value.
    Text(&'static str),
    /// A numeric rating.
    Number(u8),
}

/// One selectable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    /// Stored value.
    pub value: OptionValue,
    /// Label shown to the respondent.
    pub label: &'static str,
}

/// A single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Wire key of the answer.
    pub id: &'static str,
    /// Prompt text.
    pub text: &'static str,
    /// Answer kind.
    pub kind: QuestionKind,
    /// Options for radio and checkbox questions.
    pub options: &'static [QuestionOption],
    /// Whether an "其他" free-text escape is offered.
    pub allow_other: bool,
}

/// A titled group of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Section letter.
    pub id: &'static str,
    /// Section title.
    pub title: &'static str,
    /// Optional guidance shown under the title.
    pub description: Option<&'static str>,
    /// Questions in display order.
    pub questions: &'static [Question],
}

impl Question {
    /// Wire key of the free-text companion field for the "其他" escape.
    #[must_use]
    pub fn other_key(&self) -> Option<&'static str> {
        match self.id {
            "identity" => Some("identityOther"),
            "f4_offlineActivities" => Some("f4_offlineActivitiesOther"),
            _ => None,
        }
    }

    /// Whether `value` is one of this question's text options.
    #[must_use]
    pub fn has_text_option(&self, value: &str) -> bool {
        self.options
            .iter()
            .any(|opt| matches!(opt.value, OptionValue::Text(v) if v == value))
    }

    /// Whether the answer to this question is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.kind.is_required()
    }
}

const fn text(value: &'static str, label: &'static str) -> QuestionOption {
    QuestionOption {
        value: OptionValue::Text(value),
        label,
    }
}

const fn number(value: u8, label: &'static str) -> QuestionOption {
    QuestionOption {
        value: OptionValue::Number(value),
        label,
    }
}

const fn scale(id: &'static str, text: &'static str) -> Question {
    Question {
        id,
        text,
        kind: QuestionKind::Scale,
        options: &[],
        allow_other: false,
    }
}

const fn textarea(id: &'static str, text: &'static str) -> Question {
    Question {
        id,
        text,
        kind: QuestionKind::TextArea,
        options: &[],
        allow_other: false,
    }
}

/// Labels for the two ends of the agreement scale.
pub const SCALE_LOW_LABEL: &str = "非常不同意";
/// See [`SCALE_LOW_LABEL`].
pub const SCALE_HIGH_LABEL: &str = "非常同意";

/// Age group vocabulary.
pub const AGE_GROUPS: &[QuestionOption] = &[
    text("12岁以下", "12 岁以下"),
    text("12-18岁", "12–18 岁"),
    text("19-25岁", "19–25 岁"),
    text("26-35岁", "26–35 岁"),
    text("36岁以上", "36 岁以上"),
];

/// Identity vocabulary (plus the "其他" escape).
pub const IDENTITIES: &[QuestionOption] = &[
    text("中小学生", "中小学生"),
    text("高校学生", "高校学生"),
    text("上班族", "上班族"),
    text("家长", "家长"),
];

/// First-time flag vocabulary.
pub const FIRST_TIME: &[QuestionOption] = &[text("是", "是"), text("否", "否")];

/// Offline activity vocabulary.
pub const OFFLINE_ACTIVITIES: &[QuestionOption] = &[
    text("打卡路线", "和游戏故事相关的线下打卡路线"),
    text("文创纪念品", "与游戏角色/剧情相关的文创纪念品"),
    text("解锁更多章节", "解锁更多章节/线下限定剧情"),
    text("线下活动", "线下红色主题活动（剧本杀、讲解员带领等）"),
];

const RED_INTEREST: &[QuestionOption] = &[
    number(1, "完全不感兴趣"),
    number(2, "不太感兴趣"),
    number(3, "一般"),
    number(4, "比较感兴趣"),
    number(5, "非常感兴趣"),
];

const SATISFACTION: &[QuestionOption] = &[
    number(1, "非常不满意"),
    number(2, "不太满意"),
    number(3, "一般"),
    number(4, "比较满意"),
    number(5, "非常满意"),
];

/// All sections in display order.
pub static SECTIONS: &[Section] = &[
    Section {
        id: "B",
        title: "基本信息",
        description: None,
        questions: &[
            Question {
                id: "ageGroup",
                text: "您的年龄段？",
                kind: QuestionKind::Radio,
                options: AGE_GROUPS,
                allow_other: false,
            },
            Question {
                id: "identity",
                text: "您的身份更接近于？",
                kind: QuestionKind::Radio,
                options: IDENTITIES,
                allow_other: true,
            },
            Question {
                id: "redInterest",
                text: "您平时对“红色题材/红色旅游”的兴趣如何？",
                kind: QuestionKind::Radio,
                options: RED_INTEREST,
                allow_other: false,
            },
            Question {
                id: "firstTime",
                text: "这是您第一次在展馆/景区中体验这种“扫码玩小游戏”的项目吗？",
                kind: QuestionKind::Radio,
                options: FIRST_TIME,
                allow_other: false,
            },
        ],
    },
    Section {
        id: "C",
        title: "游戏整体体验",
        description: Some("请根据您的实际感受打分（1=非常不同意，5=非常同意）"),
        questions: &[
            scale("c1_easyToPlay", "我很容易就懂得怎么玩这个游戏。"),
            scale("c2_smoothUI", "游戏的操作和界面整体比较流畅、清晰。"),
            scale("c3_duration", "游戏流程时长对我来说是合适的。"),
            scale("c4_immersion", "在游玩的过程中，我有“沉浸在故事里”的感觉。"),
            scale("c5_funFactor", "这个游戏让我觉得“好玩”，而不是在“做题/考试”。"),
        ],
    },
    Section {
        id: "D",
        title: "剧情与红色叙事体验",
        description: Some("庄重感与趣味性的平衡（1=非常不同意，5=非常同意）"),
        questions: &[
            scale("d1_plotHook", "游戏中的故事情节让我想继续往下推理。"),
            scale("d2_historySense", "我能感受到游戏故事背后是真实的历史事件。"),
            scale(
                "d3_balance",
                "游戏在“好玩”和“红色主题的庄重感”之间平衡得比较好。",
            ),
            scale(
                "d4_curiosity",
                "相比刚开始，我现在更好奇这段红色历史的真实故事。",
            ),
        ],
    },
    Section {
        id: "E",
        title: "情感共鸣与价值认同",
        description: Some("（1=非常不同意，5=非常同意）"),
        questions: &[
            scale(
                "e1_resonance",
                "我对游戏中的人物（战士/群众/角色）产生了一定的共鸣。",
            ),
            scale("e2_empathy", "这个游戏让我更能理解当时人们做出选择的原因。"),
            scale(
                "e3_values",
                "体验后，我更认同游戏中传达的价值观（如信念、担当、牺牲等）。",
            ),
            scale("e4_recommend", "我愿意把这个游戏推荐给身边的朋友/家人体验。"),
        ],
    },
    Section {
        id: "F",
        title: "线下展馆体验 & 消费意向",
        description: Some("关于线下互动与文创（1=非常不同意，5=非常同意）"),
        questions: &[
            scale(
                "f1_visitIntent",
                "这个游戏让我更想去展馆/景区里看看相关的真实展品或场景。",
            ),
            scale(
                "f2_checkinIntent",
                "如果展馆中有与游戏相关的线下打卡点（盖章、合影点等），我会愿意去完成。",
            ),
            scale(
                "f3_buyIntent",
                "看到与游戏相关的文创产品（比如明信片、徽章、书签等），我会有购买的冲动。",
            ),
            Question {
                id: "f4_offlineActivities",
                text: "下面哪些形式是你愿意参与的？（可多选）",
                kind: QuestionKind::Checkbox,
                options: OFFLINE_ACTIVITIES,
                allow_other: true,
            },
        ],
    },
    Section {
        id: "G",
        title: "整体满意度与建议",
        description: None,
        questions: &[
            Question {
                id: "g1_overallSatisfaction",
                text: "整体来说，您对《啸仙丹心》这款游戏的满意度是？",
                kind: QuestionKind::Radio,
                options: SATISFACTION,
                allow_other: false,
            },
            textarea("g2_likedPoint", "您最喜欢这个游戏的哪一点？"),
            textarea("g3_improvementPoint", "您觉得哪一点最需要改进？"),
            textarea(
                "g4_futureContent",
                "如果以后推出更多类似的红色推理游戏，您最希望看到的内容是？",
            ),
        ],
    },
];

/// Iterate over every question in display order.
pub fn questions() -> impl Iterator<Item = &'static Question> {
    SECTIONS.iter().flat_map(|section| section.questions.iter())
}

/// Look up a question by its wire key.
#[must_use]
pub fn find(id: &str) -> Option<&'static Question> {
    questions().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_section_order() {
        let ids: Vec<_> = SECTIONS.iter().map(|s| s.id).collect();
        assert_eq!(ids, ["B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn test_question_ids_are_unique() {
        let mut seen = HashSet::new();
        for q in questions() {
            assert!(seen.insert(q.id), "duplicate question id {}", q.id);
        }
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn test_choice_questions_have_options() {
        for q in questions() {
            match q.kind {
                QuestionKind::Radio | QuestionKind::Checkbox => {
                    assert!(!q.options.is_empty(), "{} has no options", q.id);
                }
                _ => assert!(q.options.is_empty(), "{} should have no options", q.id),
            }
        }
    }

    #[test]
    fn test_find() {
        let q = find("firstTime").unwrap();
        assert_eq!(q.kind, QuestionKind::Radio);
        assert!(q.has_text_option("是"));
        assert!(!q.has_text_option("maybe"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(find("identity").unwrap().other_key(), Some("identityOther"));
        assert_eq!(
            find("f4_offlineActivities").unwrap().other_key(),
            Some("f4_offlineActivitiesOther")
        );
        assert_eq!(find("ageGroup").unwrap().other_key(), None);
    }

    #[test]
    fn test_required_kinds() {
        assert!(find("c1_easyToPlay").unwrap().is_required());
        assert!(find("g1_overallSatisfaction").unwrap().is_required());
        assert!(!find("f4_offlineActivities").unwrap().is_required());
        assert!(!find("g2_likedPoint").unwrap().is_required());
    }

    #[test]
    fn test_option_value_serializes_untagged() {
        let json = serde_json::to_string(&AGE_GROUPS[0]).unwrap();
        assert!(json.contains(r#""value":"12岁以下""#));
        let json = serde_json::to_string(&RED_INTEREST[4]).unwrap();
        assert!(json.contains(r#""value":5"#));
    }
}

//! Questionnaire form.
//!
//! [`ResponseDraft`] accumulates answers question by question and only turns
//! into a [`SurveyResponse`] once every required question is answered.
//! [`FormSession`] walks a respondent through the questionnaire over any
//! line-oriented reader and writer.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::questionnaire::{
    self, OptionValue, Question, QuestionKind, OTHER_VALUE, SCALE_HIGH_LABEL, SCALE_LOW_LABEL,
    SECTIONS,
};
use crate::response::{ScaleRating, SurveyAnswers, SurveyResponse};

/// A partially filled questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDraft {
    choices: BTreeMap<&'static str, String>,
    scales: BTreeMap<&'static str, ScaleRating>,
    selections: BTreeMap<&'static str, Vec<String>>,
    texts: BTreeMap<&'static str, String>,
    others: BTreeMap<&'static str, String>,
}

fn question(id: &str) -> Result<&'static Question> {
    questionnaire::find(id).ok_or_else(|| Error::UnknownField(id.to_string()))
}

fn wrong_kind(question: &Question, expected: &str) -> Error {
    Error::invalid_answer(question.id, format!("expected a {expected} question"))
}

impl ResponseDraft {
    /// Create an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a categorical option of a radio question.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a text radio question or `value` is not one of its
    /// options.
    pub fn set_choice(&mut self, id: &str, value: &str) -> Result<()> {
        let q = question(id)?;
        if q.kind != QuestionKind::Radio {
            return Err(wrong_kind(q, "radio"));
        }
        if !q.has_text_option(value) {
            return Err(Error::invalid_answer(
                q.id,
                format!("'{value}' is not an option"),
            ));
        }
        self.choices.insert(q.id, value.to_string());
        if let Some(other_key) = q.other_key() {
            self.others.remove(other_key);
        }
        Ok(())
    }

    /// Set a rating on a scale question or a numeric radio question.
    ///
    /// # Errors
    ///
    /// Fails if `id` does not take a rating.
    pub fn set_scale(&mut self, id: &str, rating: ScaleRating) -> Result<()> {
        let q = question(id)?;
        let numeric_radio = q.kind == QuestionKind::Radio
            && q.options
                .iter()
                .all(|opt| matches!(opt.value, OptionValue::Number(_)));
        if q.kind != QuestionKind::Scale && !numeric_radio {
            return Err(wrong_kind(q, "rating"));
        }
        self.scales.insert(q.id, rating);
        Ok(())
    }

    /// Pick the option at `index` (zero-based) of a radio question.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a radio question or `index` is out of range.
    pub fn select(&mut self, id: &str, index: usize) -> Result<()> {
        let q = question(id)?;
        if q.kind != QuestionKind::Radio {
            return Err(wrong_kind(q, "radio"));
        }
        let option = q.options.get(index).ok_or_else(|| {
            Error::invalid_answer(q.id, format!("option {} does not exist", index + 1))
        })?;
        match option.value {
            OptionValue::Text(value) => self.set_choice(q.id, value),
            OptionValue::Number(value) => self.set_scale(q.id, ScaleRating::new(value)?),
        }
    }

    /// Check or uncheck an option of a checkbox question.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a checkbox question or `value` is not one of its
    /// options.
    pub fn toggle_option(&mut self, id: &str, value: &str, checked: bool) -> Result<()> {
        let q = question(id)?;
        if q.kind != QuestionKind::Checkbox {
            return Err(wrong_kind(q, "checkbox"));
        }
        if !q.has_text_option(value) {
            return Err(Error::invalid_answer(
                q.id,
                format!("'{value}' is not an option"),
            ));
        }
        let selected = self.selections.entry(q.id).or_default();
        let position = selected.iter().position(|item| item == value);
        match (checked, position) {
            (true, None) => selected.push(value.to_string()),
            (false, Some(i)) => {
                selected.remove(i);
            }
            _ => {}
        }
        Ok(())
    }

    /// Answer through the "其他" escape with free text.
    ///
    /// On a radio question this replaces the current choice. On a checkbox
    /// question it adds the escape to the selection, or removes it when
    /// `text` is blank.
    ///
    /// # Errors
    ///
    /// Fails if the question offers no escape, or if `text` is blank on a
    /// radio question.
    pub fn set_other(&mut self, id: &str, text: &str) -> Result<()> {
        let q = question(id)?;
        let Some(other_key) = q.other_key().filter(|_| q.allow_other) else {
            return Err(Error::invalid_answer(q.id, "no '其他' option"));
        };
        let text = text.trim();
        match q.kind {
            QuestionKind::Radio => {
                if text.is_empty() {
                    return Err(Error::invalid_answer(q.id, "'其他' needs a description"));
                }
                self.choices.insert(q.id, OTHER_VALUE.to_string());
                self.others.insert(other_key, text.to_string());
            }
            QuestionKind::Checkbox => {
                let selected = self.selections.entry(q.id).or_default();
                selected.retain(|item| item != OTHER_VALUE);
                if text.is_empty() {
                    self.others.remove(other_key);
                } else {
                    selected.push(OTHER_VALUE.to_string());
                    self.others.insert(other_key, text.to_string());
                }
            }
            _ => return Err(wrong_kind(q, "choice")),
        }
        Ok(())
    }

    /// Set a free-text answer.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a text question.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<()> {
        let q = question(id)?;
        if !matches!(q.kind, QuestionKind::Text | QuestionKind::TextArea) {
            return Err(wrong_kind(q, "text"));
        }
        self.texts.insert(q.id, text.to_string());
        Ok(())
    }

    /// Whether a question has an answer.
    #[must_use]
    pub fn is_answered(&self, id: &str) -> bool {
        self.choices.contains_key(id)
            || self.scales.contains_key(id)
            || self.selections.get(id).is_some_and(|s| !s.is_empty())
            || self.texts.get(id).is_some_and(|t| !t.is_empty())
    }

    /// Required questions that still lack an answer, in questionnaire order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        questionnaire::questions()
            .filter(|q| q.is_required() && !self.is_answered(q.id))
            .map(|q| q.id)
            .collect()
    }

    fn choice(&self, id: &'static str) -> Result<String> {
        self.choices
            .get(id)
            .cloned()
            .ok_or(Error::MissingAnswer { field: id })
    }

    fn scale(&self, id: &'static str) -> Result<ScaleRating> {
        self.scales
            .get(id)
            .copied()
            .ok_or(Error::MissingAnswer { field: id })
    }

    fn text(&self, id: &'static str) -> String {
        self.texts.get(id).cloned().unwrap_or_default()
    }

    /// Assemble the answers, failing on the first unanswered required question.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAnswer`] or a vocabulary error.
    pub fn to_answers(&self) -> Result<SurveyAnswers> {
        if let Some(&field) = self.missing_required().first() {
            return Err(Error::MissingAnswer { field });
        }
        let answers = SurveyAnswers {
            age_group: self.choice("ageGroup")?,
            identity: self.choice("identity")?,
            identity_other: self.others.get("identityOther").cloned(),
            red_interest: self.scale("redInterest")?,
            first_time: self.choice("firstTime")?,
            c1_easy_to_play: self.scale("c1_easyToPlay")?,
            c2_smooth_ui: self.scale("c2_smoothUI")?,
            c3_duration: self.scale("c3_duration")?,
            c4_immersion: self.scale("c4_immersion")?,
            c5_fun_factor: self.scale("c5_funFactor")?,
            d1_plot_hook: self.scale("d1_plotHook")?,
            d2_history_sense: self.scale("d2_historySense")?,
            d3_balance: self.scale("d3_balance")?,
            d4_curiosity: self.scale("d4_curiosity")?,
            e1_resonance: self.scale("e1_resonance")?,
            e2_empathy: self.scale("e2_empathy")?,
            e3_values: self.scale("e3_values")?,
            e4_recommend: self.scale("e4_recommend")?,
            f1_visit_intent: self.scale("f1_visitIntent")?,
            f2_checkin_intent: self.scale("f2_checkinIntent")?,
            f3_buy_intent: self.scale("f3_buyIntent")?,
            f4_offline_activities: self
                .selections
                .get("f4_offlineActivities")
                .cloned()
                .unwrap_or_default(),
            f4_offline_activities_other: self.others.get("f4_offlineActivitiesOther").cloned(),
            g1_overall_satisfaction: self.scale("g1_overallSatisfaction")?,
            g2_liked_point: self.text("g2_likedPoint"),
            g3_improvement_point: self.text("g3_improvementPoint"),
            g4_future_content: self.text("g4_futureContent"),
        };
        answers.validate()?;
        Ok(answers)
    }

    /// Submit the draft, stamping it with an id and the current time.
    ///
    /// # Errors
    ///
    /// See [`ResponseDraft::to_answers`].
    pub fn finish(&self) -> Result<SurveyResponse> {
        Ok(SurveyResponse::new(self.to_answers()?))
    }
}

/// Build a response from a JSON answers document.
///
/// # Errors
///
/// Fails if the document does not parse, a rating is off the scale, or a
/// categorical answer is not in the vocabulary.
pub fn response_from_json(json: &str) -> Result<SurveyResponse> {
    let answers: SurveyAnswers = serde_json::from_str(json)?;
    answers.validate()?;
    Ok(SurveyResponse::new(answers))
}

/// Interactive, line-based questionnaire session.
#[derive(Debug)]
pub struct FormSession<R, W> {
    input: R,
    output: W,
    draft: ResponseDraft,
}

const INTRO_TITLE: &str = "《啸仙丹心》体验调研";
const INTRO_TEXT: &str = "感谢体验《啸仙丹心》红色推理游戏！本问卷约需 3–5 分钟，\
主要用于改进游戏和线下展馆体验，所有数据仅用于学术研究，匿名填写。";
const THANKS_TEXT: &str = "感谢您的参与！您的反馈对《啸仙丹心》的优化至关重要。";

impl<R: BufRead, W: Write> FormSession<R, W> {
    /// Create a session reading answers from `input` and prompting on `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            draft: ResponseDraft::new(),
        }
    }

    /// Ask every question and return the submitted response.
    ///
    /// Invalid answers are reported and the question is asked again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormAborted`] if input ends early, or an I/O error.
    pub fn run(mut self) -> Result<SurveyResponse> {
        writeln!(self.output, "{INTRO_TITLE}")?;
        writeln!(self.output, "{INTRO_TEXT}")?;

        for section in SECTIONS {
            writeln!(self.output)?;
            writeln!(self.output, "[{}] {}", section.id, section.title)?;
            if let Some(description) = section.description {
                writeln!(self.output, "{description}")?;
            }
            for q in section.questions {
                self.ask(q)?;
            }
        }

        let response = self.draft.finish()?;
        writeln!(self.output)?;
        writeln!(self.output, "{THANKS_TEXT}")?;
        info!("Questionnaire completed: {}", response.id());
        Ok(response)
    }

    fn ask(&mut self, q: &'static Question) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", q.text)?;
        match q.kind {
            QuestionKind::Scale => {
                writeln!(self.output, "  (1={SCALE_LOW_LABEL} … 5={SCALE_HIGH_LABEL})")?;
            }
            QuestionKind::Radio | QuestionKind::Checkbox => {
                for (i, opt) in q.options.iter().enumerate() {
                    writeln!(self.output, "  {}) {}", i + 1, opt.label)?;
                }
                if q.allow_other {
                    writeln!(self.output, "  其他: 直接输入内容")?;
                }
                if q.kind == QuestionKind::Checkbox {
                    writeln!(self.output, "  (可多选，用逗号分隔；直接回车跳过)")?;
                }
            }
            QuestionKind::Text | QuestionKind::TextArea => {}
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let line = self.read_line()?;
            match self.apply(q, &line) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_validation_error() => {
                    debug!("Rejected answer for {}: {}", q.id, err);
                    writeln!(self.output, "  {}", hint(q))?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn apply(&mut self, q: &'static Question, line: &str) -> Result<()> {
        let line = line.trim();
        match q.kind {
            QuestionKind::Scale => {
                let value: i64 = line
                    .parse()
                    .map_err(|_| Error::invalid_answer(q.id, "not a number"))?;
                self.draft.set_scale(q.id, ScaleRating::try_from(value)?)
            }
            QuestionKind::Radio => match line.parse::<i64>() {
                Ok(n) => match usize::try_from(n) {
                    Ok(i) if (1..=q.options.len()).contains(&i) => self.draft.select(q.id, i - 1),
                    _ => Err(Error::invalid_answer(q.id, format!("{n} is not an option"))),
                },
                Err(_) if q.allow_other && !line.is_empty() => self.draft.set_other(q.id, line),
                Err(_) => Err(Error::invalid_answer(q.id, "no option chosen")),
            },
            QuestionKind::Checkbox => {
                let mut picked = Vec::new();
                let mut other = Vec::new();
                for token in line
                    .split(&[',', '，', ' '][..])
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                {
                    match token.parse::<usize>() {
                        Ok(n) if (1..=q.options.len()).contains(&n) => picked.push(n - 1),
                        Err(_) if q.allow_other => other.push(token),
                        _ => {
                            return Err(Error::invalid_answer(
                                q.id,
                                format!("'{token}' is not an option"),
                            ))
                        }
                    }
                }
                for index in picked {
                    if let OptionValue::Text(value) = q.options[index].value {
                        self.draft.toggle_option(q.id, value, true)?;
                    }
                }
                if q.allow_other {
                    self.draft.set_other(q.id, &other.join(" "))?;
                }
                Ok(())
            }
            QuestionKind::Text | QuestionKind::TextArea => self.draft.set_text(q.id, line),
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::FormAborted);
        }
        Ok(line)
    }
}

fn hint(q: &Question) -> String {
    match q.kind {
        QuestionKind::Scale => "请输入 1-5 之间的数字".to_string(),
        QuestionKind::Radio if q.allow_other => {
            format!("请输入 1-{} 之间的数字，或直接填写其他内容", q.options.len())
        }
        QuestionKind::Radio => format!("请输入 1-{} 之间的数字", q.options.len()),
        QuestionKind::Checkbox => format!("请输入 1-{} 之间的数字，用逗号分隔", q.options.len()),
        QuestionKind::Text | QuestionKind::TextArea => "请输入您的想法".to_string(),
    }
}

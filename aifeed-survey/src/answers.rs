use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use crate::question::Question;

/// A subscriber's raw answer to one question.
///
/// Text-like and single-choice questions answer with a string, number and rating
/// questions may answer with either a string or a JSON number, and
/// multiselect/checkbox questions answer with a list of option values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Number(serde_json::Number),
    Choices(Vec<String>),
}

impl Answer {
    /// Normalize to an ordered sequence of strings; scalars become one-element sequences.
    pub fn normalized(&self) -> Vec<String> {
        match self {
            Answer::Text(s) => vec![s.clone()],
            Answer::Number(n) => vec![canonical_number(n)],
            Answer::Choices(values) => values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Text(s) => s.trim().is_empty(),
            Answer::Number(_) => false,
            Answer::Choices(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// The answer as a single value, if it holds exactly one
    pub fn single(&self) -> Option<String> {
        match self {
            Answer::Choices(values) if values.len() == 1 => Some(values[0].clone()),
            Answer::Choices(_) => None,
            other => other.normalized().into_iter().next(),
        }
    }

    /// Numeric reading of a single-valued answer; NaN and infinities are rejected
    pub fn as_number(&self) -> Option<f64> {
        let raw = self.single()?;
        parse_number(&raw)
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Text(s)
    }
}

impl From<i64> for Answer {
    fn from(n: i64) -> Self {
        Answer::Number(n.into())
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Answer::Choices(values.into_iter().map(str::to_string).collect())
    }
}

/// Integral JSON numbers print without a fraction, so `4`, `4.0` and `"4"` compare equal
fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Parse a trimmed decimal number, refusing non-finite values
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Answers collected from one cancellation attempt, keyed by question id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<Uuid, Answer>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: Uuid, answer: impl Into<Answer>) {
        self.0.insert(question_id, answer.into());
    }

    pub fn with(mut self, question_id: Uuid, answer: impl Into<Answer>) -> Self {
        self.insert(question_id, answer);
        self
    }

    pub fn get(&self, question_id: &Uuid) -> Option<&Answer> {
        self.0.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &Answer)> {
        self.0.iter()
    }

    /// Drop answers whose question is unknown or inactive.
    ///
    /// Returns the number of answers removed.
    pub fn retain_active(&mut self, questions: &[Question]) -> usize {
        let before = self.0.len();
        self.0.retain(|id, _| questions.iter().any(|q| q.id == *id && q.active));
        before - self.0.len()
    }
}

impl FromIterator<(Uuid, Answer)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (Uuid, Answer)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

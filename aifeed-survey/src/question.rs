use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Input types an exit-survey question can use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    Number,
    /// Integer score from 1 to 5
    Rating,
}

impl QuestionType {
    /// Types whose answers are picked from a fixed option list
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::Select | QuestionType::Multiselect | QuestionType::Radio | QuestionType::Checkbox
        )
    }

    /// Types that accept several values in one answer
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, QuestionType::Multiselect | QuestionType::Checkbox)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionType::Number | QuestionType::Rating)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Select => "select",
            QuestionType::Multiselect => "multiselect",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Number => "number",
            QuestionType::Rating => "rating",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = QuestionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(QuestionType::Text),
            "textarea" => Ok(QuestionType::Textarea),
            "select" => Ok(QuestionType::Select),
            "multiselect" => Ok(QuestionType::Multiselect),
            "radio" => Ok(QuestionType::Radio),
            "checkbox" => Ok(QuestionType::Checkbox),
            "number" => Ok(QuestionType::Number),
            "rating" => Ok(QuestionType::Rating),
            other => Err(QuestionValidationError::UnknownType(other.to_string())),
        }
    }
}

/// A selectable choice of a select/multiselect/radio/checkbox question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A creator-defined exit-survey question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    pub required: bool,
    pub order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Create an active, optional question with no options
    pub fn new(creator_id: Uuid, text: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id,
            text: text.into(),
            question_type,
            options: None,
            required: false,
            order: 0,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn at(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Whether `value` is one of the configured option values
    pub fn has_option(&self, value: &str) -> bool {
        self.options
            .as_deref()
            .map(|opts| opts.iter().any(|o| o.value == value))
            .unwrap_or(false)
    }
}

/// Check the shape invariants the Admin Editor must enforce before a question is stored
pub fn validate_question(question: &Question) -> Result<(), QuestionValidationError> {
    if question.text.trim().is_empty() {
        return Err(QuestionValidationError::EmptyText);
    }

    match (&question.options, question.question_type.has_options()) {
        (None, true) => Err(QuestionValidationError::MissingOptions(question.question_type)),
        (Some(opts), true) if opts.is_empty() => {
            Err(QuestionValidationError::MissingOptions(question.question_type))
        }
        (Some(_), false) => Err(QuestionValidationError::UnexpectedOptions(question.question_type)),
        (Some(opts), true) => {
            let mut seen = HashSet::new();
            for opt in opts {
                if opt.value.trim().is_empty() {
                    return Err(QuestionValidationError::EmptyOptionValue);
                }
                if !seen.insert(opt.value.as_str()) {
                    return Err(QuestionValidationError::DuplicateOption(opt.value.clone()));
                }
            }
            Ok(())
        }
        (None, false) => Ok(()),
    }
}

/// Question-related errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestionValidationError {
    #[error("Question text must not be empty")]
    EmptyText,

    #[error("Unknown question type: {0}")]
    UnknownType(String),

    #[error("Questions of type {0} need at least one option")]
    MissingOptions(QuestionType),

    #[error("Questions of type {0} do not take options")]
    UnexpectedOptions(QuestionType),

    #[error("Option values must not be empty")]
    EmptyOptionValue,

    #[error("Duplicate option value: {0}")]
    DuplicateOption(String),
}

pub mod question;
pub mod answers;
pub mod collector;

pub use question::{validate_question, Question, QuestionOption, QuestionType, QuestionValidationError};
pub use answers::{parse_number, Answer, AnswerSet};
pub use collector::{active_survey, validate_answers, AnswerError};

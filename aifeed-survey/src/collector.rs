use uuid::Uuid;
use crate::answers::{Answer, AnswerSet};
use crate::question::{Question, QuestionType};

/// Active questions in display order (ties broken by creation time, then id)
pub fn active_survey(questions: &[Question]) -> Vec<&Question> {
    let mut survey: Vec<&Question> = questions.iter().filter(|q| q.active).collect();
    survey.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    survey
}

/// Check a submitted survey against the creator's active questions.
///
/// Every problem is reported, not just the first. Answers to inactive or unknown
/// questions are not errors; they are pruned later.
pub fn validate_answers(questions: &[Question], answers: &AnswerSet) -> Result<(), Vec<AnswerError>> {
    let mut errors = Vec::new();

    for question in active_survey(questions) {
        match answers.get(&question.id) {
            None => {
                if question.required {
                    errors.push(AnswerError::Required(question.id));
                }
            }
            Some(answer) if answer.is_empty() => {
                if question.required {
                    errors.push(AnswerError::Required(question.id));
                }
            }
            Some(answer) => {
                if let Err(e) = check_shape(question, answer) {
                    errors.push(e);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_shape(question: &Question, answer: &Answer) -> Result<(), AnswerError> {
    let id = question.id;
    match question.question_type {
        QuestionType::Text | QuestionType::Textarea => match answer {
            Answer::Choices(_) => Err(AnswerError::ExpectedSingleValue(id)),
            _ => Ok(()),
        },
        QuestionType::Number => answer
            .as_number()
            .map(|_| ())
            .ok_or(AnswerError::NotANumber(id)),
        QuestionType::Rating => {
            let n = answer.as_number().ok_or(AnswerError::NotANumber(id))?;
            if n.fract() == 0.0 && (1.0..=5.0).contains(&n) {
                Ok(())
            } else {
                Err(AnswerError::RatingOutOfRange(id))
            }
        }
        QuestionType::Select | QuestionType::Radio => {
            let value = answer.single().ok_or(AnswerError::ExpectedSingleValue(id))?;
            if question.has_option(&value) {
                Ok(())
            } else {
                Err(AnswerError::UnknownOption { question_id: id, value })
            }
        }
        QuestionType::Multiselect | QuestionType::Checkbox => {
            match answer.normalized().into_iter().find(|v| !question.has_option(v)) {
                Some(value) => Err(AnswerError::UnknownOption { question_id: id, value }),
                None => Ok(()),
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum AnswerError {
    #[error("Question {0} requires an answer")]
    Required(Uuid),

    #[error("Question {0} takes a single value")]
    ExpectedSingleValue(Uuid),

    #[error("Question {0} expects a number")]
    NotANumber(Uuid),

    #[error("Question {0} expects a rating between 1 and 5")]
    RatingOutOfRange(Uuid),

    #[error("Question {question_id} has no option {value}")]
    UnknownOption { question_id: Uuid, value: String },
}

impl AnswerError {
    pub fn question_id(&self) -> Uuid {
        match self {
            AnswerError::Required(id)
            | AnswerError::ExpectedSingleValue(id)
            | AnswerError::NotANumber(id)
            | AnswerError::RatingOutOfRange(id) => *id,
            AnswerError::UnknownOption { question_id, .. } => *question_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionOption;

    fn survey() -> (Question, Question, Question, Question) {
        let creator = Uuid::new_v4();
        let reason = Question::new(creator, "Why are you leaving?", QuestionType::Radio)
            .with_options(vec![
                QuestionOption::new("too_expensive", "Too expensive"),
                QuestionOption::new("missing_feature", "Missing a feature"),
            ])
            .required()
            .at(1);
        let rating = Question::new(creator, "Rate your experience", QuestionType::Rating).at(2);
        let topics = Question::new(creator, "Which topics did you read?", QuestionType::Multiselect)
            .with_options(vec![
                QuestionOption::new("tools", "AI tools"),
                QuestionOption::new("jobs", "Jobs"),
            ])
            .at(3);
        let comment = Question::new(creator, "Anything else?", QuestionType::Textarea).at(0);
        (reason, rating, topics, comment)
    }

    #[test]
    fn test_active_survey_order() {
        let (reason, rating, topics, mut comment) = survey();
        let questions = vec![topics.clone(), reason.clone(), rating.clone(), comment.clone()];

        let ids: Vec<Uuid> = active_survey(&questions).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![comment.id, reason.id, rating.id, topics.id]);

        comment.active = false;
        let questions = vec![topics, reason.clone(), rating, comment];
        assert_eq!(active_survey(&questions)[0].id, reason.id);
    }

    #[test]
    fn test_valid_submission() {
        let (reason, rating, topics, comment) = survey();
        let answers = AnswerSet::new()
            .with(reason.id, "too_expensive")
            .with(rating.id, 4i64)
            .with(topics.id, vec!["tools", "jobs"]);

        assert!(validate_answers(&[reason, rating, topics, comment], &answers).is_ok());
    }

    #[test]
    fn test_required_question_missing_or_blank() {
        let (reason, rating, topics, comment) = survey();
        let questions = [reason.clone(), rating, topics, comment];

        let errors = validate_answers(&questions, &AnswerSet::new()).unwrap_err();
        assert_eq!(errors, vec![AnswerError::Required(reason.id)]);

        let blank = AnswerSet::new().with(reason.id, "  ");
        let errors = validate_answers(&questions, &blank).unwrap_err();
        assert_eq!(errors, vec![AnswerError::Required(reason.id)]);
    }

    #[test]
    fn test_inactive_required_question_is_skipped() {
        let (mut reason, rating, topics, comment) = survey();
        reason.active = false;
        assert!(validate_answers(&[reason, rating, topics, comment], &AnswerSet::new()).is_ok());
    }

    #[test]
    fn test_shape_errors_are_all_reported() {
        let (reason, rating, topics, comment) = survey();
        let answers = AnswerSet::new()
            .with(reason.id, "bored")
            .with(rating.id, 9i64)
            .with(topics.id, vec!["tools", "memes"])
            .with(comment.id, vec!["a", "b"]);

        let errors = validate_answers(&[reason.clone(), rating.clone(), topics.clone(), comment.clone()], &answers)
            .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&AnswerError::ExpectedSingleValue(comment.id)));
        assert!(errors.contains(&AnswerError::UnknownOption { question_id: reason.id, value: "bored".into() }));
        assert!(errors.contains(&AnswerError::RatingOutOfRange(rating.id)));
        assert!(errors.contains(&AnswerError::UnknownOption { question_id: topics.id, value: "memes".into() }));
    }

    #[test]
    fn test_rating_must_be_integral_number() {
        let (_, rating, _, _) = survey();
        let questions = [rating.clone()];

        let fractional = AnswerSet::new().with(rating.id, "3.5");
        assert_eq!(
            validate_answers(&questions, &fractional).unwrap_err(),
            vec![AnswerError::RatingOutOfRange(rating.id)]
        );

        let text = AnswerSet::new().with(rating.id, "great");
        assert_eq!(
            validate_answers(&questions, &text).unwrap_err()[0].question_id(),
            rating.id
        );
    }
}

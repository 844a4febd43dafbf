//! Answer collection: reads raw wizard form fields into typed records.

use std::str::FromStr;

use crate::models::quiz::{AnswerRecord, Constraints, Demographics, FormFields, QuizPayload};
use crate::quiz::questions::QuestionBank;
use crate::quiz::scoring::score_answers;
use crate::quiz::WizardError;

/// Everything the wizard collected, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedAnswers {
    pub demographics: Demographics,
    pub constraints: Constraints,
    pub answers: AnswerRecord,
}

impl CollectedAnswers {
    /// Scores the answers and freezes everything into the payload sent upstream.
    pub fn into_payload(self, bank: &QuestionBank) -> QuizPayload {
        let tag_scores = score_answers(bank, &self.answers);
        QuizPayload {
            demographics: self.demographics,
            constraints: self.constraints,
            answers: self.answers,
            tag_scores,
        }
    }
}

/// Collects every step. All quiz questions must be answered with one of their options.
pub fn collect(bank: &QuestionBank, fields: &FormFields) -> Result<CollectedAnswers, WizardError> {
    let answers = collect_answers(bank, fields)?;
    let missing = unanswered(bank, &answers);
    if !missing.is_empty() {
        return Err(WizardError::MissingAnswers(missing));
    }

    Ok(CollectedAnswers {
        demographics: collect_demographics(fields)?,
        constraints: collect_constraints(fields)?,
        answers,
    })
}

/// Reads the answered quiz questions. Blank values count as unanswered.
pub fn collect_answers(
    bank: &QuestionBank,
    fields: &FormFields,
) -> Result<AnswerRecord, WizardError> {
    let mut answers = AnswerRecord::new();
    for question in &bank.questions {
        let Some(value) = text(fields, &question.id) else {
            continue;
        };
        if question.option(&value).is_none() {
            return Err(WizardError::InvalidOption {
                question: question.id.clone(),
                value,
            });
        }
        answers.insert(question.id.clone(), value);
    }
    Ok(answers)
}

/// Question ids in bank order that have no answer.
pub fn unanswered(bank: &QuestionBank, answers: &AnswerRecord) -> Vec<String> {
    bank.required_ids()
        .filter(|id| !answers.contains_key(*id))
        .map(String::from)
        .collect()
}

fn collect_demographics(fields: &FormFields) -> Result<Demographics, WizardError> {
    Ok(Demographics {
        full_name: text(fields, "full_name"),
        age: number(fields, "age")?,
        gender: text(fields, "gender"),
        class_grade: text(fields, "class_grade"),
        location: text(fields, "location"),
        previous_class_percentage: number(fields, "previous_class_percentage")?,
    })
}

fn collect_constraints(fields: &FormFields) -> Result<Constraints, WizardError> {
    Ok(Constraints {
        budget: number(fields, "budget")?,
        max_distance_km: number(fields, "max_distance_km")?,
        needs_hostel: text(fields, "needs_hostel").map(|v| is_checked(&v)),
        preferred_medium: text(fields, "preferred_medium"),
    })
}

fn text(fields: &FormFields, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn number<T: FromStr>(fields: &FormFields, key: &str) -> Result<Option<T>, WizardError> {
    text(fields, key)
        .map(|v| {
            v.parse::<T>().map_err(|_| WizardError::InvalidNumber {
                field: key.to_string(),
            })
        })
        .transpose()
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "yes" | "y" | "true" | "on" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> FormFields {
        let bank = QuestionBank::default();
        let mut fields: FormFields = bank
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.options[0].value.clone()))
            .collect();
        fields.insert("full_name".into(), "Asha Verma".into());
        fields.insert("age".into(), "15".into());
        fields.insert("class_grade".into(), "10th".into());
        fields.insert("needs_hostel".into(), "on".into());
        fields.insert("budget".into(), "40000".into());
        fields
    }

    #[test]
    fn test_collect_complete_form() {
        let bank = QuestionBank::default();
        let collected = collect(&bank, &complete_fields()).unwrap();

        assert_eq!(collected.answers.len(), bank.questions.len());
        assert_eq!(collected.demographics.full_name.as_deref(), Some("Asha Verma"));
        assert_eq!(collected.demographics.age, Some(15));
        assert_eq!(collected.constraints.needs_hostel, Some(true));
        assert_eq!(collected.constraints.budget, Some(40000.0));
        assert_eq!(collected.constraints.max_distance_km, None);
    }

    #[test]
    fn test_missing_answers_are_listed() {
        let bank = QuestionBank::default();
        let mut fields = complete_fields();
        fields.remove("q_debate");
        fields.insert("q_money".into(), "   ".into());

        let err = collect(&bank, &fields).unwrap_err();
        assert_eq!(
            err,
            WizardError::MissingAnswers(vec!["q_debate".to_string(), "q_money".to_string()])
        );
    }

    #[test]
    fn test_unknown_option_rejected() {
        let bank = QuestionBank::default();
        let mut fields = complete_fields();
        fields.insert("q_lab_work".into(), "daily".into());

        assert!(matches!(
            collect(&bank, &fields),
            Err(WizardError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_bad_number_rejected() {
        let bank = QuestionBank::default();
        let mut fields = complete_fields();
        fields.insert("age".into(), "fifteen".into());

        assert_eq!(
            collect(&bank, &fields).unwrap_err(),
            WizardError::InvalidNumber {
                field: "age".to_string()
            }
        );
    }

    #[test]
    fn test_payload_carries_scores() {
        let bank = QuestionBank::default();
        let payload = collect(&bank, &complete_fields())
            .unwrap()
            .into_payload(&bank);
        // every frequency question answered "always" → 2 per tag
        assert_eq!(payload.tag_scores.get("communication"), Some(&2.0));
        assert_eq!(payload.answers.get("q_debate").map(String::as_str), Some("always"));
    }
}

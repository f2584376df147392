use std::fmt::Write;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::types::{OptionLetter, StudentAnswer};

/// The reference sequence of correct options, one per question. Only
/// [`AnswerKey::parse`] constructs one, so every key is non-empty and within
/// the option alphabet it was parsed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKey(Vec<OptionLetter>);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AnswerKeyError {
    #[error("answer key is empty")]
    Empty,
    #[error("answer key has {length} letters, at most {max} are allowed")]
    TooLong { length: usize, max: usize },
    #[error("invalid letter {letter:?} at position {position}, expected A-{last}")]
    InvalidLetter {
        letter: char,
        position: usize,
        last: char,
    },
}

impl AnswerKey {
    /// Parses a key such as `"abcdABCD"`, one letter per question. Letters
    /// are case-insensitive and whitespace is ignored.
    pub fn parse(
        text: &str,
        options_per_question: usize,
        max_length: usize,
    ) -> Result<Self, AnswerKeyError> {
        let last = OptionLetter::from_index(options_per_question.saturating_sub(1))
            .map_or('Z', |letter| letter.as_char());

        let mut letters = vec![];
        for (position, c) in text.chars().filter(|c| !c.is_whitespace()).enumerate() {
            match OptionLetter::from_char(c) {
                Some(letter) if letter.index() < options_per_question => letters.push(letter),
                _ => {
                    return Err(AnswerKeyError::InvalidLetter {
                        letter: c,
                        position: position + 1,
                        last,
                    })
                }
            }
        }

        if letters.is_empty() {
            return Err(AnswerKeyError::Empty);
        }
        if letters.len() > max_length {
            return Err(AnswerKeyError::TooLong {
                length: letters.len(),
                max: max_length,
            });
        }

        Ok(Self(letters))
    }

    pub fn letters(&self) -> &[OptionLetter] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// 1-based.
    pub question_number: usize,
    pub student_answer: StudentAnswer,
    pub correct_answer: OptionLetter,
    pub is_correct: bool,
}

/// Counts gathered while detecting bubbles, carried along for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub bubbles_detected: usize,
    pub questions_detected: usize,
    pub discarded_bubbles: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub verdicts: Vec<Verdict>,
    pub total_correct: usize,
    /// Number of questions actually compared against the key.
    pub total_evaluated: usize,
    /// Length of the answer key.
    pub total_questions: usize,
    pub detection: DetectionSummary,
}

pub const SUMMARY_LABEL: &str = "Total";
pub const CORRECT_MARKER: &str = "✔";
pub const INCORRECT_MARKER: &str = "✘";

/// Compares the answers against the key pairwise, stopping at the end of the
/// shorter of the two.
pub fn grade_answers(
    answers: &[StudentAnswer],
    key: &AnswerKey,
    detection: DetectionSummary,
) -> Report {
    if answers.len() != key.len() {
        warn!(
            "answer key has {} letter(s) but {} question(s) were detected; grading the first {}",
            key.len(),
            answers.len(),
            answers.len().min(key.len())
        );
    }

    let verdicts = answers
        .iter()
        .zip(key.letters())
        .enumerate()
        .map(|(i, (&student_answer, &correct_answer))| Verdict {
            question_number: i + 1,
            student_answer,
            correct_answer,
            is_correct: student_answer == StudentAnswer::Marked(correct_answer),
        })
        .collect::<Vec<Verdict>>();
    let total_correct = verdicts.iter().filter(|v| v.is_correct).count();

    Report {
        total_evaluated: verdicts.len(),
        verdicts,
        total_correct,
        total_questions: key.len(),
        detection,
    }
}

impl Report {
    pub fn student_answers(&self) -> Vec<StudentAnswer> {
        self.verdicts.iter().map(|v| v.student_answer).collect()
    }

    /// The score as shown in the summary row, e.g. `3 / 4`.
    pub fn score(&self) -> String {
        format!("{} / {}", self.total_correct, self.total_questions)
    }

    /// Renders the report as comma-separated values with a header row and a
    /// trailing summary row.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("Question,Student Answer,Correct Answer,Correct?\n");
        for verdict in &self.verdicts {
            let _ = writeln!(
                csv,
                "{},{},{},{}",
                verdict.question_number,
                verdict.student_answer,
                verdict.correct_answer,
                marker(verdict.is_correct)
            );
        }
        let _ = writeln!(csv, "{},,,{}", SUMMARY_LABEL, self.score());
        csv
    }

    /// Renders the report as a plain-text table for the terminal.
    pub fn to_table(&self) -> String {
        let mut table = String::new();
        let _ = writeln!(table, "{:>8}  {:>7}  {:>7}  {}", "Question", "Student", "Correct", "");
        for verdict in &self.verdicts {
            let _ = writeln!(
                table,
                "{:>8}  {:>7}  {:>7}  {}",
                verdict.question_number,
                verdict.student_answer.to_string(),
                verdict.correct_answer.to_string(),
                marker(verdict.is_correct)
            );
        }
        let _ = writeln!(table, "{:>8}  {}", SUMMARY_LABEL, self.score());
        if self.detection.questions_detected == 0 {
            let _ = writeln!(table, "no answers detected");
        }
        table
    }
}

fn marker(is_correct: bool) -> &'static str {
    if is_correct {
        CORRECT_MARKER
    } else {
        INCORRECT_MARKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(text: &str) -> Vec<StudentAnswer> {
        text.chars()
            .map(|c| OptionLetter::from_char(c).into())
            .collect()
    }

    fn key(text: &str) -> AnswerKey {
        AnswerKey::parse(text, 4, 30).unwrap()
    }

    #[test]
    fn test_parse_key_is_case_insensitive_and_ignores_whitespace() {
        assert_eq!(key("ab cD\n"), key("ABCD"));
        assert_eq!(key("abcd").len(), 4);
    }

    #[test]
    fn test_parse_key_rejects_bad_input() {
        assert_eq!(AnswerKey::parse("  ", 4, 30), Err(AnswerKeyError::Empty));
        assert_eq!(
            AnswerKey::parse("ABE", 4, 30),
            Err(AnswerKeyError::InvalidLetter {
                letter: 'E',
                position: 3,
                last: 'D'
            })
        );
        assert!(matches!(
            AnswerKey::parse("A1", 4, 30),
            Err(AnswerKeyError::InvalidLetter { letter: '1', .. })
        ));
        assert_eq!(
            AnswerKey::parse(&"A".repeat(31), 4, 30),
            Err(AnswerKeyError::TooLong {
                length: 31,
                max: 30
            })
        );
        assert!(AnswerKey::parse("ABCDE", 5, 30).is_ok());
    }

    #[test]
    fn test_grade_all_correct() {
        let report = grade_answers(&answers("ABCD"), &key("abcd"), DetectionSummary::default());
        assert_eq!(report.total_correct, 4);
        assert_eq!(report.total_evaluated, 4);
        assert_eq!(report.score(), "4 / 4");
        assert_eq!(report.verdicts[2].question_number, 3);
        assert!(report.verdicts.iter().all(|v| v.is_correct));
    }

    #[test]
    fn test_no_answer_is_never_correct() {
        let report = grade_answers(&answers("A-AA"), &key("AAAA"), DetectionSummary::default());
        assert_eq!(report.total_correct, 3);
        assert_eq!(report.verdicts[1].student_answer, StudentAnswer::NoAnswer);
        assert!(!report.verdicts[1].is_correct);
    }

    #[test]
    fn test_key_longer_than_answers_grades_overlap() {
        let report = grade_answers(
            &answers("ABCDAB"),
            &key("ABCDABCDAB"),
            DetectionSummary::default(),
        );
        assert_eq!(report.verdicts.len(), 6);
        assert_eq!(report.total_evaluated, 6);
        assert_eq!(report.total_questions, 10);
        assert_eq!(report.score(), "6 / 10");
    }

    #[test]
    fn test_answers_longer_than_key_grades_overlap() {
        let report = grade_answers(&answers("ABCDAB"), &key("AB"), DetectionSummary::default());
        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(report.total_correct, 2);
    }

    #[test]
    fn test_no_answers() {
        let report = grade_answers(&[], &key("ABC"), DetectionSummary::default());
        assert!(report.verdicts.is_empty());
        assert_eq!(report.score(), "0 / 3");
        assert!(report.to_table().contains("no answers detected"));
    }

    #[test]
    fn test_to_csv() {
        let report = grade_answers(&answers("AC"), &key("AB"), DetectionSummary::default());
        assert_eq!(
            report.to_csv(),
            "Question,Student Answer,Correct Answer,Correct?\n\
             1,A,A,✔\n\
             2,C,B,✘\n\
             Total,,,1 / 2\n"
        );
    }

    #[test]
    fn test_answer_key_serializes_as_letters() {
        assert_eq!(
            serde_json::to_string(&key(" ab c ")).unwrap(),
            r#"["A","B","C"]"#
        );
    }

    #[test]
    fn test_report_json() {
        let report = grade_answers(&answers("-"), &key("D"), DetectionSummary::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdicts"][0]["studentAnswer"], "-");
        assert_eq!(json["verdicts"][0]["correctAnswer"], "D");
        assert_eq!(json["verdicts"][0]["isCorrect"], false);
        assert_eq!(json["totalQuestions"], 1);
    }
}

//! Core data model types for aceprep.
//!
//! Everything the generation service hands back is deserialized into these
//! types and treated as immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Examination a practice session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExamLevel {
    #[default]
    #[serde(rename = "JEE Main")]
    JeeMain,
    #[serde(rename = "JEE Advanced")]
    JeeAdvanced,
    #[serde(rename = "NEET")]
    Neet,
}

impl ExamLevel {
    pub const ALL: [ExamLevel; 3] = [ExamLevel::JeeMain, ExamLevel::JeeAdvanced, ExamLevel::Neet];

    /// Years for which the archive browser offers past papers, newest first.
    pub fn archive_years(&self) -> Vec<u16> {
        let newest = match self {
            ExamLevel::JeeMain | ExamLevel::Neet => 2024,
            ExamLevel::JeeAdvanced => 2023,
        };
        (0..10).map(|offset| newest - offset).collect()
    }
}

impl fmt::Display for ExamLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamLevel::JeeMain => write!(f, "JEE Main"),
            ExamLevel::JeeAdvanced => write!(f, "JEE Advanced"),
            ExamLevel::Neet => write!(f, "NEET"),
        }
    }
}

impl FromStr for ExamLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "jeemain" | "main" => Ok(ExamLevel::JeeMain),
            "jeeadvanced" | "jeeadv" | "advanced" => Ok(ExamLevel::JeeAdvanced),
            "neet" => Ok(ExamLevel::Neet),
            _ => Err(format!("unknown exam: {s}")),
        }
    }
}

/// Question counts offered by the custom test form.
pub const QUESTION_COUNT_OPTIONS: [u32; 7] = [15, 25, 30, 45, 50, 60, 75];

/// Daily study capacities offered by the time table form.
pub const STUDY_HOUR_OPTIONS: [u32; 7] = [4, 6, 8, 10, 12, 14, 16];

/// How a question is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    /// Single correct option out of an ordered list, answered by letter.
    #[serde(rename = "MCQ")]
    SingleChoice { options: Vec<String> },
    /// Free-form numeric value, compared as an exact string.
    #[serde(rename = "NUMERICAL")]
    Numerical,
}

/// One generated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within its set.
    pub id: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub question_text: String,
    /// Option letter for MCQs, the numeric value otherwise.
    pub correct_answer: String,
    /// Step-by-step worked solution.
    pub solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
}

impl Question {
    /// Options of a single-choice question; empty for numerical ones.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::SingleChoice { options } => options,
            QuestionKind::Numerical => &[],
        }
    }

    /// Normalise a user's answer for this question.
    ///
    /// MCQ answers are reduced to an upper-case option letter and must name
    /// an offered option. Numerical answers are only trimmed. Returns `None`
    /// when the token is blank.
    pub fn normalize_answer(&self, token: &str) -> Option<Result<String, String>> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match &self.kind {
            QuestionKind::SingleChoice { options } => option_index(trimmed, options)
                .map(|i| option_letter(i).to_string())
                .ok_or_else(|| trimmed.to_string()),
            QuestionKind::Numerical => Ok(trimmed.to_string()),
        })
    }
}

/// Most options a multiple choice question may carry, one per letter.
pub const MAX_OPTIONS: usize = 26;

/// Letter label of the option at `index` (`0 => 'A'`), or `'?'` past `'Z'`.
pub fn option_letter(index: usize) -> char {
    match u8::try_from(index) {
        Ok(i) if index < MAX_OPTIONS => char::from(b'A' + i),
        _ => '?',
    }
}

/// Resolve an option reference to its index.
///
/// Accepts a bare letter in either case, the letter decorated as `(B)`,
/// `B)` or `B.`, or the exact option text.
pub fn option_index(token: &str, options: &[String]) -> Option<usize> {
    let trimmed = token.trim();
    let bare = trimmed
        .trim_start_matches('(')
        .trim_end_matches([')', '.'])
        .trim();
    let mut chars = bare.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
            if idx < options.len() {
                return Some(idx);
            }
        }
    }
    options.iter().position(|o| o.trim() == trimmed)
}

/// An ordered, immutable set of generated questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Subject label as echoed by the generator.
    pub subject: String,
    /// Topic label as echoed by the generator.
    pub topic: String,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A revision summary for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaCard {
    pub title: String,
    pub formulas: Vec<String>,
    pub concepts: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<String>,
    pub pro_tip: String,
}

/// What a schedule slot is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    Theory,
    Practice,
    Revision,
    Break,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Theory => write!(f, "Theory"),
            SlotKind::Practice => write!(f, "Practice"),
            SlotKind::Revision => write!(f, "Revision"),
            SlotKind::Break => write!(f, "Break"),
        }
    }
}

/// One entry of a daily study schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub time: String,
    pub activity: String,
    pub subject: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: SlotKind,
}

/// A generated daily study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTable {
    pub title: String,
    pub description: String,
    pub schedule: Vec<ScheduleSlot>,
    pub tips: Vec<String>,
}

/// Worked solution to a previous-year question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PyqSolution {
    pub underlying_concept: String,
    pub mathematical_derivation: String,
    pub pro_tip: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(options: &[&str]) -> Question {
        Question {
            id: 1,
            kind: QuestionKind::SingleChoice {
                options: options.iter().map(|s| s.to_string()).collect(),
            },
            question_text: "?".into(),
            correct_answer: "A".into(),
            solution: String::new(),
            difficulty_level: None,
        }
    }

    #[test]
    fn option_letters_stop_at_z() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(MAX_OPTIONS - 1), 'Z');
        assert_eq!(option_letter(MAX_OPTIONS), '?');
        assert_eq!(option_letter(300), '?');
    }

    #[test]
    fn exam_level_display_and_parse() {
        assert_eq!(ExamLevel::JeeMain.to_string(), "JEE Main");
        assert_eq!("jee-advanced".parse::<ExamLevel>(), Ok(ExamLevel::JeeAdvanced));
        assert_eq!("JEE Main".parse::<ExamLevel>(), Ok(ExamLevel::JeeMain));
        assert_eq!("neet".parse::<ExamLevel>(), Ok(ExamLevel::Neet));
        assert!("gre".parse::<ExamLevel>().is_err());
    }

    #[test]
    fn exam_level_serializes_with_official_name() {
        let json = serde_json::to_string(&ExamLevel::JeeAdvanced).unwrap();
        assert_eq!(json, "\"JEE Advanced\"");
    }

    #[test]
    fn archive_years_are_newest_first() {
        let years = ExamLevel::JeeAdvanced.archive_years();
        assert_eq!(years.len(), 10);
        assert_eq!(years[0], 2023);
        assert_eq!(years[9], 2014);
        assert_eq!(ExamLevel::Neet.archive_years()[0], 2024);
    }

    #[test]
    fn option_references_resolve() {
        let options: Vec<String> = ["1 m/s", "2 m/s", "3 m/s", "4 m/s"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(option_index("b", &options), Some(1));
        assert_eq!(option_index("(C)", &options), Some(2));
        assert_eq!(option_index("D.", &options), Some(3));
        assert_eq!(option_index("2 m/s", &options), Some(1));
        assert_eq!(option_index("E", &options), None);
        assert_eq!(option_index("5 m/s", &options), None);
    }

    #[test]
    fn normalize_answer_by_kind() {
        let q = mcq(&["x", "y"]);
        assert_eq!(q.normalize_answer(" b "), Some(Ok("B".into())));
        assert_eq!(q.normalize_answer("z"), Some(Err("z".into())));
        assert_eq!(q.normalize_answer("   "), None);

        let numeric = Question {
            kind: QuestionKind::Numerical,
            ..mcq(&[])
        };
        assert_eq!(numeric.normalize_answer(" 2.50 "), Some(Ok("2.50".into())));
    }

    #[test]
    fn question_wire_shape() {
        let q = mcq(&["x", "y"]);
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "MCQ");
        assert_eq!(value["questionText"], "?");
        assert_eq!(value["options"][1], "y");
        assert!(value.get("difficultyLevel").is_none());
    }
}

//! Generation requests, their prompts and schemas, and strict parsing of
//! what comes back.
//!
//! A response either deserializes into the declared shape and passes
//! validation, or the whole request fails. Nothing is salvaged field by
//! field and nothing is retried automatically.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::GenerationError;
use crate::model::{
    option_index, option_letter, ExamLevel, FormulaCard, PyqSolution, Question, QuestionKind,
    QuestionSet, TimeTable, MAX_OPTIONS,
};
use crate::traits::{
    extract_json_from_markdown, GenerateRequest, LlmProvider, TokenUsage, DEFAULT_SYSTEM_PROMPT,
};

/// Number of questions in an archive quiz.
pub const ARCHIVE_QUIZ_LENGTH: u32 = 10;

/// One call to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    PracticeTest {
        subjects: Vec<String>,
        topics: Vec<String>,
        count: u32,
        exam: ExamLevel,
    },
    FormulaCard {
        topic: String,
        exam: ExamLevel,
    },
    TimeTable {
        hours: u32,
        exam: ExamLevel,
        weak_areas: Vec<String>,
        focus_subjects: Vec<String>,
    },
    ArchiveQuiz {
        exam: ExamLevel,
        year: u16,
        subject: String,
        topic: String,
    },
    PyqSolution {
        question: String,
        exam: ExamLevel,
        year: u16,
        subject: String,
    },
}

/// A validated generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    PracticeTest(QuestionSet),
    FormulaCard(FormulaCard),
    TimeTable(TimeTable),
    ArchiveQuiz(QuestionSet),
    PyqSolution(PyqSolution),
}

impl GenerationRequest {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::PracticeTest { .. } => "practice_test",
            GenerationRequest::FormulaCard { .. } => "formula_card",
            GenerationRequest::TimeTable { .. } => "time_table",
            GenerationRequest::ArchiveQuiz { .. } => "archive_quiz",
            GenerationRequest::PyqSolution { .. } => "pyq_solution",
        }
    }

    /// The natural-language instruction sent to the model.
    pub fn prompt(&self) -> String {
        match self {
            GenerationRequest::PracticeTest {
                subjects,
                topics,
                count,
                exam,
            } => format!(
                "Create a professional {count}-question practice test for the following subject(s): {subjects}, specifically focusing on these topic(s): \"{topics}\" for the {exam} examination.\n\n\
                 Strict Requirements:\n\
                 1. Standards: Align with the latest NTA (National Testing Agency) standards, question patterns, and current syllabus.\n\
                 2. Question Types: Include a balanced mix of Single Correct Multiple Choice Questions (MCQ, exactly 4 options, answer given as the option letter A-D) and Numerical Value Type Questions (answer given as the exact number).\n\
                 3. Mixed Content: If multiple subjects or topics are provided, distribute the questions proportionally across them.\n\
                 4. Difficulty Distribution: Simulate a real exam with approximately 20% Easy, 50% Moderate, and 30% Challenging questions.\n\
                 5. Quality: Focus on conceptual application, multi-step reasoning, and analytical depth. Avoid purely memory-based questions.\n\
                 6. Solutions: Provide a meticulous, step-by-step mathematical or logical derivation for every solution.\n\
                 7. Identifiers: Number the questions 1 to {count}.",
                subjects = subjects.join(", "),
                topics = topics.join(", "),
            ),
            GenerationRequest::FormulaCard { topic, exam } => format!(
                "Summarize the key formulas, important reactions (if applicable), and essential concepts for {topic} for the {exam} syllabus. \
                 Present them as bulleted points for quick revision and include one common shortcut or tip for solving problems."
            ),
            GenerationRequest::TimeTable {
                hours,
                exam,
                weak_areas,
                focus_subjects,
            } => {
                let weak = if weak_areas.is_empty() {
                    "none specified".to_string()
                } else {
                    weak_areas.join(", ")
                };
                format!(
                    "Generate a high-productivity daily study time table for a student preparing for {exam}.\n\
                     Daily Study Capacity: {hours} hours.\n\
                     Focus Subjects: {focus}.\n\
                     Weak Areas to prioritize: {weak}.\n\
                     Provide a detailed hourly schedule including breaks, theory, and practice sessions. \
                     Ensure the distribution of time is balanced between the selected focus subjects.",
                    focus = focus_subjects.join(", "),
                )
            }
            GenerationRequest::ArchiveQuiz {
                exam,
                year,
                subject,
                topic,
            } => format!(
                "Generate a realistic {ARCHIVE_QUIZ_LENGTH}-question MCQ test of Previous Year Questions (PYQs) for {exam} {year} targeting the topic: \"{topic}\" in {subject}.\n\
                 Requirements:\n\
                 - Authenticity: Questions must mirror official {exam} format and difficulty.\n\
                 - Variety: Mix of easy, medium, and hard levels; label each with difficultyLevel.\n\
                 - Options: exactly 4 options per question, answer given as the option letter A-D.\n\
                 - Detailed Solutions: Provide step-by-step logic for each."
            ),
            GenerationRequest::PyqSolution {
                question,
                exam,
                year,
                subject,
            } => format!(
                "Solve the following Previous Year Question (PYQ) from {exam} {year} {subject}.\n\
                 Question: {question}\n\n\
                 Provide:\n\
                 1. The underlying fundamental concept.\n\
                 2. A step-by-step mathematical derivation or logical explanation.\n\
                 3. A \"Pro-Tip\" or shortcut for solving similar questions faster in the actual exam."
            ),
        }
    }

    /// JSON schema of the expected response.
    pub fn schema(&self) -> Value {
        match self {
            GenerationRequest::PracticeTest { .. } => question_set_schema(false),
            GenerationRequest::ArchiveQuiz { .. } => question_set_schema(true),
            GenerationRequest::FormulaCard { .. } => json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "formulas": { "type": "array", "items": { "type": "string" } },
                    "concepts": { "type": "array", "items": { "type": "string" } },
                    "reactions": { "type": "array", "items": { "type": "string" } },
                    "proTip": { "type": "string" }
                },
                "required": ["title", "formulas", "concepts", "proTip"]
            }),
            GenerationRequest::TimeTable { .. } => json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "schedule": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "time": { "type": "string" },
                                "activity": { "type": "string" },
                                "subject": { "type": "string" },
                                "topic": { "type": "string" },
                                "type": {
                                    "type": "string",
                                    "enum": ["Theory", "Practice", "Revision", "Break"]
                                }
                            },
                            "required": ["time", "activity", "subject", "topic", "type"]
                        }
                    },
                    "tips": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["title", "description", "schedule", "tips"]
            }),
            GenerationRequest::PyqSolution { .. } => json!({
                "type": "object",
                "properties": {
                    "underlyingConcept": { "type": "string" },
                    "mathematicalDerivation": { "type": "string" },
                    "proTip": { "type": "string" }
                },
                "required": ["underlyingConcept", "mathematicalDerivation", "proTip"]
            }),
        }
    }

    /// Parse and validate a response body for this request.
    pub fn parse(&self, content: &str) -> Result<Generated, GenerationError> {
        let body = extract_json_from_markdown(content);
        if body.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        match self {
            GenerationRequest::PracticeTest { .. } => {
                let wire: WireQuestionSet = serde_json::from_str(&body)?;
                Ok(Generated::PracticeTest(wire.into_question_set(false)?))
            }
            GenerationRequest::ArchiveQuiz { .. } => {
                let wire: WireQuestionSet = serde_json::from_str(&body)?;
                Ok(Generated::ArchiveQuiz(wire.into_question_set(true)?))
            }
            GenerationRequest::FormulaCard { .. } => {
                let card: FormulaCard = serde_json::from_str(&body)?;
                if card.title.trim().is_empty() {
                    return Err(GenerationError::ShapeMismatch("card has no title".into()));
                }
                Ok(Generated::FormulaCard(card))
            }
            GenerationRequest::TimeTable { .. } => {
                let table: TimeTable = serde_json::from_str(&body)?;
                if table.schedule.is_empty() {
                    return Err(GenerationError::ShapeMismatch("schedule is empty".into()));
                }
                Ok(Generated::TimeTable(table))
            }
            GenerationRequest::PyqSolution { .. } => {
                Ok(Generated::PyqSolution(serde_json::from_str(&body)?))
            }
        }
    }
}

fn question_set_schema(archive: bool) -> Value {
    let mut item_required = vec!["id", "type", "questionText", "correctAnswer", "solution"];
    if archive {
        item_required.push("options");
    }
    let mut item_properties = json!({
        "id": { "type": "integer" },
        "type": { "type": "string", "enum": ["MCQ", "NUMERICAL"] },
        "questionText": { "type": "string" },
        "options": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Array of 4 options for MCQs. Leave empty for NUMERICAL type."
        },
        "correctAnswer": {
            "type": "string",
            "description": "The correct option letter (A/B/C/D) or the specific numerical value."
        },
        "solution": {
            "type": "string",
            "description": "Detailed step-by-step pedagogical solution."
        }
    });
    if archive {
        item_properties["difficultyLevel"] = json!({ "type": "string" });
    }
    json!({
        "type": "object",
        "properties": {
            "subject": { "type": "string" },
            "topic": { "type": "string" },
            "questions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": item_properties,
                    "required": item_required
                }
            }
        },
        "required": ["subject", "topic", "questions"]
    })
}

// ---------------------------------------------------------------------------
// Wire format for question sets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireQuestionSet {
    subject: String,
    topic: String,
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    id: f64,
    #[serde(rename = "type")]
    kind: String,
    question_text: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: String,
    solution: String,
    #[serde(default)]
    difficulty_level: Option<String>,
}

impl WireQuestionSet {
    fn into_question_set(self, mcq_only: bool) -> Result<QuestionSet, GenerationError> {
        if self.questions.is_empty() {
            return Err(GenerationError::ShapeMismatch("no questions returned".into()));
        }

        let mut seen = HashSet::new();
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                let id = q.integral_id()?;
                if !seen.insert(id) {
                    return Err(GenerationError::ShapeMismatch(format!(
                        "duplicate question id {id}"
                    )));
                }
                let question = q.into_question(id)?;
                if mcq_only && matches!(question.kind, QuestionKind::Numerical) {
                    return Err(GenerationError::ShapeMismatch(format!(
                        "question {id} is numerical in an MCQ-only set"
                    )));
                }
                Ok(question)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionSet {
            subject: self.subject,
            topic: self.topic,
            questions,
        })
    }
}

impl WireQuestion {
    fn integral_id(&self) -> Result<u32, GenerationError> {
        let id = self.id;
        if id.fract() != 0.0 || id < 0.0 || id > u32::MAX as f64 {
            return Err(GenerationError::ShapeMismatch(format!(
                "question id {id} is not a non-negative integer"
            )));
        }
        Ok(id as u32)
    }

    fn into_question(self, id: u32) -> Result<Question, GenerationError> {
        let (kind, correct_answer) = match self.kind.trim().to_uppercase().as_str() {
            "MCQ" => {
                let options = self.options.unwrap_or_default();
                if options.len() < 2 {
                    return Err(GenerationError::ShapeMismatch(format!(
                        "MCQ {id} has {} option(s)",
                        options.len()
                    )));
                }
                if options.len() > MAX_OPTIONS {
                    return Err(GenerationError::ShapeMismatch(format!(
                        "MCQ {id} has {} options; at most {MAX_OPTIONS} are supported",
                        options.len()
                    )));
                }
                let index = option_index(&self.correct_answer, &options).ok_or_else(|| {
                    GenerationError::ShapeMismatch(format!(
                        "MCQ {id} answer {:?} does not name an option",
                        self.correct_answer
                    ))
                })?;
                (
                    QuestionKind::SingleChoice { options },
                    option_letter(index).to_string(),
                )
            }
            "NUMERICAL" => {
                let answer = self.correct_answer.trim().to_string();
                if answer.is_empty() {
                    return Err(GenerationError::ShapeMismatch(format!(
                        "numerical question {id} has no answer"
                    )));
                }
                (QuestionKind::Numerical, answer)
            }
            other => {
                return Err(GenerationError::ShapeMismatch(format!(
                    "question {id} has unknown type {other:?}"
                )))
            }
        };

        Ok(Question {
            id,
            kind,
            question_text: self.question_text,
            correct_answer,
            solution: self.solution,
            difficulty_level: self.difficulty_level,
        })
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Settings applied to every generation call.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            temperature: 0.7,
            max_tokens: 8192,
            system_prompt_override: None,
        }
    }
}

/// A validated result together with call metadata.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub generated: Generated,
    pub model: String,
    pub token_usage: TokenUsage,
    pub latency_ms: u64,
}

/// Sends generation requests to a provider and validates the replies.
pub struct Generator {
    provider: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run one request end to end.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        let start = Instant::now();
        let call = GenerateRequest {
            model: self.config.model.clone(),
            prompt: request.prompt(),
            system_prompt: Some(
                self.config
                    .system_prompt_override
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            response_schema: Some(request.schema()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::info!(
            kind = request.kind(),
            provider = self.provider.name(),
            model = %self.config.model,
            "requesting generation"
        );

        let response = self.provider.generate(&call).await.map_err(|e| {
            tracing::error!(kind = request.kind(), "generation request failed: {e:#}");
            GenerationError::Request(e)
        })?;

        let generated = request.parse(&response.content).map_err(|e| {
            tracing::error!(kind = request.kind(), "rejected generation response: {e}");
            e
        })?;

        tracing::debug!(
            kind = request.kind(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            tokens = response.token_usage.total_tokens,
            "generation complete"
        );

        Ok(GenerationOutput {
            generated,
            model: response.model,
            token_usage: response.token_usage,
            latency_ms: response.latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::traits::{GenerateResponse, ModelInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed body or a fixed error and records requests.
    struct ScriptedProvider {
        reply: Result<String, String>,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedProvider {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("boom".into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(body) => Ok(GenerateResponse {
                    content: body.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                Err(_) => Err(ProviderError::NetworkError("connection reset".into()).into()),
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn practice_request() -> GenerationRequest {
        GenerationRequest::PracticeTest {
            subjects: vec!["Physics".into(), "Chemistry".into()],
            topics: vec!["Optics".into(), "Hydrocarbons".into()],
            count: 15,
            exam: ExamLevel::JeeAdvanced,
        }
    }

    const PRACTICE_BODY: &str = r#"{
        "subject": "Physics, Chemistry",
        "topic": "Optics, Hydrocarbons",
        "questions": [
            {"id": 1, "type": "MCQ", "questionText": "Focal length?", "options": ["10 cm", "20 cm", "30 cm", "40 cm"], "correctAnswer": "(b)", "solution": "Use the lens formula."},
            {"id": 2.0, "type": "NUMERICAL", "questionText": "Carbons in propane?", "correctAnswer": " 3 ", "solution": "C3H8."}
        ]
    }"#;

    #[test]
    fn practice_prompt_joins_selection() {
        let prompt = practice_request().prompt();
        assert!(prompt.contains("15-question"));
        assert!(prompt.contains("Physics, Chemistry"));
        assert!(prompt.contains("\"Optics, Hydrocarbons\""));
        assert!(prompt.contains("JEE Advanced"));
    }

    #[test]
    fn schemas_declare_required_fields() {
        let schema = practice_request().schema();
        assert_eq!(schema["required"], json!(["subject", "topic", "questions"]));
        let item = &schema["properties"]["questions"]["items"];
        assert!(!item["required"].as_array().unwrap().contains(&json!("options")));

        let archive = GenerationRequest::ArchiveQuiz {
            exam: ExamLevel::Neet,
            year: 2022,
            subject: "Biology".into(),
            topic: "Genetics".into(),
        }
        .schema();
        let item = &archive["properties"]["questions"]["items"];
        assert!(item["required"].as_array().unwrap().contains(&json!("options")));
        assert!(item["properties"]["difficultyLevel"].is_object());
    }

    #[test]
    fn parse_practice_test_normalizes_answers() {
        let Generated::PracticeTest(set) = practice_request().parse(PRACTICE_BODY).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[0].correct_answer, "B");
        assert_eq!(set.questions[1].id, 2);
        assert_eq!(set.questions[1].correct_answer, "3");
        assert_eq!(set.questions[1].kind, QuestionKind::Numerical);
    }

    #[test]
    fn parse_accepts_fenced_json() {
        let fenced = format!("```json\n{PRACTICE_BODY}\n```");
        assert!(practice_request().parse(&fenced).is_ok());
    }

    #[test]
    fn parse_rejects_missing_required_field() {
        let body = r#"{"subject": "Physics", "questions": []}"#;
        assert!(matches!(
            practice_request().parse(body),
            Err(GenerationError::MalformedJson(_))
        ));
    }

    #[test]
    fn parse_rejects_shape_violations() {
        let cases = [
            r#"{"subject": "P", "topic": "T", "questions": []}"#,
            r#"{"subject": "P", "topic": "T", "questions": [
                {"id": 1, "type": "NUMERICAL", "questionText": "q", "correctAnswer": "1", "solution": "s"},
                {"id": 1, "type": "NUMERICAL", "questionText": "q", "correctAnswer": "2", "solution": "s"}]}"#,
            r#"{"subject": "P", "topic": "T", "questions": [
                {"id": 1.5, "type": "NUMERICAL", "questionText": "q", "correctAnswer": "1", "solution": "s"}]}"#,
            r#"{"subject": "P", "topic": "T", "questions": [
                {"id": 1, "type": "MCQ", "questionText": "q", "options": ["a", "b"], "correctAnswer": "D", "solution": "s"}]}"#,
            r#"{"subject": "P", "topic": "T", "questions": [
                {"id": 1, "type": "ESSAY", "questionText": "q", "correctAnswer": "x", "solution": "s"}]}"#,
        ];
        for body in cases {
            assert!(
                matches!(
                    practice_request().parse(body),
                    Err(GenerationError::ShapeMismatch(_))
                ),
                "expected shape mismatch for {body}"
            );
        }
    }

    #[test]
    fn mcq_with_more_options_than_letters_is_rejected() {
        let options: Vec<String> = (0..27).map(|i| format!("option {i}")).collect();
        let body = serde_json::json!({
            "subject": "Physics",
            "topic": "Optics",
            "questions": [{
                "id": 1,
                "type": "MCQ",
                "questionText": "q",
                "options": options,
                "correctAnswer": "A",
                "solution": "s"
            }]
        })
        .to_string();
        match practice_request().parse(&body) {
            Err(GenerationError::ShapeMismatch(msg)) => assert!(msg.contains("27 options")),
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn archive_quiz_rejects_numerical() {
        let request = GenerationRequest::ArchiveQuiz {
            exam: ExamLevel::JeeMain,
            year: 2024,
            subject: "Physics".into(),
            topic: "Optics".into(),
        };
        let body = r#"{"subject": "Physics", "topic": "Optics", "questions": [
            {"id": 1, "type": "NUMERICAL", "questionText": "q", "options": [], "correctAnswer": "1", "solution": "s"}]}"#;
        assert!(matches!(
            request.parse(body),
            Err(GenerationError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn parse_time_table_and_solution() {
        let table = GenerationRequest::TimeTable {
            hours: 8,
            exam: ExamLevel::JeeMain,
            weak_areas: vec![],
            focus_subjects: vec!["Physics".into()],
        };
        let body = r#"{"title": "Day plan", "description": "Balanced", "tips": ["Sleep"],
            "schedule": [{"time": "06:00", "activity": "Read", "subject": "Physics", "topic": "Optics", "type": "Theory"}]}"#;
        assert!(matches!(table.parse(body), Ok(Generated::TimeTable(_))));

        let bad_kind = body.replace("\"Theory\"", "\"Nap\"");
        assert!(matches!(
            table.parse(&bad_kind),
            Err(GenerationError::MalformedJson(_))
        ));

        let solve = GenerationRequest::PyqSolution {
            question: "Why?".into(),
            exam: ExamLevel::JeeMain,
            year: 2023,
            subject: "Physics".into(),
        };
        let body = r#"{"underlyingConcept": "c", "mathematicalDerivation": "d", "proTip": "t"}"#;
        assert!(matches!(solve.parse(body), Ok(Generated::PyqSolution(_))));
        assert!(matches!(solve.parse("  "), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn time_table_prompt_mentions_weak_areas() {
        let prompt = GenerationRequest::TimeTable {
            hours: 10,
            exam: ExamLevel::Neet,
            weak_areas: vec!["Genetics and Evolution".into(), "organic naming".into()],
            focus_subjects: vec!["Biology".into(), "Chemistry".into()],
        }
        .prompt();
        assert!(prompt.contains("10 hours"));
        assert!(prompt.contains("Biology, Chemistry"));
        assert!(prompt.contains("Genetics and Evolution, organic naming"));
    }

    #[tokio::test]
    async fn generator_sends_schema_and_parses() {
        let provider = ScriptedProvider::ok(PRACTICE_BODY);
        let generator = Generator::new(provider.clone(), GeneratorConfig::default());

        let output = generator.generate(&practice_request()).await.unwrap();
        assert!(matches!(output.generated, Generated::PracticeTest(_)));

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gemini-2.5-pro");
        assert!(seen[0].response_schema.is_some());
        assert_eq!(seen[0].system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn generator_wraps_provider_failure_without_retry() {
        let provider = ScriptedProvider::failing();
        let generator = Generator::new(provider.clone(), GeneratorConfig::default());

        let err = generator.generate(&practice_request()).await.unwrap_err();
        assert!(matches!(
            err.provider_error(),
            Some(ProviderError::NetworkError(_))
        ));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn generator_rejects_non_json() {
        let provider = ScriptedProvider::ok("Sorry, I cannot help with that.");
        let generator = Generator::new(provider, GeneratorConfig::default());
        let err = generator.generate(&practice_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedJson(_)));
    }
}

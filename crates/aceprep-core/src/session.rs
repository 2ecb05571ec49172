//! Session view state machine.
//!
//! One [`Session`] owns the current view, the configuration form of each
//! tool, the template store and the personal best. All transitions are
//! synchronous method calls except generation: [`Session::submit`] enters
//! `Loading` and hands back a [`PendingRequest`], and the caller reports the
//! outcome later through [`Session::complete`]. Every submission gets a fresh
//! [`RequestToken`]; a completion whose token is not the one the session is
//! waiting on is dropped without touching any state.

use std::fmt;
use std::sync::Arc;

use crate::catalog::SubjectCatalog;
use crate::error::{AnswerError, GenerationError, ValidationError};
use crate::generation::{Generated, GenerationRequest};
use crate::model::{ExamLevel, FormulaCard, PyqSolution, TimeTable};
use crate::scoring::{PersonalBest, ScoreResult};
use crate::selection::Selection;
use crate::sheet::AnswerSheet;
use crate::templates::{SavedTemplate, TemplateStore};

/// The four independent tools reachable from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CustomTest,
    FormulaCards,
    TimeTable,
    ArchiveBrowser,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::CustomTest => write!(f, "Custom Test"),
            Tool::FormulaCards => write!(f, "Formula Cards"),
            Tool::TimeTable => write!(f, "Time Table"),
            Tool::ArchiveBrowser => write!(f, "Archive Browser"),
        }
    }
}

/// Identifies one submission. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// A generated result on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    CustomTest(AnswerSheet),
    FormulaCards(FormulaCard),
    TimeTable(TimeTable),
    ArchiveQuiz(AnswerSheet),
    ArchiveSolution(PyqSolution),
}

impl Review {
    pub fn tool(&self) -> Tool {
        match self {
            Review::CustomTest(_) => Tool::CustomTest,
            Review::FormulaCards(_) => Tool::FormulaCards,
            Review::TimeTable(_) => Tool::TimeTable,
            Review::ArchiveQuiz(_) | Review::ArchiveSolution(_) => Tool::ArchiveBrowser,
        }
    }

    pub fn sheet(&self) -> Option<&AnswerSheet> {
        match self {
            Review::CustomTest(sheet) | Review::ArchiveQuiz(sheet) => Some(sheet),
            _ => None,
        }
    }

    fn sheet_mut(&mut self) -> Option<&mut AnswerSheet> {
        match self {
            Review::CustomTest(sheet) | Review::ArchiveQuiz(sheet) => Some(sheet),
            _ => None,
        }
    }

    fn from_generated(tool: Tool, generated: Generated) -> Option<Self> {
        match (tool, generated) {
            (Tool::CustomTest, Generated::PracticeTest(set)) => {
                Some(Review::CustomTest(AnswerSheet::new(set)))
            }
            (Tool::FormulaCards, Generated::FormulaCard(card)) => Some(Review::FormulaCards(card)),
            (Tool::TimeTable, Generated::TimeTable(table)) => Some(Review::TimeTable(table)),
            (Tool::ArchiveBrowser, Generated::ArchiveQuiz(set)) => {
                Some(Review::ArchiveQuiz(AnswerSheet::new(set)))
            }
            (Tool::ArchiveBrowser, Generated::PyqSolution(solution)) => {
                Some(Review::ArchiveSolution(solution))
            }
            _ => None,
        }
    }
}

/// The single live view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Dashboard,
    Configuring(Tool),
    Loading { tool: Tool, token: RequestToken },
    Reviewing(Review),
}

impl ViewState {
    /// The tool this view belongs to, if any.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            ViewState::Dashboard => None,
            ViewState::Configuring(tool) | ViewState::Loading { tool, .. } => Some(*tool),
            ViewState::Reviewing(review) => Some(review.tool()),
        }
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Custom Test configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTestForm {
    pub selection: Selection,
    pub exam: ExamLevel,
    pub count: u32,
}

impl CustomTestForm {
    fn new(catalog: &SubjectCatalog) -> Self {
        let selection = Selection::restore(
            catalog,
            &["Chemistry".to_string()],
            &["Hydrocarbons".to_string()],
        );
        Self {
            selection,
            exam: ExamLevel::JeeMain,
            count: 15,
        }
    }

    fn request(&self) -> Result<GenerationRequest, ValidationError> {
        if self.selection.subjects().is_empty() {
            return Err(ValidationError::NoSubjectSelected);
        }
        if self.selection.topics().is_empty() {
            return Err(ValidationError::NoTopicSelected);
        }
        Ok(GenerationRequest::PracticeTest {
            subjects: self.selection.subjects().to_vec(),
            topics: self.selection.topics().to_vec(),
            count: self.count,
            exam: self.exam,
        })
    }
}

/// Formula Cards configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaCardsForm {
    /// Subject whose chapter list is offered as suggestions.
    pub subject: String,
    pub topic: String,
    pub exam: ExamLevel,
}

impl Default for FormulaCardsForm {
    fn default() -> Self {
        Self {
            subject: "Physics".to_string(),
            topic: String::new(),
            exam: ExamLevel::JeeMain,
        }
    }
}

impl FormulaCardsForm {
    fn request(&self) -> Result<GenerationRequest, ValidationError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        Ok(GenerationRequest::FormulaCard {
            topic: topic.to_string(),
            exam: self.exam,
        })
    }
}

/// Time Table configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTableForm {
    pub hours: u32,
    pub exam: ExamLevel,
    pub focus_subjects: Vec<String>,
    /// Chapters picked as weak areas.
    pub weak_chapters: Vec<String>,
    /// Free-text weak areas.
    pub weak_notes: String,
}

impl Default for TimeTableForm {
    fn default() -> Self {
        Self {
            hours: 8,
            exam: ExamLevel::JeeMain,
            focus_subjects: vec!["Physics".to_string()],
            weak_chapters: Vec::new(),
            weak_notes: String::new(),
        }
    }
}

impl TimeTableForm {
    /// Add or remove a focus subject. Returns whether it is focused afterwards.
    pub fn toggle_focus_subject(&mut self, name: &str) -> bool {
        if self.focus_subjects.iter().any(|s| s == name) {
            self.focus_subjects.retain(|s| s != name);
            false
        } else {
            self.focus_subjects.push(name.to_string());
            true
        }
    }

    pub fn add_weak_chapter(&mut self, chapter: &str) -> bool {
        if chapter.is_empty() || self.weak_chapters.iter().any(|c| c == chapter) {
            return false;
        }
        self.weak_chapters.push(chapter.to_string());
        true
    }

    pub fn remove_weak_chapter(&mut self, chapter: &str) -> bool {
        let before = self.weak_chapters.len();
        self.weak_chapters.retain(|c| c != chapter);
        self.weak_chapters.len() != before
    }

    fn request(&self) -> Result<GenerationRequest, ValidationError> {
        if self.focus_subjects.is_empty() {
            return Err(ValidationError::NoFocusSubject);
        }
        let mut weak_areas = self.weak_chapters.clone();
        let notes = self.weak_notes.trim();
        if !notes.is_empty() {
            weak_areas.push(notes.to_string());
        }
        Ok(GenerationRequest::TimeTable {
            hours: self.hours,
            exam: self.exam,
            weak_areas,
            focus_subjects: self.focus_subjects.clone(),
        })
    }
}

/// Which half of the archive browser is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    /// Generate a past-paper quiz for a chapter.
    #[default]
    Browse,
    /// Solve one pasted question.
    Manual,
}

/// Archive Browser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveForm {
    pub exam: ExamLevel,
    pub year: u16,
    pub mode: ArchiveMode,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub question: String,
}

/// Subject assumed by the manual solver when none is picked.
const FALLBACK_SOLVER_SUBJECT: &str = "Physics";

impl ArchiveForm {
    fn new(exam: ExamLevel, year: u16) -> Self {
        Self {
            exam,
            year,
            mode: ArchiveMode::Browse,
            subject: None,
            topic: None,
            question: String::new(),
        }
    }

    fn request(&self) -> Result<GenerationRequest, ValidationError> {
        match self.mode {
            ArchiveMode::Browse => match (&self.subject, &self.topic) {
                (Some(subject), Some(topic)) if !topic.trim().is_empty() => {
                    Ok(GenerationRequest::ArchiveQuiz {
                        exam: self.exam,
                        year: self.year,
                        subject: subject.clone(),
                        topic: topic.trim().to_string(),
                    })
                }
                _ => Err(ValidationError::NoArchiveTopic),
            },
            ArchiveMode::Manual => {
                let question = self.question.trim();
                if question.is_empty() {
                    return Err(ValidationError::EmptyQuestion);
                }
                Ok(GenerationRequest::PyqSolution {
                    question: question.to_string(),
                    exam: self.exam,
                    year: self.year,
                    subject: self
                        .subject
                        .clone()
                        .unwrap_or_else(|| FALLBACK_SOLVER_SUBJECT.to_string()),
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Forms {
    custom_test: CustomTestForm,
    formula_cards: FormulaCardsForm,
    time_table: TimeTableForm,
    archive: ArchiveForm,
}

impl Forms {
    fn new(standard: &SubjectCatalog) -> Self {
        Self {
            custom_test: CustomTestForm::new(standard),
            formula_cards: FormulaCardsForm::default(),
            time_table: TimeTableForm::default(),
            archive: ArchiveForm::new(ExamLevel::JeeMain, 2024),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A request the caller must run and report back with [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub tool: Tool,
    pub request: GenerationRequest,
}

/// What [`Session::complete`] did with a completion.
#[derive(Debug)]
pub enum Completion {
    /// The result is now under review.
    Applied,
    /// The session returned to configuring; nothing was kept.
    Failed(GenerationError),
    /// The token was superseded; the session was not touched.
    Discarded,
}

/// One user session across all tools.
pub struct Session {
    standard: Arc<SubjectCatalog>,
    archive: Arc<SubjectCatalog>,
    view: ViewState,
    forms: Forms,
    last_token: u64,
    templates: TemplateStore,
    personal_best: PersonalBest,
}

impl Session {
    /// A session on the dashboard.
    ///
    /// `standard` backs the Custom Test, Formula Cards and Time Table tools;
    /// `archive` backs the Archive Browser.
    pub fn new(
        standard: Arc<SubjectCatalog>,
        archive: Arc<SubjectCatalog>,
        templates: TemplateStore,
        personal_best: PersonalBest,
    ) -> Self {
        let forms = Forms::new(&standard);
        Self {
            standard,
            archive,
            view: ViewState::Dashboard,
            forms,
            last_token: 0,
            templates,
            personal_best,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn standard_catalog(&self) -> &SubjectCatalog {
        &self.standard
    }

    pub fn archive_catalog(&self) -> &SubjectCatalog {
        &self.archive
    }

    /// Navigate to the dashboard, discarding all tool state. Templates and
    /// the personal best are kept. Any in-flight request becomes stale.
    pub fn go_dashboard(&mut self) {
        if self.view != ViewState::Dashboard {
            tracing::debug!(from = ?self.view.tool(), "returning to dashboard");
        }
        self.view = ViewState::Dashboard;
        self.forms = Forms::new(&self.standard);
    }

    /// Start configuring `tool`. From anywhere but the dashboard this first
    /// navigates back to it.
    pub fn open(&mut self, tool: Tool) {
        if self.view != ViewState::Dashboard {
            self.go_dashboard();
        }
        tracing::debug!(%tool, "opening tool");
        self.view = ViewState::Configuring(tool);
    }

    /// Open the archive browser with `exam` and `year` preset.
    pub fn open_archive(&mut self, exam: ExamLevel, year: u16) {
        self.open(Tool::ArchiveBrowser);
        self.forms.archive = ArchiveForm::new(exam, year);
    }

    // -- forms --------------------------------------------------------------

    pub fn custom_test_form(&self) -> &CustomTestForm {
        &self.forms.custom_test
    }

    pub fn formula_cards_form(&self) -> &FormulaCardsForm {
        &self.forms.formula_cards
    }

    pub fn time_table_form(&self) -> &TimeTableForm {
        &self.forms.time_table
    }

    pub fn archive_form(&self) -> &ArchiveForm {
        &self.forms.archive
    }

    pub fn formula_cards_form_mut(&mut self) -> &mut FormulaCardsForm {
        &mut self.forms.formula_cards
    }

    pub fn time_table_form_mut(&mut self) -> &mut TimeTableForm {
        &mut self.forms.time_table
    }

    pub fn archive_form_mut(&mut self) -> &mut ArchiveForm {
        &mut self.forms.archive
    }

    /// Toggle a Custom Test subject.
    pub fn toggle_subject(&mut self, name: &str) -> bool {
        self.forms.custom_test.selection.toggle_subject(&self.standard, name)
    }

    /// Add a Custom Test topic.
    pub fn add_topic(&mut self, name: &str) -> bool {
        self.forms.custom_test.selection.add_topic(&self.standard, name)
    }

    pub fn remove_topic(&mut self, name: &str) -> bool {
        self.forms.custom_test.selection.remove_topic(name)
    }

    pub fn toggle_all_in_subject(&mut self, subject: &str) {
        self.forms
            .custom_test
            .selection
            .toggle_all_in_subject(&self.standard, subject);
    }

    /// Replace the Custom Test selection, keeping only what the catalog
    /// supports.
    pub fn set_selection(&mut self, subjects: &[String], topics: &[String]) {
        self.forms.custom_test.selection = Selection::restore(&self.standard, subjects, topics);
    }

    pub fn set_exam(&mut self, exam: ExamLevel) {
        self.forms.custom_test.exam = exam;
    }

    pub fn set_count(&mut self, count: u32) {
        self.forms.custom_test.count = count;
    }

    /// Choose the archive subject, clearing a topic that belongs to another
    /// subject.
    pub fn select_archive_subject(&mut self, subject: &str) -> Result<(), ValidationError> {
        if !self.archive.contains_subject(subject) {
            return Err(ValidationError::UnknownSubject(subject.to_string()));
        }
        let form = &mut self.forms.archive;
        if let Some(topic) = &form.topic {
            if !self.archive.subject_has_topic(subject, topic) {
                form.topic = None;
            }
        }
        form.subject = Some(subject.to_string());
        Ok(())
    }

    /// Choose the archive topic. Free text is allowed.
    pub fn select_archive_topic(&mut self, topic: &str) {
        self.forms.archive.mode = ArchiveMode::Browse;
        self.forms.archive.topic = Some(topic.to_string());
    }

    // -- templates ----------------------------------------------------------

    pub fn templates(&self) -> &[SavedTemplate] {
        self.templates.list()
    }

    /// Snapshot the current Custom Test form as a template.
    pub fn save_template(&mut self) -> &SavedTemplate {
        let form = &self.forms.custom_test;
        self.templates.save(&form.selection, form.exam, form.count)
    }

    /// Load a template into the Custom Test form. Returns `false` for an
    /// unknown id, leaving the form untouched.
    pub fn apply_template(&mut self, id: &str) -> bool {
        let Some(applied) = self.templates.apply(id) else {
            return false;
        };
        let form = &mut self.forms.custom_test;
        form.selection = Selection::restore(&self.standard, &applied.subjects, &applied.topics);
        form.exam = applied.exam_level;
        form.count = applied.count;
        true
    }

    pub fn remove_template(&mut self, id: &str) -> bool {
        self.templates.remove(id)
    }

    pub fn personal_best(&self) -> i32 {
        self.personal_best.current()
    }

    // -- generation ---------------------------------------------------------

    /// Validate the current form and enter `Loading`.
    ///
    /// On a validation error nothing changes and no request is produced.
    pub fn submit(&mut self) -> Result<PendingRequest, ValidationError> {
        let tool = match &self.view {
            ViewState::Configuring(tool) => *tool,
            ViewState::Loading { .. } => return Err(ValidationError::AlreadyLoading),
            _ => return Err(ValidationError::NotConfiguring),
        };

        let request = match tool {
            Tool::CustomTest => self.forms.custom_test.request(),
            Tool::FormulaCards => self.forms.formula_cards.request(),
            Tool::TimeTable => self.forms.time_table.request(),
            Tool::ArchiveBrowser => self.forms.archive.request(),
        }?;

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        tracing::info!(%tool, token = self.last_token, kind = request.kind(), "submitting");
        self.view = ViewState::Loading { tool, token };

        Ok(PendingRequest {
            token,
            tool,
            request,
        })
    }

    /// Report the outcome of the request issued with `token`.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<Generated, GenerationError>,
    ) -> Completion {
        let tool = match self.view {
            ViewState::Loading {
                tool,
                token: waiting,
            } if waiting == token => tool,
            _ => {
                tracing::debug!(token = token.0, "discarding superseded completion");
                return Completion::Discarded;
            }
        };

        let outcome = outcome.and_then(|generated| {
            Review::from_generated(tool, generated).ok_or_else(|| {
                GenerationError::ShapeMismatch(format!("result does not belong to {tool}"))
            })
        });

        match outcome {
            Ok(review) => {
                self.view = ViewState::Reviewing(review);
                Completion::Applied
            }
            Err(e) => {
                tracing::warn!(%tool, "generation failed: {e}");
                self.view = ViewState::Configuring(tool);
                Completion::Failed(e)
            }
        }
    }

    /// Leave review for the same tool's form, discarding the result.
    pub fn start_over(&mut self) -> bool {
        if let ViewState::Reviewing(review) = &self.view {
            self.view = ViewState::Configuring(review.tool());
            true
        } else {
            false
        }
    }

    /// The result under review, if any.
    pub fn current_result(&self) -> Option<&Review> {
        match &self.view {
            ViewState::Reviewing(review) => Some(review),
            _ => None,
        }
    }

    // -- answering ----------------------------------------------------------

    /// Record an answer on the sheet under review.
    pub fn answer(&mut self, question_id: u32, token: &str) -> Result<(), AnswerError> {
        self.sheet_mut()?.answer(question_id, token)
    }

    /// Submit the sheet under review. Archive quizzes update the personal
    /// best on their first submission.
    pub fn submit_answers(&mut self) -> Result<ScoreResult, AnswerError> {
        let ViewState::Reviewing(review) = &mut self.view else {
            return Err(AnswerError::NoSheet);
        };
        let is_archive = matches!(review, Review::ArchiveQuiz(_));
        let sheet = review.sheet_mut().ok_or(AnswerError::NoSheet)?;
        let first_submission = !sheet.is_submitted();
        let result = sheet.submit().clone();

        if is_archive && first_submission {
            self.personal_best.record(result.total);
        }
        Ok(result)
    }

    fn sheet_mut(&mut self) -> Result<&mut AnswerSheet, AnswerError> {
        match &mut self.view {
            ViewState::Reviewing(review) => review.sheet_mut().ok_or(AnswerError::NoSheet),
            _ => Err(AnswerError::NoSheet),
        }
    }
}

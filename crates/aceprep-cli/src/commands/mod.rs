//! Subcommand implementations and the plumbing they share.

pub mod archive;
pub mod best;
pub mod cards;
pub mod catalog;
pub mod init;
pub mod models;
pub mod render;
pub mod solve;
pub mod templates;
pub mod test;
pub mod timetable;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use aceprep_core::catalog::SubjectCatalog;
use aceprep_core::generation::{Generator, GeneratorConfig};
use aceprep_core::model::QuestionSet;
use aceprep_core::persist::LocalStorage;
use aceprep_core::scoring::PersonalBest;
use aceprep_core::session::{Completion, Session};
use aceprep_core::templates::TemplateStore;
use aceprep_providers::{create_provider, load_config_from, AceprepConfig};

use crate::GlobalArgs;

/// Loaded configuration plus the global flag overrides.
pub struct AppContext {
    pub config: AceprepConfig,
    pub data_dir: PathBuf,
    provider: Option<String>,
    model: Option<String>,
}

impl AppContext {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = load_config_from(global.config.as_deref())?;
        let data_dir = global
            .data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone());
        Ok(Self {
            config,
            data_dir,
            provider: global.provider.clone(),
            model: global.model.clone(),
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider
            .as_deref()
            .unwrap_or(&self.config.default_provider)
    }

    /// The standard catalog, or the configured replacement.
    pub fn standard_catalog(&self) -> Result<SubjectCatalog> {
        let Some(path) = &self.config.catalog else {
            return Ok(SubjectCatalog::standard());
        };
        let catalog = SubjectCatalog::load(path)?;
        for warning in catalog.validate() {
            tracing::warn!(
                subject = warning.subject.as_deref().unwrap_or("-"),
                "catalog {}: {}",
                path.display(),
                warning.message
            );
        }
        anyhow::ensure!(
            !catalog.subjects().is_empty(),
            "catalog {} has no subjects",
            path.display()
        );
        Ok(catalog)
    }

    /// A session on the dashboard backed by the data directory.
    pub fn session(&self) -> Result<Session> {
        let storage = LocalStorage::new(&self.data_dir);
        Ok(Session::new(
            Arc::new(self.standard_catalog()?),
            Arc::new(SubjectCatalog::archive()),
            TemplateStore::open(storage.templates()),
            PersonalBest::open(storage.personal_best()),
        ))
    }

    /// The generator for the selected provider and model.
    pub fn generator(&self) -> Result<Generator> {
        let name = self.provider_name();
        let provider_config = self.config.provider(name)?;
        let provider = create_provider(name, provider_config)?;
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        Ok(Generator::new(
            provider,
            GeneratorConfig {
                model,
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
                system_prompt_override: None,
            },
        ))
    }
}

/// Submit the session's current form and apply the generation outcome.
pub async fn run_generation(session: &mut Session, generator: &Generator) -> Result<()> {
    let pending = session.submit()?;
    eprintln!(
        "Generating {} with {}/{} ...",
        pending.tool,
        generator.provider_name(),
        generator.model()
    );
    let outcome = generator
        .generate(&pending.request)
        .await
        .map(|output| output.generated);

    match session.complete(pending.token, outcome) {
        Completion::Applied => Ok(()),
        Completion::Failed(e) => Err(anyhow::Error::new(e).context(format!(
            "could not generate {}; nothing was kept, try again",
            pending.tool
        ))),
        Completion::Discarded => anyhow::bail!("generation result arrived after the session moved on"),
    }
}

/// Parse `"1=A,2=5"` into `(id, token)` pairs.
pub fn parse_answers(spec: &str) -> Result<Vec<(u32, String)>> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, token) = entry
                .split_once('=')
                .with_context(|| format!("answer '{entry}' is not of the form ID=ANSWER"))?;
            let id = id
                .trim()
                .parse::<u32>()
                .with_context(|| format!("answer '{entry}' has a non-numeric question id"))?;
            Ok((id, token.trim().to_string()))
        })
        .collect()
}

/// Ask for an answer to every question on stdin. A blank line skips.
pub fn prompt_answers(set: &QuestionSet) -> Result<Vec<(u32, String)>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::new();
    for question in &set.questions {
        render::print_question(question);
        print!("Your answer for Q{} (blank to skip): ", question.id);
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line.context("failed to read answer")?;
        answers.push((question.id, line));
    }
    Ok(answers)
}

/// Record answers on the session's sheet, reporting rejected ones.
pub fn record_answers(session: &mut Session, answers: &[(u32, String)]) {
    for (id, token) in answers {
        if let Err(e) = session.answer(*id, token) {
            eprintln!("Skipping answer {id}={token}: {e}");
        }
    }
}

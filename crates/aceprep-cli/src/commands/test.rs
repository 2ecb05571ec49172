//! The `aceprep test` command.

use anyhow::{Context as _, Result};

use aceprep_core::model::QUESTION_COUNT_OPTIONS;
use aceprep_core::session::{Review, Session, Tool};

use super::{parse_answers, prompt_answers, record_answers, render, run_generation, AppContext};
use crate::{GlobalArgs, SelectionArgs};

/// Apply selection flags to the Custom Test form.
///
/// Explicit `--subjects`/`--topics` replace the current selection; without
/// them a template's (or the default) selection is kept.
pub(crate) fn apply_selection(session: &mut Session, selection: &SelectionArgs) -> Result<()> {
    let catalog = session.standard_catalog();
    for name in selection.subjects.iter().chain(&selection.all_topics) {
        anyhow::ensure!(
            catalog.contains_subject(name),
            "unknown subject '{name}' (available: {})",
            catalog.subject_names().collect::<Vec<_>>().join(", ")
        );
    }

    if !selection.subjects.is_empty() || !selection.topics.is_empty() {
        let mut subjects = selection.subjects.clone();
        if subjects.is_empty() {
            subjects = session.custom_test_form().selection.subjects().to_vec();
        }
        session.set_selection(&subjects, &[]);
        for topic in &selection.topics {
            if !session.add_topic(topic) {
                tracing::warn!(topic = %topic, "chapter is not offered by any selected subject");
                eprintln!("Ignoring chapter '{topic}': no selected subject lists it");
            }
        }
    }

    for subject in &selection.all_topics {
        if !session.custom_test_form().selection.has_subject(subject) {
            session.toggle_subject(subject);
        }
        if !session
            .custom_test_form()
            .selection
            .all_selected_in(session.standard_catalog(), subject)
        {
            session.toggle_all_in_subject(subject);
        }
    }

    if let Some(exam) = selection.exam {
        session.set_exam(exam);
    }
    if let Some(count) = selection.count {
        anyhow::ensure!(
            QUESTION_COUNT_OPTIONS.contains(&count),
            "question count must be one of {QUESTION_COUNT_OPTIONS:?}, got {count}"
        );
        session.set_count(count);
    }
    Ok(())
}

pub async fn execute(
    global: &GlobalArgs,
    selection: SelectionArgs,
    template: Option<String>,
    save_template: bool,
    answers: Option<String>,
    interactive: bool,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;
    session.open(Tool::CustomTest);
    session.set_exam(ctx.config.default_exam);

    if let Some(id) = &template {
        anyhow::ensure!(session.apply_template(id), "no saved template with id '{id}'");
    }
    apply_selection(&mut session, &selection)?;

    if save_template {
        let saved = session.save_template();
        eprintln!("Saved template {}", saved.id);
    }

    let answers = answers.as_deref().map(parse_answers).transpose()?;
    let generator = ctx.generator()?;
    run_generation(&mut session, &generator).await?;

    let set = match session.current_result() {
        Some(Review::CustomTest(sheet)) => sheet.questions().clone(),
        _ => anyhow::bail!("no practice test to review"),
    };

    let answers = match answers {
        Some(answers) => Some(answers),
        None if interactive => Some(prompt_answers(&set)?),
        None => None,
    };

    let Some(answers) = answers else {
        if json {
            println!("{}", serde_json::to_string_pretty(&set)?);
        } else {
            render::print_question_set(&set);
        }
        return Ok(());
    };

    record_answers(&mut session, &answers);
    let result = session
        .submit_answers()
        .context("failed to submit answers")?;

    if json {
        let output = serde_json::json!({ "questions": set, "score": result });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render::print_score(&set, &result);
    }
    Ok(())
}

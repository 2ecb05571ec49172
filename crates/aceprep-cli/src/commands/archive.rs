//! The `aceprep archive` command: a past-paper quiz on one chapter.

use anyhow::{Context as _, Result};

use aceprep_core::model::ExamLevel;
use aceprep_core::session::Review;

use super::{parse_answers, prompt_answers, record_answers, render, run_generation, AppContext};
use crate::GlobalArgs;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    global: &GlobalArgs,
    subject: String,
    topic: String,
    exam: Option<ExamLevel>,
    year: Option<u16>,
    answers: Option<String>,
    interactive: bool,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;

    let exam = exam.unwrap_or(ctx.config.default_exam);
    let years = exam.archive_years();
    let year = match year {
        Some(year) => {
            anyhow::ensure!(
                years.contains(&year),
                "no {exam} papers for {year} (available: {:?})",
                years
            );
            year
        }
        None => years[0],
    };

    session.open_archive(exam, year);
    session.select_archive_subject(&subject)?;
    if !session.archive_catalog().subject_has_topic(&subject, &topic) {
        tracing::info!(subject = %subject, topic = %topic, "topic is not in the archive chapter list");
    }
    session.select_archive_topic(&topic);

    let answers = answers.as_deref().map(parse_answers).transpose()?;
    let best_before = session.personal_best();
    let generator = ctx.generator()?;
    run_generation(&mut session, &generator).await?;

    let set = match session.current_result() {
        Some(Review::ArchiveQuiz(sheet)) => sheet.questions().clone(),
        _ => anyhow::bail!("no archive quiz to review"),
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
            println!("{exam} {year}");
            render::print_question_set(&set);
        }
        return Ok(());
    };

    record_answers(&mut session, &answers);
    let result = session
        .submit_answers()
        .context("failed to submit answers")?;
    let best = session.personal_best();

    if json {
        let output = serde_json::json!({
            "questions": set,
            "score": result,
            "personal_best": best,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render::print_score(&set, &result);
        if best > best_before {
            println!("New personal best: {best}");
        } else {
            println!("Personal best: {best}");
        }
    }
    Ok(())
}

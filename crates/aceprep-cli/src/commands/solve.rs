//! The `aceprep solve` command: the archive browser's manual solver.

use anyhow::Result;

use aceprep_core::model::ExamLevel;
use aceprep_core::session::{ArchiveMode, Review};

use super::{render, run_generation, AppContext};
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    question: String,
    subject: Option<String>,
    exam: Option<ExamLevel>,
    year: Option<u16>,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;

    let exam = exam.unwrap_or(ctx.config.default_exam);
    let year = year.unwrap_or_else(|| exam.archive_years()[0]);
    session.open_archive(exam, year);
    if let Some(subject) = &subject {
        session.select_archive_subject(subject)?;
    }

    let form = session.archive_form_mut();
    form.mode = ArchiveMode::Manual;
    form.question = question;

    let generator = ctx.generator()?;
    run_generation(&mut session, &generator).await?;

    let Some(Review::ArchiveSolution(solution)) = session.current_result() else {
        anyhow::bail!("no solution to show");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(solution)?);
    } else {
        render::print_solution(solution);
    }
    Ok(())
}

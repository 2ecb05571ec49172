//! The `aceprep timetable` command.

use anyhow::Result;

use aceprep_core::model::{ExamLevel, STUDY_HOUR_OPTIONS};
use aceprep_core::session::{Review, Tool};

use super::{render, run_generation, AppContext};
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    subjects: Vec<String>,
    chapters: Vec<String>,
    weak: Option<String>,
    hours: Option<u32>,
    exam: Option<ExamLevel>,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;
    session.open(Tool::TimeTable);

    if let Some(hours) = hours {
        anyhow::ensure!(
            STUDY_HOUR_OPTIONS.contains(&hours),
            "study hours must be one of {STUDY_HOUR_OPTIONS:?}, got {hours}"
        );
    }

    let catalog = session.standard_catalog();
    for name in subjects.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        anyhow::ensure!(
            catalog.contains_subject(name),
            "unknown subject '{name}' (available: {})",
            catalog.subject_names().collect::<Vec<_>>().join(", ")
        );
    }
    for chapter in chapters.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        anyhow::ensure!(
            catalog.subjects_for_topic(chapter).next().is_some(),
            "unknown chapter '{chapter}': no subject lists it"
        );
    }

    let form = session.time_table_form_mut();
    if !subjects.is_empty() {
        form.focus_subjects.clear();
        for subject in subjects.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !form.focus_subjects.iter().any(|s| s == subject) {
                form.toggle_focus_subject(subject);
            }
        }
    }
    for chapter in &chapters {
        form.add_weak_chapter(chapter.trim());
    }
    if let Some(notes) = weak {
        form.weak_notes = notes;
    }
    if let Some(hours) = hours {
        form.hours = hours;
    }
    form.exam = exam.unwrap_or(ctx.config.default_exam);

    let generator = ctx.generator()?;
    run_generation(&mut session, &generator).await?;

    let Some(Review::TimeTable(plan)) = session.current_result() else {
        anyhow::bail!("no time table to show");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        render::print_time_table(plan);
    }
    Ok(())
}

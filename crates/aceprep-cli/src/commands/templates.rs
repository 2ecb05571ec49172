//! The `aceprep templates` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use aceprep_core::session::Tool;
use aceprep_core::templates::MAX_TEMPLATES;

use super::test::apply_selection;
use super::AppContext;
use crate::{GlobalArgs, SelectionArgs};

pub fn list(global: &GlobalArgs) -> Result<()> {
    let session = AppContext::load(global)?.session()?;
    let templates = session.templates();
    if templates.is_empty() {
        println!("No saved templates.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Exam", "Subjects", "Chapters", "Questions", "Saved"]);
    for t in templates {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(t.exam_level),
            Cell::new(t.subjects.join(", ")),
            Cell::new(t.topics.len()),
            Cell::new(t.count),
            Cell::new(t.saved_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    println!("{} of {MAX_TEMPLATES} slots used", templates.len());
    Ok(())
}

pub fn save(global: &GlobalArgs, selection: SelectionArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;
    session.open(Tool::CustomTest);
    session.set_exam(ctx.config.default_exam);
    apply_selection(&mut session, &selection)?;

    let saved = session.save_template();
    println!("{}", saved.id);
    Ok(())
}

pub fn show(global: &GlobalArgs, id: &str) -> Result<()> {
    let session = AppContext::load(global)?.session()?;
    let Some(t) = session.templates().iter().find(|t| t.id == id) else {
        anyhow::bail!("no saved template with id '{id}'");
    };
    println!("{}", serde_json::to_string_pretty(t)?);
    Ok(())
}

pub fn remove(global: &GlobalArgs, id: &str) -> Result<()> {
    let mut session = AppContext::load(global)?.session()?;
    anyhow::ensure!(
        session.remove_template(id),
        "no saved template with id '{id}'"
    );
    println!("Removed template {id}");
    Ok(())
}

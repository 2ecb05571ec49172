//! The `aceprep catalog` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use aceprep_core::catalog::SubjectCatalog;

use super::AppContext;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, archive: bool, subject: Option<String>) -> Result<()> {
    let catalog = if archive {
        SubjectCatalog::archive()
    } else {
        AppContext::load(global)?.standard_catalog()?
    };

    if let Some(name) = &subject {
        anyhow::ensure!(
            catalog.contains_subject(name),
            "unknown subject '{name}' (available: {})",
            catalog.subject_names().collect::<Vec<_>>().join(", ")
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Chapters", "Count"]);
    for entry in catalog.subjects() {
        if subject.as_ref().is_some_and(|name| *name != entry.name) {
            continue;
        }
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(entry.topics.join("\n")),
            Cell::new(entry.topics.len()),
        ]);
    }
    println!("{table}");

    Ok(())
}

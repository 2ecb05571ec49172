//! The `aceprep cards` command.

use anyhow::Result;

use aceprep_core::model::ExamLevel;
use aceprep_core::session::{Review, Tool};

use super::{render, run_generation, AppContext};
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    topic: String,
    exam: Option<ExamLevel>,
    json: bool,
) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let mut session = ctx.session()?;
    session.open(Tool::FormulaCards);

    let form = session.formula_cards_form_mut();
    form.topic = topic;
    form.exam = exam.unwrap_or(ctx.config.default_exam);

    let generator = ctx.generator()?;
    run_generation(&mut session, &generator).await?;

    let Some(Review::FormulaCards(card)) = session.current_result() else {
        anyhow::bail!("no formula card to show");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(card)?);
    } else {
        render::print_formula_card(card);
    }
    Ok(())
}

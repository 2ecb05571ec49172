//! The `aceprep best` command.

use anyhow::Result;

use super::AppContext;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let session = AppContext::load(global)?.session()?;
    println!("Archive personal best: {}", session.personal_best());
    Ok(())
}

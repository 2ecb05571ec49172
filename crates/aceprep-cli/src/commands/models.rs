//! The `aceprep models` command.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use aceprep_core::traits::LlmProvider;
use aceprep_providers::anthropic::AnthropicProvider;
use aceprep_providers::gemini::GeminiProvider;
use aceprep_providers::openai::OpenAiProvider;

use super::AppContext;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let filter = global.provider.as_deref();

    // Model lists are static, so no key is needed to build the clients.
    let providers: Vec<Arc<dyn LlmProvider>> = vec![
        Arc::new(GeminiProvider::new("", None)?),
        Arc::new(AnthropicProvider::new("", None)?),
        Arc::new(OpenAiProvider::new("", None, None)?),
    ];

    let mut table = Table::new();
    table.set_header(vec!["Provider", "Model", "Name", "Context", "Configured"]);
    let mut rows = 0;
    for provider in &providers {
        if filter.is_some_and(|name| name != provider.name()) {
            continue;
        }
        let configured = ctx.config.providers.contains_key(provider.name());
        for model in provider.available_models() {
            let marker = if configured && model.id == ctx.config.default_model {
                "default"
            } else if configured {
                "yes"
            } else {
                "no"
            };
            table.add_row(vec![
                Cell::new(&model.provider),
                Cell::new(&model.id),
                Cell::new(&model.name),
                Cell::new(model.max_context),
                Cell::new(marker),
            ]);
            rows += 1;
        }
    }

    if rows == 0 {
        if let Some(name) = filter {
            anyhow::bail!("no known models for provider '{name}'");
        }
    }
    println!("{table}");
    Ok(())
}

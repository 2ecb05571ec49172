//! The `aceprep init` command.

use anyhow::Result;

use aceprep_providers::config::LOCAL_CONFIG_FILE;

pub fn execute() -> Result<()> {
    if std::path::Path::new(LOCAL_CONFIG_FILE).exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit {LOCAL_CONFIG_FILE})");
    println!("  2. Run: aceprep catalog");
    println!("  3. Run: aceprep test --subjects Physics --topics Electrostatics");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# aceprep configuration

default_provider = "gemini"
default_model = "gemini-2.5-pro"
temperature = 0.7
max_tokens = 8192
default_exam = "JEE Main"
data_dir = "./.aceprep"

# Replace the built-in subject list with your own:
# catalog = "my-syllabus.toml"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

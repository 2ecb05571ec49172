//! aceprep CLI: AI-generated exam practice from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use aceprep_core::model::ExamLevel;

mod commands;

#[derive(Parser)]
#[command(
    name = "aceprep",
    version,
    about = "Practice tests, formula cards and study plans for JEE and NEET"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file path (default: ./aceprep.toml, then ~/.config/aceprep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding saved templates and the personal best
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Provider name from the config (default: default_provider)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model id (default: default_model)
    #[arg(long, global = true)]
    model: Option<String>,
}

/// Subject/topic selection shared by `test` and `templates save`.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Subjects, comma-separated (e.g. "Physics,Chemistry")
    #[arg(long, value_delimiter = ',')]
    subjects: Vec<String>,

    /// Chapters, comma-separated; each must belong to a selected subject
    #[arg(long, value_delimiter = ',')]
    topics: Vec<String>,

    /// Select every chapter of this subject (repeatable)
    #[arg(long)]
    all_topics: Vec<String>,

    /// Exam level: "JEE Main", "JEE Advanced" or "NEET"
    #[arg(long)]
    exam: Option<ExamLevel>,

    /// Number of questions (15, 25, 30, 45, 50, 60 or 75)
    #[arg(long)]
    count: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter aceprep.toml
    Init,

    /// List subjects and chapters
    Catalog {
        /// Show the archive browser's chapter lists
        #[arg(long)]
        archive: bool,

        /// Only this subject
        #[arg(long)]
        subject: Option<String>,
    },

    /// Generate a custom practice test
    Test {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Start from a saved template
        #[arg(long)]
        template: Option<String>,

        /// Save the configuration as a template before generating
        #[arg(long)]
        save_template: bool,

        /// Answers to score, e.g. "1=A,2=5,3=C"
        #[arg(long)]
        answers: Option<String>,

        /// Prompt for each answer on stdin
        #[arg(long)]
        interactive: bool,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a formula revision card
    Cards {
        /// Topic to summarise
        #[arg(long)]
        topic: String,

        #[arg(long)]
        exam: Option<ExamLevel>,

        #[arg(long)]
        json: bool,
    },

    /// Generate a daily study time table
    Timetable {
        /// Focus subjects, comma-separated
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,

        /// Weak chapters, comma-separated
        #[arg(long, value_delimiter = ',')]
        chapters: Vec<String>,

        /// Other weak areas, free text
        #[arg(long)]
        weak: Option<String>,

        /// Daily study hours (4 to 16, even)
        #[arg(long)]
        hours: Option<u32>,

        #[arg(long)]
        exam: Option<ExamLevel>,

        #[arg(long)]
        json: bool,
    },

    /// Take a past-paper quiz on one chapter
    Archive {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        topic: String,

        #[arg(long)]
        exam: Option<ExamLevel>,

        /// Paper year (defaults to the newest for the exam)
        #[arg(long)]
        year: Option<u16>,

        /// Answers to score, e.g. "1=A,2=D"
        #[arg(long)]
        answers: Option<String>,

        /// Prompt for each answer on stdin
        #[arg(long)]
        interactive: bool,

        #[arg(long)]
        json: bool,
    },

    /// Get a worked solution for a previous-year question
    Solve {
        /// The question text
        #[arg(long)]
        question: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        exam: Option<ExamLevel>,

        #[arg(long)]
        year: Option<u16>,

        #[arg(long)]
        json: bool,
    },

    /// Manage saved test templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Show the archive personal best
    Best,

    /// List known models (filter with --provider)
    Models,
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List saved templates, most recent first
    List,
    /// Save a template without generating a test
    Save {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Show one template
    Show { id: String },
    /// Delete one template
    Remove { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aceprep=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Catalog { archive, subject } => {
            commands::catalog::execute(&global, archive, subject)
        }
        Commands::Test {
            selection,
            template,
            save_template,
            answers,
            interactive,
            json,
        } => {
            commands::test::execute(
                &global,
                selection,
                template,
                save_template,
                answers,
                interactive,
                json,
            )
            .await
        }
        Commands::Cards { topic, exam, json } => {
            commands::cards::execute(&global, topic, exam, json).await
        }
        Commands::Timetable {
            subjects,
            chapters,
            weak,
            hours,
            exam,
            json,
        } => commands::timetable::execute(&global, subjects, chapters, weak, hours, exam, json).await,
        Commands::Archive {
            subject,
            topic,
            exam,
            year,
            answers,
            interactive,
            json,
        } => {
            commands::archive::execute(
                &global,
                subject,
                topic,
                exam,
                year,
                answers,
                interactive,
                json,
            )
            .await
        }
        Commands::Solve {
            question,
            subject,
            exam,
            year,
            json,
        } => commands::solve::execute(&global, question, subject, exam, year, json).await,
        Commands::Templates { action } => match action {
            TemplateAction::List => commands::templates::list(&global),
            TemplateAction::Save { selection } => commands::templates::save(&global, selection),
            TemplateAction::Show { id } => commands::templates::show(&global, &id),
            TemplateAction::Remove { id } => commands::templates::remove(&global, &id),
        },
        Commands::Best => commands::best::execute(&global),
        Commands::Models => commands::models::execute(&global),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

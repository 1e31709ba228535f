//! lectern CLI — worksheet checking and markdown study reading.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lectern", version, about = "Study worksheet checker and markdown reader")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check worksheet answers against reference answers
    Check {
        /// Path to a .toml worksheet or a directory of worksheets
        #[arg(long)]
        worksheet: PathBuf,

        /// Answer set file, or directory of `{id}.json` files
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Output directory for saved reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Saved report formats: none, json, html, markdown, all
        #[arg(long, default_value = "none")]
        format: String,

        /// Earlier report JSON to compare against
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Score only against the primary reference text
        #[arg(long)]
        primary_only: bool,

        /// Exit code 1 unless every worksheet is fully correct
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Compare two check reports
    Compare {
        /// Earlier report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Later report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any answer got worse
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Grade a single answer
    Grade {
        /// The learner's answer
        #[arg(long)]
        answer: String,

        /// The reference text
        #[arg(long)]
        reference: String,

        /// Alternate reference texts
        #[arg(long = "alt")]
        alternates: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a markdown document to a reader page
    Render {
        /// Markdown document (defaults to the configured document)
        #[arg(long)]
        document: Option<PathBuf>,

        /// Output file for the page format
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: page, fragment, json
        #[arg(long, default_value = "page")]
        format: String,

        /// Include stored notes in the page
        #[arg(long)]
        with_notes: bool,
    },

    /// Print the table of contents
    Toc {
        #[arg(long)]
        document: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a section and remember it as the current one
    Goto {
        /// Section id, `next`, `prev`, or omitted with --line
        target: Option<String>,

        /// Show the section containing this line
        #[arg(long, conflicts_with = "target")]
        line: Option<usize>,

        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Search headings and paragraphs
    Search {
        query: String,

        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Manage study notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Validate worksheets and answer sets
    Validate {
        /// Path to a worksheet file or directory
        #[arg(long)]
        worksheet: PathBuf,

        /// Answer set file or directory to validate against
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Create a starter config, worksheet, answer set and document
    Init,
}

#[derive(Subcommand)]
pub(crate) enum NotesAction {
    /// Print stored notes
    Show,
    /// Replace stored notes
    Set {
        /// New notes text
        #[arg(required_unless_present = "file")]
        text: Option<String>,

        /// Read the notes from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Export notes as JSON
    Export {
        /// Destination file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace notes from an exported JSON file
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match lectern_core::config::load_config_from(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Check {
                worksheet,
                answers,
                output,
                format,
                baseline,
                primary_only,
                fail_on_error,
            } => {
                commands::check::execute(
                    &config,
                    commands::check::CheckArgs {
                        worksheet,
                        answers,
                        output,
                        format,
                        baseline,
                        primary_only,
                        fail_on_error,
                    },
                )
                .await
            }
            Commands::Compare {
                baseline,
                current,
                fail_on_regression,
                format,
            } => commands::compare::execute(baseline, current, fail_on_regression, format),
            Commands::Grade {
                answer,
                reference,
                alternates,
                json,
            } => commands::grade::execute(answer, reference, alternates, json),
            Commands::Render {
                document,
                output,
                format,
                with_notes,
            } => commands::render::execute(&config, document, output, format, with_notes).await,
            Commands::Toc { document, json } => commands::toc::execute(&config, document, json).await,
            Commands::Goto {
                target,
                line,
                document,
            } => commands::goto::execute(&config, target, line, document).await,
            Commands::Search { query, document } => {
                commands::search::execute(&config, query, document).await
            }
            Commands::Notes { action } => commands::notes::execute(&config, action).await,
            Commands::Validate { worksheet, answers } => {
                commands::validate::execute(&config, worksheet, answers)
            }
            Commands::Init => commands::init::execute(),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const DEFAULT_LOG_FILTER: &str = "lectern_core=info,lectern_cli=info";

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod db;
mod error;
mod grading;
mod input;
mod models;
mod policy;
mod report;
mod stats;
mod transcript;

use error::GradingError;
use models::{CourseResult, GradeRow};
use policy::WeightPolicy;
use report::GradingScale;

#[derive(Parser)]
#[command(name = "gradebook-reports")]
#[command(about = "Weighted grades, transcripts and course performance reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Read grade rows from this CSV file instead of Postgres
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample courses, students and grades
    Seed,
    /// Import grade rows from a CSV file into the database
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Change a course's assignment/quiz/exam weights
    SetWeights {
        #[arg(long)]
        course: String,
        #[arg(long)]
        assignment: i32,
        #[arg(long)]
        quiz: i32,
        #[arg(long)]
        exam: i32,
    },
    /// Generate a course performance report
    CourseReport {
        #[arg(long)]
        course: String,
        #[command(flatten)]
        source: Source,
        /// Number of sections; looked up in the database when omitted
        #[arg(long)]
        sections: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a student transcript
    Transcript {
        #[arg(long)]
        student: i32,
        #[command(flatten)]
        source: Source,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List every student's grades in a course
    Gradebook {
        #[arg(long)]
        course: String,
        #[command(flatten)]
        source: Source,
        #[arg(long, value_enum, default_value_t = GradingScale::Percentage)]
        scale: GradingScale,
    },
    /// Show one student's grades across courses
    Grades {
        #[arg(long)]
        student: i32,
        #[command(flatten)]
        source: Source,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set unless --csv is given")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_results(source: &Source, scope: db::RowScope<'_>) -> anyhow::Result<Vec<CourseResult>> {
    let rows: Vec<GradeRow> = match &source.csv {
        Some(path) => {
            let rows = input::read_rows_from_path(path)?;
            match scope {
                db::RowScope::Course(name) => input::for_course(rows, name),
                db::RowScope::Student(id) => input::for_student(rows, id),
            }
        }
        None => db::fetch_rows(&connect().await?, scope).await?,
    };

    input::into_results(rows)
}

fn emit(output: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            // Formatting is finished before the file is touched.
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let rows = input::read_rows_from_path(&csv)?;
            let written = db::import_rows(&connect().await?, rows).await?;
            println!("Stored {written} grade records from {}.", csv.display());
        }
        Commands::SetWeights {
            course,
            assignment,
            quiz,
            exam,
        } => {
            let policy = WeightPolicy::new(assignment, quiz, exam)?;
            if db::set_course_weights(&connect().await?, &course, &policy).await? {
                println!("Weights updated for {course}.");
            } else {
                println!("No course named {course}.");
            }
        }
        Commands::CourseReport {
            course,
            source,
            sections,
            format,
            out,
        } => {
            let results = load_results(&source, db::RowScope::Course(&course)).await?;
            let sections = match (sections, &source.csv) {
                (Some(sections), _) => sections,
                (None, Some(_)) => 1,
                (None, None) => db::count_sections(&connect().await?, &course).await?,
            };
            info!(course = %course, rows = results.len(), sections, "generating course report");

            let output = match format {
                OutputFormat::Text => report::course_report(&course, sections, &results, today())?,
                OutputFormat::Json => {
                    let (summary, performance) =
                        stats::course_statistics(&course, sections, &results)?;
                    serde_json::to_string_pretty(&serde_json::json!({
                        "summary": summary,
                        "performance": performance,
                    }))? + "\n"
                }
            };
            emit(&output, out.as_deref())?;
        }
        Commands::Transcript {
            student,
            source,
            format,
            out,
        } => {
            let results = load_results(&source, db::RowScope::Student(student)).await?;
            info!(student, rows = results.len(), "generating transcript");

            let transcript = transcript::build_transcript(student, results)?;
            let output = match format {
                OutputFormat::Text => report::build_transcript_report(&transcript, today()),
                OutputFormat::Json => serde_json::to_string_pretty(&transcript)? + "\n",
            };
            emit(&output, out.as_deref())?;
        }
        Commands::Gradebook {
            course,
            source,
            scale,
        } => {
            let results = load_results(&source, db::RowScope::Course(&course)).await?;
            print!("{}", report::build_gradebook(&course, &results, scale));
        }
        Commands::Grades { student, source } => {
            let results = load_results(&source, db::RowScope::Student(student)).await?;
            print!("{}", report::build_grade_sheet(&results));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Err(err) => match err.downcast_ref::<GradingError>() {
            Some(GradingError::EmptyInput(scope)) => {
                println!("No grade data available for {scope}.");
                Ok(())
            }
            Some(GradingError::InvalidWeights { .. } | GradingError::InvalidScore { .. }) => {
                Err(err.context("rejected malformed numeric input"))
            }
            None => Err(err),
        },
        ok => ok,
    }
}

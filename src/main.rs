//! CLI entry point for the student portal tool.
//!
//! Provides subcommands for logging in to the records portal, fetching and
//! cleaning academic results, classifying a CGPA, and running the proxy
//! server the dashboard talks to.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use student_portal::{
    config::Config,
    fetch::{BasicClient, fetch_bytes},
    infra::{
        portal::client::PortalClient,
        session::{FileTokenStore, Session, TokenStore},
    },
    output::{append_courses, append_semesters, print_pretty, render_transcript},
    parser::parse_payload,
    results::{DedupPolicy, GradeClass, clean_results, types::CleanResults},
    server::{start_server, state::AppState},
    services::portal_api::{Credentials, PortalApi},
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "student_portal")]
#[command(about = "Student portal client: results, GPA and proxy server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the portal and store the bearer token
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (falls back to the PORTAL_PASSWORD environment variable)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the student profile
    Info {
        /// Student UIN (defaults to the logged-in user)
        uin: Option<String>,
    },
    /// Fetch results from the portal and compute GPA/CGPA
    Results {
        /// Student id (defaults to the logged-in user)
        student_id: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },
    /// Clean a raw results payload from a file or URL
    Normalize {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[command(flatten)]
        report: ReportArgs,
    },
    /// Classify a CGPA
    Classify {
        /// CGPA on the 0.00-5.00 scale
        cgpa: String,
    },
    /// Show department details
    Department {
        /// Department id (defaults to the logged-in user's department)
        id: Option<String>,
    },
    /// Show faculty details
    Faculty {
        /// Faculty id (defaults to the logged-in user's faculty)
        id: Option<String>,
    },
    /// Run the proxy server for the dashboard
    Serve {
        /// Port to listen on (overrides PORTAL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Keep every attempt instead of only the latest one per course
    #[arg(long, default_value_t = false)]
    all_attempts: bool,

    /// Print JSON instead of a text transcript
    #[arg(long, default_value_t = false)]
    json: bool,

    /// CSV file to append per-semester rows to
    #[arg(long)]
    semesters_csv: Option<String>,

    /// CSV file to append per-course rows to
    #[arg(long)]
    courses_csv: Option<String>,
}

impl ReportArgs {
    fn policy(&self) -> DedupPolicy {
        if self.all_attempts {
            DedupPolicy::AllAttempts
        } else {
            DedupPolicy::LatestAttempt
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/student_portal.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("student_portal.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = FileTokenStore::new(&config.session_file);
    let portal = PortalClient::from_config(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => std::env::var("PORTAL_PASSWORD")
                    .context("pass --password or set PORTAL_PASSWORD")?,
            };
            let response = portal.login(&Credentials { username, password }).await?;
            let Some(session) = Session::from_login_response(&response, Utc::now()) else {
                bail!("login response did not contain an access token");
            };
            store.save(&session).await?;
            info!(path = %store.path().display(), "Logged in, token stored");
        }
        Commands::Logout => {
            store.clear().await?;
            info!("Stored token removed");
        }
        Commands::Info { uin } => {
            let session = require_session(&store).await?;
            let uin = resolve_id(uin, &session, "UIN")?;
            let info = portal
                .authorized(&session.access_token)?
                .student_info(&uin)
                .await?;
            print_value(&info)?;
        }
        Commands::Results { student_id, report } => {
            let session = require_session(&store).await?;
            let student_id = resolve_id(student_id, &session, "id")?;
            let results = portal
                .authorized(&session.access_token)?
                .clean_results(&student_id, report.policy())
                .await?;
            emit(&results, &report)?;
        }
        Commands::Normalize { source, report } => {
            let bytes = fetcher(&source).await?;
            let payload = parse_payload(&bytes)?;
            let results = clean_results(&payload, report.policy());
            emit(&results, &report)?;
        }
        Commands::Classify { cgpa } => {
            let class = GradeClass::from_cgpa_str(&cgpa);
            println!("{class}");
        }
        Commands::Department { id } => {
            let session = require_session(&store).await?;
            let id = resolve_id(id, &session, "DepartmentID")?;
            let department = portal
                .authorized(&session.access_token)?
                .department(&id)
                .await?;
            print_value(&department)?;
        }
        Commands::Faculty { id } => {
            let session = require_session(&store).await?;
            let id = resolve_id(id, &session, "FacultyID")?;
            let faculty = portal
                .authorized(&session.access_token)?
                .faculty(&id)
                .await?;
            print_value(&faculty)?;
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            info!(api_url = %config.api_url, port, "Starting proxy server");
            start_server(AppState::new(portal), port).await?;
        }
    }

    Ok(())
}

/// Loads results input from a local file path or fetches it over HTTP.
#[tracing::instrument]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    Ok(bytes)
}

async fn require_session(store: &FileTokenStore) -> Result<Session> {
    store
        .load()
        .await?
        .context("not logged in; run `student_portal login` first")
}

/// Uses the explicit id when given, otherwise the matching field of the
/// logged-in user record.
fn resolve_id(explicit: Option<String>, session: &Session, field: &str) -> Result<String> {
    match explicit.or_else(|| session.user_field(field)) {
        Some(id) => Ok(id),
        None => bail!("no {field} given and none stored for the logged-in user"),
    }
}

fn print_value(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit(results: &CleanResults, report: &ReportArgs) -> Result<()> {
    print_pretty(results);

    if results.is_partial() {
        warn!(
            course_ids = ?results.unresolved_course_ids,
            "Some results were skipped for missing course records"
        );
    }

    if report.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print!("{}", render_transcript(results));
    }

    if let Some(path) = &report.semesters_csv {
        append_semesters(path, results)?;
        info!(path, semesters = results.semesters.len(), "Semester rows written");
    }
    if let Some(path) = &report.courses_csv {
        append_courses(path, results)?;
        info!(path, courses = results.all_results.len(), "Course rows written");
    }

    Ok(())
}

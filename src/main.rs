mod cli;
mod config;
mod error;
mod learn;
mod library;
mod policy;
mod transcript;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "studyhall",
    about = "Library checkout tracker and lesson quizzes for the console"
)]
pub struct Args {
    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Session transcripts directory")]
    pub transcripts_dir: Option<PathBuf>,

    #[arg(long, help = "Do not write a session transcript")]
    pub no_transcript: bool,

    #[arg(short, long, help = "Verbose diagnostics on stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Library checkout tracker
    Library,
    /// Lessons and quizzes with saved progress
    Learn {
        #[arg(long, env = "STUDYHALL_ACCOUNTS", help = "Account file path")]
        accounts: Option<PathBuf>,
    },
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Library => "library",
            Mode::Learn { .. } => "learn",
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "studyhall=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_transcript(
    args: &Args,
    cfg: &config::Config,
    root: &Path,
) -> Result<transcript::Transcript> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let subsystem = args.mode.name();
    if args.no_transcript || !cfg.transcript.enabled() {
        return Ok(transcript::Transcript::disabled(&session_id, subsystem));
    }

    let dir = args
        .transcripts_dir
        .clone()
        .unwrap_or_else(|| cfg.transcript.dir(root));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.jsonl", session_id));
    tracing::debug!(path = %path.display(), "writing session transcript");
    transcript::Transcript::new(&path, &session_id, subsystem)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let root = std::env::current_dir()?;
    let cfg = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load(&root)?,
    };
    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow::anyhow!(
            "Invalid configuration ({} errors)",
            errors.len()
        ));
    }

    let transcript = open_transcript(&args, &cfg, &root)?;
    let mut prompter = cli::EditorPrompter::new()?;

    match &args.mode {
        Mode::Library => {
            let mut session = cli::library::LibrarySession::new(&cfg.library, transcript)?;
            cli::library::run(&mut session, &mut prompter)
        }
        Mode::Learn { accounts } => {
            let path = accounts
                .clone()
                .unwrap_or_else(|| cfg.learn.accounts_file());
            let mut store = learn::AccountStore::new(path);
            let source = store.load();
            cli::learn::report_load(&store, &source);

            let catalog = learn::Catalog::builtin()?;
            tracing::debug!(
                categories = catalog.categories.len(),
                lessons = catalog.lesson_count(),
                "loaded lesson catalog"
            );
            let mut session = cli::learn::LearnSession::new(store, catalog, transcript);
            cli::learn::run(&mut session, &mut prompter)
        }
    }
}

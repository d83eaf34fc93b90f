use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use netctl::client::RestClient;
use netctl::command::{self, Action, Report, Session};
use netctl::config::{self, Config};
use netctl::context::Context;
use netctl::error::Error;
use netctl::output::Output;
use netctl::resource::{parse_documents, Registry};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Manage BGP resources on a control-plane API
#[derive(Parser, Debug)]
#[command(name = "netctl", version = netctl::VERSION, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API endpoint, overrides NETCTL_ENDPOINT and the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Timeout for the whole command in seconds, 0 for none
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create resources from a file
    Create(FileArgs),
    /// Replace existing resources from a file
    Replace(FileArgs),
    /// Create or update resources from a file
    Apply(FileArgs),
    /// Delete resources from a file or by kind and name
    Delete(DeleteArgs),
    /// Display resources
    Get(GetArgs),
}

#[derive(clap::Args, Debug)]
struct FileArgs {
    /// File to read, or - for stdin
    #[arg(short = 'f', long)]
    filename: String,
}

#[derive(clap::Args, Debug)]
struct DeleteArgs {
    /// File to read, or - for stdin
    #[arg(short = 'f', long, conflicts_with = "kind")]
    filename: Option<String>,

    /// Resource kind or alias
    #[arg(required_unless_present = "filename")]
    kind: Option<String>,

    /// Resource names
    names: Vec<String>,

    /// Namespace for namespaced kinds
    #[arg(short, long)]
    namespace: Option<String>,

    /// Do not fail on resources that do not exist
    #[arg(long)]
    skip_not_exists: bool,
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    /// Resource kinds, comma separated
    kinds: String,

    /// Resource names (single kind only)
    names: Vec<String>,

    /// Namespace for namespaced kinds
    #[arg(short, long)]
    namespace: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: Output,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let directive = level.as_directive()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // NETCTL_LOG takes full filter directives, e.g. "netctl::client=trace"
    let filter = EnvFilter::try_from_env("NETCTL_LOG").unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("netctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("netctl").join("netctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".netctl").join("netctl.log");
    }
    PathBuf::from("netctl.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level);

    let code = match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            if err.downcast_ref::<Error>().is_some_and(Error::is_fatal) {
                tracing::error!("fatal: {:#}", err);
                drop(log_guard);
                panic!("{:#}", err);
            }
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    };

    drop(log_guard);
    code
}

/// Run the command; `Ok(false)` means some resources failed
async fn run(args: Args) -> Result<bool> {
    let config = Config::load(args.config.as_deref());
    let endpoint = config.effective_endpoint(args.endpoint.as_deref(), config::process_env);
    let token = config.effective_token(config::process_env);

    tracing::info!("Using endpoint: {}", endpoint);

    let client = RestClient::new(&endpoint, token, None).context("failed to create API client")?;
    let registry = Registry::with_defaults();

    let mut ctx = Context::new();
    if let Some(timeout) = config.effective_timeout(args.timeout) {
        ctx = ctx.with_timeout(timeout);
    }

    let cancel = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight requests");
            cancel.cancel();
        }
    });

    let session = Session {
        ctx,
        registry: &registry,
        client: &client,
    };

    let report = match args.command {
        Command::Create(file) => from_file(&session, Action::Create, &file.filename).await?,
        Command::Replace(file) => from_file(&session, Action::Replace, &file.filename).await?,
        Command::Apply(file) => from_file(&session, Action::Apply, &file.filename).await?,
        Command::Delete(delete) => {
            let action = Action::Delete {
                skip_not_exists: delete.skip_not_exists,
            };
            match (delete.filename, delete.kind) {
                (Some(filename), _) => from_file(&session, action, &filename).await?,
                (None, Some(kind)) => {
                    session
                        .delete_named(
                            &kind,
                            &delete.names,
                            delete.namespace.as_deref(),
                            delete.skip_not_exists,
                        )
                        .await?
                }
                (None, None) => anyhow::bail!("delete needs -f or a kind and names"),
            }
        }
        Command::Get(get) => {
            let listing = session
                .get(&get.kinds, &get.names, get.namespace.as_deref(), get.output)
                .await?;
            print!("{}", listing.text);
            for failure in &listing.failures {
                eprintln!("{}", failure);
            }
            return Ok(listing.is_success());
        }
    };

    Ok(print_report(&report))
}

async fn from_file(session: &Session<'_>, action: Action, path: &str) -> Result<Report> {
    let text = command::read_input(path).await?;
    let objects = parse_documents(session.registry, &text)
        .with_context(|| format!("failed to parse {}", path))?;

    if objects.is_empty() {
        anyhow::bail!("no resources found in {}", path);
    }

    session.run_all(action, objects).await
}

fn print_report(report: &Report) -> bool {
    for message in &report.messages {
        println!("{}", message);
    }
    for failure in &report.failures {
        eprintln!("{}", failure);
    }
    report.is_success()
}

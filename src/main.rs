use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use holocron::error::SyncError;
use holocron::fetch::RemoteSource;
use holocron::models::EntityKind;
use holocron::store::Store;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "holocron")]
#[command(about = "Mirror the Star Wars reference API into a local database and query the copy")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full sync cycle against the remote API
    Sync(SyncArgs),
    /// Print one stored entity by its local id
    Get(GetArgs),
    /// Print a paginated, filterable listing of one entity kind
    List(ListArgs),
}

#[derive(Args)]
struct SyncArgs {
    /// Remote API base URL
    #[arg(long, default_value = holocron::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Path to the local SQLite database
    #[arg(long, default_value = holocron::config::DEFAULT_DB_PATH)]
    db: String,
}

#[derive(Args)]
struct GetArgs {
    /// Entity kind (film, character, or starship)
    kind: EntityKind,

    /// Local id of the entity
    id: Uuid,

    /// Path to the local SQLite database
    #[arg(long, default_value = holocron::config::DEFAULT_DB_PATH)]
    db: String,
}

#[derive(Args)]
struct ListArgs {
    /// Entity kind (film, character, or starship)
    kind: EntityKind,

    /// Case-insensitive substring filter on the kind's name/title field
    #[arg(long)]
    search: Option<String>,

    /// Number of records to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Page size
    #[arg(long, default_value_t = holocron::config::DEFAULT_PAGE_SIZE)]
    limit: u32,

    /// Path to the local SQLite database
    #[arg(long, default_value = holocron::config::DEFAULT_DB_PATH)]
    db: String,
}

fn open_store(path: &str) -> Result<Store> {
    Store::open(path).with_context(|| format!("Failed to open database at: {path}"))
}

fn run_sync(args: SyncArgs) -> Result<()> {
    let start = Instant::now();
    let mut store = open_store(&args.db)?;
    let remote = RemoteSource::new(&args.base_url)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("holocron-sync-worker")
        .enable_io()
        .enable_time()
        .build()?;

    let pb = make_spinner(&format!("Syncing from {} ...", args.base_url));
    let result = rt.block_on(holocron::sync::synchronize(&remote, &mut store));
    pb.finish_and_clear();
    let summary = result?;

    let elapsed = start.elapsed();
    println!();
    println!("=== Sync complete ===");
    println!("Total time:  {:.2}s", elapsed.as_secs_f64());
    println!("Films:       {}", summary.films);
    println!("Characters:  {}", summary.characters);
    println!("Starships:   {}", summary.starships);

    Ok(())
}

fn run_get(args: GetArgs) -> Result<()> {
    let store = open_store(&args.db)?;
    let json = match args.kind {
        EntityKind::Film => serde_json::to_string_pretty(&store.get_film(args.id)?)?,
        EntityKind::Character => serde_json::to_string_pretty(&store.get_character(args.id)?)?,
        EntityKind::Starship => serde_json::to_string_pretty(&store.get_starship(args.id)?)?,
    };
    println!("{json}");
    Ok(())
}

fn run_list(args: ListArgs) -> Result<()> {
    let store = open_store(&args.db)?;
    let search = args.search.as_deref();
    let json = match args.kind {
        EntityKind::Film => {
            serde_json::to_string_pretty(&store.list_films(search, args.offset, args.limit)?)?
        }
        EntityKind::Character => {
            serde_json::to_string_pretty(&store.list_characters(search, args.offset, args.limit)?)?
        }
        EntityKind::Starship => {
            serde_json::to_string_pretty(&store.list_starships(search, args.offset, args.limit)?)?
        }
    };
    println!("{json}");
    Ok(())
}

/// User-facing condition mapping, applied only at this boundary.
fn boundary_message(err: &SyncError) -> String {
    match err {
        SyncError::RemoteUnavailable { .. } => format!("remote service unavailable: {err}"),
        SyncError::NotFound { .. } => format!("not found: {err}"),
        SyncError::MalformedRecord { .. } | SyncError::DanglingReference { .. } => {
            format!("sync aborted, stored data unchanged: {err}")
        }
        SyncError::Store(_) => format!("database failure, prior data left intact: {err}"),
    }
}

fn make_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(msg.to_string());
    pb
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Sync(args) => run_sync(args),
        Commands::Get(args) => run_get(args),
        Commands::List(args) => run_list(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            match e.downcast_ref::<SyncError>() {
                Some(sync_err) => eprintln!("Error: {}", boundary_message(sync_err)),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

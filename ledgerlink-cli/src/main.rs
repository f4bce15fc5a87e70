use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerlink_core::AccountMatcher;
use ledgerlink_ingest::ParseOutput;
use ledgerlink_sync::{HttpLedger, MappingStore, RunReport, SyncRun};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod state;

use config::Env;
use prompt::TerminalDecisions;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LEDGERLINK_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "ledgerlink",
    version,
    long_version = LONG_VERSION,
    about = "Import bank statements into a personal-finance ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statements and upload their transactions to the ledger
    Import {
        /// Statement PDF or directory of statements
        #[arg(env = "STATEMENT_PATH")]
        path: PathBuf,

        /// Config file passed through to the statement parser
        #[arg(long)]
        parser_config: Option<PathBuf>,

        /// Upload without asking for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Saved statement-account mappings
    Mappings {
        #[command(subcommand)]
        command: MappingsCommand,
    },

    /// Local configuration (~/.ledgerlink/config.toml)
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MappingsCommand {
    /// Print every saved mapping
    List,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Import {
            path,
            parser_config,
            yes,
        } => import(&path, parser_config.as_deref(), yes).await,
        Command::Mappings {
            command: MappingsCommand::List,
        } => list_mappings(),
        Command::Config {
            command: ConfigCommand::Init,
        } => config::init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn import(path: &Path, parser_config: Option<&Path>, yes: bool) -> Result<()> {
    if let Some(dotenv) = config::load_dotenv() {
        tracing::debug!(path = %dotenv.display(), "loaded environment file");
    }
    let env = match Env::from_process() {
        Ok(env) => env,
        Err(missing) => {
            for name in missing {
                eprintln!("need {}", name);
            }
            std::process::exit(1);
        }
    };
    let cfg = config::load_config()?;

    println!("parsing {}", path.display());
    let parsed = cfg.parser.run(path, parser_config).await.context("parse failed")?;
    print_parse_summary(&parsed);

    let transactions = parsed.to_transactions(&cfg.ledger.currency)?;
    if transactions.is_empty() {
        return Ok(());
    }

    if !yes {
        let question = format!("\nupload {} transactions?", transactions.len());
        if !prompt::confirm(&mut io::stdin().lock(), &mut io::stdout(), &question)? {
            return Ok(());
        }
    }

    let ledger = HttpLedger::new(&env.ledger_url, &env.api_key)?;
    let store = MappingStore::load(state::mappings_path()?)?;
    let run = SyncRun::new(&ledger, &env.user_id, AccountMatcher::new(cfg.matching.clone()));
    let report = run
        .execute(
            store,
            TerminalDecisions::stdio(&cfg.ledger.bank_tag),
            transactions,
            |done, total| println!("{}/{}", done, total),
        )
        .await?;

    print_report(&report);
    Ok(())
}

fn print_parse_summary(parsed: &ParseOutput) {
    let s = &parsed.summary;
    println!(
        "files: {}/{}, transactions: {}",
        s.processed_files, s.total_files, s.total_transactions
    );
    for f in parsed.processed_files() {
        let name = Path::new(&f.file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| f.file.clone());
        println!("  {}: {}", name, f.transaction_count);
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!(
        "{} created, {} duplicate, {} failed",
        report.created, report.duplicates, report.failed
    );
    for (account, count) in &report.per_account {
        println!("  {}: {}", account, count);
    }
    println!(
        "accounts resolved: {} saved, {} matched, {} chosen, {} reused",
        report.via_saved_mapping, report.via_heuristic, report.via_decision, report.via_memo
    );
    if report.stale_mappings > 0 {
        println!("stale mappings skipped: {}", report.stale_mappings);
    }
}

fn list_mappings() -> Result<()> {
    let path = state::mappings_path()?;
    let store = MappingStore::load(&path)?;
    if store.is_empty() {
        println!("No saved mappings in {}", path.display());
        return Ok(());
    }
    for m in store.mappings() {
        println!(
            "{} ({}) -> {} [{}]",
            m.statement_account_number, m.statement_account_type, m.remote_account_name, m.remote_account_id
        );
    }
    Ok(())
}

//! Chat Memory - Binary Entry Point
//!
//! Interactive chat, one-shot questions, history inspection, backups and
//! the local HTTP API.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;

use chat_memory::api::{create_router, AppState};
use chat_memory::assistant::{Assistant, NoRetriever, OllamaClient, Retriever};
use chat_memory::config::{AppConfig, CONFIG_FILE_NAME};
use chat_memory::conversation::{export_file_name, format_size, Memory};
use chat_memory::logging::{init_tracing, LogFormat};
use chat_memory::search::DocumentIndex;

#[derive(Parser, Debug)]
#[command(
    name = "chat-memory",
    about = "Local chat assistant with a durable conversation log",
    version
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Override `settings.data_dir`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Ask a single question and exit
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print conversation history
    History {
        /// Most recent records to consider (0 = all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Show (user, assistant) pairs instead of raw messages
        #[arg(long)]
        pairs: bool,
    },
    /// Show log and backup statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Archive and clear the conversation log
    Backup {
        /// Afterwards keep only the N newest backups
        #[arg(long, value_name = "N")]
        prune: Option<usize>,
    },
    /// Write the conversation as a Markdown transcript
    Export {
        /// Output file (default: conversation_export_<timestamp>.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Most recent records to include (0 = all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Serve the HTTP API
    Serve {
        /// Listen address (default: server.addr from config)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let mut config = AppConfig::load_or_default(&cli.config);
    if let Some(dir) = cli.data_dir.clone() {
        config.settings.data_dir = dir;
    }

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&config),
        Command::Ask { text } => run_ask(&config, &text.join(" ")),
        Command::History { limit, pairs } => run_history(&config, limit, pairs),
        Command::Stats { json } => run_stats(&config, json),
        Command::Backup { prune } => run_backup(&config, prune),
        Command::Export { output, limit } => run_export(&config, output, limit),
        Command::Serve { addr } => run_serve(&config, addr.unwrap_or(config.server.addr)),
        Command::Init { force } => run_init(&config, &cli.config, force),
    }
}

fn open_memory(config: &AppConfig) -> Result<Arc<Mutex<Memory>>> {
    config.validate_settings()?;
    let log_config = config.log_config();
    let dir = log_config.data_dir().display().to_string();
    let memory = Memory::open(log_config, config.settings.memory_enabled)
        .with_context(|| format!("Failed to open memory directory {dir}"))?;
    Ok(Arc::new(Mutex::new(memory)))
}

fn build_retriever(config: &AppConfig) -> Box<dyn Retriever> {
    if !config.knowledge_base.enabled {
        return Box::new(NoRetriever);
    }
    match DocumentIndex::from_dir(&config.knowledge_base.dir) {
        Ok(index) if !index.is_empty() => {
            Box::new(index.with_top_k(config.knowledge_base.top_k))
        }
        Ok(_) => Box::new(NoRetriever),
        Err(e) => {
            tracing::warn!(
                dir = %config.knowledge_base.dir.display(),
                error = %e,
                "Knowledge base unavailable"
            );
            Box::new(NoRetriever)
        }
    }
}

fn build_assistant(config: &AppConfig, memory: Arc<Mutex<Memory>>) -> Result<Assistant> {
    config.validate()?;
    let model = OllamaClient::new(&config.api)?;
    tracing::info!(model = %config.api.model, base_url = %model.base_url(), "Model client ready");

    Ok(Assistant::new(
        Box::new(model),
        build_retriever(config),
        memory,
        config.settings.user_id.clone(),
    ))
}

fn run_chat(config: &AppConfig) -> Result<()> {
    let memory = open_memory(config)?;
    let assistant = build_assistant(config, memory.clone())?;

    // Ctrl+C at the prompt exits; during a turn it lets the turn finish
    let busy = Arc::new(AtomicBool::new(false));
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let busy = busy.clone();
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            if busy.load(Ordering::SeqCst) {
                eprintln!("\nInterrupted. Finishing current turn...");
                interrupted.store(true, Ordering::SeqCst);
            } else {
                println!("\nExiting...");
                std::process::exit(0);
            }
        })
        .context("Failed to set Ctrl+C handler")?;
    }

    let seeded = memory.lock().load_pairs(config.history_limit())?;
    println!("Assistant ready (model: {}).", assistant.model_name());
    if !seeded.is_empty() {
        println!("Loaded {} previous exchanges.", seeded.len());
    }
    println!("Type 'exit' to leave; /stats, /history [n], /backup are available.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("Goodbye!");
            break;
        }

        if let Some(command) = input.strip_prefix('/') {
            if let Err(e) = run_repl_command(&memory, command) {
                eprintln!("Error: {e:#}");
            }
            continue;
        }

        busy.store(true, Ordering::SeqCst);
        let result = assistant.think(input);
        busy.store(false, Ordering::SeqCst);

        match result {
            Ok(reply) => println!("AI: {reply}"),
            Err(e) => eprintln!("Error: {e}"),
        }

        if interrupted.load(Ordering::SeqCst) {
            println!("Exiting...");
            break;
        }
    }

    Ok(())
}

fn run_repl_command(memory: &Arc<Mutex<Memory>>, command: &str) -> Result<()> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("stats") => print_stats(&memory.lock()),
        Some("history") => {
            let limit = parts
                .next()
                .map(|n| n.parse::<usize>().context("history limit must be a number"))
                .transpose()?;
            print_pairs(&memory.lock(), normalize_limit(limit.or(Some(10))))
        }
        Some("backup") => print_backup(&memory.lock()),
        _ => {
            println!("Commands: /stats, /history [n], /backup");
            Ok(())
        }
    }
}

fn run_ask(config: &AppConfig, text: &str) -> Result<()> {
    let memory = open_memory(config)?;
    let assistant = build_assistant(config, memory)?;

    // Let a started turn reach the log before exiting
    ctrlc::set_handler(|| eprintln!("\nInterrupted. Finishing current turn..."))
        .context("Failed to set Ctrl+C handler")?;

    let reply = assistant.think(text)?;
    println!("{reply}");
    Ok(())
}

fn run_history(config: &AppConfig, limit: Option<usize>, pairs: bool) -> Result<()> {
    let memory = open_memory(config)?;
    let memory = memory.lock();
    let limit = match limit {
        Some(n) => normalize_limit(Some(n)),
        None => config.history_limit(),
    };

    if pairs {
        return print_pairs(&memory, limit);
    }

    for message in memory.load_messages(limit)? {
        println!("[{}] {}", message.role, message.content);
    }
    Ok(())
}

fn run_stats(config: &AppConfig, json: bool) -> Result<()> {
    let memory = open_memory(config)?;
    let memory = memory.lock();
    if json {
        let stats = memory.detailed_stats()?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    print_stats(&memory)
}

fn run_backup(config: &AppConfig, prune: Option<usize>) -> Result<()> {
    let memory = open_memory(config)?;
    let memory = memory.lock();
    print_backup(&memory)?;

    if let Some(keep) = prune {
        if keep == 0 {
            anyhow::bail!("--prune must keep at least one backup");
        }
        let deleted = memory.prune_backups(keep)?;
        println!("Deleted {deleted} old backup(s).");
    }
    Ok(())
}

fn run_export(config: &AppConfig, output: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let memory = open_memory(config)?;
    let memory = memory.lock();
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Utc::now())));

    let count = memory
        .export_to(&path, normalize_limit(limit))
        .with_context(|| format!("Failed to export to {}", path.display()))?;
    if count == 0 {
        println!("No conversation history to export.");
    } else {
        println!("Exported {count} messages to {}", path.display());
    }
    Ok(())
}

fn run_serve(config: &AppConfig, addr: SocketAddr) -> Result<()> {
    let memory = open_memory(config)?;

    let state = match build_assistant(config, memory.clone()) {
        Ok(assistant) => AppState::with_assistant(Arc::new(assistant)),
        Err(e) => {
            tracing::warn!("{:#}; serving history only", e);
            AppState::new(memory)
        }
    }
    .with_default_limit(config.history_limit());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!(%addr, "HTTP API listening");
        println!("Listening on http://{addr}");

        axum::serve(listener, create_router(Arc::new(state)))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown signal received");
            })
            .await
            .context("HTTP server failed")
    })
}

fn run_init(config: &AppConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_stats(memory: &Memory) -> Result<()> {
    let stats = memory.detailed_stats()?;
    println!("Memory: {}", if memory.is_enabled() { "enabled" } else { "disabled" });
    println!("Log: {}", memory.log_path().display());
    println!("Records: {} ({})", stats.record_count, format_size(stats.log_size));
    for (role, count) in &stats.records_by_role {
        println!("  {role}: {count}");
    }
    println!(
        "Backups: {} ({} records, {})",
        stats.backup_count,
        stats.backup_record_count,
        format_size(stats.backup_size)
    );
    Ok(())
}

fn print_pairs(memory: &Memory, limit: Option<usize>) -> Result<()> {
    let pairs = memory.load_pairs(limit)?;
    if pairs.is_empty() {
        println!("No conversation history.");
    }
    for pair in pairs {
        println!("You: {}", pair.user);
        println!("AI: {}", pair.assistant);
        println!();
    }
    Ok(())
}

fn print_backup(memory: &Memory) -> Result<()> {
    match memory.backup()? {
        Some(path) => println!("Backed up to {}", path.display()),
        None => println!("Nothing to back up."),
    }
    Ok(())
}

/// 0 means "all records"
fn normalize_limit(limit: Option<usize>) -> Option<usize> {
    limit.filter(|&n| n > 0)
}

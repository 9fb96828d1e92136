//! `packfs` — command-line front end over the compatibility facade and the
//! natural-language entry point. No server, no daemon: each invocation starts
//! an engine, performs one operation, flushes the index, and exits.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use packfs_core::intent::{DiscoverPurpose, FileDiscoverIntent, FileTarget, OperationOptions};
use packfs_core::{PackfsEngine, Workflow};

#[derive(Parser)]
#[command(name = "packfs", version, about = "A semantic filesystem layer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file's contents
    Read {
        path: String,
        /// Sandbox base directory (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Create or overwrite a file
    Write {
        path: String,
        content: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Check whether a path exists
    Exists {
        path: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print a file's size, mime type, and modification time
    Stat {
        path: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// List a directory's immediate entries
    Readdir {
        path: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create parent directories as needed
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Delete a file or directory
    Remove {
        path: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Copy a file to a new path
    Copy {
        from: String,
        to: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Move or rename a file
    Move {
        from: String,
        to: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Search the semantic index for files matching a query
    #[command(alias = "search")]
    Find {
        query: String,
        #[arg(long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Ask in plain English — the engine infers the intent
    Ask {
        query: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Run a JSON-encoded step list from a file
    Workflow {
        /// Path to a JSON file holding `{"steps": [...], "atomic": bool, "continueOnError": bool}`
        file: PathBuf,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Check the base directory's setup: init state, index health, entry/keyword counts
    Doctor {
        /// Project path (default: current directory)
        path: Option<PathBuf>,
    },
}

fn resolve_root(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| std::env::current_dir().expect("could not determine current directory"))
}

async fn start_engine(root: Option<PathBuf>) -> PackfsEngine {
    let root = resolve_root(root);
    match PackfsEngine::start(&root).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("failed to start engine at {}: {e}", root.display());
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("packfs=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read { path, root } => {
            let mut engine = start_engine(root).await;
            match engine.read_file(&path).await {
                Ok(content) => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "path": path, "content": content }));
                    } else {
                        println!("{content}");
                    }
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Write { path, content, root } => {
            let mut engine = start_engine(root).await;
            match engine.write_file(&path, &content).await {
                Ok(()) => println!("wrote {} bytes to {path}", content.len()),
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Exists { path, root } => {
            let mut engine = start_engine(root).await;
            match engine.exists(&path).await {
                Ok(exists) => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "path": path, "exists": exists }));
                    } else {
                        println!("{exists}");
                    }
                    if !exists {
                        std::process::exit(1);
                    }
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Stat { path, root } => {
            let mut engine = start_engine(root).await;
            match engine.stat(&path).await {
                Ok(meta) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&meta).unwrap());
                    } else {
                        println!("path:     {}", meta.path);
                        println!("size:     {} bytes", meta.size);
                        println!("mime:     {}", meta.mime_type);
                        println!("mtime:    {}", packfs_core::clock::millis_to_iso8601(meta.mtime));
                    }
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Readdir { path, root } => {
            let mut engine = start_engine(root).await;
            match engine.readdir(&path).await {
                Ok(entries) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&entries).unwrap());
                    } else {
                        for entry in &entries {
                            let marker = if entry.is_dir { "/" } else { "" };
                            println!("{}{marker}", entry.path);
                        }
                        eprintln!("\n{} entries", entries.len());
                    }
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Mkdir { path, recursive, root } => {
            let mut engine = start_engine(root).await;
            match engine.mkdir(&path, recursive).await {
                Ok(()) => println!("created {path}"),
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Remove { path, root } => {
            let mut engine = start_engine(root).await;
            match engine.remove(&path).await {
                Ok(()) => println!("removed {path}"),
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Copy { from, to, root } => {
            let mut engine = start_engine(root).await;
            match engine.copy(&from, &to).await {
                Ok(()) => println!("copied {from} -> {to}"),
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Move { from, to, root } => {
            let mut engine = start_engine(root).await;
            match engine.move_path(&from, &to).await {
                Ok(()) => println!("moved {from} -> {to}"),
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Find { query, limit, root } => {
            let mut engine = start_engine(root).await;
            let intent = FileDiscoverIntent {
                purpose: DiscoverPurpose::SearchIntegrated,
                target: FileTarget { semantic_query: Some(query.clone()), ..Default::default() },
                options: OperationOptions { max_results: Some(limit), ..Default::default() },
            };
            match engine.discover_files(&intent).await {
                Ok(result) if result.success => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result.files).unwrap());
                    } else {
                        if result.files.is_empty() {
                            eprintln!("no results for '{query}'");
                        }
                        for entry in &result.files {
                            let score = entry.relevance.map(|r| format!(" ({r:.1})")).unwrap_or_default();
                            println!("{}{score}", entry.path);
                        }
                        eprintln!("\n{} results in {}ms", result.files.len(), result.search_time_ms);
                    }
                }
                Ok(result) => {
                    eprintln!("{}", result.message.unwrap_or_else(|| "search failed".to_string()));
                    std::process::exit(1);
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Ask { query, root } => {
            let mut engine = start_engine(root).await;
            match engine.ask(&query).await {
                Ok(result) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result).unwrap());
                    } else if result.success() {
                        println!("ok");
                    } else {
                        eprintln!("not handled");
                    }
                }
                Err(e) => fail(&e, cli.json),
            }
            let _ = engine.stop().await;
        }
        Commands::Workflow { file, root } => {
            let mut engine = start_engine(root).await;
            let raw = match tokio::fs::read_to_string(&file).await {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("error: failed to read workflow file {}: {e}", file.display());
                    std::process::exit(1);
                }
            };
            let workflow: Workflow = match serde_json::from_str(&raw) {
                Ok(w) => w,
                Err(e) => {
                    eprintln!("error: invalid workflow JSON in {}: {e}", file.display());
                    std::process::exit(1);
                }
            };
            let result = engine.run_workflow(&workflow).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                for step in &result.steps {
                    match &step.error {
                        Some(e) => println!("step {}: FAILED ({e})", step.step_index),
                        None => println!("step {}: ok ({}ms)", step.step_index, step.duration_ms),
                    }
                }
                if !result.success {
                    let note = if result.rollback_required { " (rollback required)" } else { "" };
                    eprintln!("workflow failed{note}");
                }
            }
            let failed = !result.success;
            let _ = engine.stop().await;
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Doctor { path } => {
            std::process::exit(run_doctor(path).await);
        }
    }
}

/// Diagnose a base directory's setup: binary version, `.packfs` index
/// directory presence, `.packfs.toml` validity, and whether the index loads
/// cleanly — reporting entry/keyword counts when it does.
async fn run_doctor(path: Option<PathBuf>) -> i32 {
    let root = resolve_root(path);
    let root = match root.canonicalize() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("packfs doctor");
            eprintln!();
            eprintln!("  [FAIL] path '{}' not found: {e}", root.display());
            eprintln!();
            eprintln!("  Result: FAIL -- fix the issues above");
            return 1;
        }
    };

    let mut has_warn = false;
    let mut has_fail = false;

    eprintln!("packfs doctor");
    eprintln!();
    eprintln!("  [PASS] packfs-cli v{}", env!("CARGO_PKG_VERSION"));

    if root.join(".packfs").exists() {
        eprintln!("  [PASS] .packfs index directory exists");
    } else {
        eprintln!("  [WARN] .packfs index directory not found (will be created on first run)");
        has_warn = true;
    }

    let config_path = root.join(".packfs.toml");
    if config_path.exists() {
        match tokio::fs::read_to_string(&config_path).await {
            Ok(raw) => match raw.parse::<toml::Table>() {
                Ok(_) => eprintln!("  [PASS] .packfs.toml exists and is valid TOML"),
                Err(e) => {
                    eprintln!("  [FAIL] .packfs.toml exists but is invalid: {e}");
                    has_fail = true;
                }
            },
            Err(e) => {
                eprintln!("  [FAIL] .packfs.toml exists but could not be read: {e}");
                has_fail = true;
            }
        }
    } else {
        eprintln!("  [WARN] .packfs.toml not found (will use defaults)");
        has_warn = true;
    }

    match PackfsEngine::start(&root).await {
        Ok(mut engine) => {
            eprintln!("  [PASS] index loads cleanly");
            eprintln!(
                "  [INFO] {} indexed entries, {} keywords",
                engine.index_entry_count(),
                engine.index_keyword_count()
            );
            let _ = engine.stop().await;
        }
        Err(e) => {
            eprintln!("  [FAIL] index failed to load: {e}");
            has_fail = true;
        }
    }

    eprintln!();
    if has_fail {
        eprintln!("  Result: FAIL -- fix the issues above");
        1
    } else if has_warn {
        eprintln!("  Result: PASS with warnings");
        0
    } else {
        eprintln!("  Result: ALL PASS");
        0
    }
}

fn fail(err: &packfs_core::PackfsError, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::json!({ "success": false, "message": err.message(), "suggestions": err.suggestions() })
        );
    } else {
        eprintln!("error: {err}");
        for s in err.suggestions() {
            eprintln!("  hint: {}", s.detail);
        }
    }
    std::process::exit(1);
}

//! eduhub - browse study notes by subject and category.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use eduhub::config::{load_settings, Settings};
use eduhub::generate::generate_manifest;
use eduhub::loader::SubjectView;
use eduhub::render::{HtmlSurface, JsonSurface, Surface, TerminalSurface};
use eduhub::server;
use eduhub::source::{is_valid_subject_id, source_for_root, ManifestSource};

#[derive(Parser)]
#[command(name = "eduhub")]
#[command(author, version, about = "Browse study notes by subject and category")]
struct Cli {
    /// Subjects root: an http(s) URL or a local directory
    #[arg(long, global = true, env = "EDUHUB_ROOT")]
    root: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files of a subject
    List {
        /// Subject id (folder name)
        subject: String,

        /// Category to show (notes, code, videos, extras)
        #[arg(short, long)]
        category: Option<String>,

        /// Only show files whose name contains this text
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show file count and last update of a subject
    Stats {
        subject: String,
    },

    /// Interactive listing: switch category, search, change subject
    Browse {
        subject: String,
    },

    /// Create or update files.json for a subject folder
    Generate {
        dir: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the web interface for a local subjects root
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "eduhub=debug" } else { "eduhub=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut settings = load_settings().await;
    if let Some(root) = cli.root {
        settings.subjects_root = root;
    }

    match cli.command {
        Commands::List {
            subject,
            category,
            search,
            format,
            output,
        } => {
            let category = category.unwrap_or_else(|| settings.default_category.clone());
            let search = search.unwrap_or_default();
            let rendered = match format {
                OutputFormat::Text => {
                    let view = open_view(&settings, &subject, TerminalSurface::buffered())?;
                    show(&view, &subject, &category, &search).await;
                    view.into_surface().contents().to_string()
                }
                OutputFormat::Json => {
                    let view = open_view(&settings, &subject, JsonSurface::new())?;
                    show(&view, &subject, &category, &search).await;
                    view.into_surface().contents().to_string()
                }
                OutputFormat::Html => {
                    let view = open_view(&settings, &subject, HtmlSurface::new())?;
                    show(&view, &subject, &category, &search).await;
                    let categories = view.tab_categories().await;
                    let listing = view.into_surface().into_contents();
                    let body = server::templates::subject_page(
                        &subject,
                        &categories,
                        &category,
                        search.trim(),
                        &listing,
                    );
                    server::templates::base_template(&subject, &body, settings.dark_theme)
                }
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", style(path.display()).cyan());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Stats { subject } => {
            let view = open_view(&settings, &subject, TerminalSurface::buffered())?;
            view.load_files(&subject, &settings.default_category).await;
            if !view.is_available().await {
                bail!("could not load files for '{}'", subject);
            }
            let stats = view.stats().await.unwrap_or_default();
            println!("{}", style(&subject).bold());
            println!("  Total files:  {}", stats.total_files);
            println!(
                "  Last updated: {}",
                stats
                    .last_updated
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }

        Commands::Browse { subject } => {
            browse(&settings, subject).await?;
        }

        Commands::Generate { dir, dry_run } => {
            let dir = PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref());
            let report = generate_manifest(&dir, dry_run)?;
            for name in &report.added {
                println!("  {} {}", style("+").green(), name);
            }
            println!(
                "{} added, {} already listed, {} ignored",
                style(report.added.len()).bold(),
                report.already_listed,
                report.ignored
            );
            if report.written {
                println!("Updated {}", style(report.manifest_path.display()).cyan());
            } else if dry_run && !report.added.is_empty() {
                println!("{}", style("Dry run, nothing written").yellow());
            }
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server_host.clone());
            let port = port.unwrap_or(settings.server_port);
            server::serve(&settings, &host, port).await?;
        }
    }

    Ok(())
}

fn open_source(settings: &Settings) -> anyhow::Result<Arc<dyn ManifestSource>> {
    Ok(source_for_root(
        &settings.subjects_root,
        settings.request_timeout(),
        settings.user_agent.as_deref(),
    )?)
}

fn open_view<S: Surface>(
    settings: &Settings,
    subject: &str,
    surface: S,
) -> anyhow::Result<SubjectView<S>> {
    if !is_valid_subject_id(subject) {
        bail!("invalid subject id '{}'", subject);
    }
    Ok(SubjectView::new(open_source(settings)?, surface))
}

async fn show<S: Surface>(view: &SubjectView<S>, subject: &str, category: &str, search: &str) {
    view.load_files(subject, category).await;
    if !search.trim().is_empty() {
        view.set_search(search).await;
    }
}

async fn browse(settings: &Settings, subject: String) -> anyhow::Result<()> {
    let view = open_view(settings, &subject, TerminalSurface::stdout())?;
    view.load_files(&subject, &settings.default_category).await;
    print_browse_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "category" | "c" if !arg.is_empty() => view.set_category(arg).await,
            "search" | "s" => view.set_search(arg).await,
            "clear" => view.set_search("").await,
            "subject" if !arg.is_empty() => {
                if !is_valid_subject_id(arg) {
                    eprintln!("{} invalid subject id '{}'", style("!").red(), arg);
                    continue;
                }
                let category = view.active_category().await;
                view.load_files(arg, &category).await;
            }
            "categories" => {
                let categories = view.categories().await;
                println!("{}", categories.join(", "));
            }
            "quit" | "q" | "exit" => break,
            _ => print_browse_help(),
        }
    }

    Ok(())
}

fn print_browse_help() {
    println!(
        "{}",
        style("commands: category <name>, search <text>, clear, subject <id>, categories, quit")
            .dim()
    );
}

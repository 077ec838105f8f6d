use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use chipfield_core::{
    Autocomplete, ChipfieldConfig, Document, LocalLookup, Suggestion, TagAutocomplete,
    WidgetConfig, scaffold,
};
use chipfield_tui::app::{App, Outcome};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "chipfield",
    about = "Facebook-style tag picker: type, pick suggestions, get their ids",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.config/chipfield/config.toml or $CHIPFIELD_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON suggestion file; replaces `widget.url_lookup` from the config.
    #[arg(long = "source", global = true, action = clap::ArgAction::Append)]
    sources: Vec<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick tags interactively and print the selected ids.
    Pick {
        /// Ids to show as chips from the start.
        #[arg(long = "preset", action = clap::ArgAction::Append)]
        presets: Vec<String>,
    },

    /// Accept suggestions by id without a terminal UI and print the markup.
    Render {
        #[arg(long = "accept", action = clap::ArgAction::Append)]
        accept: Vec<String>,
    },

    /// Print lookup hits for a term.
    Search {
        term: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective config.
    List,
    /// Print the config file path.
    Path,
    /// Write the default config file (refuses to overwrite).
    Init,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = format!("chipfield_core={log_level},chipfield_tui={log_level},chipfield={log_level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json || std::env::var("CHIPFIELD_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(ChipfieldConfig::config_path);
    let mut config = ChipfieldConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if !cli.sources.is_empty() {
        config.widget.url_lookup = cli
            .sources
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
    }
    debug!(path = %config_path.display(), sources = ?config.widget.url_lookup, "config loaded");

    match cli.command.unwrap_or(Commands::Pick { presets: vec![] }) {
        Commands::Pick { presets } => {
            let mut app = App::new(&config, LocalLookup::default(), &presets)?;
            let outcome = chipfield_tui::run_tui(&mut app)?;
            match outcome {
                Outcome::Submitted(data) => {
                    if json_output {
                        print_json(&serde_json::json!({
                            "data": data,
                            "ids": split_data(&data),
                        }))?;
                    } else {
                        println!("{data}");
                    }
                }
                Outcome::Cancelled => {
                    info!("picker cancelled");
                    std::process::exit(1);
                }
            }
        }

        Commands::Render { accept } => {
            let settings = WidgetConfig::<Suggestion>::builder()
                .settings(&config.widget, &config.lookup)
                .suggestion_formats()
                .build()?;
            let mut doc = Document::new();
            let (container, input) = scaffold(&mut doc, &settings.input_class)?;
            let widget = TagAutocomplete::new(&mut doc, input, settings, LocalLookup::<Suggestion>::default())?;

            for id in &accept {
                let Some(record) = widget.autocomplete().records().iter().find(|s| &s.id == id).cloned()
                else {
                    bail!("no suggestion with id {id:?} in the configured sources");
                };
                widget.accept(&mut doc, &record)?;
            }

            let html = doc.to_html(container)?;
            let data = widget.get_data(&doc)?;
            if json_output {
                print_json(&serde_json::json!({ "html": html, "data": data }))?;
            } else {
                println!("{html}");
                println!("{data}");
            }
        }

        Commands::Search { term, limit } => {
            let mut builder = WidgetConfig::<Suggestion>::builder()
                .settings(&config.widget, &config.lookup)
                .suggestion_formats();
            if let Some(limit) = limit {
                builder = builder.max_items(limit);
            }
            let settings = builder.build()?;

            let mut lookup = LocalLookup::<Suggestion>::default();
            lookup.attach(&settings.url_lookup, &settings.ac_options)?;
            let hits = lookup.lookup(&term, &settings.ac_options)?;

            if json_output {
                let rows: Vec<_> = hits
                    .iter()
                    .map(|h| serde_json::json!({ "suggestion": h.data, "score": h.score }))
                    .collect();
                print_json(&serde_json::Value::Array(rows))?;
            } else if hits.is_empty() {
                println!("No matches for {term:?}");
            } else {
                for hit in &hits {
                    println!("{:>6}  {}  ({})", hit.score, hit.formatted, hit.data.id);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::List => {
                if json_output {
                    print_json(&serde_json::to_value(&config)?)?;
                } else {
                    print!("{}", config.to_toml_string()?);
                }
            }
            ConfigAction::Path => println!("{}", config_path.display()),
            ConfigAction::Init => {
                if config_path.exists() {
                    bail!("{} already exists", config_path.display());
                }
                ChipfieldConfig::default().save_to(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
    }

    Ok(())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn split_data(data: &str) -> Vec<&str> {
    if data.is_empty() {
        Vec::new()
    } else {
        data.split(',').collect()
    }
}

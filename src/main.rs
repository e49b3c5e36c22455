use chapterhouse::lifecycle::BuildMode;
use chapterhouse::{config, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chapterhouse")]
#[command(about = "Static site generator for guides written as markdown chapters")]
#[command(long_about = "\
Static site generator for guides written as markdown chapters

Every markdown file declares its place in the guide with YAML front-matter:

  ---
  title: Pure functions
  slug: pure-functions
  order: 1
  state: release          # draft | outline | release
  parent: intro           # optional: nest under the chapter with slug 'intro'
  ---

Source structure (layout is free; only front-matter decides the navigation):

  chapters/
  ├── config.toml                  # Site config (optional)
  ├── styles.css                   # Replaces the bundled stylesheet (optional)
  ├── 01-intro.md                  # slug: intro
  └── 01-intro/
      └── pure-functions.md        # slug: pure-functions, parent: intro

Output: docs/intro.html, docs/intro/pure-functions.html, docs/styles.css

Production builds publish drafts and releases; preview builds also include
outlines and link pages relative to each other so they open from disk.

Run 'chapterhouse gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing the chapters
    #[arg(long, default_value = "chapters", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "docs", global = true)]
    output: PathBuf,

    /// Which lifecycle states to publish
    #[arg(
        long,
        value_enum,
        default_value_t = BuildMode::Production,
        env = "CHAPTERHOUSE_MODE",
        global = true
    )]
    mode: BuildMode,

    /// Fail on the first document with invalid front-matter
    #[arg(long, global = true)]
    strict: bool,

    /// Log progress (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: collect chapters, then write every page
    Build,
    /// Validate the chapters and print the navigation without writing
    Check,
    /// Print the collected view model as JSON
    Collect,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = load_config(&cli)?;
            println!(
                "==> Building {} ({} mode)",
                cli.source.display(),
                cli.mode
            );

            let (tx, rx) = std::sync::mpsc::channel();
            let output_dir = cli.output.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_emit_event(&event, &output_dir) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&cli.source, &cli.output, &config, cli.mode, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer panicked")?;
            let report = result?;

            for line in output::format_diagnostics(&report.collection.diagnostics) {
                println!("{}", line);
            }
            println!();
            output::print_emit_output(&report.emitted, &cli.output);

            if !report.emitted.is_success() {
                return Err(format!("{} pages failed", report.emitted.failed.len()).into());
            }
        }
        Command::Check => {
            let config = load_config(&cli)?;
            println!("==> Checking {} ({} mode)", cli.source.display(), cli.mode);
            let collection = pipeline::collect(&cli.source, &config, cli.mode)?;
            output::print_collect_output(&collection, &cli.source);
            println!("{}", output::format_check_summary(&collection));
        }
        Command::Collect => {
            let config = load_config(&cli)?;
            let collection = pipeline::collect(&cli.source, &config, cli.mode)?;
            println!("{}", serde_json::to_string_pretty(&collection.model)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `config.toml` from the source directory, applying `--strict`.
fn load_config(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(&cli.source)?;
    if cli.strict {
        site_config.strict = true;
    }
    Ok(site_config)
}

/// Log to stderr: `RUST_LOG` if set, otherwise `info` with `--verbose` and
/// `warn` without.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use codectx::config::{config_path, load_config_file, ExtractConfig};
use codectx::errors::Result;
use codectx::extractor::ContextExtractor;
use codectx::render::generate_output;
use codectx::types::OutputFormat;

/// Extracts relevance-ranked code context for AI prompts.
#[derive(Parser)]
#[command(name = "codectx", about = "Extracts relevance-ranked code context for AI prompts", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract code context from a project
    Extract {
        /// Path to the project directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Output file path (default: auto-generated in the project dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (markdown or json)
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// Glob patterns to exclude
        #[arg(short, long)]
        exclude: Vec<String>,
        /// Glob patterns to include (whitelist)
        #[arg(short, long)]
        include: Vec<String>,
        /// Strip comments from code
        #[arg(long)]
        strip_comments: bool,
        /// Maximum tokens (0 for unlimited)
        #[arg(long, default_value = "0")]
        max_tokens: usize,
        /// Attach structural summaries to Go files
        #[arg(long)]
        ast: bool,
        /// Focus symbol (e.g. FuncName or Type.Method) for relevance tracing
        #[arg(long, default_value = "")]
        focus: String,
        /// Hop bound for focus tracing
        #[arg(long, default_value = "1")]
        depth: u32,
        /// Number of concurrent extraction workers
        #[arg(long, default_value = "4")]
        workers: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            path,
            output,
            format,
            exclude,
            include,
            strip_comments,
            max_tokens,
            ast,
            focus,
            depth,
            workers,
        } => {
            let mut cfg = ExtractConfig {
                output,
                format,
                include,
                strip_comments,
                max_tokens,
                ast,
                focus,
                depth,
                workers,
                ..ExtractConfig::default()
            };
            cfg.path = path;
            cfg.exclude.extend(exclude);

            // Project config fills in anything the CLI left at its default.
            let config_file = config_path(&cfg.path);
            if config_file.exists() {
                if let Err(e) = load_config_file(&config_file, &mut cfg) {
                    warn!(error = %e, "failed to load project config, ignoring");
                }
            }

            let max_tokens = cfg.max_tokens;
            let extractor = ContextExtractor::new(cfg);
            let ctx = extractor.extract().await?;
            let rendered = generate_output(&ctx, &extractor.config().format)?;
            write_output(&rendered, extractor.config(), &ctx.project_path)?;

            if max_tokens > 0 && ctx.estimated_tokens > max_tokens {
                warn!(
                    estimated = ctx.estimated_tokens,
                    maximum = max_tokens,
                    "estimated tokens exceed the configured maximum"
                );
            }
        }
    }
    Ok(())
}

/// Writes the rendered context to the configured output path, or to an
/// auto-generated file in the project directory, falling back to stdout.
fn write_output(rendered: &str, cfg: &ExtractConfig, project_path: &str) -> Result<()> {
    if let Some(output) = &cfg.output {
        std::fs::write(output, rendered)?;
        println!("Context extracted successfully to {}", output.display());
        return Ok(());
    }

    let ext = OutputFormat::parse(&cfg.format)
        .map(|f| f.extension())
        .unwrap_or("md");
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let default_name = format!("codectx-{stamp}.{ext}");
    let out_path = PathBuf::from(project_path).join(&default_name);

    match std::fs::write(&out_path, rendered) {
        Ok(()) => {
            println!("Context extracted successfully to {}", out_path.display());
        }
        Err(e) => {
            warn!(error = %e, "failed to write to project dir, printing to stdout");
            print!("{rendered}");
        }
    }
    Ok(())
}

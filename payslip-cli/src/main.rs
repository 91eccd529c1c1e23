use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use payslip_cli::app::{self, Branding};
use payslip_cli::config::AppConfig;
use payslip_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Payslip calculator and PDF generator.
///
/// Forms are read from TOML or JSON files; without `--form` the saved draft
/// is used.
#[derive(Debug, Parser)]
#[command(name = "payslip", version)]
struct Cli {
    /// Config file. Defaults to `payslip.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Draft storage backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Draft storage connection string.
    /// For SQLite this is a file path (e.g. `drafts.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or filter directive.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the calculated totals.
    Calc {
        #[arg(long)]
        form: Option<PathBuf>,
    },
    /// Print the payslip preview, or write it as HTML.
    Preview {
        #[arg(long)]
        form: Option<PathBuf>,
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Generate the PDF payslip.
    Export {
        #[arg(long)]
        form: Option<PathBuf>,
        /// Output directory. Defaults to `[export] output_dir`.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        logo: Option<PathBuf>,
        #[arg(long)]
        signature: Option<PathBuf>,
    },
    /// Manage the saved draft.
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Debug, Subcommand)]
enum DraftAction {
    /// Replace the saved draft with a form file.
    Save {
        #[arg(long)]
        form: PathBuf,
    },
    Show,
    Clear,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_process_env();
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(db) = cli.db {
        config.storage.connection_string = db;
    }

    logging::init_logging(&config.logging)?;
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    debug!(?config, "configuration loaded");

    let output = match cli.command {
        Command::Calc { form } => app::calc(&config, form.as_deref()).await?,
        Command::Preview { form, html } => {
            app::preview(&config, form.as_deref(), html.as_deref()).await?
        }
        Command::Export {
            form,
            out,
            logo,
            signature,
        } => {
            let branding = Branding {
                logo: logo.as_deref(),
                signature: signature.as_deref(),
            };
            let path = app::export(&config, form.as_deref(), out.as_deref(), branding).await?;
            format!("Payslip written to {}", path.display())
        }
        Command::Draft { action } => match action {
            DraftAction::Save { form } => app::draft_save(&config, &form).await?,
            DraftAction::Show => app::draft_show(&config).await?,
            DraftAction::Clear => app::draft_clear(&config).await?,
        },
    };

    println!("{output}");
    Ok(())
}

//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use srcdoc_build::Config;
use srcdoc_core::{Message, MessageHandler, Severity, Uri};
use srcdoc_lang::registry;

/// Extract API documentation from source code comments
#[derive(Parser)]
#[command(name = "srcdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the project and write the configured output document
    Build {
        /// Project directory holding .srcdoc.yaml
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Scan the project and report diagnostics without writing output
    Check {
        /// Project directory holding .srcdoc.yaml
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Detect the project's languages and write a starter .srcdoc.yaml
    Detect {
        /// Project directory to inspect
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Also look into subdirectories
        #[arg(long, default_value_t = true)]
        recursive: bool,
    },
    /// List the supported source languages
    Langs,
    /// Run the language server over stdio
    Lsp,
}

fn dir_uri(dir: &PathBuf) -> Result<Uri> {
    let abs = if dir.is_absolute() {
        dir.clone()
    } else {
        std::env::current_dir()
            .context("cannot determine working directory")?
            .join(dir)
    };
    Ok(Uri::from_path(abs))
}

fn print_message(m: Message) {
    let prefix = match m.severity {
        Severity::Erro => "[error]",
        Severity::Warn => "[warn] ",
        Severity::Info => "[info] ",
        Severity::Succ => "[ok]   ",
    };
    if m.field.is_empty() {
        eprintln!("{prefix} {} at {}", m.key, m.location);
    } else {
        eprintln!("{prefix} {} ({}) at {}", m.key, m.field, m.location);
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")
}

/// Parse arguments and run the selected command
pub fn run_cli() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build { dir } => {
            let dir = dir_uri(&dir)?;
            let cfg = Config::load(&dir).map_err(|e| anyhow::anyhow!("{e}"))?;
            let h = MessageHandler::new(print_message);
            let wrote = runtime()?
                .block_on(cfg.build(&h))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let errors = h.error_count();
            h.stop();
            if errors > 0 {
                bail!("documentation has {errors} error(s)");
            }
            if wrote {
                println!("wrote {}", cfg.output.path);
            } else {
                println!("nothing to write: no API was documented");
            }
            Ok(())
        }
        Command::Check { dir } => {
            let dir = dir_uri(&dir)?;
            let cfg = Config::load(&dir).map_err(|e| anyhow::anyhow!("{e}"))?;
            let h = MessageHandler::new(print_message);
            runtime()?.block_on(cfg.check_syntax(&h));
            let errors = h.error_count();
            h.stop();
            if errors > 0 {
                bail!("documentation has {errors} error(s)");
            }
            Ok(())
        }
        Command::Detect { dir, recursive } => {
            let dir = dir_uri(&dir)?;
            let cfg = Config::detect(&dir, recursive).map_err(|e| anyhow::anyhow!("{e}"))?;
            cfg.save(&dir).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("wrote {}", dir.join(srcdoc_build::CONFIG_FILENAMES[0]));
            Ok(())
        }
        Command::Langs => {
            println!("{:<12} {:<16} extensions", "id", "name");
            for lang in registry::languages() {
                println!(
                    "{:<12} {:<16} {}",
                    lang.id,
                    lang.display_name,
                    lang.exts.join(" ")
                );
            }
            Ok(())
        }
        Command::Lsp => {
            runtime()?.block_on(srcdoc_lsp::run_stdio());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["srcdoc", "build", "/tmp/p"]).unwrap();
        assert!(matches!(cli.command, Command::Build { .. }));

        let cli = Cli::try_parse_from(["srcdoc", "langs"]).unwrap();
        assert!(matches!(cli.command, Command::Langs));
    }

    #[test]
    fn test_dir_uri_absolute() {
        let uri = dir_uri(&PathBuf::from("/tmp/project")).unwrap();
        assert!(uri.as_str().ends_with("/tmp/project"));
    }
}

use anyhow::Result;
use clap::Args;
use colored::*;

use personas_core::SearchSource;

use super::{print_personas, OutputFormat};
use crate::config::CliConfig;
use crate::utils::{failure, print_warning, Spinner};

#[derive(Args)]
pub struct ListArgs {
    /// Only personas whose nombre, apellido or email contain this text
    #[arg(short, long)]
    search: Option<String>,

    /// Fetch the list again even if it is already loaded
    #[arg(long)]
    refresh: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

pub async fn execute(args: ListArgs, config: &CliConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config)?;
    let service = config.service()?;

    let personas = {
        let _spinner = Spinner::start("Cargando personas...");
        if args.refresh {
            service.reload().await
        } else {
            service.list().await.map(|feed| feed.current())
        }
    }
    .map_err(|e| failure("Error al cargar personas", e))?;

    let personas = match args.search.as_deref() {
        Some(query) => {
            let results = {
                let _spinner = Spinner::start("Buscando...");
                service.search_with_fallback(query).await
            };
            if results.source == SearchSource::LocalFallback {
                if let Some(err) = &results.error {
                    print_warning("Búsqueda local:", &err.to_string());
                }
            }
            results.personas
        }
        None => personas,
    };

    print_personas(&personas, format)?;

    if format == OutputFormat::Table && !personas.is_empty() {
        println!();
        println!("  Total: {}", personas.len().to_string().cyan());
    }

    Ok(())
}

use anyhow::Result;
use clap::Args;

use super::{print_personas, OutputFormat};
use crate::config::CliConfig;
use crate::utils::{failure, Spinner};

#[derive(Args)]
pub struct SearchArgs {
    /// Text matched against nombre, apellido and email on the server
    query: String,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

pub async fn execute(args: SearchArgs, config: &CliConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config)?;
    let service = config.service()?;

    let personas = {
        let _spinner = Spinner::start("Buscando...");
        service.search(args.query.trim()).await
    }
    .map_err(|e| failure("Error en la búsqueda", e))?;

    print_personas(&personas, format)
}

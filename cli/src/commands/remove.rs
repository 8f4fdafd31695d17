use anyhow::Result;
use clap::Args;
use colored::*;

use personas_core::PersonaId;

use crate::config::CliConfig;
use crate::utils::{confirm, failure, print_success, Spinner};

#[derive(Args)]
pub struct RemoveArgs {
    /// Persona ID
    id: PersonaId,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

pub async fn execute(args: RemoveArgs, config: &CliConfig) -> Result<()> {
    let service = config.service()?;

    if !args.yes {
        if !config.ui.interactive {
            anyhow::bail!("Refusing to delete persona {} without --yes", args.id);
        }

        let persona = {
            let _spinner = Spinner::start("Cargando datos de la persona...");
            service.get_by_id(args.id).await
        }
        .map_err(|e| failure("Error al cargar persona", e))?;

        let prompt = format!(
            "¿Está seguro de que desea eliminar a {} {}?",
            persona.nombre, persona.apellido
        );
        if !confirm(&prompt, false)? {
            println!("{}", "Eliminación cancelada.".yellow());
            return Ok(());
        }
    }

    let deleted = {
        let _spinner = Spinner::start("Eliminando persona...");
        service.delete(args.id).await
    };
    deleted.map_err(|e| failure("Error al eliminar", e))?;

    print_success("Persona eliminada con éxito");
    Ok(())
}

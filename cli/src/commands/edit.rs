use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::*;

use personas_core::{PersonaForm, PersonaId, UNSAVED_CHANGES_PROMPT};

use super::{prompt_fields, FieldArgs};
use crate::config::CliConfig;
use crate::utils::{confirm, failure, print_success, Spinner};

#[derive(Args)]
pub struct EditArgs {
    /// Persona ID
    id: PersonaId,

    #[command(flatten)]
    fields: FieldArgs,

    /// Skip interactive prompts
    #[arg(short, long)]
    yes: bool,
}

pub async fn execute(args: EditArgs, config: &CliConfig) -> Result<()> {
    let service = config.service()?;

    let current = {
        let _spinner = Spinner::start("Cargando datos de la persona...");
        service.get_by_id(args.id).await
    }
    .map_err(|e| failure("Error al cargar persona", e))?;

    let now = Utc::now();
    let mut form = PersonaForm::from_persona(&current);
    println!(
        "{} {}",
        form.title().cyan().bold(),
        current.full_name().bright_cyan()
    );

    args.fields.apply(&mut form, now);
    let interactive = config.ui.interactive && !args.yes;

    loop {
        if interactive {
            prompt_fields(&mut form, now)?;
        }

        if !form.is_dirty() {
            println!("{}", "Sin cambios.".yellow());
            return Ok(());
        }

        if !interactive {
            break;
        }
        match closing_choice(
            || confirm("¿Guardar los cambios?", true),
            || confirm(UNSAVED_CHANGES_PROMPT, false),
        )? {
            Closing::Save => break,
            Closing::Discard => {
                println!("{}", "Cambios descartados.".yellow());
                return Ok(());
            }
            Closing::KeepEditing => {}
        }
    }

    let persona = form
        .submit(Utc::now())
        .map_err(|errors| failure("Error al guardar", errors.into()))?;

    let updated = {
        let _spinner = Spinner::start(form.mode().progress_message());
        service.update(args.id, &persona).await
    };
    updated.map_err(|e| failure("Error al guardar", e))?;

    print_success(form.mode().success_message());
    Ok(())
}

/// What to do with a dirty form once the user is done with the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    Save,
    Discard,
    KeepEditing,
}

/// Declining to save never saves: it either leaves without changes or returns to the fields.
fn closing_choice(
    save: impl FnOnce() -> Result<bool>,
    leave: impl FnOnce() -> Result<bool>,
) -> Result<Closing> {
    if save()? {
        return Ok(Closing::Save);
    }
    Ok(if leave()? {
        Closing::Discard
    } else {
        Closing::KeepEditing
    })
}

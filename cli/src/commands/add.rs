use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::*;

use personas_core::PersonaForm;

use super::{prompt_fields, FieldArgs};
use crate::config::CliConfig;
use crate::utils::{failure, print_success, Spinner};

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    fields: FieldArgs,

    /// Skip interactive prompts
    #[arg(short, long)]
    yes: bool,
}

pub async fn execute(args: AddArgs, config: &CliConfig) -> Result<()> {
    let now = Utc::now();
    let mut form = PersonaForm::new();
    println!("{}", form.title().cyan().bold());

    args.fields.apply(&mut form, now);
    if config.ui.interactive && !args.yes {
        prompt_fields(&mut form, now)?;
    }

    let persona = form
        .submit(Utc::now())
        .map_err(|errors| failure("Error al guardar", errors.into()))?;

    let service = config.service()?;
    let created = {
        let _spinner = Spinner::start(form.mode().progress_message());
        service.create(&persona).await
    }
    .map_err(|e| failure("Error al guardar", e))?;

    print_success(form.mode().success_message());
    if let Some(id) = created.id {
        println!("  {} {}", created.full_name().bright_green(), format!("(ID {})", id).dimmed());
        println!("  • Ver: {}", format!("personas show {}", id).cyan());
    }

    Ok(())
}

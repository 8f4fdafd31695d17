use anyhow::Result;
use clap::Args;
use colored::*;
use tabled::{Table, Tabled};

use personas_core::{Field, Persona, PersonaId};

use super::OutputFormat;
use crate::config::CliConfig;
use crate::utils::{failure, Spinner};

#[derive(Args)]
pub struct ShowArgs {
    /// Persona ID
    id: PersonaId,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Tabled)]
struct DetailRow {
    #[tabled(rename = "Campo")]
    field: String,
    #[tabled(rename = "Valor")]
    value: String,
}

pub async fn execute(args: ShowArgs, config: &CliConfig) -> Result<()> {
    let format = OutputFormat::resolve(args.format, config)?;
    let service = config.service()?;

    let persona = {
        let _spinner = Spinner::start("Cargando datos de la persona...");
        service.get_by_id(args.id).await
    }
    .map_err(|e| failure("Error al cargar persona", e))?;

    match format {
        OutputFormat::Table => display_details(&persona),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&persona)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&persona)?),
    }

    Ok(())
}

fn display_details(persona: &Persona) {
    println!("{}", persona.full_name().bright_cyan().bold());

    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut rows = vec![DetailRow {
        field: "ID".to_string(),
        value: persona.id.map(|id| id.to_string()).unwrap_or_default(),
    }];
    rows.extend(
        [
            (Field::Nombre, persona.nombre.clone()),
            (Field::Apellido, persona.apellido.clone()),
            (Field::FechaNacimiento, persona.fecha_nacimiento.clone()),
            (Field::Email, persona.email.clone()),
            (Field::Telefono, optional(&persona.telefono)),
            (Field::Direccion, optional(&persona.direccion)),
        ]
        .into_iter()
        .map(|(field, value)| DetailRow {
            field: field.label().to_string(),
            value,
        }),
    );
    rows.push(DetailRow {
        field: "Registrado".to_string(),
        value: optional(&persona.fecha_registro),
    });

    println!("{}", Table::new(rows));
}

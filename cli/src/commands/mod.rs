use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use colored::*;
use dialoguer::Input;
use tabled::{Table, Tabled};

use personas_core::{blur_title, Field, Persona, PersonaForm};

use crate::config::CliConfig;
use crate::utils::print_warning;

pub mod add;
pub mod edit;
pub mod list;
pub mod ping;
pub mod remove;
pub mod search;
pub mod show;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// `--format` if given, else the configured default.
    pub fn resolve(flag: Option<OutputFormat>, config: &CliConfig) -> Result<Self> {
        match flag {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&config.ui.default_output_format, true).map_err(|_| {
                anyhow::anyhow!(
                    "Unsupported output format in config: {}",
                    config.ui.default_output_format
                )
            }),
        }
    }
}

#[derive(Debug, Tabled)]
struct PersonaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Nombre")]
    nombre: String,
    #[tabled(rename = "Apellido")]
    apellido: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Teléfono")]
    telefono: String,
    #[tabled(rename = "Nacimiento")]
    fecha_nacimiento: String,
}

impl From<&Persona> for PersonaRow {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            nombre: persona.nombre.clone(),
            apellido: persona.apellido.clone(),
            email: persona.email.clone(),
            telefono: persona.telefono.clone().unwrap_or_else(|| "-".to_string()),
            fecha_nacimiento: birth_day(&persona.fecha_nacimiento).to_string(),
        }
    }
}

/// Date part of an API date or timestamp
fn birth_day(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

pub fn print_personas(personas: &[Persona], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if personas.is_empty() {
                println!("{}", "No se encontraron personas.".yellow());
                return Ok(());
            }
            let rows: Vec<PersonaRow> = personas.iter().map(PersonaRow::from).collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(personas)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(personas)?),
    }
    Ok(())
}

/// Field values given on the command line
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Nombre
    #[arg(long)]
    pub nombre: Option<String>,

    /// Apellido
    #[arg(long)]
    pub apellido: Option<String>,

    /// Fecha de nacimiento (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub fecha_nacimiento: Option<String>,

    /// Email
    #[arg(long)]
    pub email: Option<String>,

    /// Teléfono (8 dígitos)
    #[arg(long)]
    pub telefono: Option<String>,

    /// Dirección
    #[arg(long)]
    pub direccion: Option<String>,
}

impl FieldArgs {
    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Nombre => self.nombre.as_deref(),
            Field::Apellido => self.apellido.as_deref(),
            Field::FechaNacimiento => self.fecha_nacimiento.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Telefono => self.telefono.as_deref(),
            Field::Direccion => self.direccion.as_deref(),
        }
    }

    /// Type every given value into the form, reporting what the form flags on leaving a field.
    pub fn apply(&self, form: &mut PersonaForm, now: DateTime<Utc>) {
        for field in Field::ALL {
            if let Some(raw) = self.get(field) {
                form.input(field, raw);
                if let Some(alert) = form.blur(field, now) {
                    print_warning(&blur_title(field), &alert);
                }
            }
        }
    }
}

/// Prompt for every field, pre-filled with the form's current value. Input is re-asked until it
/// passes the field's rule.
pub fn prompt_fields(form: &mut PersonaForm, now: DateTime<Utc>) -> Result<()> {
    for field in Field::ALL {
        let label = if field.is_required() {
            field.label().to_string()
        } else {
            format!("{} (opcional)", field.label())
        };

        let value: String = Input::new()
            .with_prompt(label)
            .with_initial_text(form.value(field))
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), String> {
                field
                    .validate(&field.sanitize(input), now)
                    .map_err(|violation| violation.inline_message(field))
            })
            .interact_text()?;

        form.input(field, &value);
        form.blur(field, now);
    }
    Ok(())
}

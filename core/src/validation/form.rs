use chrono::{DateTime, Utc};

use super::{blur_message, Field, ValidationErrors};
use crate::{Persona, PersonaId};

pub const UNSAVED_CHANGES_PROMPT: &str =
    "Tienes cambios sin guardar. ¿Estás seguro de que quieres salir?";

/// Whether a form creates a new Persona or edits a persisted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(PersonaId),
}

impl FormMode {
    pub fn title(&self) -> &'static str {
        match self {
            FormMode::Create => "Nueva Persona",
            FormMode::Edit(_) => "Editar Persona",
        }
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            FormMode::Create => "Creando persona...",
            FormMode::Edit(_) => "Actualizando persona...",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            FormMode::Create => "Persona creada con éxito",
            FormMode::Edit(_) => "Persona actualizada con éxito",
        }
    }
}

/// Editable copy of a Persona.
///
/// Values are sanitized on [`PersonaForm::input`]; inline errors only show for fields the user
/// has left at least once (or after a submit attempt).
#[derive(Debug, Clone)]
pub struct PersonaForm {
    mode: FormMode,
    values: [String; 6],
    initial: [String; 6],
    touched: [bool; 6],
}

impl Default for PersonaForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaForm {
    /// Empty form for a new record
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            values: Default::default(),
            initial: Default::default(),
            touched: [false; 6],
        }
    }

    /// Form pre-filled from a fetched record; edits it when the record is persisted.
    pub fn from_persona(persona: &Persona) -> Self {
        let values = [
            persona.nombre.clone(),
            persona.apellido.clone(),
            persona.fecha_nacimiento.clone(),
            persona.email.clone(),
            persona.telefono.clone().unwrap_or_default(),
            persona.direccion.clone().unwrap_or_default(),
        ];
        Self {
            mode: persona.id.map_or(FormMode::Create, FormMode::Edit),
            initial: values.clone(),
            values,
            touched: [false; 6],
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &'static str {
        self.mode.title()
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field as usize]
    }

    /// Apply the live sanitizer to `raw` and store the result.
    pub fn input(&mut self, field: Field, raw: &str) -> &str {
        self.values[field as usize] = field.sanitize(raw);
        self.value(field)
    }

    /// Mark `field` as visited and return the detailed alert text, if its value warrants one.
    pub fn blur(&mut self, field: Field, now: DateTime<Utc>) -> Option<String> {
        self.touched[field as usize] = true;

        let value = self.value(field);
        if value.is_empty() {
            return None;
        }
        let violation = field.validate(value, now).err()?;
        blur_message(field, value, violation)
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched[field as usize]
    }

    /// Whether any value differs from what the form was opened with.
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    /// Inline error for a visited field.
    pub fn error(&self, field: Field, now: DateTime<Utc>) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        field
            .validate(self.value(field), now)
            .err()
            .map(|violation| violation.inline_message(field))
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in Field::ALL {
            if let Err(violation) = field.validate(self.value(field), now) {
                errors.push(field, violation);
            }
        }
        errors.into_result()
    }

    /// Validate every field and build the record to send.
    ///
    /// All fields count as touched afterwards, so [`PersonaForm::error`] reports each problem.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Persona, ValidationErrors> {
        self.touched = [true; 6];
        self.validate(now)?;

        let optional = |field: Field| {
            let value = self.value(field);
            (!value.is_empty()).then(|| value.to_string())
        };
        Ok(Persona {
            id: match self.mode {
                FormMode::Edit(id) => Some(id),
                FormMode::Create => None,
            },
            nombre: self.value(Field::Nombre).to_string(),
            apellido: self.value(Field::Apellido).to_string(),
            fecha_nacimiento: self.value(Field::FechaNacimiento).to_string(),
            email: self.value(Field::Email).to_string(),
            telefono: optional(Field::Telefono),
            direccion: optional(Field::Direccion),
            fecha_registro: None,
        })
    }
}

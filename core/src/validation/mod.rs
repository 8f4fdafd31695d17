//! Persona form validation.
//!
//! Rules are pure functions over the raw field text. [`FIELD_RULES`] ties each [`Field`] to its
//! validator and live sanitizer, and the message tables in [`messages`] turn a [`Violation`] into
//! the inline or on-blur text shown to the user. [`PersonaForm`] layers create/edit state on top.

pub mod form;
pub mod messages;
pub mod rules;
pub mod sanitize;

pub use form::*;
pub use messages::*;
pub use rules::*;
pub use sanitize::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Editable field of a Persona form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Nombre,
    Apellido,
    FechaNacimiento,
    Email,
    Telefono,
    Direccion,
}

impl Field {
    /// Form order
    pub const ALL: [Field; 6] = [
        Field::Nombre,
        Field::Apellido,
        Field::FechaNacimiento,
        Field::Email,
        Field::Telefono,
        Field::Direccion,
    ];

    /// Wire and form key
    pub fn key(self) -> &'static str {
        match self {
            Field::Nombre => "nombre",
            Field::Apellido => "apellido",
            Field::FechaNacimiento => "fechaNacimiento",
            Field::Email => "email",
            Field::Telefono => "telefono",
            Field::Direccion => "direccion",
        }
    }

    /// Label used at the start of user-facing messages
    pub fn label(self) -> &'static str {
        match self {
            Field::Nombre => "El nombre",
            Field::Apellido => "El apellido",
            Field::FechaNacimiento => "La fecha de nacimiento",
            Field::Email => "El email",
            Field::Telefono => "El teléfono",
            Field::Direccion => "La dirección",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Field::Telefono | Field::Direccion)
    }

    pub fn rule(self) -> &'static FieldRule {
        &FIELD_RULES[self as usize]
    }

    pub fn validate(self, value: &str, now: DateTime<Utc>) -> Result<(), Violation> {
        (self.rule().validate)(value, now)
    }

    pub fn sanitize(self, raw: &str) -> String {
        (self.rule().sanitize)(raw)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// Why a field value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Required,
    MinLength(usize),
    MaxLength(usize),
    InvalidEmail,
    InvalidDate,
    FutureDate,
    TooOld,
    NonNumeric,
    /// Carries the number of digits actually entered
    WrongLength(usize),
    InvalidCharacters,
    OnlyWhitespace,
}

/// Validator and live sanitizer for one field
pub struct FieldRule {
    pub field: Field,
    pub validate: fn(&str, DateTime<Utc>) -> Result<(), Violation>,
    pub sanitize: fn(&str) -> String,
}

/// Indexed by `Field as usize`.
pub static FIELD_RULES: [FieldRule; 6] = [
    FieldRule {
        field: Field::Nombre,
        validate: |value, _| validate_nombre(value),
        sanitize: sanitize_name,
    },
    FieldRule {
        field: Field::Apellido,
        validate: |value, _| validate_apellido(value),
        sanitize: sanitize_name,
    },
    FieldRule {
        field: Field::FechaNacimiento,
        validate: validate_birth_date,
        sanitize: sanitize_trimmed,
    },
    FieldRule {
        field: Field::Email,
        validate: |value, _| validate_email(value),
        sanitize: sanitize_email,
    },
    FieldRule {
        field: Field::Telefono,
        validate: |value, _| validate_telefono(value),
        sanitize: sanitize_phone,
    },
    FieldRule {
        field: Field::Direccion,
        validate: |value, _| validate_direccion(value),
        sanitize: sanitize_untouched,
    },
];

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Field,
    pub violation: Violation,
}

impl FieldIssue {
    pub fn message(&self) -> String {
        self.violation.inline_message(self.field)
    }
}

/// Every field a submission was rejected for, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, violation: Violation) {
        self.issues.push(FieldIssue { field, violation });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldIssue> {
        self.issues.iter()
    }

    pub fn get(&self, field: Field) -> Option<Violation> {
        self.issues
            .iter()
            .find(|issue| issue.field == field)
            .map(|issue| issue.violation)
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(FieldIssue::message).collect()
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", VALIDATION_TITLE)?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table_follows_field_order() {
        for (index, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(FIELD_RULES[index].field, field);
            assert_eq!(field.rule().field, field);
        }
    }

    #[test]
    fn parses_field_keys() {
        assert_eq!("fechaNacimiento".parse::<Field>().unwrap(), Field::FechaNacimiento);
        assert_eq!("EMAIL".parse::<Field>().unwrap(), Field::Email);
        assert!("edad".parse::<Field>().is_err());
    }

    #[test]
    fn errors_display_every_message() {
        let mut errors = ValidationErrors::new();
        errors.push(Field::Nombre, Violation::Required);
        errors.push(Field::Telefono, Violation::WrongLength(7));

        let text = errors.to_string();
        assert!(text.starts_with("Errores de validación"));
        assert!(text.contains("El nombre es obligatorio."));
        assert!(text.contains("El teléfono debe tener exactamente 8 dígitos."));
        assert_eq!(errors.get(Field::Telefono), Some(Violation::WrongLength(7)));
        assert_eq!(errors.get(Field::Email), None);
    }
}

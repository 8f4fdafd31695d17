//! User-facing validation text.

use super::rules::{MAX_AGE_YEARS, PHONE_DIGITS};
use super::{Field, Violation};

pub const VALIDATION_TITLE: &str = "Errores de validación";

impl Violation {
    /// Short key identifying the rule that failed
    pub fn key(&self) -> &'static str {
        match self {
            Violation::Required => "required",
            Violation::MinLength(_) => "minlength",
            Violation::MaxLength(_) => "maxlength",
            Violation::InvalidEmail => "email",
            Violation::InvalidDate => "pattern",
            Violation::FutureDate => "fechaFutura",
            Violation::TooOld => "fechaMuyAntigua",
            Violation::NonNumeric => "soloNumeros",
            Violation::WrongLength(_) => "longitudIncorrecta",
            Violation::InvalidCharacters => "soloLetras",
            Violation::OnlyWhitespace => "soloEspacios",
        }
    }

    /// Message shown next to a touched field and in the submission summary.
    pub fn inline_message(&self, field: Field) -> String {
        let label = field.label();
        match self {
            Violation::Required => format!("{} es obligatorio.", label),
            Violation::MinLength(min) => {
                format!("{} debe tener al menos {} caracteres.", label, min)
            }
            Violation::MaxLength(max) => {
                format!("{} no puede tener más de {} caracteres.", label, max)
            }
            Violation::InvalidEmail => "El formato del email no es válido.".to_string(),
            Violation::InvalidDate => format!("{} tiene un formato inválido.", label),
            Violation::FutureDate => "La fecha de nacimiento no puede ser futura.".to_string(),
            Violation::TooOld => format!(
                "La fecha de nacimiento no puede ser mayor a {} años.",
                MAX_AGE_YEARS
            ),
            Violation::NonNumeric => "El teléfono solo puede contener números.".to_string(),
            Violation::WrongLength(_) => format!(
                "El teléfono debe tener exactamente {} dígitos.",
                PHONE_DIGITS
            ),
            Violation::InvalidCharacters => {
                format!("{} solo puede contener letras y espacios.", label)
            }
            Violation::OnlyWhitespace => {
                format!("{} no puede estar vacío o contener solo espacios.", label)
            }
        }
    }
}

/// Detailed explanation shown when the user leaves a field holding `value`.
///
/// Only character-set, whitespace, phone-length and email-shape problems get one; everything
/// else waits for the inline message.
pub fn blur_message(field: Field, value: &str, violation: Violation) -> Option<String> {
    let message = match (field, violation) {
        (Field::Telefono, Violation::NonNumeric) => format!(
            "El teléfono \"{}\" contiene caracteres no válidos. Solo se permiten números (0-9).",
            value
        ),
        (Field::Telefono, Violation::WrongLength(digits)) => format!(
            "El teléfono \"{}\" tiene {} dígito{}. Debe tener exactamente {} dígitos para línea fija o móvil.",
            value,
            digits,
            if digits == 1 { "" } else { "s" },
            PHONE_DIGITS
        ),
        (Field::Nombre | Field::Apellido, Violation::InvalidCharacters) => format!(
            "{} \"{}\" contiene caracteres no válidos. Solo se permiten letras, espacios y acentos.",
            field.label().to_lowercase(),
            value
        ),
        (Field::Nombre | Field::Apellido, Violation::OnlyWhitespace) => format!(
            "{} no puede contener solo espacios. Debe incluir al menos una letra.",
            field.label().to_lowercase()
        ),
        (Field::Email, Violation::InvalidEmail) => format!(
            "El email \"{}\" no tiene un formato válido. Debe tener el formato: ejemplo@correo.com",
            value
        ),
        _ => return None,
    };
    Some(message)
}

/// Heading for the blur alert of `field`.
pub fn blur_title(field: Field) -> String {
    match field {
        Field::Telefono => "📞 Teléfono Inválido".to_string(),
        Field::Email => "⚠️ Email Inválido".to_string(),
        _ => format!("✏️ {} Inválido", field.label()),
    }
}

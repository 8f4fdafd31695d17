use serde::{Deserialize, Serialize};

/// Server-assigned identity of a persisted Persona
pub type PersonaId = i64;

/// Person record managed through the Personas API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Absent until the server has persisted the record
    #[serde(
        rename = "idPersona",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<PersonaId>,

    pub nombre: String,

    pub apellido: String,

    /// `YYYY-MM-DD` or an RFC 3339 timestamp, as the API returns it
    pub fecha_nacimiento: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,

    /// Set by the server on creation, in whatever timestamp format it uses; never edited by
    /// the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_registro: Option<String>,
}

impl Persona {
    /// Create an unpersisted record
    pub fn new(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        fecha_nacimiento: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            nombre: nombre.into(),
            apellido: apellido.into(),
            fecha_nacimiento: fecha_nacimiento.into(),
            email: email.into(),
            telefono: None,
            direccion: None,
            fecha_registro: None,
        }
    }

    pub fn with_telefono(mut self, telefono: impl Into<String>) -> Self {
        self.telefono = Some(telefono.into());
        self
    }

    pub fn with_direccion(mut self, direccion: impl Into<String>) -> Self {
        self.direccion = Some(direccion.into());
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }

    /// Case-insensitive substring match over nombre, apellido and email.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.nombre, &self.apellido, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Copy sent in create/update bodies; server-owned fields are left out.
    pub fn to_submission(&self) -> Self {
        Self {
            fecha_registro: None,
            ..self.clone()
        }
    }
}

/// API payload either wrapped in a `data` envelope or returned bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_api_field_names() {
        let persona: Persona = serde_json::from_value(json!({
            "idPersona": 4,
            "nombre": "Ana",
            "apellido": "Garcia",
            "fechaNacimiento": "1990-05-01",
            "email": "a@x.com",
            "telefono": "22334455",
            "fechaRegistro": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(persona.id, Some(4));
        assert_eq!(persona.fecha_nacimiento, "1990-05-01");
        assert_eq!(persona.telefono.as_deref(), Some("22334455"));
        assert!(persona.direccion.is_none());
        assert!(persona.fecha_registro.is_some());
    }

    #[test]
    fn accepts_plain_id_alias() {
        let persona: Persona = serde_json::from_value(json!({
            "id": 9,
            "nombre": "Luis",
            "apellido": "Perez",
            "fechaNacimiento": "1985-01-01",
            "email": "l@x.com"
        }))
        .unwrap();

        assert_eq!(persona.id, Some(9));
    }

    #[test]
    fn new_records_serialize_without_id() {
        let body = serde_json::to_value(
            Persona::new("Ana", "Garcia", "1990-05-01", "a@x.com").with_telefono("22334455"),
        )
        .unwrap();

        assert!(body.get("idPersona").is_none());
        assert!(body.get("fechaRegistro").is_none());
        assert_eq!(body["fechaNacimiento"], "1990-05-01");
        assert_eq!(body["telefono"], "22334455");
    }

    #[test]
    fn envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<Vec<Persona>> = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(wrapped.into_inner().is_empty());

        let bare: Envelope<Persona> = serde_json::from_value(json!({
            "idPersona": 1,
            "nombre": "Ana",
            "apellido": "Garcia",
            "fechaNacimiento": "1990-05-01",
            "email": "a@x.com"
        }))
        .unwrap();
        assert_eq!(bare.into_inner().id, Some(1));
    }

    #[test]
    fn matches_is_case_insensitive_over_searchable_fields() {
        let ana = Persona::new("Ana", "Garcia", "1990-05-01", "a@x.com");
        assert!(ana.matches("garcia"));
        assert!(ana.matches("ANA"));
        assert!(ana.matches("@x.c"));
        assert!(!ana.matches("perez"));
    }
}

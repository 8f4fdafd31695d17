use async_trait::async_trait;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::{ApiClient, Envelope, Persona, PersonaId, PersonaResult};

const PERSONAS: &str = "Personas";
const SEARCH: &str = "Personas/buscar";

/// Remote Persona resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonaRepository: Send + Sync {
    async fn list_all(&self) -> PersonaResult<Vec<Persona>>;
    async fn find_by_id(&self, id: PersonaId) -> PersonaResult<Persona>;
    /// Returns the record as persisted, with its server-assigned id.
    async fn create(&self, persona: &Persona) -> PersonaResult<Persona>;
    async fn update(&self, id: PersonaId, persona: &Persona) -> PersonaResult<Persona>;
    async fn delete(&self, id: PersonaId) -> PersonaResult<()>;
    /// Server-side match of `query` against nombre, apellido or email.
    async fn search(&self, query: &str) -> PersonaResult<Vec<Persona>>;
}

/// [`PersonaRepository`] backed by the Personas REST API.
#[derive(Clone)]
pub struct HttpPersonaRepository {
    client: ApiClient,
}

impl HttpPersonaRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn item(id: PersonaId) -> String {
        format!("{}/{}", PERSONAS, id)
    }
}

#[async_trait]
impl PersonaRepository for HttpPersonaRepository {
    async fn list_all(&self) -> PersonaResult<Vec<Persona>> {
        let personas = self
            .client
            .get::<Envelope<Vec<Persona>>>(PERSONAS, &[])
            .await?
            .into_inner();
        debug!(count = personas.len(), "fetched personas");
        Ok(personas)
    }

    async fn find_by_id(&self, id: PersonaId) -> PersonaResult<Persona> {
        let persona = self
            .client
            .get::<Envelope<Persona>>(&Self::item(id), &[])
            .await?;
        Ok(persona.into_inner())
    }

    async fn create(&self, persona: &Persona) -> PersonaResult<Persona> {
        let created = self
            .client
            .post::<_, Envelope<Persona>>(PERSONAS, &persona.to_submission())
            .await?;
        Ok(created.into_inner())
    }

    async fn update(&self, id: PersonaId, persona: &Persona) -> PersonaResult<Persona> {
        let submission = persona.to_submission();
        let updated = self
            .client
            .put::<_, Option<Envelope<Persona>>>(&Self::item(id), &submission)
            .await?;

        // 204 No Content: the server accepted the record as sent
        Ok(match updated {
            Some(envelope) => envelope.into_inner(),
            None => Persona {
                id: Some(id),
                ..submission
            },
        })
    }

    async fn delete(&self, id: PersonaId) -> PersonaResult<()> {
        self.client.delete::<IgnoredAny>(&Self::item(id)).await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> PersonaResult<Vec<Persona>> {
        let params = [("nombre", query), ("apellido", query), ("email", query)];
        let personas = self
            .client
            .get::<Envelope<Vec<Persona>>>(SEARCH, &params)
            .await?
            .into_inner();
        debug!(query, count = personas.len(), "searched personas");
        Ok(personas)
    }
}

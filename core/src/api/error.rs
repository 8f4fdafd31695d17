//! Translation of transport and HTTP failures into the messages shown to users.
//!
//! Nothing above the request pipeline ever sees a raw `reqwest` error or a bare status code: each
//! failure is logged in full here and replaced with an [`ApiError`] carrying a fixed title and
//! message.

use std::time::Duration;

use serde_json::Value;
use tracing::error;

const GENERIC_TITLE: &str = "Error";
const GENERIC_MESSAGE: &str = "Ha ocurrido un error inesperado";

/// User-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response at all: DNS, refused connection, TLS, timeout
    Connectivity,
    InvalidInput,
    Unauthorized,
    Forbidden,
    NotFound,
    Server,
    /// 502, 503 and 504
    Unavailable,
    Unknown,
}

struct Translation {
    kind: ErrorKind,
    title: &'static str,
    message: &'static str,
}

const CONNECTIVITY: Translation = Translation {
    kind: ErrorKind::Connectivity,
    title: "Sin Conexión",
    message: "No se puede conectar con el servidor. Verifica tu conexión a internet y que el servidor esté ejecutándose.",
};

const UNAVAILABLE: Translation = Translation {
    kind: ErrorKind::Unavailable,
    title: "Servidor No Disponible",
    message: "El servidor no está disponible temporalmente. Intenta más tarde.",
};

/// Status code → translation. Codes missing here fall back to the server's own message.
const STATUS_TABLE: &[(u16, Translation)] = &[
    (0, CONNECTIVITY),
    (
        400,
        Translation {
            kind: ErrorKind::InvalidInput,
            title: "Datos Inválidos",
            message: "Los datos enviados no son válidos. Revisa la información e intenta nuevamente.",
        },
    ),
    (
        401,
        Translation {
            kind: ErrorKind::Unauthorized,
            title: "No Autorizado",
            message: "Token de autorización inválido o expirado. Contacta al administrador.",
        },
    ),
    (
        403,
        Translation {
            kind: ErrorKind::Forbidden,
            title: "Acceso Denegado",
            message: "No tienes permisos para realizar esta acción.",
        },
    ),
    (
        404,
        Translation {
            kind: ErrorKind::NotFound,
            title: "No Encontrado",
            message: "El recurso solicitado no fue encontrado.",
        },
    ),
    (
        500,
        Translation {
            kind: ErrorKind::Server,
            title: "Error del Servidor",
            message: "Error interno del servidor. Intenta nuevamente más tarde.",
        },
    ),
    (502, UNAVAILABLE),
    (503, UNAVAILABLE),
    (504, UNAVAILABLE),
];

/// Normalized failure returned by every pipeline call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    title: String,
    message: String,
    status: Option<u16>,
}

impl ApiError {
    pub fn new(
        kind: ErrorKind,
        title: impl Into<String>,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            status,
        }
    }

    /// The translated error for a bare status code, without any server body.
    pub fn from_status(status: u16) -> Self {
        translate_status(status, None)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized | ErrorKind::Forbidden)
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind == ErrorKind::Connectivity
    }
}

/// What actually went wrong during one request attempt
#[derive(Debug, Clone, thiserror::Error)]
pub enum RawFailure {
    #[error("{method} {url}: {detail}")]
    Connectivity {
        method: String,
        url: String,
        detail: String,
    },

    #[error("{method} {url}: no response after {after:?}")]
    Timeout {
        method: String,
        url: String,
        after: Duration,
    },

    #[error("{method} {url}: HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url}: unreadable response body: {detail}")]
    Decode {
        method: String,
        url: String,
        detail: String,
    },
}

impl RawFailure {
    /// Status as the translator sees it; 0 means no response
    pub fn status(&self) -> Option<u16> {
        match self {
            RawFailure::Connectivity { .. } | RawFailure::Timeout { .. } => Some(0),
            RawFailure::Status { status, .. } => Some(*status),
            RawFailure::Decode { .. } => None,
        }
    }

    /// Whether another attempt with the same parameters may help
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RawFailure::Decode { .. })
    }
}

/// Log `failure` in full and return its user-facing translation.
pub fn translate(failure: &RawFailure) -> ApiError {
    let translated = match failure {
        RawFailure::Connectivity { .. } | RawFailure::Timeout { .. } => translate_status(0, None),
        RawFailure::Status { status, body, .. } => translate_status(*status, Some(body.as_str())),
        RawFailure::Decode { .. } => {
            ApiError::new(ErrorKind::Unknown, GENERIC_TITLE, GENERIC_MESSAGE, None)
        }
    };

    match failure {
        RawFailure::Status { url, body, .. } => error!(
            status = failure.status(),
            url = %url,
            body = %body,
            translated = %translated.message,
            "HTTP error: {}",
            failure
        ),
        _ => error!(
            status = failure.status(),
            translated = %translated.message,
            "HTTP error: {}",
            failure
        ),
    }

    translated
}

fn translate_status(status: u16, body: Option<&str>) -> ApiError {
    if let Some((_, entry)) = STATUS_TABLE.iter().find(|(code, _)| *code == status) {
        return ApiError::new(entry.kind, entry.title, entry.message, Some(status));
    }

    let message = body
        .and_then(server_message)
        .unwrap_or_else(|| GENERIC_MESSAGE.to_string());
    ApiError::new(ErrorKind::Unknown, GENERIC_TITLE, message, Some(status))
}

/// `message` (or ASP.NET's `Message` / problem-details `title`) from a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "Message", "title"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

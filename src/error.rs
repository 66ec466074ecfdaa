use serde::Deserialize;
use thiserror::Error;

use crate::types::RecipeDraft;

/// Provider codes that mean the account ran out of quota or hit a rate limit.
const QUOTA_CODES: &[&str] = &[
    "rate_limit_exceeded",
    "insufficient_quota",
    "RESOURCE_EXHAUSTED",
];

/// Provider codes that mean the credential was rejected.
const CREDENTIAL_CODES: &[&str] = &["invalid_api_key", "UNAUTHENTICATED", "PERMISSION_DENIED"];

/// Lowercased message fragments that mark a quota failure when a gateway
/// sends neither a telling status nor a provider code.
const QUOTA_WORDING: &[&str] = &["rate limit", "quota"];

/// Classified outcome of a failed generation request.
///
/// Exactly one of these is produced per failed request. The presentation
/// layer keys its localized message on [`GenerationError::kind`].
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No ingredients were provided")]
    NoInput,

    #[error("No usable API key is configured")]
    MissingCredential,

    #[error("API quota exceeded{}", fmt_detail(.0))]
    QuotaExceeded(Option<String>),

    #[error("API key was rejected{}", fmt_detail(.0))]
    InvalidCredential(Option<String>),

    #[error("Model returned an invalid recipe{}", fmt_detail(.0))]
    MalformedResponse(Option<String>),

    #[error("Model returned an empty response{}", fmt_detail(.0))]
    EmptyResponse(Option<String>),

    /// The recipe text was valid but no image came back. The validated draft
    /// is kept so a caller can still show the text-only recipe.
    #[error("Recipe was generated but the image could not be created{}", fmt_detail(.detail))]
    ImageGenerationFailed {
        draft: Box<RecipeDraft>,
        detail: Option<String>,
    },

    #[error("Unknown error{}", fmt_detail(.0))]
    Unknown(Option<String>),
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::NoInput => ErrorKind::NoInput,
            GenerationError::MissingCredential => ErrorKind::MissingCredential,
            GenerationError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            GenerationError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            GenerationError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            GenerationError::EmptyResponse(_) => ErrorKind::EmptyResponse,
            GenerationError::ImageGenerationFailed { .. } => ErrorKind::ImageGenerationFailed,
            GenerationError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Optional human-readable detail attached to the classification.
    pub fn detail(&self) -> Option<&str> {
        match self {
            GenerationError::NoInput | GenerationError::MissingCredential => None,
            GenerationError::QuotaExceeded(d)
            | GenerationError::InvalidCredential(d)
            | GenerationError::MalformedResponse(d)
            | GenerationError::EmptyResponse(d)
            | GenerationError::Unknown(d) => d.as_deref(),
            GenerationError::ImageGenerationFailed { detail, .. } => detail.as_deref(),
        }
    }

    /// The text-only recipe, when the failure happened after it was validated.
    pub fn partial_recipe(&self) -> Option<&RecipeDraft> {
        match self {
            GenerationError::ImageGenerationFailed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        GenerationError::MalformedResponse(Some(detail.into()))
    }
}

/// Machine-readable tag for a [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoInput,
    MissingCredential,
    QuotaExceeded,
    InvalidCredential,
    MalformedResponse,
    EmptyResponse,
    ImageGenerationFailed,
    Unknown,
}

impl ErrorKind {
    /// Stable code suitable for logs and cross-process reporting.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NoInput => "NO_INPUT",
            ErrorKind::MissingCredential => "API_KEY_MISSING",
            ErrorKind::QuotaExceeded => "API_QUOTA_EXCEEDED",
            ErrorKind::InvalidCredential => "API_INVALID_KEY",
            ErrorKind::MalformedResponse => "INVALID_RECIPE_FORMAT",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::ImageGenerationFailed => "IMAGE_GENERATION_FAILED",
            ErrorKind::Unknown => "API_UNKNOWN_ERROR",
        }
    }

    /// Dotted message key understood by [`crate::i18n::t`].
    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorKind::NoInput => "error.noIngredients",
            ErrorKind::MissingCredential => "error.keyMissing",
            ErrorKind::QuotaExceeded => "error.quotaExceeded",
            ErrorKind::InvalidCredential => "error.invalidKey",
            ErrorKind::MalformedResponse => "error.invalidRecipeFormat",
            ErrorKind::EmptyResponse => "error.emptyResponse",
            ErrorKind::ImageGenerationFailed => "error.imageFailed",
            ErrorKind::Unknown => "error.unknown",
        }
    }

    /// Whether resubmitting the same request may succeed, as opposed to a
    /// configuration problem the user has to fix first.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedResponse
                | ErrorKind::EmptyResponse
                | ErrorKind::ImageGenerationFailed
                | ErrorKind::Unknown
        )
    }
}

/// Structured failure reported by a provider adapter.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned HTTP {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// The provider refused to answer (safety filter, blocked prompt).
    #[error("Response blocked by provider: {0}")]
    Blocked(String),

    /// The provider envelope was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// A success body that did not decode into the provider's response shape.
    #[error("Could not decode provider response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Build an `Http` error from a status and raw response body, decoding the
    /// provider's error envelope when present.
    pub fn from_http(status: u16, body: &str) -> Self {
        let (code, message) = decode_error_body(body);
        ProviderError::Http {
            status,
            code,
            message,
        }
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Http {
                status,
                code,
                message,
            } => {
                let code = code.as_deref().unwrap_or("");
                if status == 429 || QUOTA_CODES.contains(&code) {
                    GenerationError::QuotaExceeded(Some(message))
                } else if status == 401 || status == 403 || CREDENTIAL_CODES.contains(&code) {
                    GenerationError::InvalidCredential(Some(message))
                } else if mentions_quota(&message) {
                    GenerationError::QuotaExceeded(Some(message))
                } else {
                    GenerationError::Unknown(Some(format!("HTTP {}: {}", status, message)))
                }
            }
            ProviderError::Blocked(reason) => GenerationError::EmptyResponse(Some(reason)),
            other => GenerationError::Unknown(Some(other.to_string())),
        }
    }
}

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_WORDING.iter().any(|w| lower.contains(w))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

/// Union of the OpenAI (`type`, string `code`) and Gemini (`status`, numeric
/// `code`) error shapes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    code: Option<serde_json::Value>,
}

fn decode_error_body(body: &str) -> (Option<String>, String) {
    let Some(err) = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
    else {
        return (None, body.trim().to_string());
    };

    // Gemini's symbolic status is more specific than its numeric code.
    let code = err
        .status
        .or_else(|| err.code.as_ref().and_then(|c| c.as_str().map(String::from)))
        .or(err.kind);
    let message = err.message.unwrap_or_else(|| body.trim().to_string());
    (code, message)
}

pub type Result<T> = std::result::Result<T, GenerationError>;

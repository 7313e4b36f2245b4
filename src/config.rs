//! Environment-driven settings shared by the docrag binaries.

use std::fmt;
use std::path::PathBuf;

/// Embedding model used when `GOOGLE_EMBEDDING_MODEL` is unset.
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
/// Chat model used when `GOOGLE_LLM_MODEL` is unset.
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash-lite";

/// Raw, possibly-absent configuration values gathered from the environment.
///
/// Binaries collect these through clap `env = ...` arguments and resolve them
/// into [`Settings`] before doing any I/O, so a run with several missing
/// settings reports all of them at once.
#[derive(Debug, Default, Clone)]
pub struct RawSettings {
    /// `GOOGLE_API_KEY`.
    pub google_api_key: Option<String>,
    /// `DATABASE_URL`.
    pub database_url: Option<String>,
    /// `PG_VECTOR_COLLECTION_NAME`.
    pub collection: Option<String>,
    /// `PDF_PATH` (ingestion only).
    pub pdf_path: Option<PathBuf>,
    /// `GOOGLE_EMBEDDING_MODEL`.
    pub embedding_model: Option<String>,
    /// `GOOGLE_LLM_MODEL`.
    pub llm_model: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key authenticating embedding and chat requests.
    pub google_api_key: String,
    /// Postgres connection string for the pgvector backend.
    pub database_url: String,
    /// Collection name holding chunks and embeddings.
    pub collection: String,
    /// Source PDF; guaranteed present after [`RawSettings::resolve_for_ingest`].
    pub pdf_path: Option<PathBuf>,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat model identifier.
    pub llm_model: String,
}

/// Errors surfaced while resolving settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// One or more required settings were absent or blank.
    Missing(Vec<&'static str>),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(names) => {
                write!(f, "missing required settings: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl RawSettings {
    /// Resolves the settings needed by the chat and search binaries.
    pub fn resolve(self) -> Result<Settings, SettingsError> {
        self.resolve_inner(false)
    }

    /// Resolves the settings needed by ingestion; additionally requires `PDF_PATH`.
    pub fn resolve_for_ingest(self) -> Result<Settings, SettingsError> {
        self.resolve_inner(true)
    }

    fn resolve_inner(self, require_pdf: bool) -> Result<Settings, SettingsError> {
        let mut missing = Vec::new();
        let google_api_key = present(self.google_api_key);
        if google_api_key.is_none() {
            missing.push("GOOGLE_API_KEY");
        }
        let database_url = present(self.database_url);
        if database_url.is_none() {
            missing.push("DATABASE_URL");
        }
        let collection = present(self.collection);
        if collection.is_none() {
            missing.push("PG_VECTOR_COLLECTION_NAME");
        }
        let pdf_path = self
            .pdf_path
            .filter(|path| !path.as_os_str().is_empty());
        if require_pdf && pdf_path.is_none() {
            missing.push("PDF_PATH");
        }
        if !missing.is_empty() {
            return Err(SettingsError::Missing(missing));
        }

        Ok(Settings {
            google_api_key: google_api_key.unwrap(),
            database_url: database_url.unwrap(),
            collection: collection.unwrap(),
            pdf_path,
            embedding_model: present(self.embedding_model)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            llm_model: present(self.llm_model).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RawSettings {
        RawSettings {
            google_api_key: Some("key".into()),
            database_url: Some("postgres://localhost/rag".into()),
            collection: Some("docs".into()),
            pdf_path: Some(PathBuf::from("document.pdf")),
            embedding_model: None,
            llm_model: None,
        }
    }

    #[test]
    fn reports_every_missing_setting_by_name() {
        let err = RawSettings::default().resolve_for_ingest().unwrap_err();
        let SettingsError::Missing(names) = &err;
        assert_eq!(
            names,
            &vec![
                "GOOGLE_API_KEY",
                "DATABASE_URL",
                "PG_VECTOR_COLLECTION_NAME",
                "PDF_PATH"
            ]
        );
        let message = err.to_string();
        assert!(message.contains("GOOGLE_API_KEY"));
        assert!(message.contains("PDF_PATH"));
    }

    #[test]
    fn pdf_path_optional_outside_ingestion() {
        let mut raw = complete();
        raw.pdf_path = None;
        let settings = raw.resolve().expect("resolve");
        assert!(settings.pdf_path.is_none());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut raw = complete();
        raw.google_api_key = Some("   ".into());
        let SettingsError::Missing(names) = raw.resolve().unwrap_err();
        assert_eq!(names, vec!["GOOGLE_API_KEY"]);
    }

    #[test]
    fn model_defaults_apply_when_unset() {
        let settings = complete().resolve_for_ingest().expect("resolve");
        assert_eq!(settings.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(settings.llm_model, DEFAULT_LLM_MODEL);
    }

    #[test]
    fn explicit_models_override_defaults() {
        let mut raw = complete();
        raw.embedding_model = Some("models/text-embedding-004".into());
        raw.llm_model = Some("gemini-2.5-pro".into());
        let settings = raw.resolve().expect("resolve");
        assert_eq!(settings.embedding_model, "models/text-embedding-004");
        assert_eq!(settings.llm_model, "gemini-2.5-pro");
    }
}

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use deckgen_common::ConfigError;
use deckgen_genai::GenAiError;
use deckgen_web_search::SearchError;

/// Top-level error for a deck generation run.
#[derive(Error, Debug)]
pub enum DeckError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Research errors
    #[error("Research error: {0}")]
    Research(#[from] ResearchError),

    /// Per-slide content generation errors
    #[error("Content generation error: {0}")]
    Content(#[from] ContentGenerationError),

    /// Per-slide image errors
    #[error("Image resolution error: {0}")]
    Image(#[from] ImageResolutionError),

    /// Structural errors between stages
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Document rendering errors
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeckError {
    /// Whether this error aborts the run. Everything else degrades to a fallback value.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DeckError::Config(_) | DeckError::Assembly(_) | DeckError::Writer(_) | DeckError::Io(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("every search backend failed: {}", .failures.join("; "))]
    Unavailable { failures: Vec<String> },
}

#[derive(Error, Debug)]
pub enum ContentGenerationError {
    #[error("slide {position}: {source}")]
    Backend {
        position: usize,
        #[source]
        source: GenAiError,
    },

    #[error("slide {position}: generation timed out after {}s", .timeout.as_secs())]
    Timeout { position: usize, timeout: Duration },

    #[error("slide {position}: invalid response: {reason}")]
    InvalidResponse { position: usize, reason: String },
}

impl ContentGenerationError {
    pub fn position(&self) -> usize {
        match self {
            ContentGenerationError::Backend { position, .. }
            | ContentGenerationError::Timeout { position, .. }
            | ContentGenerationError::InvalidResponse { position, .. } => *position,
        }
    }
}

#[derive(Error, Debug)]
pub enum ImageResolutionError {
    #[error("image search for '{query}' failed: {source}")]
    Search {
        query: String,
        #[source]
        source: SearchError,
    },

    #[error("no admissible image for '{query}' among {seen} results")]
    NoAdmissibleHit { query: String, seen: usize },

    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: SearchError,
    },

    #[error("{url} is not a decodable image: {reason}")]
    Decode { url: String, reason: String },

    #[error("image request timed out after {}s", .timeout.as_secs())]
    Timeout { timeout: Duration },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("expected {expected} slides, got {contents} contents and {images} images")]
    CountMismatch {
        expected: usize,
        contents: usize,
        images: usize,
    },

    #[error("{what} position {position} is outside 1..={len}")]
    OutOfRange {
        what: &'static str,
        position: usize,
        len: usize,
    },

    #[error("duplicate {what} for position {position}")]
    Duplicate { what: &'static str, position: usize },

    #[error("missing {what} for position {position}")]
    Missing { what: &'static str, position: usize },
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("slide {position}: image could not be embedded: {reason}")]
    Image { position: usize, reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DeckError>;

/// Error reporting utilities
pub struct ErrorReporter;

impl ErrorReporter {
    /// Format error for user display
    pub fn format_user_error(error: &DeckError) -> String {
        match error {
            DeckError::Config(config_err) => Self::format_config_error(config_err),
            DeckError::Assembly(assembly_err) => {
                format!(
                    "🧩 Slides could not be assembled: {assembly_err}\n💡 This is an internal error, please report it"
                )
            }
            DeckError::Writer(writer_err) => {
                format!("📄 Document could not be written: {writer_err}")
            }
            DeckError::Io(io_err) => {
                format!("📁 File operation failed: {io_err}\n💡 Check that the output directory is writable")
            }
            DeckError::Research(err) => format!("🔎 {err}"),
            DeckError::Content(err) => format!("✍️  {err}"),
            DeckError::Image(err) => format!("🖼️  {err}"),
        }
    }

    fn format_config_error(error: &ConfigError) -> String {
        match error {
            ConfigError::MissingCredential { var, purpose } => {
                format!(
                    "🔑 Missing required credential: {var} ({purpose})\n💡 Set {var} in your environment or in a .env file"
                )
            }
            ConfigError::EmptyTopic => {
                "📝 Topic must not be empty\n💡 Pass a topic, e.g. deckgen \"Solar Energy\"".to_string()
            }
            ConfigError::InvalidFile { path, reason } => {
                format!(
                    "📄 Configuration file invalid: {path}\n📝 Reason: {reason}\n💡 Fix the file or pass --config with another path"
                )
            }
            _ => format!("⚙️  Configuration error: {error}"),
        }
    }

    /// Get error severity level
    pub fn get_severity(error: &DeckError) -> ErrorSeverity {
        match error {
            DeckError::Research(_) | DeckError::Content(_) | DeckError::Image(_) => {
                ErrorSeverity::Warning
            }
            DeckError::Assembly(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "⚠️  WARNING"),
            ErrorSeverity::Error => write!(f, "❌ ERROR"),
            ErrorSeverity::Critical => write!(f, "🚨 CRITICAL"),
        }
    }
}

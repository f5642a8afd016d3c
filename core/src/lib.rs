//! Deck generation pipeline: research, plan, content, imagery, assembly and rendering.

pub mod assembly;
pub mod content;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod research;
pub mod retry;
pub mod visual;
pub mod writer;

pub use assembly::assemble;
pub use content::{ContentGenerator, LlmContentGenerator};
pub use error::{DeckError, ErrorReporter, ErrorSeverity, Result};
pub use pipeline::{Pipeline, RunOutput, RunReport};
pub use plan::build_plan;
pub use research::{Research, WebResearcher};
pub use visual::{ImageResolver, WebImageResolver};
pub use writer::{writer_for, DocumentWriter, MarkdownWriter, PptxWriter};

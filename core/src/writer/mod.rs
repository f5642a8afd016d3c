//! Document writers: render an assembled [`Deck`] into the bytes of one output file.

use deckgen_common::{Deck, OutputFormat};

use crate::error::WriterError;

mod markdown;
mod pptx;

pub use markdown::MarkdownWriter;
pub use pptx::PptxWriter;

pub trait DocumentWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn render(&self, deck: &Deck) -> Result<Vec<u8>, WriterError>;
}

/// The writer for an output format.
pub fn writer_for(format: OutputFormat) -> Box<dyn DocumentWriter> {
    match format {
        OutputFormat::Pptx => Box::new(PptxWriter::default()),
        OutputFormat::Markdown => Box::new(MarkdownWriter),
    }
}

/// Subtitle shown under the title slide's heading.
pub(crate) fn subtitle(deck: &Deck) -> String {
    format!("A Presentation on {}", deck.topic)
}

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(
            escape_xml("<t>\"x\" 'y'</t>"),
            "&lt;t&gt;&quot;x&quot; &apos;y&apos;&lt;/t&gt;"
        );
        assert_eq!(escape_xml("bell\u{7}tab\t"), "belltab\t");
    }

    #[test]
    fn test_writer_for_format() {
        assert_eq!(writer_for(OutputFormat::Pptx).format(), OutputFormat::Pptx);
        assert_eq!(writer_for(OutputFormat::Markdown).format(), OutputFormat::Markdown);
    }
}

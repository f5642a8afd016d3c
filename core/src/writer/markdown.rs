use base64::Engine;
use deckgen_common::{Deck, DeckSlide, OutputFormat, SlideKind};
use std::fmt::Write;

use super::{subtitle, DocumentWriter};
use crate::error::WriterError;

const SLIDE_SEPARATOR: &str = "\n---\n\n";

/// Markdown slides separated by `---`, images inlined as base64 data URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownWriter;

impl MarkdownWriter {
    fn write_slide(out: &mut String, deck: &Deck, slide: &DeckSlide) -> std::fmt::Result {
        let title = one_line(&slide.content.title);
        match slide.kind {
            SlideKind::Title => {
                writeln!(out, "# {title}")?;
                writeln!(out)?;
                writeln!(out, "*{}*", subtitle(deck))?;
            }
            _ => {
                writeln!(out, "## {title}")?;
                writeln!(out)?;
                for bullet in &slide.content.bullets {
                    writeln!(out, "- {}", one_line(bullet))?;
                }
            }
        }

        let image = &slide.image;
        if let Some(mime) = image.format.mime_type().filter(|_| !image.is_absent()) {
            let alt = slide.content.image_query().unwrap_or(&title);
            let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
            writeln!(out)?;
            writeln!(out, "![{}](data:{mime};base64,{data})", one_line(alt))?;
        }
        Ok(())
    }
}

impl DocumentWriter for MarkdownWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render(&self, deck: &Deck) -> Result<Vec<u8>, WriterError> {
        let mut out = String::new();
        for (i, slide) in deck.slides.iter().enumerate() {
            if i > 0 {
                out.push_str(SLIDE_SEPARATOR);
            }
            Self::write_slide(&mut out, deck, slide)?;
        }
        Ok(out.into_bytes())
    }
}

/// Collapse line breaks so model text cannot break the Markdown structure.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_common::{ImageFormat, ResolvedImage, SlideContent, Topic};

    fn slide(position: usize, kind: SlideKind, image: ResolvedImage) -> DeckSlide {
        DeckSlide {
            kind,
            content: SlideContent {
                position,
                title: format!("Title {position}"),
                bullets: if kind.is_body() {
                    vec!["First point.".to_string(), "Second\npoint.".to_string()]
                } else {
                    Vec::new()
                },
                image_query: kind.wants_image().then(|| "solar panel".to_string()),
            },
            image,
        }
    }

    #[test]
    fn test_renders_slides_in_order() {
        let deck = Deck {
            topic: Topic::new("Solar Energy").unwrap(),
            slides: vec![
                slide(1, SlideKind::Title, ResolvedImage::absent(1)),
                slide(2, SlideKind::Overview, ResolvedImage::absent(2)),
                slide(
                    3,
                    SlideKind::KeyPoint,
                    ResolvedImage {
                        position: 3,
                        bytes: vec![1, 2, 3],
                        format: ImageFormat::Png,
                        dimensions: Some((1, 1)),
                    },
                ),
            ],
        };
        let text = String::from_utf8(MarkdownWriter.render(&deck).unwrap()).unwrap();
        let parts: Vec<&str> = text.split(SLIDE_SEPARATOR).collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("# Title 1\n\n*A Presentation on Solar Energy*"));
        assert!(parts[1].contains("## Title 2\n\n- First point.\n- Second point.\n"));
        assert!(!parts[1].contains("data:"));
        assert!(parts[2].contains("![solar panel](data:image/png;base64,AQID)"));
    }
}

use deckgen_common::{Deck, DeckSlide, PresentationPlan, ResolvedImage, SlideContent, Topic};

use crate::error::AssemblyError;

/// Join contents and images with the plan by position.
///
/// Any structural mismatch is an internal invariant breach and is reported, never repaired.
pub fn assemble(
    topic: &Topic,
    plan: &PresentationPlan,
    contents: Vec<SlideContent>,
    images: Vec<ResolvedImage>,
) -> Result<Deck, AssemblyError> {
    let len = plan.len();
    if contents.len() != len || images.len() != len {
        return Err(AssemblyError::CountMismatch {
            expected: len,
            contents: contents.len(),
            images: images.len(),
        });
    }

    let contents = index_by_position("content", contents, |c| c.position, len)?;
    let images = index_by_position("image", images, |i| i.position, len)?;

    let mut slides = Vec::with_capacity(len);
    for ((descriptor, content), image) in plan.slides.iter().zip(contents).zip(images) {
        let position = descriptor.position;
        let content = content.ok_or(AssemblyError::Missing {
            what: "content",
            position,
        })?;
        let image = image.ok_or(AssemblyError::Missing {
            what: "image",
            position,
        })?;
        slides.push(DeckSlide {
            kind: descriptor.kind,
            content,
            image,
        });
    }

    Ok(Deck {
        topic: topic.clone(),
        slides,
    })
}

/// Place items into slots `0..len` by their 1-based position.
fn index_by_position<T>(
    what: &'static str,
    items: Vec<T>,
    position_of: impl Fn(&T) -> usize,
    len: usize,
) -> Result<Vec<Option<T>>, AssemblyError> {
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    for item in items {
        let position = position_of(&item);
        if position == 0 || position > len {
            return Err(AssemblyError::OutOfRange {
                what,
                position,
                len,
            });
        }
        let slot = &mut slots[position - 1];
        if slot.is_some() {
            return Err(AssemblyError::Duplicate { what, position });
        }
        *slot = Some(item);
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::build_plan;
    use deckgen_common::SlideKind;

    fn content(position: usize) -> SlideContent {
        SlideContent {
            position,
            title: format!("Slide {position}"),
            bullets: vec![format!("Point for slide {position}.")],
            image_query: None,
        }
    }

    fn fixture() -> (Topic, PresentationPlan) {
        let topic = Topic::new("Solar Energy").unwrap();
        let plan = build_plan(&topic);
        (topic, plan)
    }

    #[test]
    fn test_assembles_in_position_order() {
        let (topic, plan) = fixture();
        let contents: Vec<_> = (1..=7).rev().map(content).collect();
        let images: Vec<_> = [4, 1, 7, 2, 6, 3, 5].into_iter().map(ResolvedImage::absent).collect();
        let deck = assemble(&topic, &plan, contents, images).unwrap();
        assert_eq!(deck.len(), 7);
        for (i, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.position(), i + 1);
            assert_eq!(slide.image.position, i + 1);
        }
        assert_eq!(deck.slides[0].kind, SlideKind::Title);
        assert_eq!(deck.slides[6].kind, SlideKind::Conclusion);
    }

    #[test]
    fn test_missing_position_fails() {
        let (topic, plan) = fixture();
        let contents: Vec<_> = [1, 2, 3, 5, 6, 7].into_iter().map(content).collect();
        let images: Vec<_> = (1..=7).map(ResolvedImage::absent).collect();
        let err = assemble(&topic, &plan, contents, images).unwrap_err();
        assert!(matches!(err, AssemblyError::CountMismatch { contents: 6, .. }));

        // Same count, but 4 replaced by a second 5.
        let contents: Vec<_> = [1, 2, 3, 5, 5, 6, 7].into_iter().map(content).collect();
        let images: Vec<_> = (1..=7).map(ResolvedImage::absent).collect();
        let err = assemble(&topic, &plan, contents, images).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::Duplicate {
                what: "content",
                position: 5,
            }
        );
    }

    #[test]
    fn test_out_of_range_position_fails() {
        let (topic, plan) = fixture();
        let contents: Vec<_> = (1..=7).map(content).collect();
        let images: Vec<_> = (2..=8).map(ResolvedImage::absent).collect();
        let err = assemble(&topic, &plan, contents, images).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::OutOfRange {
                what: "image",
                position: 8,
                len: 7,
            }
        );
    }
}

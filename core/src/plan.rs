use deckgen_common::{PresentationPlan, SlideDescriptor, SlideKind, Topic, PLAN_LEN};

/// Build the fixed seven-slide plan for a topic. Pure and deterministic.
pub fn build_plan(topic: &Topic) -> PresentationPlan {
    let topic = topic.as_str();
    let outline: [(SlideKind, String); PLAN_LEN] = [
        (
            SlideKind::Title,
            "A compelling title for the presentation.".to_string(),
        ),
        (
            SlideKind::Overview,
            "An overview describing key talking points.".to_string(),
        ),
        (
            SlideKind::KeyPoint,
            format!("The first key point or trend about {topic}."),
        ),
        (
            SlideKind::KeyPoint,
            format!("The second key point or argument about {topic}."),
        ),
        (
            SlideKind::KeyPoint,
            format!("The third key point or trend about {topic}."),
        ),
        (
            SlideKind::KeyPoint,
            format!("The fourth key point or argument about {topic}."),
        ),
        (SlideKind::Conclusion, "Give Concluding Points.".to_string()),
    ];

    let slides = outline
        .into_iter()
        .enumerate()
        .map(|(i, (kind, purpose))| SlideDescriptor {
            position: i + 1,
            kind,
            purpose,
        })
        .collect();

    PresentationPlan { slides }
}

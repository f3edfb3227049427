#![allow(dead_code)]

//! Fallback Content Provider — the fixed outline installed when remote
//! generation is exhausted or the user opts out of waiting.
//!
//! Hand-authored, no network dependency, no structural randomness (ids are
//! fresh per call, everything else is fixed). Kept generic enough to fit any
//! talk while still giving the user a complete, navigable plan.

use std::collections::BTreeMap;

use crate::models::outline::{Chapter, ChapterPoint, Outline, SalesProcessStep};

/// The fallback keeps its own fixed shape; it never passes through the
/// generation clamp.
pub const FALLBACK_CHAPTER_COUNT: usize = 3;

pub fn fallback_outline() -> Outline {
    let chapters = vec![
        Chapter::new(
            "The problem your audience lives with",
            vec![
                ChapterPoint::new("Name the everyday pain in the audience's own words"),
                ChapterPoint::new("Show what the pain costs them in time, money, or morale"),
                ChapterPoint::new("Explain why the usual workarounds stop working"),
            ],
        ),
        Chapter::new(
            "A better way to think about it",
            vec![
                ChapterPoint::new("Introduce your approach through a story from your own work"),
                ChapterPoint::new("Walk through the three decisions that make it work"),
                ChapterPoint::new("Answer the most common objection head-on"),
            ],
        ),
        Chapter::new(
            "What to do next week",
            vec![
                ChapterPoint::new("Give one small experiment the audience can run immediately"),
                ChapterPoint::new("Show what good looks like after thirty days"),
                ChapterPoint::new("Connect the next step to your call to action"),
            ],
        ),
    ];

    let steps = [
        ("Open with their world", "Start from the audience's situation, not your product"),
        ("Earn the right", "Establish credibility with one concrete, verifiable result"),
        ("Name the gap", "Make the distance between today and better unmissable"),
        ("Raise the stakes", "Quantify what staying put costs them"),
        ("Show the path", "Lay out your approach as three understandable decisions"),
        ("Prove it", "Bring one customer story with numbers attached"),
        ("Handle objections", "Take the hardest objection on stage before anyone asks"),
        ("Make the offer", "Present the product as the shortcut to the path you just showed"),
        ("Lower the threshold", "Give a risk-free first step anyone can take today"),
        ("Call to action", "Ask plainly for the one next step you actually want"),
    ];

    let sales_process = steps
        .into_iter()
        .enumerate()
        .map(|(i, (title, description))| SalesProcessStep::new(title, description, i as u32 + 1))
        .collect();

    let mut discussion_questions = BTreeMap::new();
    discussion_questions.insert(
        "The problem your audience lives with".to_string(),
        "Which part of this problem costs you the most today?".to_string(),
    );
    discussion_questions.insert(
        "A better way to think about it".to_string(),
        "What would have to be true for this approach to work in your team?".to_string(),
    );
    discussion_questions.insert(
        "What to do next week".to_string(),
        "What is the smallest experiment you could commit to this week?".to_string(),
    );

    Outline {
        chapters,
        opening_styles: vec![
            "A bold question that names the audience's pain".to_string(),
            "A short personal story about the moment you saw the problem".to_string(),
            "A surprising number the audience has never heard".to_string(),
        ],
        time_distribution: "Spend roughly a quarter of the time on the problem, half on the \
            approach, and the final quarter on next steps and the call to action."
            .to_string(),
        discussion_questions,
        sales_guide: "Sell the path, not the product. The product only appears once the \
            audience already wants the path you described."
            .to_string(),
        follow_up_plan: "Within 48 hours, send attendees the slides plus the one experiment \
            from the closing chapter, and book calls with everyone who took the first step."
            .to_string(),
        motivation: "The room is full of people who have the problem you solve. Tell the \
            truth about it and the talk does the selling."
            .to_string(),
        sales_process,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::schema::{validate_outline, SALES_STEP_COUNT};

    #[test]
    fn fallback_has_the_fixed_shape() {
        let outline = fallback_outline();
        assert_eq!(outline.chapters.len(), FALLBACK_CHAPTER_COUNT);
        assert!(outline.chapters.iter().all(|ch| ch.points.len() == 3));
        assert_eq!(outline.sales_process.len(), SALES_STEP_COUNT);
    }

    #[test]
    fn fallback_passes_the_schema_validator() {
        let value = serde_json::to_value(fallback_outline()).unwrap();
        assert!(validate_outline(&value).is_empty());
    }

    #[test]
    fn fallback_step_orders_are_monotonic() {
        let outline = fallback_outline();
        let orders: Vec<u32> = outline.sales_process.iter().map(|s| s.order).collect();
        assert_eq!(orders, (1..=SALES_STEP_COUNT as u32).collect::<Vec<_>>());
    }

    #[test]
    fn fallback_structure_is_deterministic() {
        let a = fallback_outline();
        let b = fallback_outline();
        let titles = |o: &Outline| {
            o.chapters
                .iter()
                .map(|c| c.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&a), titles(&b));
        assert_eq!(a.discussion_questions, b.discussion_questions);
    }

    #[test]
    fn discussion_questions_are_keyed_by_chapter_titles() {
        let outline = fallback_outline();
        for chapter in &outline.chapters {
            assert!(outline.discussion_questions.contains_key(&chapter.title));
        }
    }
}

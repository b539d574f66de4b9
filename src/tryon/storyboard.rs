// Storyboard - free-form canvas elements that carry creative direction

use serde::{Deserialize, Serialize};

/// An element placed on the storyboard canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoryboardElement {
    Note {
        id: String,
        content: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl StoryboardElement {
    /// A note with default placement
    pub fn note(id: impl Into<String>, content: impl Into<String>) -> Self {
        StoryboardElement::Note {
            id: id.into(),
            content: content.into(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 120.0,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StoryboardElement::Note { id, .. } => id,
        }
    }
}

/// Content of every note, joined with single spaces
pub fn instructions(elements: &[StoryboardElement]) -> String {
    elements
        .iter()
        .map(|el| match el {
            StoryboardElement::Note { content, .. } => content.as_str(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

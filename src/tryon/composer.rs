// Prompt composer - builds the synthesis instruction and request parts for one pose

use super::types::{Asset, GenerationJob};
use gemini::Part;

/// Pose templates, in the order results are produced
pub const POSE_TEMPLATES: [&str; 5] = [
    "Full-body fashion shot, model looking confidently at the camera, dynamic pose.",
    "Three-quarters view, stylish, relaxed pose against a clean background.",
    "Medium shot from the waist up, focusing on the outfit details, natural candid pose.",
    "Walking towards the camera, candid street style shot.",
    "Leaning against a textured wall, relaxed and looking away from the camera.",
];

/// Scene used when the user gave no direction
pub const DEFAULT_SCENE: &str = "A clean, minimalist, brightly lit photography studio.";

pub const PERSON_LABEL: &str = "**[PERSON IMAGE]**";
pub const HAIRSTYLE_LABEL: &str = "**[HAIRSTYLE IMAGE]**";
pub const GARMENTS_LABEL: &str = "**[GARMENT IMAGES]**";

/// User direction, or the default scene when blank
pub fn scene_for(instructions: &str) -> &str {
    if instructions.trim().is_empty() {
        DEFAULT_SCENE
    } else {
        instructions
    }
}

/// Everything the instruction document depends on apart from the pose
#[derive(Debug, Clone)]
pub struct PromptComposer<'a> {
    pub model_analysis: &'a str,
    pub garment_analysis: &'a str,
    pub hairstyle_analysis: &'a str,
    pub instructions: &'a str,
    pub has_hairstyle: bool,
    pub face_lock: bool,
}

impl PromptComposer<'_> {
    /// Instruction document for one pose
    pub fn compose(&self, pose: &str) -> String {
        let hair = if self.has_hairstyle {
            "Replace the hair with the style from **[HAIRSTYLE IMAGE]**."
        } else {
            "Keep the original hair."
        };
        let face_lock = if self.face_lock {
            "Facial features MUST be a 100% match to the [PERSON IMAGE]."
        } else {
            "Preserve facial features with high fidelity."
        };

        format!(
            r#"
# TASK: VIRTUAL TRY-ON

## UNBREAKABLE CORE DIRECTIVE:
**REPLICATE THE PERSON from [PERSON IMAGE] EXACTLY.** The face, body shape, and skin texture are non-negotiable. Any change to their identity is a failure.

---

## REFERENCE ASSETS:

*   **[PERSON IMAGE]:** The base image. This person's identity MUST be preserved.
    *   **Model Analysis:** {model}
*   **[GARMENT IMAGES]:** The clothing to apply.
    *   **Garment Analysis:** {garments}
*   **[HAIRSTYLE IMAGE]:** (If provided) The hairstyle to apply. The face in this image is IRRELEVANT.
    *   **Hairstyle Analysis:** {hairstyle}

---

## EXECUTION ORDER:

1.  **BASE:** Use the person from **[PERSON IMAGE]**.
2.  **DRESS:** Apply the exact clothes from **[GARMENT IMAGES]**.
3.  **HAIR:** {hair}
4.  **POSE & SCENE:** Place the person in this setting: "{scene}", with this pose: "{pose}".
5.  **FACE LOCK:** {face_lock}
6.  **REALISM:** Maintain natural skin texture. Do not airbrush. Pores should be visible.

---

## FINAL OUTPUT:
Generate ONLY the final image. No text.
"#,
            model = self.model_analysis,
            garments = self.garment_analysis,
            hairstyle = self.hairstyle_analysis,
            hair = hair,
            scene = scene_for(self.instructions),
            pose = pose,
            face_lock = face_lock,
        )
    }
}

/// Ordered request parts for one pose: labelled images, then the instruction
pub fn assemble_parts(
    model: &Asset,
    hairstyle: Option<&Asset>,
    job: &GenerationJob,
    instruction: String,
) -> Vec<Part> {
    let mut parts = vec![Part::text(PERSON_LABEL), model.part()];

    if let Some(hair) = hairstyle {
        parts.push(Part::text(HAIRSTYLE_LABEL));
        parts.push(hair.part());
    }

    if !job.garments.is_empty() {
        parts.push(Part::text(GARMENTS_LABEL));
        parts.extend(job.garments.iter().map(Asset::part));
    }

    parts.push(Part::text(instruction));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer(instructions: &str, has_hairstyle: bool, face_lock: bool) -> PromptComposer<'_> {
        PromptComposer {
            model_analysis: "MODEL-A",
            garment_analysis: "GARMENT-A",
            hairstyle_analysis: "HAIR-A",
            instructions,
            has_hairstyle,
            face_lock,
        }
    }

    #[test]
    fn test_blank_instructions_use_default_scene() {
        assert_eq!(scene_for("   \n"), DEFAULT_SCENE);
        assert_eq!(scene_for("On a beach"), "On a beach");

        let prompt = composer("  ", false, true).compose(POSE_TEMPLATES[0]);
        assert!(prompt.contains(&format!("setting: \"{}\"", DEFAULT_SCENE)));
        assert!(prompt.contains(&format!("pose: \"{}\"", POSE_TEMPLATES[0])));
    }

    #[test]
    fn test_analyses_are_embedded() {
        let prompt = composer("Rooftop", false, true).compose(POSE_TEMPLATES[2]);
        assert!(prompt.contains("**Model Analysis:** MODEL-A"));
        assert!(prompt.contains("**Garment Analysis:** GARMENT-A"));
        assert!(prompt.contains("**Hairstyle Analysis:** HAIR-A"));
        assert!(prompt.contains("setting: \"Rooftop\""));
        assert!(prompt.trim_end().ends_with("Generate ONLY the final image. No text."));
    }

    #[test]
    fn test_toggles_change_directives() {
        let locked = composer("", true, true).compose(POSE_TEMPLATES[1]);
        assert!(locked.contains("Replace the hair with the style from **[HAIRSTYLE IMAGE]**."));
        assert!(locked.contains("100% match"));

        let loose = composer("", false, false).compose(POSE_TEMPLATES[1]);
        assert!(loose.contains("Keep the original hair."));
        assert!(loose.contains("Preserve facial features with high fidelity."));
        assert!(!loose.contains("100% match"));
    }

    #[test]
    fn test_assemble_parts_order() {
        let model = Asset::new("me.png", "image/png", vec![1u8]);
        let hair = Asset::new("hair.png", "image/png", vec![2u8]);
        let job = GenerationJob {
            id: "o1".into(),
            name: "Outfit 1".into(),
            garments: vec![
                Asset::new("a.png", "image/png", vec![3u8]),
                Asset::new("b.png", "image/png", vec![4u8]),
            ],
        };

        let parts = assemble_parts(&model, Some(&hair), &job, "DO IT".into());
        assert_eq!(parts.len(), 8);
        assert_eq!(parts[0], Part::text(PERSON_LABEL));
        assert_eq!(parts[1], model.part());
        assert_eq!(parts[2], Part::text(HAIRSTYLE_LABEL));
        assert_eq!(parts[3], hair.part());
        assert_eq!(parts[4], Part::text(GARMENTS_LABEL));
        assert_eq!(parts[5], job.garments[0].part());
        assert_eq!(parts[6], job.garments[1].part());
        assert_eq!(parts[7], Part::text("DO IT"));
    }

    #[test]
    fn test_assemble_parts_hairstyle_only() {
        let model = Asset::new("me.png", "image/png", vec![1u8]);
        let parts = assemble_parts(&model, None, &GenerationJob::hairstyle_only(), "x".into());
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], Part::text("x"));
    }
}

// Realism enhancer - single-image hyper-realism pass

use super::error::{Result, TryOnError};
use super::types::Asset;
use gemini::{GenerateRequest, GenerationService, Modality, Part};
use std::sync::Arc;
use tracing::{info, warn};

pub const ENHANCE_PROMPT: &str = r#"
**PRIMARY GOAL: HYPERREALISTIC ENHANCEMENT**

**NON-NEGOTIABLE RULE:**
You MUST preserve the subject's exact pose, facial expression, and all compositional elements from the original image. Do NOT change the person, their expression, the way they are standing/sitting, or the camera angle. Your only task is to enhance the realism of the existing image content. Changing the pose or expression is a failure.

---
**DETAILED INSTRUCTIONS:**

Recreate the image with maximum ultrarealistic, photorealistic fidelity while preserving the exact original composition, colors, and subject matter. The goal is to transform the image into something indistinguishable from a real photograph captured on a professional DSLR or cinema camera. Every element should be true-to-life, grounded in natural optics, and free of artificial polish.

The rendering of skin texture must be **exaggerated for maximum realism**, pushing the boundaries of photorealism. Render skin with authentic, **hyper-detailed** natural texture. Pores must be **clearly visible** and varied in size across different areas of the face and body: **noticeably** larger and more defined around the nose, forehead, and cheeks, softer and finer along the temples, jawline, and under the eyes. Each pore must catch light realistically, creating **distinct micro-shadows and highlights** that shift with the angle of illumination. The skin surface must show a subtle but **clear** oil balance, with a gentle sheen in naturally reflective zones (T-zone, chin, upper lip) and a more matte texture in drier areas. Fine vellus hair (peach fuzz) must be clearly visible when light catches it. **Amplify** the presence of fine lines, tiny bumps, faint veins, natural uneven pigmentation, and slight variations in tone. Preserve the true undertones of the skin (warm, cool, or neutral) without altering the natural complexion. Maintain lifelike subsurface scattering, accurate highlight rolloff, and realistic specular reflections that follow real-world lighting behavior. Do not erase imperfections; subtle scars, minor dryness, faint redness, and organic variation must remain intact for realism.

Hair must be rendered with exceptional realism. Individual strands should be distinct, with subtle variations in color and thickness. Capture the natural flow and texture, whether straight, wavy, or curly. Show how light interacts with the hair: specular highlights on individual strands, soft sheen on larger sections, and realistic translucency where light passes through the edges. Include natural imperfections like subtle flyaways and split ends. The hairline should be soft and natural, with fine baby hairs seamlessly blending into the skin.

Color science must follow real-world photography principles. White balance should be accurate and consistent with the original image’s lighting. Avoid unnatural color shifts. Keep neutrals neutral, preserve mid-tones, and maintain realistic saturation. Skin tones should never appear over-saturated, neon, or orange/magenta shifted. Shadows should remain clean without green or muddy casts, and highlights must roll off naturally without clipping. Colors in the environment, clothing, and background should remain balanced, believable, and harmonized with the subject without artificial oversaturation or flattening.

Texture fidelity should be preserved across every surface: skin, hair, fabric weave, natural fibers, wood grain, metal reflections, glass transparency, environmental surfaces, and small background details. Depth of field must remain consistent with the original image—do not introduce artificial blur or sharpness where it did not exist. If the original had background blur, keep it; if it was sharp, preserve it. Optics should mimic real lenses: natural vignetting, realistic depth, slight chromatic aberration control, and true perspective.

The overall rendering should match the look of a RAW photo: full dynamic range, soft highlight falloff, rich yet accurate mid-tones, and clean shadow detail. Add subtle photographic noise or natural film grain for authenticity, ensuring the image avoids a sterile, overly polished look.

Finally, upscale the result to a high resolution (e.g., 2048x2048 pixels). This upscaling step is **critical** and **non-negotiable** for final realism. You **MUST** use the increased resolution to further enhance and intensify the hyperrealistic textures you have already rendered. Skin pores, vellus hair, and fabric threads **MUST** become even more distinct and clear. Any form of artificial smoothing, blurring, or loss of detail during upscaling is a strict failure. The final image should appear as if it were natively captured at this higher resolution, revealing more organic detail, not looking like a digitally enlarged photo.

Do not include: plastic or waxy skin textures, porcelain doll appearance, beauty filter smoothing, airbrushed or artificial retouching, fake freckles unless they were present in the original, CGI gloss, cartoonish or painterly effects, watercolor artifacts, extreme HDR glow, haloing, neon or oversaturated colors, unnatural orange/magenta/green casts, duplicated facial features, warped or misaligned eyes, unnatural makeup overlays, excessive sharpening, AI blur, misrendered hands or fingers, extra limbs, or anything that breaks photorealism. Be sure the final result avoids all signs of AI artifacts and instead reflects true human imperfection, organic color, and natural photographic depth.
"#;

/// Sends one image with the enhancement instruction to the image model
pub struct RealismEnhancer {
    service: Arc<dyn GenerationService>,
    model: String,
}

impl RealismEnhancer {
    pub fn new(service: Arc<dyn GenerationService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    /// File name of the enhanced copy of `file_name`
    pub fn output_name(file_name: &str) -> String {
        format!("enhanced-{}", file_name)
    }

    /// Enhance `asset`. There is no placeholder: a missing image is an error.
    pub async fn enhance(&self, asset: &Asset) -> Result<Asset> {
        if !self.service.is_configured() {
            return Err(TryOnError::MissingCredential);
        }

        let request = GenerateRequest::new(&self.model)
            .with_part(asset.part())
            .with_part(Part::text(ENHANCE_PROMPT))
            .with_modalities(&[Modality::Image]);

        info!(file = %asset.file_name, model = %self.model, "Enhancing image");
        let response = self.service.generate(&request).await?;

        match response.first_image() {
            Some(image) => Ok(Asset {
                file_name: Self::output_name(&asset.file_name),
                image: image.clone(),
            }),
            None => {
                warn!(file = %asset.file_name, "Enhancement returned no image");
                Err(TryOnError::NoImage(
                    "Failed to enhance image: No image data returned.".into(),
                ))
            }
        }
    }
}

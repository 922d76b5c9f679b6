/// Prompt construction for the AI tools
///
/// The generation endpoint has no structured parameters for these edits, so
/// every tool's settings are folded into a natural-language instruction.
/// No validation happens here; callers check `ToolParameters::is_ready`.
use crate::state::edit::ToolParameters;

/// Style presets offered by the Style tool
pub const STYLE_PRESETS: [&str; 8] = [
    "Van Gogh Starry Night",
    "Cyberpunk 2077",
    "Watercolor",
    "Oil Painting",
    "Pencil Sketch",
    "Anime Studio Ghibli",
    "Pixel Art",
    "Ukiyo-e",
];

/// Quick suggestions offered by the object eraser
pub const ERASER_SUGGESTIONS: [&str; 5] =
    ["Person", "Text", "Watermark", "Shadow", "Background Clutter"];

/// Prompt pre-filled when the editor opens on the Retouch tool
pub const RETOUCH_DEFAULT_PROMPT: &str = "Remove this object";

const BACKGROUND_REMOVAL: &str =
    "Remove the background from this image. Return the subject on a transparent or white background.";

const STYLE_SUFFIX: &str =
    "Maintain the original subject matter and composition but apply the artistic style aggressively.";

const GROUNDING_HINT: &str = " Use Google Search if you need real-world reference or current styles to ensure accuracy and high quality.";

/// How strongly a morph may depart from the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphBand {
    Subtle,
    Balanced,
    Heavy,
}

impl MorphBand {
    /// 0..=30 subtle, 31..=70 balanced, 71.. heavy
    pub fn from_strength(strength: u8) -> Self {
        match strength {
            0..=30 => MorphBand::Subtle,
            31..=70 => MorphBand::Balanced,
            _ => MorphBand::Heavy,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            MorphBand::Subtle => "Strictly adhere to the original image structure. Only morph fine details to match the prompt subtly.",
            MorphBand::Balanced => "Balanced Morph: Blend the original structure with the new concept. Update shapes and textures but keep the composition.",
            MorphBand::Heavy => "Heavy Morph: Use the original only as a loose guide. Significantly transform the subject and environment to match the prompt.",
        }
    }
}

/// Build the tool-specific instruction text
pub fn build_instruction(params: &ToolParameters) -> String {
    match params {
        ToolParameters::Magic { prompt } => prompt.clone(),

        ToolParameters::BackgroundRemoval => BACKGROUND_REMOVAL.to_string(),

        ToolParameters::Morph { target, strength } => {
            let band = MorphBand::from_strength(*strength);
            format!(
                "[AI Morph Task] \nTarget Concept: \"{target}\". \nTransformation Strength: {strength}%. \nInstruction: {} \nMorph the input image towards the target concept seamlessly.",
                band.instruction()
            )
        }

        ToolParameters::Upscale {
            factor,
            face_enhance,
        } => {
            let faces = if *face_enhance { " and face restoration" } else { "" };
            format!(
                "Upscale this image {}x with Real-ESRGAN style enhancement{faces}. High resolution, sharp details, photorealistic restoration.",
                factor.value()
            )
        }

        ToolParameters::StyleTransfer {
            preset,
            free_text,
            lora_repo,
            lora_scale,
            strength,
            has_reference,
        } => {
            let target = preset
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(free_text.as_str())
                .trim();
            let lora = lora_repo.trim();

            let mut text = if *has_reference {
                let mut text = format!(
                    "Transfer the artistic style, color palette, and texture of the second attached image (the style reference) onto the first image. Style Strength: {strength}. "
                );
                if !target.is_empty() {
                    text.push_str(&format!("Also incorporate elements of: {target}. "));
                }
                text
            } else if !lora.is_empty() {
                // LoRA weights are never loaded; the repo name is descriptive only
                let mut text = format!(
                    "Apply the aesthetic/style from the LoRA model '{lora}' with a scale of {lora_scale} and a mixing strength of {strength}. "
                );
                if !target.is_empty() {
                    text.push_str(&format!("Also incorporate elements of: {target}. "));
                }
                text
            } else {
                format!("Transform this image into the style of {target}. Style Strength: {strength}. ")
            };
            text.push_str(STYLE_SUFFIX);
            text
        }

        ToolParameters::ObjectErase { target } => format!(
            "Object Removal Task: Identify the object described as \"{target}\". Remove it completely from the image. Inpaint the resulting hole to match the surrounding background pattern, texture, and lighting seamlessly. The result should look as if the object never existed."
        ),

        ToolParameters::Retouch {
            selection,
            instruction,
        } => format!(
            "Edit Instruction: Locate the object or area described as \"{selection}\" and {instruction}. Ensure seamless integration with the surrounding image."
        ),
    }
}

/// Compose the final text segment sent after any attached images
pub fn compose_final_text(
    instruction: &str,
    has_primary_image: bool,
    excluded_terms: Option<&str>,
    grounding: bool,
) -> String {
    let mut text = if has_primary_image {
        format!("Action: {instruction}.")
    } else {
        format!("Generate: {instruction}.")
    };

    if let Some(terms) = excluded_terms.map(str::trim).filter(|t| !t.is_empty()) {
        text.push_str(&format!(
            " EXCLUSIONS/NEGATIVE PROMPT: Strictly avoid including the following elements or characteristics: {terms}."
        ));
    }

    if grounding {
        text.push_str(GROUNDING_HINT);
    }

    text
}

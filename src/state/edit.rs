/// Tool selection and tool parameters
///
/// The AI tools collect their inputs into a `ToolParameters` value that the
/// prompt builder turns into an instruction. The Adjust and Filters tools only
/// affect the local preview and never reach the generation endpoint.
use crate::color::{FilterChain, FilterOp};

/// Every tool shown in the editor tool strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Magic,
    BackgroundRemoval,
    Morph,
    Upscale,
    Style,
    Eraser,
    Retouch,
    Filters,
    Adjust,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Magic,
        ToolKind::BackgroundRemoval,
        ToolKind::Morph,
        ToolKind::Upscale,
        ToolKind::Style,
        ToolKind::Eraser,
        ToolKind::Retouch,
        ToolKind::Filters,
        ToolKind::Adjust,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Magic => "AI Magic",
            ToolKind::BackgroundRemoval => "Bg Remove",
            ToolKind::Morph => "AI Morph",
            ToolKind::Upscale => "Upscale",
            ToolKind::Style => "Style",
            ToolKind::Eraser => "Eraser",
            ToolKind::Retouch => "Retouch",
            ToolKind::Filters => "Filters",
            ToolKind::Adjust => "Adjust",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::Magic => "Generate creative edits with AI",
            ToolKind::BackgroundRemoval => "Remove background automatically",
            ToolKind::Morph => "Blend images & apply subtle morphs",
            ToolKind::Upscale => "Real-ESRGAN Super Resolution",
            ToolKind::Style => "AI Style Transfer",
            ToolKind::Eraser => "Magic Object Eraser",
            ToolKind::Retouch => "Smart Object Edit / Generative Fill",
            ToolKind::Filters => "Apply artistic color filters",
            ToolKind::Adjust => "Tweak brightness and contrast",
        }
    }

    /// Whether the tool submits a generation request
    pub fn is_generative(self) -> bool {
        !matches!(self, ToolKind::Filters | ToolKind::Adjust)
    }
}

/// Upscale factor offered by the Upscale tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpscaleFactor {
    #[default]
    X2,
    X4,
}

impl UpscaleFactor {
    pub fn value(self) -> u8 {
        match self {
            UpscaleFactor::X2 => 2,
            UpscaleFactor::X4 => 4,
        }
    }
}

/// Inputs of one AI tool, ready to be turned into an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum ToolParameters {
    Magic {
        prompt: String,
    },
    BackgroundRemoval,
    Morph {
        target: String,
        /// 0 to 100
        strength: u8,
    },
    Upscale {
        factor: UpscaleFactor,
        face_enhance: bool,
    },
    StyleTransfer {
        preset: Option<String>,
        free_text: String,
        lora_repo: String,
        /// 0.0 to 2.0
        lora_scale: f32,
        /// 0.0 to 1.0
        strength: f32,
        /// A style reference image is attached as the second image
        has_reference: bool,
    },
    ObjectErase {
        target: String,
    },
    Retouch {
        selection: String,
        instruction: String,
    },
}

impl ToolParameters {
    /// Check that every required field is filled in.
    ///
    /// Submissions are only issued when this returns true.
    pub fn is_ready(&self) -> bool {
        match self {
            ToolParameters::Magic { prompt } => is_filled(prompt),
            ToolParameters::BackgroundRemoval | ToolParameters::Upscale { .. } => true,
            ToolParameters::Morph { target, .. } => is_filled(target),
            ToolParameters::StyleTransfer {
                preset,
                free_text,
                lora_repo,
                has_reference,
                ..
            } => {
                *has_reference
                    || preset.as_deref().is_some_and(is_filled)
                    || is_filled(free_text)
                    || is_filled(lora_repo)
            }
            ToolParameters::ObjectErase { target } => is_filled(target),
            ToolParameters::Retouch {
                selection,
                instruction,
            } => is_filled(selection) && is_filled(instruction),
        }
    }
}

fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Local preview adjustments (brightness/contrast offsets in percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjustParams {
    /// -50 to +50
    pub exposure: i32,
    /// -50 to +50
    pub contrast: i32,
}

impl AdjustParams {
    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Filter presets offered by the Filters tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPreset {
    #[default]
    Original,
    BlackAndWhite,
    Noir,
    Sepia,
    Vintage,
    Cinematic,
    Chrome,
    Warm,
    Cool,
    Fade,
    Dramatic,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 11] = [
        FilterPreset::Original,
        FilterPreset::BlackAndWhite,
        FilterPreset::Noir,
        FilterPreset::Sepia,
        FilterPreset::Vintage,
        FilterPreset::Cinematic,
        FilterPreset::Chrome,
        FilterPreset::Warm,
        FilterPreset::Cool,
        FilterPreset::Fade,
        FilterPreset::Dramatic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterPreset::Original => "Original",
            FilterPreset::BlackAndWhite => "B&W",
            FilterPreset::Noir => "Noir",
            FilterPreset::Sepia => "Sepia",
            FilterPreset::Vintage => "Vintage",
            FilterPreset::Cinematic => "Cinema",
            FilterPreset::Chrome => "Chrome",
            FilterPreset::Warm => "Warm",
            FilterPreset::Cool => "Cool",
            FilterPreset::Fade => "Fade",
            FilterPreset::Dramatic => "Drama",
        }
    }

    /// Filter operations for this preset at `intensity` (0 to 100)
    pub fn ops(self, intensity: u8) -> Vec<FilterOp> {
        let i = f32::from(intensity.min(100));
        let pct = |value: f32| value / 100.0;

        match self {
            FilterPreset::Original => Vec::new(),
            FilterPreset::BlackAndWhite => vec![FilterOp::Grayscale(pct(i))],
            FilterPreset::Noir => vec![
                FilterOp::Grayscale(1.0),
                FilterOp::Contrast(pct(100.0 + i * 0.5)),
                FilterOp::Brightness(pct(100.0 - i * 0.2)),
            ],
            FilterPreset::Sepia => vec![FilterOp::Sepia(pct(i))],
            FilterPreset::Vintage => vec![
                FilterOp::Sepia(pct(i * 0.5)),
                FilterOp::Contrast(pct(100.0 + i * 0.2)),
                FilterOp::Brightness(pct(100.0 - i * 0.05)),
            ],
            FilterPreset::Cinematic => vec![
                FilterOp::Contrast(pct(100.0 + i * 0.2)),
                FilterOp::Saturate(pct(100.0 - i * 0.1)),
                FilterOp::Sepia(pct(i * 0.2)),
            ],
            FilterPreset::Chrome => vec![
                FilterOp::Contrast(pct(100.0 + i * 0.3)),
                FilterOp::Saturate(pct(100.0 + i * 0.3)),
            ],
            FilterPreset::Warm => vec![
                FilterOp::Sepia(pct(i * 0.3)),
                FilterOp::Saturate(pct(100.0 + i * 0.2)),
            ],
            FilterPreset::Cool => vec![
                FilterOp::HueRotate(-i * 0.4),
                FilterOp::Saturate(pct(100.0 - i * 0.1)),
            ],
            FilterPreset::Fade => vec![
                FilterOp::Brightness(pct(100.0 + i * 0.1)),
                FilterOp::Contrast(pct(100.0 - i * 0.2)),
                FilterOp::Saturate(pct(100.0 - i * 0.2)),
            ],
            FilterPreset::Dramatic => vec![
                FilterOp::Contrast(pct(100.0 + i * 0.4)),
                FilterOp::Brightness(pct(100.0 - i * 0.1)),
            ],
        }
    }
}

/// Compose the preview chain: adjustments first, then the selected preset
pub fn preview_chain(adjust: &AdjustParams, preset: FilterPreset, intensity: u8) -> FilterChain {
    let mut ops = vec![
        FilterOp::Brightness((100 + adjust.exposure) as f32 / 100.0),
        FilterOp::Contrast((100 + adjust.contrast) as f32 / 100.0),
    ];
    ops.extend(preset.ops(intensity));
    FilterChain::new(ops)
}

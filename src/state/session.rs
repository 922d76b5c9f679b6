/// Editor session for one open project
///
/// Holds the working image and every tool's inputs. At most one generation
/// job is in flight per session; results that do not belong to the current
/// job are dropped instead of being applied to stale state.
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use super::data::{EncodedImage, Project};
use super::edit::{preview_chain, AdjustParams, FilterPreset, ToolKind, ToolParameters, UpscaleFactor};
use crate::color::FilterChain;
use crate::gemini::{ErrorKind, GenerateError, GenerationRequest, GenerationResult, SourceLink};
use crate::prompt::{self, RETOUCH_DEFAULT_PROMPT};

/// Identifies one submitted generation job, unique for the whole process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobId(u64);

static NEXT_JOB: AtomicU64 = AtomicU64::new(1);

impl JobId {
    fn next() -> Self {
        JobId(NEXT_JOB.fetch_add(1, Ordering::Relaxed))
    }
}

/// A job accepted by the single-flight guard, ready to send
#[derive(Debug, Clone)]
pub struct PendingJob {
    pub id: JobId,
    pub request: GenerationRequest,
}

/// What happened when a job finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The working image was replaced
    Applied,
    /// The job failed; the working image is unchanged
    Failed(ErrorKind),
    /// The result belonged to a job this session is no longer waiting for
    Stale,
}

#[derive(Debug)]
pub struct EditorSession {
    pub project_id: u64,
    pub active_tool: ToolKind,
    working: EncodedImage,

    /// Shared prompt used by Magic, Morph, Retouch and Style
    pub prompt: String,
    /// Negative prompt applied to every AI tool
    pub exclusions: String,

    pub morph_strength: u8,
    morph_source: Option<EncodedImage>,

    pub upscale_factor: UpscaleFactor,
    pub face_enhance: bool,

    pub eraser_target: String,
    pub retouch_selection: String,

    pub style_preset: Option<String>,
    pub lora_repo: String,
    pub lora_scale: f32,
    pub style_strength: f32,
    style_reference: Option<EncodedImage>,

    pub adjust: AdjustParams,
    pub filter: FilterPreset,
    pub filter_intensity: u8,

    in_flight: Option<JobId>,
    pub error: Option<String>,
    pub source_links: Vec<SourceLink>,
}

impl EditorSession {
    pub fn new(project: &Project, tool: ToolKind) -> Self {
        let mut session = Self {
            project_id: project.id,
            active_tool: ToolKind::Magic,
            working: project.image.clone(),
            prompt: String::new(),
            exclusions: String::new(),
            morph_strength: 50,
            morph_source: None,
            upscale_factor: UpscaleFactor::X2,
            face_enhance: false,
            eraser_target: String::new(),
            retouch_selection: String::new(),
            style_preset: None,
            lora_repo: String::new(),
            lora_scale: 0.8,
            style_strength: 0.75,
            style_reference: None,
            adjust: AdjustParams::default(),
            filter: FilterPreset::Original,
            filter_intensity: 100,
            in_flight: None,
            error: None,
            source_links: Vec::new(),
        };

        if tool == ToolKind::Retouch {
            session.prompt = RETOUCH_DEFAULT_PROMPT.to_string();
        }
        session.select_tool(tool);
        session
    }

    pub fn working_image(&self) -> &EncodedImage {
        &self.working
    }

    pub fn morph_source(&self) -> Option<&EncodedImage> {
        self.morph_source.as_ref()
    }

    pub fn style_reference(&self) -> Option<&EncodedImage> {
        self.style_reference.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
        // Morphs start from the image shown when the tool was opened
        if tool == ToolKind::Morph && self.morph_source.is_none() {
            self.morph_source = Some(self.working.clone());
        }
    }

    /// Replace the morph source with an uploaded image.
    ///
    /// The upload is also shown as the working image.
    pub fn set_morph_source(&mut self, image: EncodedImage) {
        self.working = image.clone();
        self.morph_source = Some(image);
    }

    pub fn set_style_reference(&mut self, image: Option<EncodedImage>) {
        self.style_reference = image;
    }

    pub fn select_style_preset(&mut self, preset: &str) {
        self.style_preset = Some(preset.to_string());
        self.lora_repo.clear();
    }

    pub fn set_lora_repo(&mut self, repo: String) {
        if !repo.is_empty() {
            self.style_preset = None;
        }
        self.lora_repo = repo;
    }

    /// Update the shared prompt; typing a style prompt deselects the preset
    pub fn set_prompt(&mut self, prompt: String) {
        if self.active_tool == ToolKind::Style && !prompt.is_empty() {
            self.style_preset = None;
        }
        self.prompt = prompt;
    }

    /// Parameters of the active tool, or None for preview-only tools
    pub fn tool_parameters(&self) -> Option<ToolParameters> {
        let params = match self.active_tool {
            ToolKind::Magic => ToolParameters::Magic {
                prompt: self.prompt.clone(),
            },
            ToolKind::BackgroundRemoval => ToolParameters::BackgroundRemoval,
            ToolKind::Morph => ToolParameters::Morph {
                target: self.prompt.clone(),
                strength: self.morph_strength.min(100),
            },
            ToolKind::Upscale => ToolParameters::Upscale {
                factor: self.upscale_factor,
                face_enhance: self.face_enhance,
            },
            ToolKind::Style => ToolParameters::StyleTransfer {
                preset: self.style_preset.clone(),
                free_text: self.prompt.clone(),
                lora_repo: self.lora_repo.clone(),
                lora_scale: self.lora_scale,
                strength: self.style_strength,
                has_reference: self.style_reference.is_some(),
            },
            ToolKind::Eraser => ToolParameters::ObjectErase {
                target: self.eraser_target.clone(),
            },
            ToolKind::Retouch => ToolParameters::Retouch {
                selection: self.retouch_selection.clone(),
                instruction: self.prompt.clone(),
            },
            ToolKind::Filters | ToolKind::Adjust => return None,
        };
        Some(params)
    }

    /// True when the active tool's submit control should be enabled
    pub fn can_submit(&self) -> bool {
        !self.is_generating() && self.tool_parameters().is_some_and(|p| p.is_ready())
    }

    /// Start a job for the active tool.
    ///
    /// Returns None (and sends nothing) while another job is in flight or
    /// when a required field is empty.
    pub fn begin(&mut self) -> Option<PendingJob> {
        if let Some(job) = self.in_flight {
            debug!(?job, "generation already in flight");
            return None;
        }

        let params = self.tool_parameters()?;
        if !params.is_ready() {
            debug!(tool = self.active_tool.label(), "required fields missing");
            return None;
        }

        let primary = match self.active_tool {
            ToolKind::Morph => self.morph_source.clone().unwrap_or_else(|| self.working.clone()),
            _ => self.working.clone(),
        };
        let reference = match self.active_tool {
            ToolKind::Style => self.style_reference.clone(),
            _ => None,
        };
        let exclusions = self.exclusions.trim();

        let id = JobId::next();
        self.in_flight = Some(id);
        self.error = None;

        info!(?id, tool = self.active_tool.label(), "starting generation");
        Some(PendingJob {
            id,
            request: GenerationRequest {
                instruction: prompt::build_instruction(&params),
                primary_image: Some(primary),
                reference_image: reference,
                excluded_terms: (!exclusions.is_empty()).then(|| exclusions.to_string()),
            },
        })
    }

    /// Apply the outcome of `job`
    pub fn complete(
        &mut self,
        job: JobId,
        outcome: Result<GenerationResult, GenerateError>,
    ) -> Completion {
        if self.in_flight != Some(job) {
            warn!(?job, "dropping result of a job that is no longer current");
            return Completion::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                self.working = result.image;
                self.source_links = result.source_links;
                Completion::Applied
            }
            Err(err) => {
                warn!(?job, error = %err, "generation failed");
                self.error = Some(err.to_string());
                Completion::Failed(err.kind())
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Filter chain for the local preview
    pub fn preview_chain(&self) -> FilterChain {
        preview_chain(&self.adjust, self.filter, self.filter_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ProjectCategory;

    fn project() -> Project {
        Project {
            id: 7,
            title: "New Project".into(),
            created_at: "01/01/2026, 9:00 AM".into(),
            image: EncodedImage::new(vec![1u8, 1, 1], "image/jpeg"),
            thumbnail: None,
            category: ProjectCategory::New,
        }
    }

    fn result(byte: u8) -> GenerationResult {
        GenerationResult {
            image: EncodedImage::new(vec![byte], "image/png"),
            source_links: vec![SourceLink {
                title: "Ref".into(),
                uri: "https://example.com".into(),
            }],
        }
    }

    #[test]
    fn test_empty_required_fields_send_nothing() {
        let p = project();
        for tool in [ToolKind::Magic, ToolKind::Morph, ToolKind::Eraser, ToolKind::Style] {
            let mut session = EditorSession::new(&p, tool);
            assert!(!session.can_submit(), "{tool:?}");
            assert!(session.begin().is_none(), "{tool:?}");
            assert!(!session.is_generating());
        }

        let mut retouch = EditorSession::new(&p, ToolKind::Retouch);
        assert_eq!(retouch.prompt, RETOUCH_DEFAULT_PROMPT);
        assert!(retouch.begin().is_none(), "selection still empty");
    }

    #[test]
    fn test_preview_tools_never_submit() {
        let p = project();
        for tool in [ToolKind::Filters, ToolKind::Adjust] {
            let mut session = EditorSession::new(&p, tool);
            session.prompt = "anything".into();
            assert!(session.begin().is_none());
        }
    }

    #[test]
    fn test_single_flight_guard() {
        let mut session = EditorSession::new(&project(), ToolKind::BackgroundRemoval);

        let job = session.begin().expect("first job starts");
        assert!(session.is_generating());
        assert!(session.begin().is_none(), "second job refused while in flight");

        assert_eq!(session.complete(job.id, Ok(result(9))), Completion::Applied);
        assert!(!session.is_generating());
        assert!(session.begin().is_some());
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut session = EditorSession::new(&project(), ToolKind::Upscale);
        let job = session.begin().unwrap();
        session.complete(job.id, Err(GenerateError::Transport("reset".into())));

        // A duplicate completion for the same job must not apply
        assert_eq!(session.complete(job.id, Ok(result(5))), Completion::Stale);
        assert_eq!(session.working_image().bytes(), &[1, 1, 1]);
    }

    #[test]
    fn test_result_from_closed_editor_is_stale_after_reopen() {
        let p = project();
        let mut closed = EditorSession::new(&p, ToolKind::BackgroundRemoval);
        let old_job = closed.begin().unwrap();
        drop(closed);

        // Same project opened again, with a fresh job in flight
        let mut reopened = EditorSession::new(&p, ToolKind::BackgroundRemoval);
        let new_job = reopened.begin().unwrap();
        assert_ne!(old_job.id, new_job.id);

        assert_eq!(reopened.complete(old_job.id, Ok(result(170))), Completion::Stale);
        assert_eq!(reopened.working_image().bytes(), &[1, 1, 1]);
        assert!(reopened.is_generating());

        assert_eq!(reopened.complete(new_job.id, Ok(result(4))), Completion::Applied);
        assert_eq!(reopened.working_image().bytes(), &[4]);
    }

    #[test]
    fn test_failure_keeps_image_and_sets_error() {
        let mut session = EditorSession::new(&project(), ToolKind::Upscale);
        let job = session.begin().unwrap();

        let completion = session.complete(job.id, Err(GenerateError::NoImage { reason: None }));
        assert_eq!(completion, Completion::Failed(ErrorKind::NoImage));
        assert_eq!(session.working_image().bytes(), &[1, 1, 1]);
        assert!(session.error.is_some());
        assert!(session.source_links.is_empty());
    }

    #[test]
    fn test_success_replaces_image_and_links() {
        let mut session = EditorSession::new(&project(), ToolKind::BackgroundRemoval);
        let job = session.begin().unwrap();
        session.complete(job.id, Ok(result(4)));

        assert_eq!(session.working_image().bytes(), &[4]);
        assert_eq!(session.working_image().mime_type(), "image/png");
        assert_eq!(session.source_links.len(), 1);
    }

    #[test]
    fn test_morph_uses_captured_source() {
        let mut session = EditorSession::new(&project(), ToolKind::Magic);
        session.prompt = "sunset".into();
        let job = session.begin().unwrap();
        session.complete(job.id, Ok(result(8)));

        // Entering Morph captures the current image as its source
        session.select_tool(ToolKind::Morph);
        session.prompt = "Marble statue".into();
        session.morph_strength = 71;
        let job = session.begin().unwrap();

        let primary = job.request.primary_image.as_ref().unwrap();
        assert_eq!(primary.bytes(), &[8]);
        assert!(job.request.instruction.contains("Heavy Morph"));
    }

    #[test]
    fn test_style_reference_is_attached_second() {
        let mut session = EditorSession::new(&project(), ToolKind::Style);
        session.set_style_reference(Some(EncodedImage::new(vec![3u8], "image/webp")));
        session.exclusions = "  text overlays ".into();

        let job = session.begin().expect("reference alone is enough");
        assert_eq!(job.request.reference_image.as_ref().unwrap().bytes(), &[3]);
        assert_eq!(job.request.excluded_terms.as_deref(), Some("text overlays"));
        assert!(job.request.instruction.contains("second attached image"));
    }

    #[test]
    fn test_lora_clears_preset_and_prompt_clears_preset() {
        let mut session = EditorSession::new(&project(), ToolKind::Style);
        session.select_style_preset("Watercolor");
        session.set_lora_repo("ostris/ikea-instructions-lora-sdxl".into());
        assert!(session.style_preset.is_none());

        session.select_style_preset("Pixel Art");
        assert!(session.lora_repo.is_empty());

        session.set_prompt("comic book".into());
        assert!(session.style_preset.is_none());
    }

    #[test]
    fn test_upscale_end_to_end_instruction() {
        let mut session = EditorSession::new(&project(), ToolKind::Upscale);
        session.upscale_factor = UpscaleFactor::X4;
        session.face_enhance = true;

        let job = session.begin().unwrap();
        assert!(job.request.instruction.contains("4x"));
        assert!(job.request.instruction.contains("face restoration"));
        assert!(job.request.excluded_terms.is_none());
    }
}

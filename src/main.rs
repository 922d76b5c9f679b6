use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use iced::widget::image::Handle;
use iced::{Element, Task, Theme};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod color;
mod config;
mod gemini;
mod media;
mod prompt;
mod state;
mod ui;

use config::Settings;
use gemini::{CredentialStore, GenerateError, GenerationClient, GenerationResult};
use media::{MediaError, PreviewFrame};
use state::data::{EncodedImage, ProjectCategory};
use state::edit::{FilterPreset, ToolKind, UpscaleFactor};
use state::library::Library;
use state::screen::Screen;
use state::session::{Completion, EditorSession, JobId};
use ui::export::ExportState;
use ui::key_prompt::KeyPrompt;

/// Main application state
struct PixelStudio {
    settings: Settings,
    client: GenerationClient,
    /// Projects created this session
    library: Library,
    screen: Screen,
    /// Open editor, present on the Editor and Export screens
    session: Option<EditorSession>,
    /// Decoded working image
    display: Option<Handle>,
    /// Filtered preview, shown instead of `display` while filters are active
    preview: Option<PreviewFrame>,
    preview_revision: u64,
    export: ExportState,
    key_prompt: Option<KeyPrompt>,
    /// A credential could be resolved at the last check
    pro_active: bool,
    /// Home screen error banner
    banner: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    SplashFinished,

    OpenKeyPrompt(Option<ToolKind>),
    KeyInputChanged(String),
    KeySubmitted,
    KeyPromptCancelled,

    CreateProject(ToolKind),
    ProjectImagePicked(ToolKind, Option<Result<EncodedImage, MediaError>>),
    PasteProject,
    ClipboardRead(Option<String>),
    ThumbnailReady(u64, EncodedImage, Result<PreviewFrame, MediaError>),
    OpenProject(u64),
    DismissBanner,
    GoHome,

    SelectTool(ToolKind),
    PromptChanged(String),
    ExclusionsChanged(String),
    MorphStrengthChanged(u8),
    ChangeMorphSource,
    MorphSourcePicked(Option<Result<EncodedImage, MediaError>>),
    UpscaleFactorSelected(UpscaleFactor),
    FaceEnhanceToggled(bool),
    EraserTargetChanged(String),
    EraserSuggestion(&'static str),
    RetouchSelectionChanged(String),
    StylePresetSelected(&'static str),
    LoraRepoChanged(String),
    LoraScaleChanged(f32),
    StyleStrengthChanged(f32),
    PickStyleReference,
    StyleReferencePicked(Option<Result<EncodedImage, MediaError>>),
    ClearStyleReference,
    ExposureChanged(i32),
    ContrastChanged(i32),
    ResetAdjust,
    FilterSelected(FilterPreset),
    FilterIntensityChanged(u8),
    PreviewRendered(u64, Result<PreviewFrame, MediaError>),

    Generate,
    GenerationFinished {
        job: JobId,
        project: u64,
        outcome: Result<GenerationResult, GenerateError>,
    },
    DismissError,
    CopyLink(String),

    GoToExport,
    BackToEditor,
    WatermarkToggled(bool),
    SaveExport,
    ExportSaved(Option<Result<PathBuf, MediaError>>),
    CopyDataUri,
}

impl PixelStudio {
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default settings");
            Settings::default()
        });
        info!(
            model = %settings.model,
            base_url = %settings.base_url,
            grounding = settings.grounding,
            "Pixel Studio starting"
        );

        let credentials = CredentialStore::new(settings.api_key_vars());
        let client = GenerationClient::new(settings.clone(), credentials);
        let splash = Duration::from_millis(settings.splash_millis);

        (
            PixelStudio {
                settings,
                client,
                library: Library::new(),
                screen: Screen::default(),
                session: None,
                display: None,
                preview: None,
                preview_revision: 0,
                export: ExportState::default(),
                key_prompt: None,
                pro_active: false,
                banner: None,
            },
            Task::perform(tokio::time::sleep(splash), |_| Message::SplashFinished),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SplashFinished => {
                self.pro_active = self.client.credentials().has_credential();
                info!(pro_active = self.pro_active, "credential check");
                self.navigate(Screen::Home);
                Task::none()
            }

            Message::OpenKeyPrompt(pending_tool) => {
                self.key_prompt = Some(KeyPrompt::new(None, pending_tool));
                Task::none()
            }
            Message::KeyInputChanged(input) => {
                if let Some(prompt) = &mut self.key_prompt {
                    prompt.input = input;
                }
                Task::none()
            }
            Message::KeySubmitted => {
                let Some(prompt) = self.key_prompt.take() else {
                    return Task::none();
                };
                self.client.credentials().select(&prompt.input);
                self.pro_active = self.client.credentials().has_credential();

                match prompt.pending_tool {
                    Some(tool) if self.pro_active => pick_project_image(tool),
                    _ => Task::none(),
                }
            }
            Message::KeyPromptCancelled => {
                self.key_prompt = None;
                Task::none()
            }

            Message::CreateProject(tool) => {
                if !self.client.credentials().has_credential() {
                    self.key_prompt = Some(KeyPrompt::new(None, Some(tool)));
                    return Task::none();
                }
                pick_project_image(tool)
            }
            Message::ProjectImagePicked(tool, picked) => match picked {
                Some(Ok(image)) => self.create_project(image, tool),
                Some(Err(e)) => {
                    error!(error = %e, "could not open image");
                    self.banner = Some(e.to_string());
                    Task::none()
                }
                None => Task::none(),
            },
            Message::PasteProject => iced::clipboard::read().map(Message::ClipboardRead),
            Message::ClipboardRead(contents) => {
                let Some(contents) = contents else {
                    self.banner = Some("Clipboard is empty".to_string());
                    return Task::none();
                };
                match EncodedImage::from_data_uri(contents.trim()) {
                    Ok(image) if image::guess_format(image.bytes()).is_ok() => {
                        self.create_project(image, ToolKind::Magic)
                    }
                    Ok(_) => {
                        self.banner = Some("Clipboard does not hold an image".to_string());
                        Task::none()
                    }
                    Err(e) => {
                        self.banner = Some(e.to_string());
                        Task::none()
                    }
                }
            }
            Message::ThumbnailReady(id, source, result) => {
                match result {
                    Ok(frame) => {
                        if !self.library.set_thumbnail(id, &source, frame) {
                            debug!(id, "dropping thumbnail of a replaced image");
                        }
                    }
                    Err(e) => warn!(id, error = %e, "thumbnail failed"),
                }
                Task::none()
            }
            Message::OpenProject(id) => self.open_project(id, ToolKind::Magic),
            Message::DismissBanner => {
                self.banner = None;
                Task::none()
            }
            Message::GoHome => {
                if self.navigate(Screen::Home) {
                    // Uncommitted edits are discarded with the session
                    self.session = None;
                    self.display = None;
                    self.preview = None;
                    self.export = ExportState::default();
                }
                Task::none()
            }

            Message::Generate => {
                let Some(session) = &mut self.session else {
                    return Task::none();
                };
                let Some(job) = session.begin() else {
                    return Task::none();
                };

                let client = self.client.clone();
                let project = session.project_id;
                let id = job.id;
                Task::perform(
                    async move { client.generate(job.request).await },
                    move |outcome| Message::GenerationFinished {
                        job: id,
                        project,
                        outcome,
                    },
                )
            }
            Message::GenerationFinished {
                job,
                project,
                outcome,
            } => self.finish_generation(job, project, outcome),
            Message::CopyLink(uri) => iced::clipboard::write(uri),

            Message::PreviewRendered(revision, result) => {
                if revision != self.preview_revision {
                    debug!(revision, "dropping outdated preview");
                    return Task::none();
                }
                match result {
                    Ok(frame) => self.preview = Some(frame),
                    Err(e) => warn!(error = %e, "preview render failed"),
                }
                Task::none()
            }

            Message::GoToExport => {
                let Some((id, image)) = self
                    .session
                    .as_ref()
                    .filter(|s| !s.is_generating())
                    .map(|s| (s.project_id, s.working_image().clone()))
                else {
                    return Task::none();
                };
                if !self.navigate(Screen::Export) {
                    return Task::none();
                }

                // Edits are committed when the user moves on to export
                self.library.commit_image(id, image.clone());
                self.export = ExportState::default();

                let needs_thumbnail = self.library.get(id).is_some_and(|p| p.thumbnail.is_none());
                if needs_thumbnail {
                    thumbnail_task(id, image)
                } else {
                    Task::none()
                }
            }
            Message::BackToEditor => {
                self.navigate(Screen::Editor);
                Task::none()
            }
            Message::WatermarkToggled(enabled) => {
                self.export.watermark = enabled;
                Task::none()
            }
            Message::SaveExport => {
                let Some(session) = &self.session else {
                    return Task::none();
                };
                let image = session.working_image().clone();
                let stem = format!("pixel-studio-{}", Local::now().format("%Y%m%d-%H%M%S"));
                Task::perform(media::loader::save_image(image, stem), Message::ExportSaved)
            }
            Message::ExportSaved(saved) => {
                match saved {
                    Some(Ok(path)) => {
                        info!(path = %path.display(), "exported image");
                        self.export.status = Some(format!("Saved to {}", path.display()));
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "export failed");
                        self.export.status = Some(e.to_string());
                    }
                    None => {}
                }
                Task::none()
            }
            Message::CopyDataUri => {
                let Some(session) = &self.session else {
                    return Task::none();
                };
                self.export.status = Some("Copied to clipboard".to_string());
                iced::clipboard::write(session.working_image().to_data_uri())
            }

            editor_message => self.update_editor(editor_message),
        }
    }

    /// Tool input messages, which all edit the open session
    fn update_editor(&mut self, message: Message) -> Task<Message> {
        let Some(session) = &mut self.session else {
            return Task::none();
        };

        match message {
            Message::SelectTool(tool) => session.select_tool(tool),
            Message::PromptChanged(prompt) => session.set_prompt(prompt),
            Message::ExclusionsChanged(exclusions) => session.exclusions = exclusions,
            Message::MorphStrengthChanged(strength) => session.morph_strength = strength,
            Message::ChangeMorphSource => {
                return Task::perform(
                    media::loader::pick_image("Choose a Source Image"),
                    Message::MorphSourcePicked,
                );
            }
            Message::MorphSourcePicked(picked) => {
                if let Some(image) = self.take_picked(picked) {
                    if let Some(session) = &mut self.session {
                        session.set_morph_source(image);
                    }
                    return self.refresh_display();
                }
            }
            Message::UpscaleFactorSelected(factor) => session.upscale_factor = factor,
            Message::FaceEnhanceToggled(enabled) => session.face_enhance = enabled,
            Message::EraserTargetChanged(target) => session.eraser_target = target,
            Message::EraserSuggestion(target) => session.eraser_target = target.to_string(),
            Message::RetouchSelectionChanged(selection) => session.retouch_selection = selection,
            Message::StylePresetSelected(preset) => session.select_style_preset(preset),
            Message::LoraRepoChanged(repo) => session.set_lora_repo(repo),
            Message::LoraScaleChanged(scale) => session.lora_scale = scale,
            Message::StyleStrengthChanged(strength) => session.style_strength = strength,
            Message::PickStyleReference => {
                return Task::perform(
                    media::loader::pick_image("Choose a Style Reference"),
                    Message::StyleReferencePicked,
                );
            }
            Message::StyleReferencePicked(picked) => {
                if let Some(image) = self.take_picked(picked) {
                    if let Some(session) = &mut self.session {
                        session.set_style_reference(Some(image));
                    }
                }
            }
            Message::ClearStyleReference => session.set_style_reference(None),
            Message::ExposureChanged(value) => {
                session.adjust.exposure = value;
                return self.render_preview();
            }
            Message::ContrastChanged(value) => {
                session.adjust.contrast = value;
                return self.render_preview();
            }
            Message::ResetAdjust => {
                session.adjust.reset();
                return self.render_preview();
            }
            Message::FilterSelected(preset) => {
                session.filter = preset;
                return self.render_preview();
            }
            Message::FilterIntensityChanged(intensity) => {
                session.filter_intensity = intensity;
                return self.render_preview();
            }
            Message::DismissError => session.dismiss_error(),
            other => debug!(?other, "message ignored on this screen"),
        }
        Task::none()
    }

    /// Apply a finished job to the session it was started from
    fn finish_generation(
        &mut self,
        job: JobId,
        project: u64,
        outcome: Result<GenerationResult, GenerateError>,
    ) -> Task<Message> {
        let Some(session) = self.session.as_mut().filter(|s| s.project_id == project) else {
            debug!(?job, project, "result arrived after the editor closed");
            return Task::none();
        };

        let reselect = outcome
            .as_ref()
            .err()
            .filter(|e| e.requires_credential_reselect())
            .map(|e| e.to_string());

        match session.complete(job, outcome) {
            Completion::Applied => {
                info!(?job, "generation applied");
                self.refresh_display()
            }
            Completion::Failed(kind) => {
                if let Some(reason) = reselect {
                    warn!(?kind, "credential rejected, asking for a new key");
                    self.client.credentials().clear_selection();
                    self.pro_active = self.client.credentials().has_credential();
                    self.key_prompt = Some(KeyPrompt::new(Some(reason), None));
                }
                Task::none()
            }
            Completion::Stale => Task::none(),
        }
    }

    fn create_project(&mut self, image: EncodedImage, tool: ToolKind) -> Task<Message> {
        let id = self.library.create(image.clone(), ProjectCategory::for_tool(tool));
        Task::batch([thumbnail_task(id, image), self.open_project(id, tool)])
    }

    fn open_project(&mut self, id: u64, tool: ToolKind) -> Task<Message> {
        let Some(project) = self.library.get(id) else {
            warn!(id, "no such project");
            return Task::none();
        };
        let session = EditorSession::new(project, tool);
        if !self.navigate(Screen::Editor) {
            return Task::none();
        }

        self.session = Some(session);
        self.banner = None;
        self.refresh_display()
    }

    /// Decode the working image for display and re-render the preview
    fn refresh_display(&mut self) -> Task<Message> {
        let Some(session) = &self.session else {
            return Task::none();
        };
        self.display = Some(Handle::from_bytes(session.working_image().bytes().to_vec()));
        self.render_preview()
    }

    fn render_preview(&mut self) -> Task<Message> {
        let Some(session) = &self.session else {
            return Task::none();
        };
        self.preview_revision += 1;
        let revision = self.preview_revision;

        let chain = session.preview_chain();
        if chain.is_identity() {
            self.preview = None;
            return Task::none();
        }

        debug!(revision, filter = %chain, "rendering preview");
        Task::perform(
            media::preview::render_preview(session.working_image().clone(), chain),
            move |result| Message::PreviewRendered(revision, result),
        )
    }

    /// Unwrap a picker result, reporting failures on the session
    fn take_picked(
        &mut self,
        picked: Option<Result<EncodedImage, MediaError>>,
    ) -> Option<EncodedImage> {
        match picked? {
            Ok(image) => Some(image),
            Err(e) => {
                error!(error = %e, "could not open image");
                if let Some(session) = &mut self.session {
                    session.error = Some(e.to_string());
                }
                None
            }
        }
    }

    fn navigate(&mut self, to: Screen) -> bool {
        match self.screen.transition(to) {
            Ok(screen) => {
                debug!(from = ?self.screen, to = ?screen, "navigate");
                self.screen = screen;
                true
            }
            Err(e) => {
                warn!(error = %e, "navigation rejected");
                false
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if let Some(prompt) = &self.key_prompt {
            return ui::key_prompt::view(prompt);
        }

        let display = self
            .preview
            .as_ref()
            .map(|frame| &frame.handle)
            .or(self.display.as_ref());

        match (self.screen, &self.session) {
            (Screen::Loading, _) => ui::loading::view(),
            (Screen::Editor, Some(session)) => ui::editor::view(session, display, self.pro_active),
            (Screen::Export, Some(_)) => ui::export::view(&self.export, self.display.as_ref()),
            _ => ui::home::view(&self.library, self.pro_active, self.banner.as_deref()),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn title(&self) -> String {
        match &self.session {
            Some(session) if self.screen != Screen::Home => {
                format!("Pixel Studio - {} ({})", session.active_tool.label(), self.settings.model)
            }
            _ => "Pixel Studio".to_string(),
        }
    }
}

fn pick_project_image(tool: ToolKind) -> Task<Message> {
    Task::perform(media::loader::pick_image("Choose a Photo"), move |picked| {
        Message::ProjectImagePicked(tool, picked)
    })
}

fn thumbnail_task(id: u64, image: EncodedImage) -> Task<Message> {
    Task::perform(media::thumbnail::generate_thumbnail(image.clone()), move |result| {
        Message::ThumbnailReady(id, image.clone(), result)
    })
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixel_studio=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    iced::application(PixelStudio::title, PixelStudio::update, PixelStudio::view)
        .theme(PixelStudio::theme)
        .centered()
        .run_with(PixelStudio::new)
}

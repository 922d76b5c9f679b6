use iced::widget::{
    button, checkbox, column, container, image, row, scrollable, slider, text, text_input, Column,
    Row,
};
use iced::{Alignment, ContentFit, Element, Length};

use super::{banner, pro_badge};
use crate::prompt::{ERASER_SUGGESTIONS, STYLE_PRESETS};
use crate::state::edit::{FilterPreset, ToolKind, UpscaleFactor};
use crate::state::session::EditorSession;
use crate::Message;

const PANEL_WIDTH: f32 = 320.0;

pub fn view<'a>(
    session: &'a EditorSession,
    display: Option<&'a image::Handle>,
    pro_active: bool,
) -> Element<'a, Message> {
    let header = row![
        button(text("Home")).on_press(Message::GoHome).style(button::text),
        text(session.active_tool.label()).size(22).width(Length::Fill),
        pro_badge(pro_active),
        button(text("Export"))
            .on_press_maybe((!session.is_generating()).then_some(Message::GoToExport))
            .style(button::primary),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let tools = Column::with_children(ToolKind::ALL.iter().map(|tool| {
        let style = if *tool == session.active_tool {
            button::primary
        } else {
            button::text
        };
        button(text(tool.label()).size(14))
            .on_press(Message::SelectTool(*tool))
            .style(style)
            .width(Length::Fill)
            .into()
    }))
    .spacing(4)
    .width(Length::Fixed(140.0));

    let picture: Element<Message> = match display {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text("Decoding...").into(),
    };

    let mut canvas = Column::new().spacing(10).width(Length::Fill);
    if let Some(error) = &session.error {
        canvas = canvas.push(banner(error, Message::DismissError));
    }
    canvas = canvas.push(
        container(picture)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    );
    if session.is_generating() {
        canvas = canvas.push(text("Generating...").size(14));
    }
    if !session.source_links.is_empty() {
        canvas = canvas.push(source_links(session));
    }

    let panel = scrollable(
        column![tool_panel(session), shared_controls(session)]
            .spacing(20)
            .padding(10),
    )
    .width(Length::Fixed(PANEL_WIDTH));

    column![header, row![tools, canvas, panel].spacing(16).height(Length::Fill)]
        .spacing(16)
        .padding(20)
        .into()
}

fn source_links(session: &EditorSession) -> Element<'_, Message> {
    let links = Row::with_children(session.source_links.iter().map(|link| {
        button(text(&link.title).size(12))
            .on_press(Message::CopyLink(link.uri.clone()))
            .style(button::secondary)
            .into()
    }))
    .spacing(6)
    .wrap();

    column![text("Sources").size(12), links].spacing(4).into()
}

fn tool_panel(session: &EditorSession) -> Element<'_, Message> {
    let title = text(session.active_tool.description()).size(14);

    let body: Element<Message> = match session.active_tool {
        ToolKind::Magic => prompt_input(session, "Describe the edit or a new image").into(),

        ToolKind::BackgroundRemoval => text("Isolates the main subject on a transparent background.")
            .size(13)
            .into(),

        ToolKind::Morph => column![
            prompt_input(session, "Target concept, e.g. Marble statue"),
            text(format!("Strength: {}%", session.morph_strength)).size(13),
            slider(0..=100, session.morph_strength, Message::MorphStrengthChanged),
            button(text("Change Source"))
                .on_press(Message::ChangeMorphSource)
                .style(button::secondary),
        ]
        .spacing(10)
        .into(),

        ToolKind::Upscale => {
            let factor = |f: UpscaleFactor| {
                let style = if session.upscale_factor == f {
                    button::primary
                } else {
                    button::secondary
                };
                button(text(format!("{}x", f.value())))
                    .on_press(Message::UpscaleFactorSelected(f))
                    .style(style)
            };
            column![
                row![factor(UpscaleFactor::X2), factor(UpscaleFactor::X4)].spacing(8),
                checkbox("Face enhance", session.face_enhance).on_toggle(Message::FaceEnhanceToggled),
            ]
            .spacing(10)
            .into()
        }

        ToolKind::Style => style_panel(session),

        ToolKind::Eraser => {
            let suggestions = Row::with_children(ERASER_SUGGESTIONS.iter().map(|s| {
                button(text(*s).size(12))
                    .on_press(Message::EraserSuggestion(*s))
                    .style(button::secondary)
                    .into()
            }))
            .spacing(6)
            .wrap();
            column![
                text_input("Object to remove", &session.eraser_target)
                    .on_input(Message::EraserTargetChanged)
                    .padding(8),
                suggestions,
            ]
            .spacing(10)
            .into()
        }

        ToolKind::Retouch => column![
            text_input("Area or object, e.g. the red car", &session.retouch_selection)
                .on_input(Message::RetouchSelectionChanged)
                .padding(8),
            prompt_input(session, "What to do with it"),
        ]
        .spacing(10)
        .into(),

        ToolKind::Filters => {
            let presets = Row::with_children(FilterPreset::ALL.iter().map(|preset| {
                let style = if *preset == session.filter {
                    button::primary
                } else {
                    button::secondary
                };
                button(text(preset.name()).size(12))
                    .on_press(Message::FilterSelected(*preset))
                    .style(style)
                    .into()
            }))
            .spacing(6)
            .wrap();
            column![
                presets,
                text(format!("Intensity: {}%", session.filter_intensity)).size(13),
                slider(0..=100, session.filter_intensity, Message::FilterIntensityChanged),
            ]
            .spacing(10)
            .into()
        }

        ToolKind::Adjust => column![
            text(format!("Exposure: {:+}", session.adjust.exposure)).size(13),
            slider(-50..=50, session.adjust.exposure, Message::ExposureChanged),
            text(format!("Contrast: {:+}", session.adjust.contrast)).size(13),
            slider(-50..=50, session.adjust.contrast, Message::ContrastChanged),
            button(text("Reset"))
                .on_press_maybe((!session.adjust.is_unedited()).then_some(Message::ResetAdjust))
                .style(button::secondary),
        ]
        .spacing(10)
        .into(),
    };

    column![title, body].spacing(12).into()
}

fn style_panel(session: &EditorSession) -> Element<'_, Message> {
    let presets = Row::with_children(STYLE_PRESETS.iter().map(|preset| {
        let selected = session.style_preset.as_deref() == Some(*preset);
        button(text(*preset).size(12))
            .on_press(Message::StylePresetSelected(*preset))
            .style(if selected { button::primary } else { button::secondary })
            .into()
    }))
    .spacing(6)
    .wrap();

    let reference: Element<Message> = if session.style_reference().is_some() {
        row![
            text("Reference image attached").size(13).width(Length::Fill),
            button(text("Remove").size(12))
                .on_press(Message::ClearStyleReference)
                .style(button::danger),
        ]
        .align_y(Alignment::Center)
        .into()
    } else {
        button(text("Upload style reference"))
            .on_press(Message::PickStyleReference)
            .style(button::secondary)
            .into()
    };

    column![
        presets,
        prompt_input(session, "Or describe a style"),
        text_input("LoRA repo, e.g. owner/model", &session.lora_repo)
            .on_input(Message::LoraRepoChanged)
            .padding(8),
        text(format!("LoRA scale: {:.2}", session.lora_scale)).size(13),
        slider(0.0..=2.0, session.lora_scale, Message::LoraScaleChanged).step(0.05),
        text(format!("Strength: {:.2}", session.style_strength)).size(13),
        slider(0.0..=1.0, session.style_strength, Message::StyleStrengthChanged).step(0.05),
        reference,
    ]
    .spacing(10)
    .into()
}

/// Exclusions and the submit button, shared by every AI tool
fn shared_controls(session: &EditorSession) -> Element<'_, Message> {
    if !session.active_tool.is_generative() {
        return column![].into();
    }

    let label = if session.is_generating() {
        "Generating..."
    } else {
        "Generate"
    };

    column![
        text_input("Exclude (negative prompt)", &session.exclusions)
            .on_input(Message::ExclusionsChanged)
            .padding(8),
        button(text(label))
            .on_press_maybe(session.can_submit().then_some(Message::Generate))
            .style(button::primary)
            .width(Length::Fill)
            .padding(12),
    ]
    .spacing(10)
    .into()
}

fn prompt_input<'a>(session: &'a EditorSession, placeholder: &'a str) -> iced::widget::TextInput<'a, Message> {
    text_input(placeholder, &session.prompt)
        .on_input(Message::PromptChanged)
        .on_submit_maybe(session.can_submit().then_some(Message::Generate))
        .padding(8)
}

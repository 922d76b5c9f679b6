use iced::widget::{button, column, container, image, row, scrollable, text, Column, Row};
use iced::{Alignment, ContentFit, Element, Length};

use super::{banner, pro_badge};
use crate::state::data::Project;
use crate::state::edit::ToolKind;
use crate::state::library::Library;
use crate::Message;

/// Shortcuts that start a new project with a tool already selected
const QUICK_TOOLS: [(ToolKind, &str); 5] = [
    (ToolKind::BackgroundRemoval, "Background Remove"),
    (ToolKind::Upscale, "AI Enhance"),
    (ToolKind::Retouch, "Object Eraser"),
    (ToolKind::Morph, "AI Morph"),
    (ToolKind::Style, "Style Transfer"),
];

const CARD_WIDTH: f32 = 180.0;

pub fn view<'a>(
    library: &'a Library,
    pro_active: bool,
    error: Option<&'a str>,
) -> Element<'a, Message> {
    let header = row![
        text("Pixel Studio").size(32).width(Length::Fill),
        pro_badge(pro_active),
    ]
    .align_y(Alignment::Center);

    let start = row![
        button(text("New Project"))
            .on_press(Message::CreateProject(ToolKind::Magic))
            .style(button::primary)
            .padding(12),
        button(text("Paste Image"))
            .on_press(Message::PasteProject)
            .style(button::secondary)
            .padding(12),
    ]
    .spacing(10);

    let quick_tools = Row::with_children(QUICK_TOOLS.iter().map(|(tool, label)| {
        button(
            column![text(*label).size(16), text(tool.description()).size(12)]
                .spacing(4)
                .width(Length::Fixed(CARD_WIDTH)),
        )
        .on_press(Message::CreateProject(*tool))
        .style(button::secondary)
        .padding(12)
        .into()
    }))
    .spacing(10)
    .wrap();

    let recent: Element<Message> = if library.project_count() == 0 {
        text("No projects yet. Start one above.").size(14).into()
    } else {
        Row::with_children(library.recent().map(project_card))
            .spacing(12)
            .wrap()
            .into()
    };

    let mut content = Column::new().spacing(24).padding(30);
    if let Some(message) = error {
        content = content.push(banner(message, Message::DismissBanner));
    }
    content = content
        .push(header)
        .push(start)
        .push(text("Quick Tools").size(20))
        .push(quick_tools)
        .push(text(format!("Recent Projects ({})", library.project_count())).size(20))
        .push(recent);

    scrollable(content).height(Length::Fill).into()
}

fn project_card(project: &Project) -> Element<'_, Message> {
    let thumbnail: Element<Message> = match &project.thumbnail {
        Some(frame) => image(frame.handle.clone())
            .content_fit(ContentFit::Cover)
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_WIDTH))
            .into(),
        None => container(text("...").size(24))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_WIDTH))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(CARD_WIDTH))
            .style(container::rounded_box)
            .into(),
    };

    button(
        column![
            thumbnail,
            text(&project.title).size(14),
            row![
                text(&project.created_at).size(11).width(Length::Fill),
                text(project.category.label()).size(11),
            ],
        ]
        .spacing(6)
        .width(Length::Fixed(CARD_WIDTH)),
    )
    .on_press(Message::OpenProject(project.id))
    .style(button::text)
    .into()
}

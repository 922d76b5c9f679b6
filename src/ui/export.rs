use iced::widget::{button, checkbox, column, container, image, row, stack, text, Column};
use iced::{Alignment, ContentFit, Element, Length};

use crate::Message;

/// Export screen state
#[derive(Debug, Clone, Default)]
pub struct ExportState {
    /// Show the brand overlay on the preview
    pub watermark: bool,
    /// Result of the last save or copy
    pub status: Option<String>,
}

pub fn view<'a>(state: &'a ExportState, display: Option<&'a image::Handle>) -> Element<'a, Message> {
    let header = row![
        button(text("Back")).on_press(Message::BackToEditor).style(button::text),
        text("Export").size(22).width(Length::Fill),
        button(text("Done")).on_press(Message::GoHome).style(button::secondary),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let picture: Element<Message> = match display {
        Some(handle) => {
            let picture = image(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill);
            if state.watermark {
                stack![
                    picture,
                    container(text("Pixel Studio").size(18))
                        .padding(16)
                        .align_right(Length::Fill)
                        .align_bottom(Length::Fill),
                ]
                .into()
            } else {
                picture.into()
            }
        }
        None => text("Decoding...").into(),
    };

    let mut content = Column::new()
        .push(header)
        .push(container(picture).width(Length::Fill).height(Length::Fill))
        .push(checkbox("Watermark", state.watermark).on_toggle(Message::WatermarkToggled))
        .push(
            row![
                button(text("Save to disk"))
                    .on_press(Message::SaveExport)
                    .style(button::primary)
                    .padding(12),
                button(text("Copy as data URI"))
                    .on_press(Message::CopyDataUri)
                    .style(button::secondary)
                    .padding(12),
            ]
            .spacing(10),
        )
        .spacing(16)
        .padding(20);

    if let Some(status) = &state.status {
        content = content.push(text(status).size(14));
    }

    content.into()
}

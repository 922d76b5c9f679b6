use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::state::edit::ToolKind;
use crate::Message;

/// State of the API key dialog
#[derive(Debug, Clone, Default)]
pub struct KeyPrompt {
    pub input: String,
    /// Why the dialog opened, e.g. the endpoint rejected the last key
    pub reason: Option<String>,
    /// Tool to start a project with once a key is entered
    pub pending_tool: Option<ToolKind>,
}

impl KeyPrompt {
    pub fn new(reason: Option<String>, pending_tool: Option<ToolKind>) -> Self {
        Self {
            input: String::new(),
            reason,
            pending_tool,
        }
    }
}

pub fn view(prompt: &KeyPrompt) -> Element<'_, Message> {
    let mut content = column![
        text("Connect your API key").size(28),
        text("AI tools need a key for the image generation service. It is kept in memory for this session only.")
            .size(14),
    ]
    .spacing(16)
    .max_width(480)
    .align_x(Alignment::Center);

    if let Some(reason) = &prompt.reason {
        content = content.push(text(reason).style(text::danger));
    }

    let submit = (!prompt.input.trim().is_empty()).then_some(Message::KeySubmitted);

    content = content
        .push(
            text_input("API key", &prompt.input)
                .on_input(Message::KeyInputChanged)
                .on_submit_maybe(submit.clone())
                .secure(true)
                .padding(10),
        )
        .push(
            row![
                button(text("Cancel"))
                    .on_press(Message::KeyPromptCancelled)
                    .style(button::secondary),
                button(text("Use Key"))
                    .on_press_maybe(submit)
                    .style(button::primary),
            ]
            .spacing(10),
        );

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// UI module
///
/// One view function per screen, all producing `crate::Message`:
/// - Splash (loading.rs)
/// - Quick tools and recent projects (home.rs)
/// - Tool panels around the working image (editor.rs)
/// - Save / copy of the finished image (export.rs)
/// - API key entry (key_prompt.rs)
use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length};

use crate::Message;

pub mod editor;
pub mod export;
pub mod home;
pub mod key_prompt;
pub mod loading;

/// Dismissable error strip shown above screen content
pub fn banner(message: &str, on_dismiss: Message) -> Element<'_, Message> {
    container(
        row![
            text(message).style(text::danger).width(Length::Fill),
            button(text("Dismiss").size(14))
                .on_press(on_dismiss)
                .style(button::text),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
    )
    .padding(10)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

/// Badge text for the credential indicator
pub fn pro_badge(active: bool) -> Element<'static, Message> {
    let label = if active { "PRO ACTIVE" } else { "GET PRO" };
    let badge = button(text(label).size(12)).on_press(Message::OpenKeyPrompt(None));

    if active {
        badge.style(button::success).into()
    } else {
        badge.style(button::secondary).into()
    }
}

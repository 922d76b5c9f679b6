use iced::widget::{column, container, text};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Splash screen shown while the app starts up
pub fn view() -> Element<'static, Message> {
    let content = column![
        text("Pixel Studio").size(48),
        text("AI photo editing").size(16),
        text("Loading...").size(14),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

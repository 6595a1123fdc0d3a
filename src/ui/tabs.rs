//! Tab bar switching between the two screens
use iced::widget::{button, container, row, text};
use iced::{Element, Length, Theme};

use crate::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Characters,
    Favorites,
}

pub fn tab_bar<'a>(active: Tab, favorites: usize) -> Element<'a, Message> {
    let tab_button = |tab: Tab, label: String| {
        let style: fn(&Theme, button::Status) -> button::Style = if tab == active {
            button::primary
        } else {
            button::secondary
        };
        button(text(label))
            .on_press(Message::TabSelected(tab))
            .padding([8, 20])
            .style(style)
    };

    let tabs = row![
        tab_button(Tab::Characters, "Characters".to_string()),
        tab_button(Tab::Favorites, format!("Favorites ({favorites})")),
    ]
    .spacing(10);

    container(tabs).center_x(Length::Fill).padding(10).into()
}

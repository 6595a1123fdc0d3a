//! Character card shared by the roster and favorites screens
use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Alignment, Background, Border, Color, Element, Length, Theme};

use crate::state::data::{Character, Status};
use crate::Message;

/// Fixed card width so the grid wraps evenly
pub const CARD_WIDTH: f32 = 240.0;

const AVATAR_HEIGHT: f32 = 200.0;
const LABEL_WIDTH: f32 = 70.0;

/// What the card button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Add,
    Remove,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Add => "Add",
            CardAction::Remove => "Remove",
        }
    }
}

/// Indicator colour for a life status
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Alive => Color::from_rgb8(0x55, 0xcc, 0x44),
        Status::Dead => Color::from_rgb8(0xff, 0x44, 0x44),
        Status::Unknown => Color::from_rgb8(0xff, 0xaa, 0x33),
    }
}

pub fn character_card<'a>(
    character: &'a Character,
    avatar: Option<&image::Handle>,
    action: CardAction,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match avatar {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(AVATAR_HEIGHT))
            .into(),
        None => container(text("…").size(32))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(AVATAR_HEIGHT))
            .style(container::rounded_box)
            .into(),
    };

    let status_row = row![
        text("Status:").width(Length::Fixed(LABEL_WIDTH)),
        status_dot(character.status),
        text(character.status.label()),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let gender_row = row![
        text("Gender:").width(Length::Fixed(LABEL_WIDTH)),
        text(character.gender.label()),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let on_press = match action {
        CardAction::Add => Message::AddFavorite(character.clone()),
        CardAction::Remove => Message::RemoveFavorite(character.id.clone()),
    };
    let style: fn(&Theme, button::Status) -> button::Style = match action {
        CardAction::Add => button::success,
        CardAction::Remove => button::danger,
    };
    let action_button = button(text(action.label()))
        .on_press(on_press)
        .padding([6, 12])
        .style(style);

    let content = column![
        picture,
        text(&character.name).size(20),
        status_row,
        gender_row,
        action_button,
    ]
    .spacing(8);

    container(content)
        .padding(12)
        .width(Length::Fixed(CARD_WIDTH))
        .style(container::rounded_box)
        .into()
}

fn status_dot<'a>(status: Status) -> Element<'a, Message> {
    let color = status_color(status);

    container(Space::new(Length::Fixed(10.0), Length::Fixed(10.0)))
        .style(move |_theme: &Theme| container::Style {
            background: Some(Background::Color(color)),
            border: Border {
                radius: 5.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_are_distinct() {
        let alive = status_color(Status::Alive);
        let dead = status_color(Status::Dead);
        let unknown = status_color(Status::Unknown);

        assert_ne!(alive, dead);
        assert_ne!(dead, unknown);
        assert_eq!(CardAction::Remove.label(), "Remove");
    }
}

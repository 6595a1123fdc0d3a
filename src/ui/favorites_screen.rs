//! Favorites screen
use std::collections::HashMap;

use iced::widget::{button, column, container, horizontal_space, image, row, scrollable, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::card::{self, CardAction};
use crate::state::favorites::Favorites;
use crate::Message;

pub fn view<'a>(
    favorites: &'a Favorites,
    hydrated: bool,
    avatars: &'a HashMap<String, image::Handle>,
) -> Element<'a, Message> {
    let mut header = row![
        text(format!(
            "Favorites ({}/{})",
            favorites.len(),
            favorites.max_items()
        ))
        .size(24),
        horizontal_space(),
    ]
    .align_y(Alignment::Center);

    if !favorites.is_empty() {
        header = header.push(
            button("Clear all")
                .on_press(Message::ClearFavorites)
                .style(button::danger),
        );
    }

    let body: Element<'a, Message> = if favorites.is_empty() {
        let hint = if hydrated {
            format!(
                "No favorites yet. Add up to {} characters from the roster.",
                favorites.max_items()
            )
        } else {
            "Loading favorites…".to_string()
        };
        container(text(hint)).center_x(Length::Fill).padding(40).into()
    } else {
        let cards = favorites
            .list()
            .iter()
            .map(|character| {
                card::character_card(character, avatars.get(&character.id), CardAction::Remove)
            })
            .collect();
        Wrap::with_elements(cards)
            .spacing(20.0)
            .line_spacing(20.0)
            .into()
    };

    scrollable(column![header, body].spacing(20).padding(20).width(Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

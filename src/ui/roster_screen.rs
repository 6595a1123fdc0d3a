//! Roster screen: every fetched character, paged in as the user scrolls
use std::collections::HashMap;

use iced::widget::{button, column, container, horizontal_space, image, row, scrollable, text};
use iced::{Alignment, Color, Element, Length};
use iced_aw::Wrap;

use super::card::{self, CardAction};
use crate::state::favorites::Favorites;
use crate::state::roster::{Roster, RosterStatus};
use crate::Message;

/// Fraction of the scroll range left when the next page is requested
pub const END_REACHED_THRESHOLD: f32 = 0.1;

/// Whether a relative scroll offset is close enough to the bottom
///
/// The offset is NaN when the content fits in the viewport.
pub fn is_near_end(relative_y: f32) -> bool {
    relative_y.is_finite() && relative_y >= 1.0 - END_REACHED_THRESHOLD
}

pub fn view<'a>(
    roster: &'a Roster,
    favorites: &'a Favorites,
    avatars: &'a HashMap<String, image::Handle>,
) -> Element<'a, Message> {
    let loaded = roster.characters().len();
    let title = match roster.total() {
        Some(total) => format!("{loaded} of {total} characters, page {}", roster.page()),
        None => "Characters".to_string(),
    };

    let header = row![
        text(title).size(24),
        horizontal_space(),
        button("Refresh")
            .on_press(Message::Refresh)
            .style(button::secondary),
    ]
    .align_y(Alignment::Center);

    let cards: Vec<Element<'a, Message>> = roster
        .characters()
        .iter()
        .map(|character| {
            // Favorites hold at most a handful of entries, a scan per card is fine
            let action = if favorites.contains(&character.id) {
                CardAction::Remove
            } else {
                CardAction::Add
            };
            card::character_card(character, avatars.get(&character.id), action)
        })
        .collect();

    let grid = Wrap::with_elements(cards).spacing(20.0).line_spacing(20.0);

    let content = column![header, grid, footer(roster.status())]
        .spacing(20)
        .padding(20)
        .width(Length::Fill);

    scrollable(content)
        .on_scroll(Message::RosterScrolled)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Footer reflecting the request phase
fn footer<'a>(status: RosterStatus) -> Element<'a, Message> {
    let content: Element<'a, Message> = match status {
        RosterStatus::Loading => text("Loading characters…").into(),
        RosterStatus::Failed => column![
            text("Request failed.").color(Color::from_rgb8(0xff, 0x44, 0x44)),
            button("Try again").on_press(Message::LoadMore),
        ]
        .spacing(10)
        .align_x(Alignment::Center)
        .into(),
        RosterStatus::Exhausted => text("No more characters.").into(),
        RosterStatus::Idle => button("Load more").on_press(Message::LoadMore).into(),
    };

    container(content).center_x(Length::Fill).padding(20).into()
}

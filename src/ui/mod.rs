/// User interface module
///
/// This module builds the views, including:
/// - The character card shared by both screens (card.rs)
/// - The infinite-scroll roster screen (roster_screen.rs)
/// - The favorites screen (favorites_screen.rs)
/// - The tab bar switching between them (tabs.rs)

pub mod card;
pub mod favorites_screen;
pub mod roster_screen;
pub mod tabs;

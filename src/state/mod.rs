/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The paging accumulator behind the roster screen (roster.rs)
/// - The capped favorites reducer (favorites.rs)
/// - The key-value store backends (storage.rs)
/// - Asynchronous persistence of the favorites snapshot (persist.rs)

pub mod data;
pub mod favorites;
pub mod persist;
pub mod roster;
pub mod storage;

//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the GraphQL layer, the persisted favorites snapshot and the UI.
use serde::{Deserialize, Serialize};

/// Life status of a character as reported by the API
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Alive,
    Dead,
    /// Wire value `unknown`, also used for anything unrecognised
    #[default]
    Unknown,
}

impl Status {
    /// Human readable label for the card
    pub fn label(self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Dead => "Dead",
            Status::Unknown => "Unknown",
        }
    }

    fn wire(self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Dead => "Dead",
            Status::Unknown => "unknown",
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Alive" => Status::Alive,
            "Dead" => Status::Dead,
            _ => Status::Unknown,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.wire().to_string()
    }
}

/// Gender of a character as reported by the API
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Female,
    Male,
    Genderless,
    #[default]
    Unknown,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Genderless => "Genderless",
            Gender::Unknown => "Unknown",
        }
    }

    fn wire(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Genderless => "Genderless",
            Gender::Unknown => "unknown",
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Female" => Gender::Female,
            "Male" => Gender::Male,
            "Genderless" => Gender::Genderless,
            _ => Gender::Unknown,
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.wire().to_string()
    }
}

/// A single character record
///
/// Immutable once fetched. The same shape is used on the wire and in the
/// persisted favorites snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Unique, API-assigned ID
    pub id: String,
    pub name: String,
    /// Avatar URL
    pub image: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub gender: Gender,
}

/// Pagination metadata of one page
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Total number of records on the server
    pub count: u32,
    /// Next page number, `None` on the last page
    pub next: Option<u32>,
}

/// One page of the `characters` query
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CharactersPage {
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<Character>,
}

#[cfg(test)]
pub(crate) fn sample(id: &str) -> Character {
    Character {
        id: id.to_string(),
        name: format!("Character {id}"),
        image: format!("https://example.invalid/avatar/{id}.jpeg"),
        status: Status::Alive,
        gender: Gender::Unknown,
    }
}

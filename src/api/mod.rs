/// GraphQL access to the remote character service
///
/// This module handles:
/// - The `GetCharacters` query document and wire types (query.rs)
/// - Posting the query and decoding the answer (client.rs)

pub mod client;
pub mod query;

pub use client::GraphQlClient;

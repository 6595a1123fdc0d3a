//! The `GetCharacters` query and its wire types
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::data::CharactersPage;

/// Paginated character listing
pub const CHARACTERS_QUERY: &str = "query GetCharacters($page: Int!) {
  characters(page: $page) {
    info {
      count
      next
    }
    results {
      id
      name
      gender
      status
      image
    }
  }
}";

/// Body of a GraphQL POST
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: PageVariables,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PageVariables {
    pub page: u32,
}

/// Build the request for one page of characters
pub fn characters_request(page: u32) -> GraphQlRequest {
    GraphQlRequest {
        query: CHARACTERS_QUERY,
        variables: PageVariables { page },
    }
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize, Debug)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Deserialize, Debug)]
struct CharactersData {
    characters: Option<CharactersPage>,
}

/// Decode a `GetCharacters` response body
///
/// `Ok(None)` means the server answered without a `characters` object.
/// Errors only fail the call when no page came back with them.
pub fn decode_characters(body: &str) -> Result<Option<CharactersPage>, ApiError> {
    let response: GraphQlResponse<CharactersData> = serde_json::from_str(body)?;

    let page = response.data.and_then(|data| data.characters);
    if page.is_none() && !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ApiError::GraphQl(messages.join("; ")));
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_page_variable() {
        let body = serde_json::to_value(characters_request(3)).unwrap();

        assert_eq!(body["variables"]["page"], 3);
        assert!(body["query"].as_str().unwrap().contains("characters(page: $page)"));
    }

    #[test]
    fn test_decodes_page() {
        let body = r#"{
            "data": {
                "characters": {
                    "info": { "count": 826, "next": 2 },
                    "results": [
                        { "id": "1", "name": "Rick Sanchez", "gender": "Male", "status": "Alive",
                          "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg" },
                        { "id": "2", "name": "Morty Smith", "gender": "Male", "status": "Alive",
                          "image": "https://rickandmortyapi.com/api/character/avatar/2.jpeg" }
                    ]
                }
            }
        }"#;

        let page = decode_characters(body).unwrap().unwrap();

        assert_eq!(page.info.next, Some(2));
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].name, "Morty Smith");
    }

    #[test]
    fn test_null_characters_is_no_result() {
        let body = r#"{"data":{"characters":null}}"#;

        assert_eq!(decode_characters(body).unwrap(), None);
    }

    #[test]
    fn test_errors_without_data_fail() {
        let body = r#"{"data":null,"errors":[{"message":"404: Not Found"},{"message":"again"}]}"#;

        let err = decode_characters(body).unwrap_err();

        assert_eq!(err, ApiError::GraphQl("404: Not Found; again".to_string()));
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let err = decode_characters("<html>bad gateway</html>").unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }
}

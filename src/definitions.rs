//! Looking up the definitions that go on the back of each card.

use crate::flashcards::Flashcard;
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Used in place of a definition whenever one can't be found, for whatever reason
pub const DEFINITION_NOT_FOUND: &str = "Definition not found";

pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en/";

/// Anything that can turn a word into a definition. Resolving never fails: a source that
/// can't find a definition returns [DEFINITION_NOT_FOUND].
pub trait DefinitionSource {
    fn resolve(&self, word: &str) -> String;
}

impl<F: Fn(&str) -> String> DefinitionSource for F {
    fn resolve(&self, word: &str) -> String {
        self(word)
    }
}

/// Pull the first definition of the first meaning of the first entry out of a dictionary
/// API response body, if the body has that shape
pub fn extract_definition(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => first_definition(&value),
        Err(e) => {
            debug!("unexpected dictionary response: {e}");
            None
        }
    }
}

/// Only the path to the first definition is looked at; the rest of the response can be
/// whatever shape it likes
fn first_definition(response: &Value) -> Option<String> {
    response
        .get(0)?
        .get("meanings")?
        .get(0)?
        .get("definitions")?
        .get(0)?
        .get("definition")?
        .as_str()
        .map(str::to_string)
}

/// Parse a dictionary endpoint that words can be appended to as a path segment
pub fn parse_base_url(base_url: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        anyhow::bail!("dictionary url `{url}` cannot have a word appended to it");
    }
    // an empty trailing segment would otherwise leave a `//` before the word
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
    }
    Ok(url)
}

/// Looks words up with a blocking GET against a dictionaryapi.dev style endpoint
pub struct DictionaryClient {
    client: Client,
    base_url: Url,
}

impl DictionaryClient {
    /// `base_url` is the endpoint that the (percent-encoded) word gets appended to
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<DictionaryClient> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(DictionaryClient {
            client: builder.build()?,
            base_url,
        })
    }

    /// The url `word` is looked up at
    pub fn url_for(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(word);
        }
        url
    }

    fn fetch(&self, word: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(self.url_for(word))
            .send()?
            .error_for_status()?
            .json()
    }
}

impl DefinitionSource for DictionaryClient {
    fn resolve(&self, word: &str) -> String {
        if word.is_empty() {
            return DEFINITION_NOT_FOUND.to_string();
        }

        match self.fetch(word) {
            Ok(response) => first_definition(&response).unwrap_or_else(|| {
                warn!(word, "dictionary response has no definition");
                DEFINITION_NOT_FOUND.to_string()
            }),
            Err(e) => {
                warn!(word, "definition lookup failed: {e}");
                DEFINITION_NOT_FOUND.to_string()
            }
        }
    }
}

/// Resolve every word in order, one lookup at a time
pub fn resolve_all<S: DefinitionSource + ?Sized>(words: &[String], source: &S) -> Vec<Flashcard> {
    words
        .iter()
        .map(|word| {
            let definition = source.resolve(word);
            debug!(word = %word, definition = %definition, "resolved");
            Flashcard::new(word, definition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT: &str = r#"[{
        "word": "cat",
        "phonetic": "/kæt/",
        "meanings": [
            {
                "partOfSpeech": "noun",
                "definitions": [
                    {"definition": "An animal of the family Felidae.", "synonyms": []},
                    {"definition": "A person; a guy."}
                ]
            },
            {
                "partOfSpeech": "verb",
                "definitions": [{"definition": "To hoist the anchor."}]
            }
        ]
    }]"#;

    #[test]
    fn takes_the_first_definition() {
        assert_eq!(
            extract_definition(CAT).as_deref(),
            Some("An animal of the family Felidae.")
        );
    }

    #[test]
    fn not_found_responses_have_no_definition() {
        let body = r#"{"title":"No Definitions Found","message":"Sorry pal","resolution":"..."}"#;
        assert_eq!(extract_definition(body), None);
    }

    #[test]
    fn missing_or_empty_fields_have_no_definition() {
        assert_eq!(extract_definition("[]"), None);
        assert_eq!(extract_definition(r#"[{"word":"x"}]"#), None);
        assert_eq!(extract_definition(r#"[{"meanings":[]}]"#), None);
        assert_eq!(extract_definition(r#"[{"meanings":[{"definitions":[]}]}]"#), None);
        assert_eq!(extract_definition(r#"[{"meanings":[{"definitions":[{}]}]}]"#), None);
        assert_eq!(extract_definition(r#"[{"meanings":[{"definitions":[{"definition":7}]}]}]"#), None);
        assert_eq!(extract_definition("<html>oops</html>"), None);
    }

    #[test]
    fn only_the_first_definition_has_to_be_well_formed() {
        let odd_sibling = r#"[{"meanings":[{"definitions":[{"definition":"first"},{}]}]}]"#;
        assert_eq!(extract_definition(odd_sibling).as_deref(), Some("first"));

        let odd_entry = r#"[
            {"meanings":[{"definitions":[{"definition":"first"}]}]},
            {"word":"x","meanings":null}
        ]"#;
        assert_eq!(extract_definition(odd_entry).as_deref(), Some("first"));

        let odd_meaning = r#"[{"meanings":[
            {"definitions":[{"definition":"first"}]},
            {"definitions":"none"}
        ]}]"#;
        assert_eq!(extract_definition(odd_meaning).as_deref(), Some("first"));
    }

    #[test]
    fn words_are_appended_as_path_segments() {
        let client = DictionaryClient::new(DEFAULT_DICTIONARY_URL, None).unwrap();
        assert_eq!(
            client.url_for("cat").as_str(),
            "https://api.dictionaryapi.dev/api/v2/entries/en/cat"
        );
        assert_eq!(
            client.url_for("ice cream/cone").as_str(),
            "https://api.dictionaryapi.dev/api/v2/entries/en/ice%20cream%2Fcone"
        );

        let client = DictionaryClient::new("http://localhost:8080/define", None).unwrap();
        assert_eq!(client.url_for("cat").as_str(), "http://localhost:8080/define/cat");
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(DictionaryClient::new("not a url", None).is_err());
        assert!(DictionaryClient::new("mailto:someone@example.com", None).is_err());
    }

    #[test]
    fn unreachable_dictionary_gives_the_sentinel() {
        // nothing listens on the discard port
        let client =
            DictionaryClient::new("http://127.0.0.1:9/", Some(Duration::from_secs(2))).unwrap();
        assert_eq!(client.resolve("zzxyqq123"), DEFINITION_NOT_FOUND);
        assert_eq!(client.resolve(""), DEFINITION_NOT_FOUND);
    }

    #[test]
    fn resolves_in_order() {
        let source = |word: &str| {
            if word == "zzxyqq123" {
                DEFINITION_NOT_FOUND.to_string()
            } else {
                format!("meaning of {word}")
            }
        };
        let words = vec!["apple".to_string(), "zzxyqq123".to_string()];
        let cards = resolve_all(&words, &source);
        assert_eq!(
            cards,
            vec![
                Flashcard::new("apple", "meaning of apple"),
                Flashcard::new("zzxyqq123", DEFINITION_NOT_FOUND),
            ]
        );
    }
}

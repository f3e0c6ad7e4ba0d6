//! Validation of single-set exchange documents.
//!
//! Files and AI replies are parsed loosely as JSON values first so that a
//! card with a wrong field type only drops that card instead of rejecting the
//! whole document.

use serde_json::Value;

use crate::error::{FlashError, Result};
use crate::models::{ExchangeCard, ExchangeSet};

/// Parse and validate an exchange document.
///
/// The document needs a non-empty string `name` and a `cards` array. Cards
/// without text on both sides are dropped.
pub fn parse_exchange(json: &str) -> Result<ExchangeSet> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| FlashError::MalformedImport(format!("not valid JSON ({e})")))?;

    let name = match doc.get("name").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(FlashError::MalformedImport("missing \"name\"".to_string())),
    };
    let cards = doc
        .get("cards")
        .and_then(Value::as_array)
        .ok_or_else(|| FlashError::MalformedImport("\"cards\" must be an array".to_string()))?;

    Ok(ExchangeSet {
        name,
        cards: valid_cards(cards)?,
    })
}

/// Keep cards whose `question` and `answer` are both non-blank strings.
/// Fails with [`FlashError::NoValidCards`] when none survive.
pub fn valid_cards(cards: &[Value]) -> Result<Vec<ExchangeCard>> {
    let valid: Vec<ExchangeCard> = cards.iter().filter_map(as_card).collect();
    if valid.is_empty() {
        return Err(FlashError::NoValidCards);
    }
    Ok(valid)
}

fn as_card(value: &Value) -> Option<ExchangeCard> {
    let question = value.get("question")?.as_str()?;
    let answer = value.get("answer")?.as_str()?;
    if question.trim().is_empty() || answer.trim().is_empty() {
        return None;
    }
    Some(ExchangeCard::new(question, answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_document() {
        let set = parse_exchange(
            r#"{"name": "Capitals", "cards": [{"question": "France", "answer": "Paris"}]}"#,
        )
        .unwrap();
        assert_eq!(set.name, "Capitals");
        assert_eq!(set.cards, vec![ExchangeCard::new("France", "Paris")]);
    }

    #[test]
    fn test_invalid_cards_are_dropped() {
        let set = parse_exchange(
            r#"{"name": "n", "cards": [
                {"question": "q1", "answer": "a1"},
                {"question": "", "answer": "a2"},
                {"question": "q3", "answer": 3},
                {"question": "   ", "answer": "a4"},
                {"answer": "a5"},
                "not a card",
                {"question": "q6", "answer": "a6", "extra": true}
            ]}"#,
        )
        .unwrap();
        let questions: Vec<&str> = set.cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q6"]);
    }

    #[test]
    fn test_shape_errors_are_malformed() {
        for doc in [
            "not json at all",
            r#"{"cards": []}"#,
            r#"{"name": "", "cards": []}"#,
            r#"{"name": 5, "cards": []}"#,
            r#"{"name": "n"}"#,
            r#"{"name": "n", "cards": {}}"#,
            r#"[]"#,
        ] {
            assert!(
                matches!(parse_exchange(doc), Err(FlashError::MalformedImport(_))),
                "{doc}"
            );
        }
    }

    #[test]
    fn test_no_surviving_cards() {
        let err = parse_exchange(r#"{"name": "n", "cards": [{"question": "q"}]}"#).unwrap_err();
        assert_eq!(err, FlashError::NoValidCards);
        let err = parse_exchange(r#"{"name": "n", "cards": []}"#).unwrap_err();
        assert_eq!(err, FlashError::NoValidCards);
    }

    #[test]
    fn test_exported_set_parses_back() {
        let exported = ExchangeSet {
            name: "Verbs".to_string(),
            cards: vec![ExchangeCard::new("go", "йти")],
        };
        let json = serde_json::to_string_pretty(&exported).unwrap();
        assert_eq!(parse_exchange(&json).unwrap(), exported);
    }
}

//! Data models for flashcards and card sets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a card set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(pub u64);

/// Identifier of a card, unique within its owning set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SetId)
    }
}

impl FromStr for CardId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CardId)
    }
}

/// Hands out strictly increasing identifiers seeded from the wall clock.
///
/// Two calls within the same millisecond still get distinct values, so a batch
/// of imported cards never collides.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Make sure later ids are greater than `id`.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }

    pub fn next_set_id(&mut self) -> SetId {
        SetId(self.next_id())
    }

    pub fn next_card_id(&mut self) -> CardId {
        CardId(self.next_id())
    }
}

/// Which side of a card an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Question,
    Answer,
}

/// A single flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
}

impl Card {
    pub fn new(id: CardId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn blank(id: CardId) -> Self {
        Self::new(id, String::new(), String::new())
    }

    /// True when neither side has any text besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty() && self.answer.trim().is_empty()
    }

    pub fn set(&mut self, field: CardField, value: String) {
        match field {
            CardField::Question => self.question = value,
            CardField::Answer => self.answer = value,
        }
    }

    pub fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Question => &self.question,
            CardField::Answer => &self.answer,
        }
    }

    pub(crate) fn trimmed(&self) -> Self {
        Self::new(self.id, self.question.trim(), self.answer.trim())
    }

    fn matches(&self, needle: &str) -> bool {
        self.question.to_lowercase().contains(needle) || self.answer.to_lowercase().contains(needle)
    }
}

/// A named, ordered collection of flashcards with play history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: SetId,
    pub name: String,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub last_score: Option<u8>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_played_at: Option<DateTime<Utc>>,
}

impl CardSet {
    pub fn new(id: SetId, name: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            id,
            name: name.into(),
            cards,
            last_score: None,
            last_played_at: None,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Case-insensitive match on the name or any card's text.
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle) || self.cards.iter().any(|c| c.matches(needle))
    }

    pub(crate) fn max_card_id(&self) -> Option<u64> {
        self.cards.iter().map(|c| c.id.0).max()
    }

    pub fn to_exchange(&self) -> ExchangeSet {
        ExchangeSet {
            name: self.name.clone(),
            cards: self
                .cards
                .iter()
                .map(|c| ExchangeCard {
                    question: c.question.clone(),
                    answer: c.answer.clone(),
                })
                .collect(),
        }
    }
}

/// Question/answer pair as it appears in exported files and AI replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCard {
    pub question: String,
    pub answer: String,
}

impl ExchangeCard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Single-set transfer document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSet {
    pub name: String,
    pub cards: Vec<ExchangeCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_id_generator_observe_skips_past_existing() {
        let mut ids = IdGenerator::new();
        ids.observe(u64::MAX / 2);
        assert_eq!(ids.next_id(), u64::MAX / 2 + 1);
    }

    #[test]
    fn test_persisted_format_uses_camel_case_and_nulls() {
        let set = CardSet::new(SetId(7), "Verbs", vec![Card::new(CardId(1), "go", "йти")]);
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["cards"][0]["id"], 1);
        assert!(json["lastScore"].is_null());
        assert!(json["lastPlayedAt"].is_null());
    }

    #[test]
    fn test_last_played_at_round_trips_as_millis() {
        let raw = r#"{"id":1,"name":"n","cards":[],"lastScore":40,"lastPlayedAt":1700000000123}"#;
        let set: CardSet = serde_json::from_str(raw).unwrap();

        assert_eq!(set.last_score, Some(40));
        assert_eq!(set.last_played_at.unwrap().timestamp_millis(), 1_700_000_000_123);
        let back = serde_json::to_value(&set).unwrap();
        assert_eq!(back["lastPlayedAt"], 1_700_000_000_123i64);
    }

    #[test]
    fn test_missing_history_fields_default_to_none() {
        let raw = r#"{"id":1,"name":"n","cards":[{"id":2,"question":"q","answer":"a"}]}"#;
        let set: CardSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.last_score, None);
        assert_eq!(set.last_played_at, None);
    }

    #[test]
    fn test_blank_card_ignores_whitespace() {
        let mut card = Card::blank(CardId(1));
        card.set(CardField::Question, "   ".to_string());
        assert!(card.is_blank());
        card.set(CardField::Answer, "x".to_string());
        assert!(!card.is_blank());
        assert_eq!(card.get(CardField::Answer), "x");
    }
}

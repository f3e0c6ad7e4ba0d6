//! Draft editing of a single set before it is committed to the repository.

use chrono::{DateTime, Utc};

use crate::error::{FlashError, Result};
use crate::models::{Card, CardField, CardId, CardSet, IdGenerator, SetId};
use crate::repository::SetRepository;

/// Mutable working copy of a set. Not visible through the repository until
/// [`SetEditor::commit`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// `None` for a set that has never been committed.
    pub id: Option<SetId>,
    pub name: String,
    pub cards: Vec<Card>,
    pub last_score: Option<u8>,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl Draft {
    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }
}

impl From<CardSet> for Draft {
    fn from(set: CardSet) -> Self {
        Self {
            id: Some(set.id),
            name: set.name,
            cards: set.cards,
            last_score: set.last_score,
            last_played_at: set.last_played_at,
        }
    }
}

/// Holds at most one draft at a time.
#[derive(Debug, Default)]
pub struct SetEditor {
    draft: Option<Draft>,
    ids: IdGenerator,
}

impl SetEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Start a brand new set. Any uncommitted draft is dropped.
    pub fn begin_create(&mut self) -> &Draft {
        let card = Card::blank(self.ids.next_card_id());
        self.draft.insert(Draft {
            id: None,
            name: String::new(),
            cards: vec![card],
            last_score: None,
            last_played_at: None,
        })
    }

    /// Copy an existing set into the draft. Returns `None`, leaving no draft,
    /// when the set does not exist.
    pub fn begin_edit(&mut self, repo: &SetRepository, id: SetId) -> Option<&Draft> {
        let Some(set) = repo.get(id) else {
            self.draft = None;
            return None;
        };
        if let Some(max) = set.max_card_id() {
            self.ids.observe(max);
        }
        Some(&*self.draft.insert(Draft::from(set.clone())))
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(draft) = self.draft.as_mut() {
            draft.name = name.into();
        }
    }

    pub fn update_card(&mut self, card_id: CardId, field: CardField, value: impl Into<String>) {
        if let Some(card) = self.draft.as_mut().and_then(|d| d.card_mut(card_id)) {
            card.set(field, value.into());
        }
    }

    pub fn set_question(&mut self, card_id: CardId, value: impl Into<String>) {
        self.update_card(card_id, CardField::Question, value);
    }

    pub fn set_answer(&mut self, card_id: CardId, value: impl Into<String>) {
        self.update_card(card_id, CardField::Answer, value);
    }

    /// Append a blank card. Returns its id, or `None` without a draft.
    pub fn add_card(&mut self) -> Option<CardId> {
        let draft = self.draft.as_mut()?;
        let id = self.ids.next_card_id();
        draft.cards.push(Card::blank(id));
        Some(id)
    }

    /// Remove a card, unless it is the only one left.
    pub fn delete_card(&mut self, card_id: CardId) -> bool {
        match self.draft.as_mut() {
            Some(draft) if draft.cards.len() > 1 => {
                let before = draft.cards.len();
                draft.cards.retain(|c| c.id != card_id);
                draft.cards.len() != before
            }
            _ => false,
        }
    }

    /// Validate the draft and write it into the repository.
    ///
    /// Blank cards (no text on either side) are dropped. On failure neither
    /// the draft nor the repository is touched.
    pub fn commit<'r>(&mut self, repo: &'r mut SetRepository) -> Result<&'r CardSet> {
        let draft = self.draft.as_ref().ok_or(FlashError::NoDraft)?;

        let name = draft.name.trim();
        if name.is_empty() {
            return Err(FlashError::EmptyName);
        }

        let cards: Vec<Card> = draft
            .cards
            .iter()
            .filter(|c| !c.is_blank())
            .map(Card::trimmed)
            .collect();
        if cards.is_empty() {
            return Err(FlashError::NoValidCards);
        }

        let set = match draft.id {
            Some(id) => CardSet {
                id,
                name: name.to_string(),
                cards,
                last_score: draft.last_score,
                last_played_at: draft.last_played_at,
            },
            None => CardSet::new(repo.next_set_id(), name, cards),
        };

        self.draft = None;
        Ok(repo.upsert(set))
    }
}

//! In-memory collection of card sets.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use feruca::Collator;

use crate::models::{Card, CardId, CardSet, ExchangeCard, ExchangeSet, IdGenerator, SetId};

/// Example set installed when there is nothing saved yet.
const SEED_NAME: &str = "Англійські слова";
const SEED_CARDS: [(&str, &str); 3] = [("Hello", "Привіт"), ("World", "Світ"), ("Learn", "Вчити")];

/// Ordering applied by [`SetRepository::filter_and_sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Recent,
    NameAsc,
    NameDesc,
    CardsAsc,
    CardsDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::Newest,
        Self::Oldest,
        Self::Recent,
        Self::NameAsc,
        Self::NameDesc,
        Self::CardsAsc,
        Self::CardsDesc,
    ];

    /// Parse a sort key; anything unrecognized means `Newest`.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key.trim())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Recent => "recent",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::CardsAsc => "cards-asc",
            Self::CardsDesc => "cards-desc",
        }
    }

    fn compare(&self, collator: &mut Collator, a: &CardSet, b: &CardSet) -> Ordering {
        match self {
            Self::Newest => b.id.cmp(&a.id),
            Self::Oldest => a.id.cmp(&b.id),
            Self::Recent => played_desc(a, b).then_with(|| b.id.cmp(&a.id)),
            Self::NameAsc => locale_cmp(collator, &a.name, &b.name),
            Self::NameDesc => locale_cmp(collator, &b.name, &a.name),
            Self::CardsAsc => a.cards.len().cmp(&b.cards.len()),
            Self::CardsDesc => b.cards.len().cmp(&a.cards.len()),
        }
    }
}

/// Most recently played first; never-played sets go last.
fn played_desc(a: &CardSet, b: &CardSet) -> Ordering {
    match (a.last_played_at, b.last_played_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Unicode collation (CLDR root order), exact text only to break ties.
fn locale_cmp(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Owns the canonical ordered list of sets for one application run.
#[derive(Debug, Default)]
pub struct SetRepository {
    sets: Vec<CardSet>,
    ids: IdGenerator,
}

impl SetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt previously saved sets, or install the example set when there are none.
    pub fn initialize(&mut self, loaded: Option<Vec<CardSet>>) -> &[CardSet] {
        match loaded {
            Some(sets) if !sets.is_empty() => {
                for set in &sets {
                    self.ids.observe(set.id.0);
                }
                self.sets = sets;
            }
            _ => {
                let seed = self.seed_set();
                self.sets = vec![seed];
            }
        }
        &self.sets
    }

    fn seed_set(&mut self) -> CardSet {
        let cards = SEED_CARDS
            .iter()
            .zip(1..)
            .map(|(&(q, a), id)| Card::new(CardId(id), q, a))
            .collect();
        CardSet::new(self.ids.next_set_id(), SEED_NAME, cards)
    }

    pub fn all(&self) -> &[CardSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, id: SetId) -> Option<&CardSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: SetId) -> Option<&mut CardSet> {
        self.sets.iter_mut().find(|s| s.id == id)
    }

    /// Remove a set. Returns whether anything was removed.
    pub fn delete(&mut self, id: SetId) -> bool {
        let before = self.sets.len();
        self.sets.retain(|s| s.id != id);
        self.sets.len() != before
    }

    /// Derived view: sets matching `query`, stably sorted by `sort`.
    pub fn filter_and_sort(&self, query: &str, sort: SortKey) -> Vec<&CardSet> {
        let needle = query.trim().to_lowercase();
        let mut view: Vec<&CardSet> = self.sets.iter().filter(|s| s.matches(&needle)).collect();
        let mut collator = Collator::default();
        view.sort_by(|a, b| sort.compare(&mut collator, a, b));
        view
    }

    /// Add a set read from an exchange file.
    pub fn add_imported(&mut self, data: ExchangeSet) -> &CardSet {
        self.add_from_pairs(&data.name, data.cards)
    }

    /// Add a set produced by card generation.
    pub fn add_generated(&mut self, name: &str, cards: Vec<ExchangeCard>) -> &CardSet {
        self.add_from_pairs(name, cards)
    }

    fn add_from_pairs(&mut self, name: &str, cards: Vec<ExchangeCard>) -> &CardSet {
        let cards = cards
            .iter()
            .map(|c| Card::new(self.ids.next_card_id(), c.question.trim(), c.answer.trim()))
            .collect();
        let set = CardSet::new(self.ids.next_set_id(), name.trim(), cards);
        self.push(set)
    }

    fn push(&mut self, set: CardSet) -> &CardSet {
        self.sets.push(set);
        let last = self.sets.len() - 1;
        &self.sets[last]
    }

    pub(crate) fn next_set_id(&mut self) -> SetId {
        self.ids.next_set_id()
    }

    /// Replace the set with the same id, or append it when there is none.
    pub(crate) fn upsert(&mut self, set: CardSet) -> &CardSet {
        self.ids.observe(set.id.0);
        match self.sets.iter().position(|s| s.id == set.id) {
            Some(i) => {
                self.sets[i] = set;
                &self.sets[i]
            }
            None => self.push(set),
        }
    }

    pub(crate) fn record_score(&mut self, id: SetId, score: u8) -> bool {
        match self.get_mut(id) {
            Some(set) => {
                set.last_score = Some(score);
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_played(&mut self, id: SetId, at: DateTime<Utc>) -> bool {
        match self.get_mut(id) {
            Some(set) => {
                set.last_played_at = Some(at);
                true
            }
            None => false,
        }
    }
}

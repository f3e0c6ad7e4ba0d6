//! Self-graded study session over one set's cards.
//!
//! A session walks the cards in order. For each card the learner either
//! marks it known (counts toward the score and moves on) or asks to see the
//! answer, then moves on without credit. After the last card the session is
//! finished and the score is written back to the set.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};

use crate::models::{Card, SetId};
use crate::repository::SetRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active { index: usize, show_answer: bool },
    Finished { final_score: u8 },
}

/// Result of a single learner action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still going.
    Continue,
    /// This action completed the session; the score is already on the set.
    Finished { final_score: u8 },
    /// The action is not valid in the current state.
    Ignored,
}

/// What happened to a session when it was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Ran to the end; the score write-back already happened.
    Completed,
    /// Left before the last card; no score was recorded.
    Abandoned,
}

impl ExitOutcome {
    pub fn completed_naturally(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone)]
pub struct StudySession {
    set_id: SetId,
    cards: Vec<Card>,
    len: NonZeroUsize,
    correct_count: usize,
    state: SessionState,
}

impl StudySession {
    /// Begin studying a set. `None` if the set is missing or has no cards.
    ///
    /// Stamps the set's `last_played_at` with `now`.
    pub fn start(repo: &mut SetRepository, set_id: SetId, now: DateTime<Utc>) -> Option<Self> {
        let cards = repo.get(set_id)?.cards.clone();
        let len = NonZeroUsize::new(cards.len())?;
        repo.mark_played(set_id, now);

        Some(Self {
            set_id,
            cards,
            len,
            correct_count: 0,
            state: SessionState::Active {
                index: 0,
                show_answer: false,
            },
        })
    }

    /// Start over on the same set, picking up any edits made since.
    pub fn restart(&self, repo: &mut SetRepository, now: DateTime<Utc>) -> Option<Self> {
        Self::start(repo, self.set_id, now)
    }

    pub fn set_id(&self) -> SetId {
        self.set_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total(&self) -> usize {
        self.len.get()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished { .. })
    }

    pub fn final_score(&self) -> Option<u8> {
        match self.state {
            SessionState::Finished { final_score } => Some(final_score),
            SessionState::Active { .. } => None,
        }
    }

    /// The card being asked, while the session is active.
    pub fn current_card(&self) -> Option<&Card> {
        match self.state {
            SessionState::Active { index, .. } => self.cards.get(index),
            SessionState::Finished { .. } => None,
        }
    }

    /// Number of cards already answered.
    pub fn position(&self) -> usize {
        match self.state {
            SessionState::Active { index, .. } => index,
            SessionState::Finished { .. } => self.len.get(),
        }
    }

    pub fn mark_known(&mut self, repo: &mut SetRepository) -> Step {
        match self.state {
            SessionState::Active { index, .. } => {
                self.correct_count += 1;
                self.move_to(index + 1, repo)
            }
            SessionState::Finished { .. } => Step::Ignored,
        }
    }

    /// Reveal the answer. Does not move on or change the count.
    pub fn mark_unknown(&mut self) -> Step {
        match self.state {
            SessionState::Active {
                index,
                show_answer: false,
            } => {
                self.state = SessionState::Active {
                    index,
                    show_answer: true,
                };
                Step::Continue
            }
            _ => Step::Ignored,
        }
    }

    /// Move past a card whose answer has been revealed.
    pub fn advance(&mut self, repo: &mut SetRepository) -> Step {
        match self.state {
            SessionState::Active {
                index,
                show_answer: true,
            } => self.move_to(index + 1, repo),
            _ => Step::Ignored,
        }
    }

    /// Leave the session.
    pub fn exit(self) -> ExitOutcome {
        if self.is_finished() {
            ExitOutcome::Completed
        } else {
            ExitOutcome::Abandoned
        }
    }

    fn move_to(&mut self, index: usize, repo: &mut SetRepository) -> Step {
        if index < self.len.get() {
            self.state = SessionState::Active {
                index,
                show_answer: false,
            };
            return Step::Continue;
        }

        let final_score = percent(self.correct_count, self.len);
        repo.record_score(self.set_id, final_score);
        self.state = SessionState::Finished { final_score };
        Step::Finished { final_score }
    }
}

/// `correct / total * 100`, rounded half up on the exact fraction.
fn percent(correct: usize, total: NonZeroUsize) -> u8 {
    let total = total.get();
    let correct = correct.min(total);
    let rounded = (correct * 200 + total) / (2 * total);
    // correct <= total, so this is at most 100.
    rounded as u8
}

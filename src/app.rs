//! Command-line controller: owns the repository and editor, runs sessions,
//! and saves through the storage gateway after every change.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;

use flashmind::{
    AiClient, CardId, CardSet, Config, ExitOutcome, GenerationRequest, SessionState, SetEditor,
    SetId, SetRepository, SetStorage, SortKey, Step, StudySession,
};

use crate::display;

pub struct App {
    pub config: Config,
    storage: SetStorage,
    repo: SetRepository,
    editor: SetEditor,
}

impl App {
    pub fn new(storage: SetStorage, config: Config) -> Result<Self> {
        let loaded = storage.load()?;
        let first_run = loaded.as_ref().map_or(true, Vec::is_empty);

        let mut repo = SetRepository::new();
        repo.initialize(loaded);

        let app = Self {
            config,
            storage,
            repo,
            editor: SetEditor::new(),
        };
        if first_run {
            log::info!("No saved sets, installing the example set");
            app.save()?;
        }
        Ok(app)
    }

    pub fn repo(&self) -> &SetRepository {
        &self.repo
    }

    fn save(&self) -> Result<()> {
        self.storage.save(self.repo.all())?;
        Ok(())
    }

    fn find(&self, id: SetId) -> Result<&CardSet> {
        self.repo
            .get(id)
            .with_context(|| format!("No set with id {}", id))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Browsing
    // ══════════════════════════════════════════════════════════════════════

    pub fn list(&self, out: &mut impl Write, query: &str, sort: SortKey) -> Result<()> {
        let view = self.repo.filter_and_sort(query, sort);
        if view.is_empty() {
            writeln!(out, "No sets match '{}'", query.trim())?;
            return Ok(());
        }

        writeln!(out, "{}", display::list_header())?;
        for set in view {
            writeln!(out, "{}", display::set_row(set))?;
        }
        Ok(())
    }

    pub fn show(&self, out: &mut impl Write, id: SetId) -> Result<()> {
        let set = self.find(id)?;
        writeln!(out, "{}", set.name)?;
        writeln!(
            out,
            "{} cards, last score {}, played {}",
            set.cards.len(),
            display::score_label(set).trim(),
            display::played_label(set)
        )?;
        for card in &set.cards {
            writeln!(out, "\n#{}", card.id)?;
            writeln!(out, "{}", display::wrapped(&format!("Q: {}", card.question), "  "))?;
            writeln!(out, "{}", display::wrapped(&format!("A: {}", card.answer), "  "))?;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Editing
    // ══════════════════════════════════════════════════════════════════════

    pub fn create(&mut self, name: &str, cards: &[(String, String)]) -> Result<SetId> {
        let first = self.editor.begin_create().cards[0].id;
        self.editor.set_name(name);

        let mut slots = vec![first];
        for _ in 1..cards.len() {
            slots.extend(self.editor.add_card());
        }
        for (id, (question, answer)) in slots.into_iter().zip(cards) {
            self.editor.set_question(id, question.as_str());
            self.editor.set_answer(id, answer.as_str());
        }

        self.commit()
    }

    pub fn rename(&mut self, id: SetId, name: &str) -> Result<()> {
        self.edit(id, |editor| {
            editor.set_name(name);
            Ok(())
        })
    }

    pub fn add_card(&mut self, id: SetId, question: &str, answer: &str) -> Result<CardId> {
        if question.trim().is_empty() && answer.trim().is_empty() {
            bail!("A card needs a question or an answer");
        }
        let mut added = None;
        self.edit(id, |editor| {
            let card = editor.add_card().context("No set is being edited")?;
            editor.set_question(card, question);
            editor.set_answer(card, answer);
            added = Some(card);
            Ok(())
        })?;
        added.context("Card was not added")
    }

    pub fn edit_card(
        &mut self,
        id: SetId,
        card: CardId,
        question: Option<&str>,
        answer: Option<&str>,
    ) -> Result<()> {
        self.edit(id, |editor| {
            ensure_card(editor, id, card)?;
            if let Some(question) = question {
                editor.set_question(card, question);
            }
            if let Some(answer) = answer {
                editor.set_answer(card, answer);
            }
            let blank = editor
                .draft()
                .and_then(|d| d.cards.iter().find(|c| c.id == card))
                .map_or(true, |c| c.is_blank());
            if blank {
                bail!("Card {} would have neither a question nor an answer", card);
            }
            Ok(())
        })
    }

    pub fn remove_card(&mut self, id: SetId, card: CardId) -> Result<()> {
        self.edit(id, |editor| {
            ensure_card(editor, id, card)?;
            if !editor.delete_card(card) {
                bail!("A set needs at least one card");
            }
            Ok(())
        })
    }

    /// Load a set into the editor, apply `change`, commit and save.
    fn edit<F>(&mut self, id: SetId, change: F) -> Result<()>
    where
        F: FnOnce(&mut SetEditor) -> Result<()>,
    {
        if self.editor.begin_edit(&self.repo, id).is_none() {
            bail!("No set with id {}", id);
        }
        if let Err(e) = change(&mut self.editor) {
            self.editor.cancel();
            return Err(e);
        }
        self.commit().map(|_| ())
    }

    fn commit(&mut self) -> Result<SetId> {
        let result = self.editor.commit(&mut self.repo).map(|set| set.id);
        let id = match result {
            Ok(id) => id,
            Err(e) => {
                self.editor.cancel();
                return Err(e).context("Set was not saved");
            }
        };
        self.save()?;
        Ok(id)
    }

    pub fn delete(&mut self, id: SetId) -> Result<bool> {
        let removed = self.repo.delete(id);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Exchange
    // ══════════════════════════════════════════════════════════════════════

    pub fn export(&self, id: SetId, dir: &Path) -> Result<PathBuf> {
        self.storage.export_set(self.find(id)?, dir)
    }

    pub fn import(&mut self, path: &Path) -> Result<SetId> {
        let data = self.storage.import_set(path)?;
        let id = self.repo.add_imported(data).id;
        self.save()?;
        Ok(id)
    }

    pub fn generate(&mut self, request: &GenerationRequest) -> Result<SetId> {
        let client = AiClient::new(self.config.ai.clone())?;
        let cards = client.generate(request)?;
        let id = self.repo.add_generated(&request.topic, cards).id;
        self.save()?;
        Ok(id)
    }

    pub fn set_name(&self, id: SetId) -> Option<&str> {
        self.repo.get(id).map(|s| s.name.as_str())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Study
    // ══════════════════════════════════════════════════════════════════════

    /// Interactive quiz over `id`, reading one command per line.
    pub fn study(&mut self, id: SetId, mut input: impl BufRead, out: &mut impl Write) -> Result<()> {
        let Some(mut session) = StudySession::start(&mut self.repo, id, Utc::now()) else {
            bail!("No set with id {} that has cards to study", id);
        };
        self.save()?;
        writeln!(out, "Studying '{}' ({} cards)", self.find(id)?.name, session.total())?;

        loop {
            match session.state() {
                SessionState::Active {
                    index,
                    show_answer: false,
                } => {
                    let card = &session.cards()[index];
                    writeln!(out, "\n[{}/{}]", index + 1, session.total())?;
                    writeln!(out, "{}", display::wrapped(&card.question, "  "))?;
                    write!(out, "[k]now  [d]on't know  [q]uit > ")?;
                    out.flush()?;

                    let step = match read_command(&mut input)?.as_deref() {
                        Some("k") => session.mark_known(&mut self.repo),
                        Some("d") => session.mark_unknown(),
                        Some("q") | None => break,
                        Some(_) => Step::Ignored,
                    };
                    self.after_step(step)?;
                }
                SessionState::Active {
                    index,
                    show_answer: true,
                } => {
                    let card = &session.cards()[index];
                    writeln!(out, "{}", display::wrapped(&card.answer, "  = "))?;
                    write!(out, "[n]ext  [q]uit > ")?;
                    out.flush()?;

                    let step = match read_command(&mut input)?.as_deref() {
                        Some("n") | Some("") => session.advance(&mut self.repo),
                        Some("k") => session.mark_known(&mut self.repo),
                        Some("q") | None => break,
                        Some(_) => Step::Ignored,
                    };
                    self.after_step(step)?;
                }
                SessionState::Finished { final_score } => {
                    writeln!(
                        out,
                        "\nDone: {} of {} known, score {}%",
                        session.correct_count(),
                        session.total(),
                        final_score
                    )?;
                    write!(out, "[r]estart  [q]uit > ")?;
                    out.flush()?;

                    if read_command(&mut input)?.as_deref() != Some("r") {
                        break;
                    }
                    match session.restart(&mut self.repo, Utc::now()) {
                        Some(next) => {
                            self.save()?;
                            session = next;
                        }
                        None => break,
                    }
                }
            }
        }

        match session.exit() {
            ExitOutcome::Completed => log::debug!("Session on {} completed", id),
            ExitOutcome::Abandoned => writeln!(out, "\nLeft early, no score recorded")?,
        }
        Ok(())
    }

    fn after_step(&self, step: Step) -> Result<()> {
        if let Step::Finished { final_score } = step {
            log::debug!("Recording score {}", final_score);
            self.save()?;
        }
        Ok(())
    }
}

fn ensure_card(editor: &SetEditor, id: SetId, card: CardId) -> Result<()> {
    let present = editor
        .draft()
        .map_or(false, |d| d.cards.iter().any(|c| c.id == card));
    if !present {
        bail!("Set {} has no card {}", id, card);
    }
    Ok(())
}

/// Next trimmed, lowercased input line. `None` at end of input.
fn read_command(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

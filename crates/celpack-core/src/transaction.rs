//! Scoped, all-or-nothing edits of a [`Sprite`] with whole-step undo/redo.
//!
//! A [`Transaction`] takes exclusive access to the sprite and snapshots its content.
//! Committing records the snapshot as a single history step; dropping an uncommitted
//! transaction puts the snapshot back.

use crate::config::ColorMode;
use crate::error::Result;
use crate::model::{Layer, Palette, Sprite};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Sprite content captured before an edit.
#[derive(Debug, Clone)]
struct Snapshot {
    width: u32,
    height: u32,
    color_mode: ColorMode,
    transparent_index: u8,
    palettes: Vec<Palette>,
    layers: Vec<Layer>,
    frames: u32,
}

impl Snapshot {
    fn capture(sprite: &Sprite) -> Self {
        Self {
            width: sprite.width,
            height: sprite.height,
            color_mode: sprite.color_mode,
            transparent_index: sprite.transparent_index,
            palettes: sprite.palettes.clone(),
            layers: sprite.layers.clone(),
            frames: sprite.frames,
        }
    }

    /// Writes the snapshot into `sprite` and returns what was there before.
    fn swap_into(self, sprite: &mut Sprite) -> Snapshot {
        let current = Snapshot::capture(sprite);
        sprite.width = self.width;
        sprite.height = self.height;
        sprite.color_mode = self.color_mode;
        sprite.transparent_index = self.transparent_index;
        sprite.palettes = self.palettes;
        sprite.layers = self.layers;
        sprite.frames = self.frames;
        current
    }
}

#[derive(Debug, Clone)]
struct Step {
    label: String,
    state: Snapshot,
}

/// Undo and redo stacks of a sprite.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Step>,
    redo: Vec<Step>,
}

impl History {
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Labels of undoable steps, oldest first.
    pub fn undo_labels(&self) -> impl Iterator<Item = &str> {
        self.undo.iter().map(|s| s.label.as_str())
    }
}

/// Exclusive scoped mutation of a sprite. Derefs to the sprite being edited.
pub struct Transaction<'a> {
    sprite: &'a mut Sprite,
    label: String,
    before: Option<Snapshot>,
}

impl Transaction<'_> {
    /// Records the edit as one undo step and marks the sprite modified.
    pub fn commit(mut self) {
        if let Some(before) = self.before.take() {
            debug!(label = %self.label, "commit transaction");
            self.sprite.history.undo.push(Step {
                label: std::mem::take(&mut self.label),
                state: before,
            });
            self.sprite.history.redo.clear();
            self.sprite.modified = true;
        }
    }

    /// Restores the sprite to its state when the transaction began.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(before) = self.before.take() {
            debug!(label = %self.label, "roll back transaction");
            before.swap_into(self.sprite);
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Sprite;
    fn deref(&self) -> &Sprite {
        self.sprite
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Sprite {
        self.sprite
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

impl Sprite {
    /// Starts a transaction. Edits through the returned guard are undone unless it is committed.
    pub fn transaction(&mut self, label: impl Into<String>) -> Transaction<'_> {
        let before = Snapshot::capture(self);
        Transaction {
            sprite: self,
            label: label.into(),
            before: Some(before),
        }
    }

    /// Runs `edit` inside a transaction: commits on `Ok`, rolls back on `Err`.
    pub fn apply<T>(
        &mut self,
        label: impl Into<String>,
        edit: impl FnOnce(&mut Sprite) -> Result<T>,
    ) -> Result<T> {
        let mut tx = self.transaction(label);
        match edit(&mut *tx) {
            Ok(v) => {
                tx.commit();
                Ok(v)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Reverts the most recent step. Returns its label, or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        let step = self.history.undo.pop()?;
        let after = step.state.swap_into(self);
        self.modified = true;
        self.history.redo.push(Step {
            label: step.label.clone(),
            state: after,
        });
        Some(step.label)
    }

    /// Re-applies the most recently undone step.
    pub fn redo(&mut self) -> Option<String> {
        let step = self.history.redo.pop()?;
        let before = step.state.swap_into(self);
        self.modified = true;
        self.history.undo.push(Step {
            label: step.label.clone(),
            state: before,
        });
        Some(step.label)
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

//! Lead-source selection state, owned by the caller and kept across renders.

use crate::types::LeadSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    available: Vec<LeadSource>,
    selected:  BTreeSet<LeadSource>,
}

impl SelectionState {
    /// Every available source starts selected.
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LeadSource>,
    {
        let mut available: Vec<LeadSource> = available.into_iter().map(Into::into).collect();
        available.sort();
        available.dedup();
        let selected = available.iter().cloned().collect();
        Self { available, selected }
    }

    pub fn available(&self) -> &[LeadSource] {
        &self.available
    }

    /// Selected sources in available order.
    pub fn selected(&self) -> Vec<LeadSource> {
        self.available
            .iter()
            .filter(|s| self.selected.contains(*s))
            .cloned()
            .collect()
    }

    pub fn is_selected(&self, source: &str) -> bool {
        self.selected.contains(source)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn select_all(&mut self) {
        self.selected = self.available.iter().cloned().collect();
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// Flip one source. Returns its new state; unknown sources stay unselected.
    pub fn toggle(&mut self, source: &str) -> bool {
        if !self.is_available(source) {
            log::warn!("ignoring toggle of unknown lead source '{source}'");
            return false;
        }
        if !self.selected.remove(source) {
            self.selected.insert(source.to_string());
        }
        self.is_selected(source)
    }

    /// Replace the selection. Unknown sources are dropped.
    pub fn set<I, S>(&mut self, sources: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected.clear();
        for s in sources {
            let s = s.as_ref();
            if self.is_available(s) {
                self.selected.insert(s.to_string());
            } else {
                log::warn!("ignoring unknown lead source '{s}'");
            }
        }
    }

    /// Swap in a new list of available sources, keeping whatever part of
    /// the current selection still exists. An empty selection stays empty.
    /// If none of the previously selected sources survive, everything in the
    /// new list is selected.
    pub fn rebase<I, S>(&mut self, available: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<LeadSource>,
    {
        let previous = std::mem::take(&mut self.selected);
        *self = Self::new(available);
        if previous.is_empty() {
            self.selected.clear();
            return;
        }
        self.selected.retain(|s| previous.contains(s));
        if self.selected.is_empty() {
            self.select_all();
        }
    }

    fn is_available(&self, source: &str) -> bool {
        self.available.binary_search_by(|a| a.as_str().cmp(source)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_everything_selected() {
        let state = SelectionState::new(["Roku", "Google"]);
        assert_eq!(state.selected(), vec!["Google".to_string(), "Roku".to_string()]);
    }

    #[test]
    fn clear_then_select_all() {
        let mut state = SelectionState::new(["Roku", "Google"]);
        state.clear_all();
        assert!(state.is_empty());
        state.select_all();
        assert_eq!(state.selected().len(), 2);
    }

    #[test]
    fn toggle_and_set_ignore_unknown_sources() {
        let mut state = SelectionState::new(["Roku", "Google"]);
        assert!(!state.toggle("Roku"));
        assert!(state.toggle("Roku"));
        assert!(!state.toggle("Bogus"));
        state.set(["Google", "Bogus"]);
        assert_eq!(state.selected(), vec!["Google".to_string()]);
    }

    #[test]
    fn rebase_keeps_surviving_selection() {
        let mut state = SelectionState::new(["Roku", "Google", "VOXR"]);
        state.set(["Roku", "VOXR"]);
        state.rebase(["Roku", "Google", "Regal"]);
        assert_eq!(state.selected(), vec!["Roku".to_string()]);
        assert_eq!(state.available().len(), 3);
    }

    #[test]
    fn rebase_keeps_cleared_selection_empty() {
        let mut state = SelectionState::new(["Roku", "Google"]);
        state.clear_all();
        state.rebase(["Roku", "Google", "Regal"]);
        assert!(state.is_empty());
        assert_eq!(state.available().len(), 3);
    }

    #[test]
    fn rebase_selects_all_when_no_pick_survives() {
        let mut state = SelectionState::new(["Roku", "Google"]);
        state.set(["Roku"]);
        state.rebase(["Regal", "VOXR"]);
        assert_eq!(state.selected(), vec!["Regal".to_string(), "VOXR".to_string()]);
    }
}

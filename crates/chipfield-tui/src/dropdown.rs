use chipfield_core::{LookupResult, Suggestion};

/// Suggestion dropdown under the input. Arrows or Tab select, Enter accepts.
#[derive(Debug, Clone, Default)]
pub struct Dropdown {
    pub items: Vec<LookupResult<Suggestion>>,
    /// Index into `items` currently highlighted.
    pub selected: Option<usize>,
    /// Whether the dropdown is shown.
    pub active: bool,
}

impl Dropdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items and highlight the first one.
    pub fn set_items(&mut self, items: Vec<LookupResult<Suggestion>>) {
        self.items = items;
        self.active = !self.items.is_empty();
        self.selected = if self.active { Some(0) } else { None };
    }

    /// Move selection down (wraps).
    pub fn move_down(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(match self.selected {
                Some(i) => (i + 1) % self.items.len(),
                None => 0,
            });
        }
    }

    /// Move selection up (wraps).
    pub fn move_up(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(match self.selected {
                Some(0) | None => self.items.len() - 1,
                Some(i) => i - 1,
            });
        }
    }

    pub fn current(&self) -> Option<&LookupResult<Suggestion>> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str) -> LookupResult<Suggestion> {
        LookupResult {
            data: Suggestion::new(id, id),
            formatted: id.to_string(),
            score: 0,
            match_indices: vec![],
        }
    }

    #[test]
    fn test_selection_wraps() {
        let mut dd = Dropdown::new();
        dd.set_items(vec![hit("a"), hit("b"), hit("c")]);
        assert_eq!(dd.selected, Some(0));

        dd.move_up();
        assert_eq!(dd.current().map(|r| r.formatted.as_str()), Some("c"));
        dd.move_down();
        assert_eq!(dd.selected, Some(0));
        dd.move_down();
        assert_eq!(dd.current().map(|r| r.formatted.as_str()), Some("b"));
    }

    #[test]
    fn test_empty_items_deactivate() {
        let mut dd = Dropdown::new();
        dd.set_items(vec![hit("a")]);
        assert!(dd.active);

        dd.set_items(vec![]);
        assert!(!dd.active);
        assert!(dd.current().is_none());
        dd.move_down();
        assert!(dd.selected.is_none());
    }
}

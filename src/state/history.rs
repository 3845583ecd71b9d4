use crate::element::DesignElement;

/// Linear undo log of full element snapshots.
///
/// `index` always points at the entry currently displayed. Committing after
/// an undo drops every entry past the index, so there is no redo.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<DesignElement>>,
    index: usize,
}

impl History {
    /// Starts a log whose first entry is `initial`.
    pub fn new(initial: Vec<DesignElement>) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Appends a snapshot, discarding entries after the current index.
    pub fn commit(&mut self, snapshot: Vec<DesignElement>) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;
    }

    /// Steps back one entry and returns it; `None` at the first entry.
    pub fn undo(&mut self) -> Option<&[DesignElement]> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    pub fn current(&self) -> &[DesignElement] {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut history = History::new(Vec::new());
        history.commit(Vec::new());
        history.commit(Vec::new());
        assert_eq!(history.index(), 2);

        assert!(history.undo().is_some());
        assert!(history.undo().is_some());
        assert_eq!(history.index(), 0);
        assert!(history.undo().is_none());

        history.commit(Vec::new());
        assert_eq!(history.index(), 1);
        assert_eq!(history.len(), 2);
    }
}

/// Indices the user navigated away from, most recent last.
///
/// Plain LIFO: unbounded, no dedup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Vec<usize>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize) {
        self.entries.push(index);
    }

    /// `None` means "no history", never an error.
    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut history = HistoryStack::new();
        history.push(0);
        history.push(4);
        history.push(2);
        assert_eq!(history.as_slice(), &[0, 4, 2]);
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.pop(), Some(4));
        assert_eq!(history.pop(), Some(0));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut history = HistoryStack::new();
        history.push(3);
        history.push(3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice(), &[3, 3]);
    }

    #[test]
    fn pop_on_empty() {
        let mut history = HistoryStack::new();
        assert!(history.is_empty());
        assert_eq!(history.pop(), None);
        assert!(history.is_empty());
    }
}

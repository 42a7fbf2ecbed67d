//! The crawl frontier: a LIFO work list of URLs waiting to be visited

use url::Url;

/// A URL queued for visiting, with its link distance from the homepage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Stack of pending work
///
/// The most recently pushed item is popped first, which makes the crawl
/// depth-first. Nothing is de-duplicated here; the crawler checks its visited
/// set when an entry is popped.
#[derive(Debug, Clone)]
pub struct Frontier<T = FrontierEntry> {
    entries: Vec<T>,
}

impl<T> Default for Frontier<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Frontier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Pushes every item in sequence order; the last item is popped first
    pub fn push_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.entries.extend(entries);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_push_pops_last_first() {
        let mut frontier = Frontier::new();
        frontier.push_all(["u1", "u2", "u3"]);
        assert_eq!(frontier.pop(), Some("u3"));
        assert_eq!(frontier.pop(), Some("u2"));
        assert_eq!(frontier.pop(), Some("u1"));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_push_then_batch() {
        let mut frontier = Frontier::new();
        frontier.push("home");
        frontier.push_all(vec!["a", "b"]);
        frontier.push("c");
        let order: Vec<_> = std::iter::from_fn(|| frontier.pop()).collect();
        assert_eq!(order, vec!["c", "b", "a", "home"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut frontier = Frontier::new();
        frontier.push_all(["u1", "u1"]);
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_is_empty() {
        let mut frontier: Frontier<FrontierEntry> = Frontier::new();
        assert!(frontier.is_empty());

        frontier.push(FrontierEntry::new(Url::parse("http://a.com/").unwrap(), 0));
        assert!(!frontier.is_empty());

        frontier.pop();
        assert!(frontier.is_empty());
    }
}

//! Crawl frontier: discovered/visited bookkeeping.
//!
//! The frontier is an explicit value owned by the crawl runner (not
//! ambient spider state) so the at-most-once-fetch invariant is
//! independently testable. All mutation happens under the runner's single
//! lock.

use std::collections::{HashSet, VecDeque};

/// What to do with a fetched page.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// A listing page carrying cards; page number is ordinal + 1.
    Listing { page_number: u32 },
    /// A detail page for one missile, with the card context it came from.
    Detail {
        missile_name: String,
        index_page_url: String,
        page_number: u32,
    },
}

/// One unit of fetch work.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub url: String,
    pub kind: TaskKind,
}

impl Task {
    pub fn listing(url: impl Into<String>, page_number: u32) -> Self {
        Self {
            url: url.into(),
            kind: TaskKind::Listing { page_number },
        }
    }

    pub fn detail(
        url: impl Into<String>,
        missile_name: impl Into<String>,
        index_page_url: impl Into<String>,
        page_number: u32,
    ) -> Self {
        Self {
            url: url.into(),
            kind: TaskKind::Detail {
                missile_name: missile_name.into(),
                index_page_url: index_page_url.into(),
                page_number,
            },
        }
    }
}

/// Tracks which locators are known and which have been fetched.
#[derive(Debug, Default)]
pub struct Frontier {
    discovered: HashSet<String>,
    visited: HashSet<String>,
    queue: VecDeque<Task>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a locator for fetching.
    ///
    /// No-op (returns false) if the locator was already discovered or
    /// visited, no matter how many extraction paths rediscover it.
    pub fn admit(&mut self, task: Task) -> bool {
        if self.visited.contains(&task.url) || !self.discovered.insert(task.url.clone()) {
            return false;
        }
        self.queue.push_back(task);
        true
    }

    /// Move a locator from discovered bookkeeping to visited. Idempotent.
    pub fn mark_visited(&mut self, url: &str) {
        self.discovered.remove(url);
        self.visited.insert(url.to_string());
    }

    /// Take the next scheduled task, if any.
    pub fn next(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Drain every currently scheduled task.
    pub fn drain(&mut self) -> Vec<Task> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admitting_twice_schedules_once() {
        let mut frontier = Frontier::new();
        assert!(frontier.admit(Task::listing("https://missilery.info/search?page=1", 2)));
        assert!(!frontier.admit(Task::listing("https://missilery.info/search?page=1", 2)));
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn visited_locators_are_not_readmitted() {
        let mut frontier = Frontier::new();
        let url = "https://missilery.info/missile/topol";
        assert!(frontier.admit(Task::detail(url, "Тополь", "i", 1)));
        frontier.next().unwrap();
        frontier.mark_visited(url);
        // Rediscovered from another listing context
        assert!(!frontier.admit(Task::detail(url, "Тополь", "j", 2)));
        assert_eq!(frontier.pending(), 0);
    }

    #[test]
    fn mark_visited_is_idempotent() {
        let mut frontier = Frontier::new();
        frontier.mark_visited("a");
        frontier.mark_visited("a");
        assert_eq!(frontier.visited_count(), 1);
    }
}

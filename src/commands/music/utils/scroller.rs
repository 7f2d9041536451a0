//! Page navigation state for the player message.

use std::time::Duration;
use tokio::time::Instant;

use super::pagination::Pagination;

/// A navigation request from one of the scroll buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    First,
    Prev,
    Home,
    Next,
    Last,
}

/// Holds the current pages and which one is shown.
///
/// The index always stays inside `[0, page_count - 1]`; scrolling past an
/// edge does nothing. After the idle timeout the scroller stops accepting
/// input until it is re-armed.
#[derive(Debug, Clone)]
pub struct PageScroller {
    pages: Vec<String>,
    home_page_index: usize,
    current_page_index: usize,
    idle_timeout: Duration,
    last_interaction: Instant,
    disabled: bool,
}

impl PageScroller {
    pub fn new(idle_timeout: Duration, now: Instant) -> Self {
        Self {
            pages: vec![String::new()],
            home_page_index: 0,
            current_page_index: 0,
            idle_timeout,
            last_interaction: now,
            disabled: false,
        }
    }

    /// Swap in freshly computed pages, keeping the viewer at the same
    /// distance from the home page where possible.
    pub fn set_pages(&mut self, pagination: Pagination) {
        let offset = self.current_page_index as isize - self.home_page_index as isize;
        self.pages = if pagination.pages.is_empty() {
            vec![String::new()]
        } else {
            pagination.pages
        };
        self.home_page_index = pagination.home_page_index.min(self.pages.len() - 1);
        self.current_page_index = self.clamp(self.home_page_index as isize + offset);
    }

    fn clamp(&self, index: isize) -> usize {
        index.clamp(0, self.last_index() as isize) as usize
    }

    fn last_index(&self) -> usize {
        self.pages.len() - 1
    }

    fn target(&self, action: ScrollAction) -> usize {
        match action {
            ScrollAction::First => 0,
            ScrollAction::Prev => self.current_page_index.saturating_sub(1),
            ScrollAction::Home => self.home_page_index,
            ScrollAction::Next => (self.current_page_index + 1).min(self.last_index()),
            ScrollAction::Last => self.last_index(),
        }
    }

    /// Apply a navigation. Returns whether the shown page changed.
    pub fn scroll(&mut self, action: ScrollAction, now: Instant) -> bool {
        if self.disabled {
            return false;
        }
        self.last_interaction = now;

        let target = self.target(action);
        let moved = target != self.current_page_index;
        self.current_page_index = target;
        moved
    }

    pub fn first(&mut self, now: Instant) -> bool {
        self.scroll(ScrollAction::First, now)
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        self.scroll(ScrollAction::Prev, now)
    }

    pub fn home(&mut self, now: Instant) -> bool {
        self.scroll(ScrollAction::Home, now)
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.scroll(ScrollAction::Next, now)
    }

    pub fn last(&mut self, now: Instant) -> bool {
        self.scroll(ScrollAction::Last, now)
    }

    /// Whether the button for `action` should be greyed out at the current index.
    pub fn is_disabled(&self, action: ScrollAction) -> bool {
        self.disabled || self.target(action) == self.current_page_index
    }

    pub fn current_page(&self) -> &str {
        &self.pages[self.current_page_index]
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn home_page_index(&self) -> usize {
        self.home_page_index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Record activity that should postpone the idle timeout.
    pub fn touch(&mut self, now: Instant) {
        self.last_interaction = now;
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_interaction) >= self.idle_timeout
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Accept input again and jump back to the home page.
    pub fn rearm(&mut self, now: Instant) {
        self.disabled = false;
        self.last_interaction = now;
        self.current_page_index = self.home_page_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn pages(count: usize, home: usize) -> Pagination {
        Pagination {
            pages: (0..count).map(|i| format!("page {}", i)).collect(),
            home_page_index: home,
        }
    }

    fn scroller(count: usize, home: usize) -> (PageScroller, Instant) {
        let now = Instant::now();
        let mut scroller = PageScroller::new(Duration::from_secs(300), now);
        scroller.set_pages(pages(count, home));
        (scroller, now)
    }

    #[test]
    fn starts_on_home_page() {
        let (scroller, _) = scroller(4, 2);
        assert_eq!(scroller.current_page_index(), 2);
        assert_eq!(scroller.current_page(), "page 2");
        assert!(scroller.is_disabled(ScrollAction::Home));
    }

    #[test]
    fn next_at_last_page_is_a_no_op() {
        let (mut scroller, now) = scroller(3, 0);
        assert!(scroller.last(now));
        assert!(!scroller.next(now));
        assert_eq!(scroller.current_page_index(), 2);
        assert!(scroller.is_disabled(ScrollAction::Last));
        assert!(scroller.is_disabled(ScrollAction::Next));
        assert!(!scroller.is_disabled(ScrollAction::Prev));
        assert!(!scroller.is_disabled(ScrollAction::First));
    }

    #[test]
    fn prev_at_first_page_is_a_no_op() {
        let (mut scroller, now) = scroller(3, 1);
        assert!(scroller.first(now));
        assert!(!scroller.prev(now));
        assert!(scroller.is_disabled(ScrollAction::First));
        assert!(scroller.is_disabled(ScrollAction::Prev));
        assert!(scroller.home(now));
        assert_eq!(scroller.current_page_index(), 1);
    }

    #[test]
    fn single_page_disables_everything() {
        let (scroller, _) = scroller(1, 0);
        for action in [
            ScrollAction::First,
            ScrollAction::Prev,
            ScrollAction::Home,
            ScrollAction::Next,
            ScrollAction::Last,
        ] {
            assert!(scroller.is_disabled(action), "{:?} should be disabled", action);
        }
    }

    #[test_case(5, 2, 4, 7, 3 => 5; "keeps offset from home")]
    #[test_case(5, 2, 4, 3, 0 => 2; "clamps when pages shrink")]
    #[test_case(5, 2, 0, 4, 3 => 1; "follows a moved home page")]
    fn recomputed_pages_keep_relative_position(
        count: usize,
        home: usize,
        viewing: usize,
        new_count: usize,
        new_home: usize,
    ) -> usize {
        let (mut scroller, now) = scroller(count, home);
        while scroller.current_page_index() < viewing {
            scroller.next(now);
        }
        while scroller.current_page_index() > viewing {
            scroller.prev(now);
        }
        scroller.set_pages(pages(new_count, new_home));
        scroller.current_page_index()
    }

    #[test]
    fn goes_idle_after_timeout_and_ignores_input_once_disabled() {
        let (mut scroller, now) = scroller(3, 1);
        assert!(!scroller.is_idle(now + Duration::from_secs(299)));
        assert!(scroller.is_idle(now + Duration::from_secs(300)));

        scroller.disable();
        assert!(!scroller.first(now));
        assert!(scroller.is_disabled(ScrollAction::First));

        scroller.rearm(now);
        assert!(scroller.is_enabled());
        assert!(scroller.first(now));
    }

    #[test]
    fn interaction_postpones_idle() {
        let (mut scroller, now) = scroller(3, 1);
        let later = now + Duration::from_secs(200);
        scroller.next(later);
        assert!(!scroller.is_idle(now + Duration::from_secs(400)));
    }
}

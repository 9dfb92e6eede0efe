//! Selector: maps page-navigation and digit/letter selection keys onto
//! positions in the current candidate menu.
//!
//! Grounded in the teacher's `CandidateList` paging (`candidate.rs`) for
//! page geometry, generalized with a configurable `select_keys` sequence
//! and `page_down_cycle` wraparound the teacher's fixed "press 1-9" scheme
//! didn't need.

use crate::pipeline::processor::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Linear,
    Stacked,
}

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub select_keys: Vec<char>,
    pub layout: Layout,
    pub page_down_cycle: bool,
}

impl SelectorConfig {
    pub fn new(select_keys: Vec<char>) -> Self {
        Self {
            select_keys,
            layout: Layout::Linear,
            page_down_cycle: false,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_page_down_cycle(mut self, cycle: bool) -> Self {
        self.page_down_cycle = cycle;
        self
    }
}

pub struct Selector {
    config: SelectorConfig,
}

impl Selector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Map a typed char to an index on the current page, using the
    /// configured `select_keys` in order (`select_keys[0]` picks index 0).
    pub fn key_to_index(&self, ch: char) -> Option<usize> {
        self.config.select_keys.iter().position(|&k| k == ch)
    }

    /// Whether `event` is one of the navigation keys this selector claims
    /// (page up/down, or cursor up/down under a stacked layout).
    pub fn handles(&self, event: &KeyEvent) -> bool {
        match event {
            KeyEvent::PageUp | KeyEvent::PageDown => true,
            KeyEvent::Up | KeyEvent::Down => self.config.layout == Layout::Stacked,
            _ => false,
        }
    }

    /// Next page index, honoring `page_down_cycle` to wrap back to page 0
    /// instead of clamping at the last page.
    pub fn page_down(&self, current_page: usize, num_pages: usize) -> usize {
        if num_pages == 0 {
            return 0;
        }
        if current_page + 1 >= num_pages {
            if self.config.page_down_cycle {
                0
            } else {
                current_page
            }
        } else {
            current_page + 1
        }
    }

    pub fn page_up(&self, current_page: usize, num_pages: usize) -> usize {
        if num_pages == 0 {
            return 0;
        }
        if current_page == 0 {
            if self.config.page_down_cycle {
                num_pages - 1
            } else {
                0
            }
        } else {
            current_page - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_to_index_follows_select_keys_order() {
        let selector = Selector::new(SelectorConfig::new(vec!['1', '2', '3']));
        assert_eq!(selector.key_to_index('2'), Some(1));
        assert_eq!(selector.key_to_index('9'), None);
    }

    #[test]
    fn page_down_cycles_when_configured() {
        let selector = Selector::new(SelectorConfig::new(vec![]).with_page_down_cycle(true));
        assert_eq!(selector.page_down(2, 3), 0);
    }

    #[test]
    fn page_down_clamps_without_cycle() {
        let selector = Selector::new(SelectorConfig::new(vec![]));
        assert_eq!(selector.page_down(2, 3), 2);
    }
}

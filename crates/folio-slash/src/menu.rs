//! The slash menu state machine.
//!
//! One menu instance lives per editor. Opening while already active tears
//! the previous session down first. Filtering runs nucleo's fuzzy matcher
//! over title, description and keywords; committing returns the
//! highlighted item's commands prefixed by the deletion of the trigger
//! text, ready for one atomic chain.

use folio_editor_core::{Command, DeleteRange};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use tracing::debug;

use crate::item::{DEFAULT_ITEMS, SlashItem};
use crate::trigger::TriggerRange;

/// Minimum fuzzy score an item needs to stay visible.
pub const DEFAULT_SCORE_THRESHOLD: u32 = 40;

enum MenuState {
    Idle,
    Active {
        range: TriggerRange,
        filtered: Vec<usize>,
        index: usize,
    },
}

pub struct SlashMenu {
    items: Vec<SlashItem>,
    threshold: u32,
    /// When false (the default), backspacing the trigger also deletes the
    /// `/` from the document.
    pub keep_trigger_on_backspace: bool,
    matcher: Matcher,
    state: MenuState,
}

impl Default for SlashMenu {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS.to_vec(), DEFAULT_SCORE_THRESHOLD)
    }
}

impl SlashMenu {
    pub fn new(items: Vec<SlashItem>, threshold: u32) -> Self {
        Self {
            items,
            threshold,
            keep_trigger_on_backspace: false,
            matcher: Matcher::new(Config::DEFAULT),
            state: MenuState::Idle,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Active { .. })
    }

    /// Open for a fresh trigger. Any previous session is discarded.
    pub fn open(&mut self, range: TriggerRange, query: &str) {
        if self.is_open() {
            debug!("slash menu reopened, discarding previous session");
        }
        let filtered = self.filter(query);
        self.state = MenuState::Active {
            range,
            filtered,
            index: 0,
        };
    }

    /// Re-filter for the in-progress query. The highlight resets to the
    /// top because the old index points at the old list.
    pub fn update_query(&mut self, range: TriggerRange, query: &str) {
        let filtered = self.filter(query);
        self.state = MenuState::Active {
            range,
            filtered,
            index: 0,
        };
    }

    pub fn dismiss(&mut self) {
        self.state = MenuState::Idle;
    }

    /// Visible items in rank order.
    pub fn visible(&self) -> Vec<&SlashItem> {
        match &self.state {
            MenuState::Active { filtered, .. } => {
                filtered.iter().map(|&ix| &self.items[ix]).collect()
            }
            MenuState::Idle => Vec::new(),
        }
    }

    pub fn selected(&self) -> Option<&SlashItem> {
        match &self.state {
            MenuState::Active { filtered, index, .. } => {
                filtered.get(*index).map(|&ix| &self.items[ix])
            }
            MenuState::Idle => None,
        }
    }

    pub fn move_down(&mut self) {
        if let MenuState::Active { filtered, index, .. } = &mut self.state {
            if !filtered.is_empty() {
                *index = (*index + 1) % filtered.len();
            }
        }
    }

    pub fn move_up(&mut self) {
        if let MenuState::Active { filtered, index, .. } = &mut self.state {
            if !filtered.is_empty() {
                *index = index.checked_sub(1).unwrap_or(filtered.len() - 1);
            }
        }
    }

    /// Commit the highlighted item: delete the trigger text, then run the
    /// item's commands. Closes the menu either way; `None` when nothing
    /// was highlighted.
    pub fn commit(&mut self) -> Option<Vec<Box<dyn Command>>> {
        let MenuState::Active { range, filtered, index } = &self.state else {
            return None;
        };
        let Some(item) = filtered.get(*index).map(|&ix| &self.items[ix]) else {
            self.state = MenuState::Idle;
            return None;
        };
        let mut commands: Vec<Box<dyn Command>> = vec![Box::new(DeleteRange {
            from: range.start(),
            to: range.end(),
        })];
        commands.extend((item.action)(*range));
        self.state = MenuState::Idle;
        Some(commands)
    }

    /// Backspacing over the trigger char closes the menu. Unless
    /// configured otherwise, the `/` itself goes with it.
    pub fn backspace_trigger(&mut self) -> Option<Vec<Box<dyn Command>>> {
        let MenuState::Active { range, .. } = &self.state else {
            return None;
        };
        let commands = (!self.keep_trigger_on_backspace).then(|| {
            vec![Box::new(DeleteRange {
                from: range.start(),
                to: range.end(),
            }) as Box<dyn Command>]
        });
        self.state = MenuState::Idle;
        commands
    }

    fn filter(&mut self, query: &str) -> Vec<usize> {
        if query.is_empty() {
            return (0..self.items.len()).collect();
        }
        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let mut buf = Vec::new();
        let mut scored: Vec<(usize, u32)> = Vec::new();
        for (ix, item) in self.items.iter().enumerate() {
            let Some(score) = item_score(&pattern, item, &mut self.matcher, &mut buf) else {
                continue;
            };
            if score >= self.threshold {
                scored.push((ix, score));
            }
        }
        // Rank by score; declared order breaks ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.into_iter().map(|(ix, _)| ix).collect()
    }
}

/// Best score across the item's searchable text. Title hits count double
/// so `/head` surfaces the headings above keyword-only matches.
fn item_score(
    pattern: &Pattern,
    item: &SlashItem,
    matcher: &mut Matcher,
    buf: &mut Vec<char>,
) -> Option<u32> {
    let title = pattern
        .score(Utf32Str::new(item.title, buf), matcher)
        .map(|s| s * 2);
    let description = pattern.score(Utf32Str::new(item.description, buf), matcher);
    let keywords = item
        .keywords
        .iter()
        .filter_map(|kw| pattern.score(Utf32Str::new(kw, buf), matcher))
        .max();
    [title, description, keywords].into_iter().flatten().max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::trigger_query;
    use folio_editor_core::basic::basic_schema;
    use folio_editor_core::{EditorState, Node, Selection, chain};

    fn slash_state(text: &str) -> (EditorState, TriggerRange, String) {
        let schema = basic_schema();
        let doc =
            Node::new("doc").with_children(vec![
                Node::new("paragraph").with_children(vec![Node::text(text)]),
            ]);
        let block = doc.content[0].id;
        let state = EditorState::new(doc, Selection::caret(block, text.chars().count()));
        let (range, query) = trigger_query(&state, &schema).unwrap();
        (state, range, query)
    }

    #[test]
    fn head_query_ranks_headings_first() {
        let (_, range, query) = slash_state("/head");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);

        let visible: Vec<&str> = menu.visible().iter().map(|i| i.title).collect();
        assert_eq!(visible[0], "Heading 1");
        assert!(visible.contains(&"Heading 2"));
        assert!(visible.contains(&"Heading 3"));
        assert!(!visible.contains(&"Divider"));
    }

    #[test]
    fn empty_query_lists_palette_in_order() {
        let (_, range, query) = slash_state("/");
        assert_eq!(query, "");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);
        let visible: Vec<&str> = menu.visible().iter().map(|i| i.title).collect();
        assert_eq!(visible[0], "Text");
        assert_eq!(visible.len(), crate::item::DEFAULT_ITEMS.len());
    }

    #[test]
    fn selection_wraps_both_ends() {
        let (_, range, query) = slash_state("/");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);
        let count = menu.visible().len();

        menu.move_up();
        assert_eq!(
            menu.selected().map(|i| i.title),
            Some(crate::item::DEFAULT_ITEMS[count - 1].title)
        );
        menu.move_down();
        assert_eq!(menu.selected().map(|i| i.title), Some("Text"));
    }

    #[test]
    fn commit_converts_block_and_clears_trigger() {
        let schema = basic_schema();
        let (state, range, query) = slash_state("/head");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);

        let commands = menu.commit().unwrap();
        assert!(!menu.is_open());

        let next = chain(&commands, &state, &schema).unwrap();
        let block = next.doc.find(range.block).unwrap();
        assert_eq!(block.kind, "heading");
        assert_eq!(block.attrs.u64_attr("level"), Some(1));
        assert!(block.inline_text().is_empty());
    }

    #[test]
    fn backspace_removes_trigger_by_default() {
        let schema = basic_schema();
        let (state, range, query) = slash_state("/");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);

        let commands = menu.backspace_trigger().unwrap();
        assert!(!menu.is_open());
        let next = chain(&commands, &state, &schema).unwrap();
        assert!(next.doc.find(range.block).unwrap().inline_text().is_empty());
    }

    #[test]
    fn backspace_can_keep_trigger() {
        let (_, range, query) = slash_state("/");
        let mut menu = SlashMenu::default();
        menu.keep_trigger_on_backspace = true;
        menu.open(range, &query);
        assert!(menu.backspace_trigger().is_none());
        assert!(!menu.is_open());
    }

    #[test]
    fn commit_with_no_matches_closes_the_menu() {
        let (_, range, query) = slash_state("/zzqx");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);
        assert!(menu.visible().is_empty());

        assert!(menu.commit().is_none());
        assert!(!menu.is_open());
    }

    #[test]
    fn reopening_discards_previous_session() {
        let (_, range, query) = slash_state("/head");
        let mut menu = SlashMenu::default();
        menu.open(range, &query);
        menu.move_down();

        menu.open(range, "");
        assert_eq!(menu.selected().map(|i| i.title), Some("Text"));
    }
}

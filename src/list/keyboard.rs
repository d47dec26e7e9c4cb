use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, trace};

use super::content::is_blank;
use super::host::{BlockData, BlockHost, CaretPosition};
use super::navigation::{
    SiblingDirection, deepest_last_descendant, get_child_items, get_children_wrapper,
    get_siblings, has_sublist, is_last_item, item_level, parent_item, previous_sibling,
    remove_wrapper_if_empty,
};
use super::tree::ItemId;
use super::{Caret, ListStyle, ListTabulator};

/// Structural meaning of a key press inside a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    Enter,
    Backspace,
    Indent,
    Outdent,
}

impl KeyIntent {
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        match event.code {
            KeyCode::Enter => Some(KeyIntent::Enter),
            KeyCode::Backspace => Some(KeyIntent::Backspace),
            KeyCode::BackTab => Some(KeyIntent::Outdent),
            KeyCode::Tab if event.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(KeyIntent::Outdent)
            }
            KeyCode::Tab => Some(KeyIntent::Indent),
            _ => None,
        }
    }
}

/// A key press together with the input method state.
#[derive(Clone, Copy, Debug)]
pub struct KeyPress {
    pub event: KeyEvent,
    pub composing: bool,
}

impl KeyPress {
    pub fn new(event: KeyEvent) -> Self {
        Self {
            event,
            composing: false,
        }
    }

    pub fn composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }
}

impl From<KeyEvent> for KeyPress {
    fn from(event: KeyEvent) -> Self {
        KeyPress::new(event)
    }
}

/// How the host should treat the key press after the list handled it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Skip the native behavior (newline insertion, character deletion).
    pub prevent_default: bool,
    /// Do not pass the key on to the host's own handlers.
    pub stop_propagation: bool,
}

impl KeyOutcome {
    pub const IGNORED: KeyOutcome = KeyOutcome {
        prevent_default: false,
        stop_propagation: false,
    };

    pub const CONSUMED: KeyOutcome = KeyOutcome {
        prevent_default: true,
        stop_propagation: true,
    };
}

impl ListTabulator {
    pub fn handle_key(
        &mut self,
        key: &KeyPress,
        caret: &mut Caret,
        host: &mut dyn BlockHost,
    ) -> KeyOutcome {
        if !self.listening {
            return KeyOutcome::IGNORED;
        }
        let Some(intent) = KeyIntent::from_event(&key.event) else {
            return KeyOutcome::IGNORED;
        };
        trace!("list key intent {intent:?}");
        match intent {
            KeyIntent::Enter => self.enter_pressed(key.composing, caret, host),
            KeyIntent::Backspace => self.backspace(caret),
            KeyIntent::Indent => {
                if let Some(item) = self.current_item(caret) {
                    self.add_tab(item, caret);
                }
                KeyOutcome::CONSUMED
            }
            KeyIntent::Outdent => {
                if let Some(item) = self.current_item(caret) {
                    self.unshift_item(item, caret);
                }
                KeyOutcome::CONSUMED
            }
        }
    }

    fn enter_pressed(
        &mut self,
        composing: bool,
        caret: &mut Caret,
        host: &mut dyn BlockHost,
    ) -> KeyOutcome {
        if composing {
            return KeyOutcome::CONSUMED;
        }
        let Some(item) = self.current_item(caret) else {
            return KeyOutcome::CONSUMED;
        };
        if let Some((_, offset)) = self.list_wrapper.and_then(|root| caret.anchor(&self.tree, root)) {
            caret.offset = offset;
        }

        let is_empty = is_blank(&self.renderer.read_content(&self.tree, item));
        let is_first_level = self.tree.parent_wrapper(item) == self.list_wrapper;

        if is_first_level && is_empty {
            if is_last_item(&self.tree, item) && !has_sublist(&self.tree, item) {
                trace!("enter on trailing empty item leaves the list");
                let index = host.current_block_index() + 1;
                self.get_out_of_list(item, index, host);
            } else {
                trace!("enter on empty first-level item splits the list");
                self.split_list(item, caret, host);
            }
        } else if is_empty {
            self.unshift_item(item, caret);
        } else {
            self.split_item(item, caret);
        }
        KeyOutcome::CONSUMED
    }

    fn backspace(&mut self, caret: &mut Caret) -> KeyOutcome {
        let Some(root) = self.list_wrapper else {
            return KeyOutcome::IGNORED;
        };
        let Some(item) = self.current_item(caret) else {
            return KeyOutcome::IGNORED;
        };

        let is_first_of_root = self
            .tree
            .wrapper(root)
            .and_then(|node| node.items().first().copied())
            == Some(item);
        let is_first_level = self.tree.parent_wrapper(item) == Some(root);
        let has_previous = previous_sibling(&self.tree, item).is_some();

        let mut outcome = KeyOutcome::IGNORED;
        if !is_first_of_root && !has_previous && !is_first_level {
            outcome.stop_propagation = true;
        }

        if !caret.is_at_start() {
            return outcome;
        }

        outcome.prevent_default = true;
        if self.merge_item_with_previous(item, caret) {
            outcome.stop_propagation = true;
        }
        outcome
    }

    /// Removes `item` and hands the caret to a new paragraph block the host
    /// inserts at `index`. The paragraph carries the item's content.
    pub fn get_out_of_list(&mut self, item: ItemId, index: usize, host: &mut dyn BlockHost) {
        let content = self.renderer.read_content(&self.tree, item);
        self.remove_item(item);
        host.insert_block(BlockData::Paragraph { text: content }, index);
        host.set_caret_to_block(index, CaretPosition::Start);
    }

    /// Cuts the list at `item`: its following siblings move into a new list
    /// block after this one and `item` itself becomes a paragraph between
    /// both lists.
    pub fn split_list(&mut self, item: ItemId, caret: &mut Caret, host: &mut dyn BlockHost) {
        let current_index = host.current_block_index();

        let children = get_child_items(&self.tree, item, true);
        if let Some(&first_child) = children.first() {
            self.unshift_item(first_child, caret);
            caret.focus(&self.tree, item, false);
        }

        if previous_sibling(&self.tree, item).is_none()
            && self.tree.parent_wrapper(item) == self.list_wrapper
        {
            self.get_out_of_list(item, current_index, host);
            return;
        }

        let following = get_siblings(&self.tree, item, SiblingDirection::After);
        if following.is_empty() {
            self.get_out_of_list(item, current_index + 1, host);
            return;
        }

        let new_wrapper = self.renderer.create_wrapper(&mut self.tree, true);
        for sibling in following {
            self.tree.append_item(new_wrapper, sibling);
        }
        let mut new_list = self.save(Some(new_wrapper));
        if new_list.style == ListStyle::Ordered {
            new_list.start = Some(1);
        }

        host.insert_block(BlockData::List(new_list), current_index + 1);
        self.get_out_of_list(item, current_index + 1, host);
        self.tree.remove_wrapper(new_wrapper);
    }

    /// Moves the content after the caret into a new item right after `item`.
    /// Children of `item` follow the moved content.
    pub fn split_item(&mut self, item: ItemId, caret: &mut Caret) -> bool {
        if caret.item != item {
            return false;
        }
        let Some(tail) = caret.extract_to_end(&mut self.tree) else {
            return false;
        };
        let new_item = self.renderer.create_item(&mut self.tree, &tail, None);
        if !self.tree.insert_after(item, new_item) {
            self.tree.remove_item(new_item);
            return false;
        }
        if let Some(children) = get_children_wrapper(&self.tree, item) {
            self.tree.attach_children(new_item, children);
        }
        caret.focus(&self.tree, new_item, true);
        true
    }

    /// Joins `item` into the item before it in document order: the deepest
    /// descendant of the previous sibling, or the parent item.
    pub fn merge_item_with_previous(&mut self, item: ItemId, caret: &mut Caret) -> bool {
        let previous = previous_sibling(&self.tree, item);
        let target = match previous {
            Some(previous) => deepest_last_descendant(&self.tree, previous),
            None => match parent_item(&self.tree, item) {
                Some(parent) => parent,
                None => return false,
            },
        };

        caret.focus(&self.tree, target, false);
        let merged = self.renderer.read_content(&self.tree, target)
            + &self.renderer.read_content(&self.tree, item);
        self.tree.set_content(target, merged);

        let children = get_child_items(&self.tree, item, true);
        if children.is_empty() {
            self.remove_item(item);
            return true;
        }

        let Some(target_wrapper) = self.ensure_children_wrapper(target) else {
            return false;
        };
        if previous.is_some() {
            for child in children {
                self.tree.append_item(target_wrapper, child);
            }
        } else {
            for (index, child) in children.into_iter().enumerate() {
                self.tree.insert_item(target_wrapper, index, child);
            }
        }
        self.remove_item(item);
        true
    }

    /// Indents `item` below its previous sibling. The item's own children are
    /// lifted to become its following siblings at the new level.
    pub fn add_tab(&mut self, item: ItemId, caret: &mut Caret) -> bool {
        let level = item_level(&self.tree, item);
        if let Some(max_level) = self.config.max_level {
            if level >= max_level {
                debug!("indent refused: item already at level {level} of {max_level}");
                return false;
            }
        }
        let Some(previous) = previous_sibling(&self.tree, item) else {
            debug!("indent refused: no previous sibling to nest under");
            return false;
        };

        let Some(wrapper) = self.ensure_children_wrapper(previous) else {
            return false;
        };
        let own_children = get_child_items(&self.tree, item, true);
        self.tree.append_item(wrapper, item);
        for child in own_children {
            self.tree.append_item(wrapper, child);
        }
        if let Some(emptied) = get_children_wrapper(&self.tree, item) {
            remove_wrapper_if_empty(&mut self.tree, emptied);
        }

        caret.focus(&self.tree, item, false);
        true
    }

    /// Moves `item` one level up, right after its parent item. Following
    /// siblings become children of `item`.
    pub fn unshift_item(&mut self, item: ItemId, caret: &mut Caret) -> bool {
        let Some(parent) = parent_item(&self.tree, item) else {
            debug!("outdent refused: item is on the first level");
            return false;
        };
        let Some(parent_wrapper) = self.tree.parent_wrapper(item) else {
            return false;
        };

        let following = get_siblings(&self.tree, item, SiblingDirection::After);
        if !following.is_empty() {
            let Some(wrapper) = self.ensure_children_wrapper(item) else {
                return false;
            };
            for sibling in following {
                self.tree.append_item(wrapper, sibling);
            }
        }

        self.tree.insert_after(parent, item);
        remove_wrapper_if_empty(&mut self.tree, parent_wrapper);

        caret.focus(&self.tree, item, false);
        true
    }
}

#[cfg(test)]
#[path = "keyboard_tests.rs"]
mod keyboard_tests;

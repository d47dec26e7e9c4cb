use super::content::{insert_text_at, remove_before, split_at, visible_len};
use super::navigation::get_wrapper_items;
use super::tree::{ItemId, ListTree, WrapperId};

/// Caret inside the content of one item.
///
/// `offset` counts visible characters of the item's content. The caret is
/// handed to every operation that reads or moves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caret {
    pub item: ItemId,
    pub offset: usize,
}

impl Caret {
    pub fn new(item: ItemId, offset: usize) -> Self {
        Self { item, offset }
    }

    pub fn at_start(item: ItemId) -> Self {
        Self::new(item, 0)
    }

    pub fn at_end(tree: &ListTree, item: ItemId) -> Self {
        Self::new(item, tree.content(item).map(visible_len).unwrap_or(0))
    }

    /// The item and offset the selection is anchored at, when the item still
    /// exists and sits below `root`.
    pub fn anchor(&self, tree: &ListTree, root: WrapperId) -> Option<(ItemId, usize)> {
        if tree.root_of(self.item) != Some(root) {
            return None;
        }
        let len = visible_len(tree.content(self.item)?);
        Some((self.item, self.offset.min(len)))
    }

    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn is_at_end(&self, tree: &ListTree) -> bool {
        tree.content(self.item)
            .map(|content| self.offset >= visible_len(content))
            .unwrap_or(true)
    }

    /// Cuts the content from the caret to the end of the item and returns it.
    /// The item keeps everything before the caret.
    pub fn extract_to_end(&self, tree: &mut ListTree) -> Option<String> {
        let content = tree.content(self.item)?;
        let (head, tail) = split_at(content, self.offset);
        tree.set_content(self.item, head);
        Some(tail)
    }

    pub fn focus(&mut self, tree: &ListTree, item: ItemId, at_start: bool) {
        *self = if at_start {
            Caret::at_start(item)
        } else {
            Caret::at_end(tree, item)
        };
    }

    pub fn insert_text(&mut self, tree: &mut ListTree, text: &str) -> bool {
        let Some(content) = tree.content(self.item) else {
            return false;
        };
        let offset = self.offset.min(visible_len(content));
        let updated = insert_text_at(content, offset, text);
        tree.set_content(self.item, updated);
        self.offset = offset + text.chars().count();
        true
    }

    /// Deletes the character before the caret within the item.
    pub fn delete_backward(&mut self, tree: &mut ListTree) -> bool {
        if self.offset == 0 {
            return false;
        }
        let Some(content) = tree.content(self.item) else {
            return false;
        };
        let offset = self.offset.min(visible_len(content));
        let updated = remove_before(content, offset);
        tree.set_content(self.item, updated);
        self.offset = offset.saturating_sub(1);
        true
    }

    pub fn move_left(&mut self, tree: &ListTree, root: WrapperId) -> bool {
        if self.offset > 0 {
            self.offset -= 1;
            return true;
        }
        match self.neighbour(tree, root, -1) {
            Some(previous) => {
                self.focus(tree, previous, false);
                true
            }
            None => false,
        }
    }

    pub fn move_right(&mut self, tree: &ListTree, root: WrapperId) -> bool {
        if !self.is_at_end(tree) {
            self.offset += 1;
            return true;
        }
        match self.neighbour(tree, root, 1) {
            Some(next) => {
                self.focus(tree, next, true);
                true
            }
            None => false,
        }
    }

    pub fn move_up(&mut self, tree: &ListTree, root: WrapperId) -> bool {
        self.move_vertically(tree, root, -1)
    }

    pub fn move_down(&mut self, tree: &ListTree, root: WrapperId) -> bool {
        self.move_vertically(tree, root, 1)
    }

    pub fn move_home(&mut self) {
        self.offset = 0;
    }

    pub fn move_end(&mut self, tree: &ListTree) {
        *self = Caret::at_end(tree, self.item);
    }

    fn move_vertically(&mut self, tree: &ListTree, root: WrapperId, step: isize) -> bool {
        let Some(target) = self.neighbour(tree, root, step) else {
            return false;
        };
        let len = tree.content(target).map(visible_len).unwrap_or(0);
        *self = Caret::new(target, self.offset.min(len));
        true
    }

    fn neighbour(&self, tree: &ListTree, root: WrapperId, step: isize) -> Option<ItemId> {
        let items = get_wrapper_items(tree, root, false);
        let index = items.iter().position(|item| *item == self.item)?;
        let target = index.checked_add_signed(step)?;
        items.get(target).copied()
    }
}

#[cfg(test)]
#[path = "caret_tests.rs"]
mod caret_tests;

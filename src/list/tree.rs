use super::data::{CounterType, ItemMeta};

/// Slot index plus the generation the slot had when the node was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Key {
    index: usize,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Key);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperId(Key);

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with a free list. A freed slot is reused under a new
/// generation, so keys handed out before the free no longer resolve.
#[derive(Clone, Debug)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, value: T) -> Key {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            return Key {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Key {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn get(&self, key: Key) -> Option<&T> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)?
            .value
            .as_ref()
    }

    fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)?
            .value
            .as_mut()
    }

    fn take(&mut self, key: Key) -> Option<T> {
        let value = self
            .slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)?
            .value
            .take()?;
        self.free.push(key.index);
        Some(value)
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[derive(Clone, Debug)]
pub struct ItemNode {
    pub content: String,
    pub meta: ItemMeta,
    parent: Option<WrapperId>,
    children: Option<WrapperId>,
}

impl ItemNode {
    pub fn parent(&self) -> Option<WrapperId> {
        self.parent
    }

    pub fn children(&self) -> Option<WrapperId> {
        self.children
    }
}

#[derive(Clone, Debug)]
pub struct WrapperNode {
    owner: Option<ItemId>,
    items: Vec<ItemId>,
    is_root: bool,
    pub start: Option<u32>,
    pub counter_type: Option<CounterType>,
}

impl WrapperNode {
    pub fn owner(&self) -> Option<ItemId> {
        self.owner
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

/// Live tree of items and children wrappers.
///
/// Nodes live in two arenas and refer to each other by id. Moving an attached
/// node detaches it from its old place first, so a node is never reachable
/// from two parents. Freed slots are reused; stale ids resolve to `None`.
#[derive(Clone, Debug, Default)]
pub struct ListTree {
    items: Arena<ItemNode>,
    wrappers: Arena<WrapperNode>,
}

impl ListTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_wrapper(&mut self, is_root: bool) -> WrapperId {
        WrapperId(self.wrappers.insert(WrapperNode {
            owner: None,
            items: Vec::new(),
            is_root,
            start: None,
            counter_type: None,
        }))
    }

    pub fn create_item(&mut self, content: String, meta: ItemMeta) -> ItemId {
        ItemId(self.items.insert(ItemNode {
            content,
            meta,
            parent: None,
            children: None,
        }))
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemNode> {
        self.items.get(id.0)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemNode> {
        self.items.get_mut(id.0)
    }

    pub fn wrapper(&self, id: WrapperId) -> Option<&WrapperNode> {
        self.wrappers.get(id.0)
    }

    pub fn wrapper_mut(&mut self, id: WrapperId) -> Option<&mut WrapperNode> {
        self.wrappers.get_mut(id.0)
    }

    pub fn content(&self, id: ItemId) -> Option<&str> {
        self.item(id).map(|item| item.content.as_str())
    }

    pub fn set_content(&mut self, id: ItemId, content: String) -> bool {
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        item.content = content;
        true
    }

    pub fn parent_wrapper(&self, id: ItemId) -> Option<WrapperId> {
        self.item(id)?.parent
    }

    pub fn children_wrapper(&self, id: ItemId) -> Option<WrapperId> {
        self.item(id)?.children
    }

    pub fn owner(&self, wrapper: WrapperId) -> Option<ItemId> {
        self.wrapper(wrapper)?.owner
    }

    pub fn index_in_parent(&self, id: ItemId) -> Option<usize> {
        let parent = self.parent_wrapper(id)?;
        self.wrapper(parent)?.items.iter().position(|item| *item == id)
    }

    /// Unlinks an item (with its subtree) from its wrapper.
    pub fn detach_item(&mut self, id: ItemId) -> bool {
        let Some(parent) = self.parent_wrapper(id) else {
            return false;
        };
        if let Some(wrapper) = self.wrapper_mut(parent) {
            wrapper.items.retain(|item| *item != id);
        }
        if let Some(item) = self.item_mut(id) {
            item.parent = None;
        }
        true
    }

    /// Inserts `id` into `wrapper` at `index` (clamped), moving it there if
    /// it is attached elsewhere.
    pub fn insert_item(&mut self, wrapper: WrapperId, index: usize, id: ItemId) -> bool {
        if self.wrapper(wrapper).is_none() || self.item(id).is_none() {
            return false;
        }
        if self.wrapper_in_subtree(id, wrapper) {
            return false;
        }
        self.detach_item(id);
        let Some(node) = self.wrapper_mut(wrapper) else {
            return false;
        };
        let index = index.min(node.items.len());
        node.items.insert(index, id);
        if let Some(item) = self.item_mut(id) {
            item.parent = Some(wrapper);
        }
        true
    }

    pub fn append_item(&mut self, wrapper: WrapperId, id: ItemId) -> bool {
        let len = self.wrapper(wrapper).map(|node| node.items.len()).unwrap_or(0);
        self.insert_item(wrapper, len, id)
    }

    /// Places `id` directly after `anchor`, in the anchor's wrapper.
    pub fn insert_after(&mut self, anchor: ItemId, id: ItemId) -> bool {
        if anchor == id || self.item(id).is_none() {
            return false;
        }
        let Some(parent) = self.parent_wrapper(anchor) else {
            return false;
        };
        if self.wrapper_in_subtree(id, parent) {
            return false;
        }
        self.detach_item(id);
        let Some(index) = self.index_in_parent(anchor) else {
            return false;
        };
        self.insert_item(parent, index + 1, id)
    }

    /// Makes `wrapper` the children wrapper of `id`. A wrapper owned by
    /// another item is taken away from it; a previous children wrapper of
    /// `id` is removed together with its items.
    pub fn attach_children(&mut self, id: ItemId, wrapper: WrapperId) -> bool {
        if self.item(id).is_none() || self.wrapper(wrapper).is_none() {
            return false;
        }
        if self.item_in_wrapper_subtree(wrapper, id) {
            return false;
        }
        if self.children_wrapper(id) == Some(wrapper) {
            return true;
        }
        self.detach_wrapper(wrapper);
        if let Some(previous) = self.children_wrapper(id) {
            self.remove_wrapper(previous);
        }
        if let Some(node) = self.wrapper_mut(wrapper) {
            node.owner = Some(id);
        }
        if let Some(item) = self.item_mut(id) {
            item.children = Some(wrapper);
        }
        true
    }

    /// Unlinks a wrapper from its owner item, keeping its items.
    pub fn detach_wrapper(&mut self, wrapper: WrapperId) -> bool {
        let Some(owner) = self.owner(wrapper) else {
            return false;
        };
        if let Some(item) = self.item_mut(owner) {
            item.children = None;
        }
        if let Some(node) = self.wrapper_mut(wrapper) {
            node.owner = None;
        }
        true
    }

    /// Removes an item and frees its whole subtree.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        self.detach_item(id);
        self.free_item(id);
        true
    }

    /// Removes a wrapper and frees every item below it.
    pub fn remove_wrapper(&mut self, wrapper: WrapperId) -> bool {
        if self.wrapper(wrapper).is_none() {
            return false;
        }
        self.detach_wrapper(wrapper);
        self.free_wrapper(wrapper);
        true
    }

    fn free_item(&mut self, id: ItemId) {
        let Some(node) = self.items.take(id.0) else {
            return;
        };
        if let Some(children) = node.children {
            self.free_wrapper(children);
        }
    }

    fn free_wrapper(&mut self, wrapper: WrapperId) {
        let Some(node) = self.wrappers.take(wrapper.0) else {
            return;
        };
        for item in node.items {
            self.free_item(item);
        }
    }

    /// True when `wrapper` is the children wrapper of `id` or of one of its
    /// descendants.
    fn wrapper_in_subtree(&self, id: ItemId, wrapper: WrapperId) -> bool {
        let mut current = Some(wrapper);
        while let Some(candidate) = current {
            let Some(owner) = self.owner(candidate) else {
                return false;
            };
            if owner == id {
                return true;
            }
            current = self.parent_wrapper(owner);
        }
        false
    }

    /// True when `id` sits somewhere below `wrapper`.
    fn item_in_wrapper_subtree(&self, wrapper: WrapperId, id: ItemId) -> bool {
        let mut current = self.parent_wrapper(id);
        while let Some(candidate) = current {
            if candidate == wrapper {
                return true;
            }
            current = self.owner(candidate).and_then(|owner| self.parent_wrapper(owner));
        }
        false
    }

    /// The root wrapper an item is ultimately attached to.
    pub fn root_of(&self, id: ItemId) -> Option<WrapperId> {
        let mut wrapper = self.parent_wrapper(id)?;
        loop {
            match self.owner(wrapper) {
                Some(owner) => wrapper = self.parent_wrapper(owner)?,
                None => return Some(wrapper),
            }
        }
    }

    pub fn live_item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;

use log::debug;

mod caret;
mod config;
pub mod content;
mod data;
mod host;
mod keyboard;
pub mod navigation;
mod paste;
mod renderer;
mod tree;

pub use caret::Caret;
pub use config::ListConfig;
pub use data::{CounterType, ItemMeta, ListData, ListItem, ListStyle};
pub use host::{BlockCommand, BlockCommands, BlockData, BlockHost, CaretPosition};
pub use keyboard::{KeyIntent, KeyOutcome, KeyPress};
pub use paste::{Markup, markup_from_paragraph, normalize};
pub use renderer::ListRenderer;
pub use tree::{ItemId, ItemNode, ListTree, WrapperId, WrapperNode};

use navigation::{get_children_wrapper, get_wrapper_items, remove_wrapper_if_empty};

/// Editing engine of one list block.
///
/// Holds the persisted data of the block and, once rendered, the live tree
/// built from it. Key presses, pastes and merges mutate the live tree;
/// [`ListTabulator::save`] reads it back into [`ListData`].
pub struct ListTabulator {
    data: ListData,
    config: ListConfig,
    read_only: bool,
    renderer: ListRenderer,
    tree: ListTree,
    list_wrapper: Option<WrapperId>,
    listening: bool,
}

impl ListTabulator {
    pub fn new(data: Option<ListData>, config: ListConfig, read_only: bool) -> Self {
        let data = data.unwrap_or_else(|| {
            let style = config.default_style;
            let mut data = ListData::new(style);
            if style == ListStyle::Ordered {
                data.start = config.start;
            }
            data
        });
        Self {
            renderer: ListRenderer::for_style(data.style),
            data,
            config,
            read_only,
            tree: ListTree::new(),
            list_wrapper: None,
            listening: false,
        }
    }

    pub fn data(&self) -> &ListData {
        &self.data
    }

    pub fn style(&self) -> ListStyle {
        self.renderer.style()
    }

    pub fn renderer(&self) -> ListRenderer {
        self.renderer
    }

    pub fn tree(&self) -> &ListTree {
        &self.tree
    }

    pub fn root(&self) -> Option<WrapperId> {
        self.list_wrapper
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn first_item(&self) -> Option<ItemId> {
        let root = self.list_wrapper?;
        self.tree.wrapper(root)?.items().first().copied()
    }

    /// Builds the live tree from the held data and returns its root wrapper.
    /// A previously rendered tree is dropped.
    pub fn render(&mut self) -> WrapperId {
        if let Some(previous) = self.list_wrapper.take() {
            self.tree.remove_wrapper(previous);
        }
        self.renderer = ListRenderer::for_style(self.data.style);
        let root = self.renderer.create_wrapper(&mut self.tree, true);

        if self.data.items.is_empty() {
            let item = self.renderer.create_item(&mut self.tree, "", None);
            self.tree.append_item(root, item);
        } else {
            let items = self.data.items.clone();
            self.append_items(&items, root);
        }

        if self.data.style == ListStyle::Ordered {
            if let Some(node) = self.tree.wrapper_mut(root) {
                node.start = self.data.start;
                node.counter_type = self.data.counter_type;
            }
        }

        self.list_wrapper = Some(root);
        self.listening = !self.read_only;
        root
    }

    pub(crate) fn append_items(&mut self, items: &[ListItem], wrapper: WrapperId) {
        for item in items {
            let id = self
                .renderer
                .create_item(&mut self.tree, &item.content, Some(&item.meta));
            self.tree.append_item(wrapper, id);
            if !item.items.is_empty() {
                let children = self.renderer.create_wrapper(&mut self.tree, false);
                self.tree.attach_children(id, children);
                self.append_items(&item.items, children);
            }
        }
    }

    /// Reads `wrapper` (the root by default) back into persisted data.
    pub fn save(&self, wrapper: Option<WrapperId>) -> ListData {
        let Some(wrapper) = wrapper.or(self.list_wrapper) else {
            return self.data.clone();
        };
        let style = self.renderer.style();
        let mut data = ListData::new(style).with_items(self.collect_items(wrapper));
        if style == ListStyle::Ordered {
            let node = self.tree.wrapper(wrapper);
            data.start = node.and_then(|node| node.start).or(self.data.start);
            data.counter_type = node
                .and_then(|node| node.counter_type)
                .or(self.data.counter_type);
        }
        data
    }

    fn collect_items(&self, wrapper: WrapperId) -> Vec<ListItem> {
        get_wrapper_items(&self.tree, wrapper, true)
            .into_iter()
            .map(|item| ListItem {
                content: self.renderer.read_content(&self.tree, item),
                meta: self.renderer.read_meta(&self.tree, item),
                items: get_children_wrapper(&self.tree, item)
                    .map(|children| self.collect_items(children))
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn change_start_with(&mut self, start: u32) {
        if let Some(node) = self.list_wrapper.and_then(|root| self.tree.wrapper_mut(root)) {
            node.start = Some(start);
        }
        self.data.start = Some(start);
    }

    pub fn change_counter_type(&mut self, counter_type: CounterType) {
        if let Some(node) = self.list_wrapper.and_then(|root| self.tree.wrapper_mut(root)) {
            node.counter_type = Some(counter_type);
        }
        self.data.counter_type = Some(counter_type);
    }

    /// Flips the checkbox of a checklist item, returning the new state.
    pub fn toggle_checkbox(&mut self, item: ItemId) -> Option<bool> {
        if self.read_only {
            return None;
        }
        self.renderer.toggle_checked(&mut self.tree, item)
    }

    /// Appends a following list block to this one. The first incoming item's
    /// content joins the last item of this tree (the deepest one in document
    /// order); its children go below the last first-level item; the other
    /// incoming items become first-level items. An empty tree takes the
    /// incoming items as they are.
    pub fn merge(&mut self, data: &ListData) {
        let Some(root) = self.list_wrapper else {
            return;
        };
        let Some((first, rest)) = data.items.split_first() else {
            return;
        };

        let all_items = get_wrapper_items(&self.tree, root, false);
        let Some(&deepest) = all_items.last() else {
            self.append_items(&data.items, root);
            return;
        };
        let merged = self.renderer.read_content(&self.tree, deepest) + &first.content;
        self.tree.set_content(deepest, merged);

        if !first.items.is_empty() {
            let last_first_level = get_wrapper_items(&self.tree, root, true).last().copied();
            match last_first_level {
                Some(owner) => {
                    let children = match get_children_wrapper(&self.tree, owner) {
                        Some(children) => children,
                        None => {
                            let children = self.renderer.create_wrapper(&mut self.tree, false);
                            self.tree.attach_children(owner, children);
                            children
                        }
                    };
                    self.append_items(&first.items, children);
                }
                None => self.append_items(&first.items, root),
            }
        }

        if !rest.is_empty() {
            self.append_items(rest, root);
        }
    }

    /// Replaces the whole list with a pasted foreign list. Returns the new
    /// root wrapper, or `None` when the markup is not a list.
    pub fn on_paste(&mut self, markup: &Markup) -> Option<WrapperId> {
        let Some(data) = normalize(markup) else {
            debug!("ignoring paste of non-list markup");
            return None;
        };
        self.data = data;
        Some(self.render())
    }

    /// The item the caret is in, if it belongs to this list.
    pub(crate) fn current_item(&self, caret: &Caret) -> Option<ItemId> {
        let root = self.list_wrapper?;
        caret.anchor(&self.tree, root).map(|(item, _)| item)
    }

    /// Removes an item and the wrapper it leaves empty behind.
    fn remove_item(&mut self, item: ItemId) {
        let parent = self.tree.parent_wrapper(item);
        self.tree.remove_item(item);
        if let Some(parent) = parent {
            remove_wrapper_if_empty(&mut self.tree, parent);
        }
    }

    fn ensure_children_wrapper(&mut self, item: ItemId) -> Option<WrapperId> {
        if let Some(children) = get_children_wrapper(&self.tree, item) {
            return Some(children);
        }
        let children = self.renderer.create_wrapper(&mut self.tree, false);
        if self.tree.attach_children(item, children) {
            Some(children)
        } else {
            self.tree.remove_wrapper(children);
            None
        }
    }

    /// Gives the caller mutable access to the tree for native editing
    /// (typing, deleting characters).
    pub fn tree_mut(&mut self) -> Option<&mut ListTree> {
        if self.read_only {
            None
        } else {
            Some(&mut self.tree)
        }
    }
}

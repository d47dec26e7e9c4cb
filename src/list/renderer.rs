use super::data::{ItemMeta, ListStyle};
use super::tree::{ItemId, ListTree, WrapperId};

/// Creates and reads items and children wrappers for one list style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListRenderer {
    Unordered,
    Ordered,
    Checklist,
}

impl ListRenderer {
    pub fn for_style(style: ListStyle) -> Self {
        match style {
            ListStyle::Unordered => ListRenderer::Unordered,
            ListStyle::Ordered => ListRenderer::Ordered,
            ListStyle::Checklist => ListRenderer::Checklist,
        }
    }

    pub fn style(self) -> ListStyle {
        match self {
            ListRenderer::Unordered => ListStyle::Unordered,
            ListRenderer::Ordered => ListStyle::Ordered,
            ListRenderer::Checklist => ListStyle::Checklist,
        }
    }

    pub fn create_wrapper(self, tree: &mut ListTree, is_root: bool) -> WrapperId {
        tree.create_wrapper(is_root)
    }

    /// Creates a detached item. Meta of another style is replaced by this
    /// style's default.
    pub fn create_item(self, tree: &mut ListTree, content: &str, meta: Option<&ItemMeta>) -> ItemId {
        let meta = meta
            .map(|meta| self.normalize_meta(meta))
            .unwrap_or_else(|| self.default_meta());
        tree.create_item(content.to_string(), meta)
    }

    pub fn read_content(self, tree: &ListTree, item: ItemId) -> String {
        tree.content(item).unwrap_or_default().to_string()
    }

    pub fn read_meta(self, tree: &ListTree, item: ItemId) -> ItemMeta {
        tree.item(item)
            .map(|node| self.normalize_meta(&node.meta))
            .unwrap_or_else(|| self.default_meta())
    }

    pub fn default_meta(self) -> ItemMeta {
        ItemMeta::default_for(self.style())
    }

    pub fn normalize_meta(self, meta: &ItemMeta) -> ItemMeta {
        if meta.style() == self.style() {
            meta.clone()
        } else {
            self.default_meta()
        }
    }

    pub fn set_checked(self, tree: &mut ListTree, item: ItemId, checked: bool) -> bool {
        if self != ListRenderer::Checklist {
            return false;
        }
        let Some(node) = tree.item_mut(item) else {
            return false;
        };
        node.meta = ItemMeta::Checklist { checked };
        true
    }

    pub fn toggle_checked(self, tree: &mut ListTree, item: ItemId) -> Option<bool> {
        let checked = !tree.item(item)?.meta.checked()?;
        self.set_checked(tree, item, checked).then_some(checked)
    }
}

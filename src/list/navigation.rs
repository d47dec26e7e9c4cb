//! Read-only traversal helpers over the live tree, plus the one clean-up
//! every structural edit relies on: dropping wrappers that became empty.

use super::tree::{ItemId, ListTree, WrapperId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiblingDirection {
    After,
    Before,
}

pub fn get_children_wrapper(tree: &ListTree, item: ItemId) -> Option<WrapperId> {
    tree.children_wrapper(item)
}

/// Items of a wrapper in document order. With `first_level_only` unset, all
/// descendants are included depth-first.
pub fn get_wrapper_items(tree: &ListTree, wrapper: WrapperId, first_level_only: bool) -> Vec<ItemId> {
    let mut result = Vec::new();
    collect_items(tree, wrapper, first_level_only, &mut result);
    result
}

fn collect_items(tree: &ListTree, wrapper: WrapperId, first_level_only: bool, out: &mut Vec<ItemId>) {
    let Some(node) = tree.wrapper(wrapper) else {
        return;
    };
    for &item in node.items() {
        out.push(item);
        if first_level_only {
            continue;
        }
        if let Some(children) = tree.children_wrapper(item) {
            collect_items(tree, children, false, out);
        }
    }
}

pub fn get_child_items(tree: &ListTree, item: ItemId, first_level_only: bool) -> Vec<ItemId> {
    tree.children_wrapper(item)
        .map(|wrapper| get_wrapper_items(tree, wrapper, first_level_only))
        .unwrap_or_default()
}

/// Siblings on one side of `item`. `After` lists them in document order,
/// `Before` starts with the nearest one.
pub fn get_siblings(tree: &ListTree, item: ItemId, direction: SiblingDirection) -> Vec<ItemId> {
    let Some(parent) = tree.parent_wrapper(item) else {
        return Vec::new();
    };
    let Some(index) = tree.index_in_parent(item) else {
        return Vec::new();
    };
    let Some(node) = tree.wrapper(parent) else {
        return Vec::new();
    };
    match direction {
        SiblingDirection::After => node.items()[index + 1..].to_vec(),
        SiblingDirection::Before => node.items()[..index].iter().rev().copied().collect(),
    }
}

pub fn previous_sibling(tree: &ListTree, item: ItemId) -> Option<ItemId> {
    let index = tree.index_in_parent(item)?;
    let parent = tree.parent_wrapper(item)?;
    index
        .checked_sub(1)
        .and_then(|prev| tree.wrapper(parent)?.items().get(prev).copied())
}

pub fn next_sibling(tree: &ListTree, item: ItemId) -> Option<ItemId> {
    let index = tree.index_in_parent(item)?;
    let parent = tree.parent_wrapper(item)?;
    tree.wrapper(parent)?.items().get(index + 1).copied()
}

pub fn has_sublist(tree: &ListTree, item: ItemId) -> bool {
    tree.children_wrapper(item)
        .and_then(|wrapper| tree.wrapper(wrapper))
        .map(|node| !node.items().is_empty())
        .unwrap_or(false)
}

pub fn is_last_item(tree: &ListTree, item: ItemId) -> bool {
    next_sibling(tree, item).is_none()
}

/// The item owning the wrapper `item` sits in; `None` on the first level.
pub fn parent_item(tree: &ListTree, item: ItemId) -> Option<ItemId> {
    tree.owner(tree.parent_wrapper(item)?)
}

/// Nesting level, counting first-level items as 1.
pub fn item_level(tree: &ListTree, item: ItemId) -> usize {
    let mut level = 1;
    let mut current = item;
    while let Some(parent) = parent_item(tree, current) {
        level += 1;
        current = parent;
    }
    level
}

/// Follows the last child down as far as it goes.
pub fn deepest_last_descendant(tree: &ListTree, item: ItemId) -> ItemId {
    let mut current = item;
    while let Some(last) = tree
        .children_wrapper(current)
        .and_then(|wrapper| tree.wrapper(wrapper))
        .and_then(|node| node.items().last().copied())
    {
        current = last;
    }
    current
}

/// Removes `wrapper` when it holds no items. Root wrappers are kept.
pub fn remove_wrapper_if_empty(tree: &mut ListTree, wrapper: WrapperId) -> bool {
    let Some(node) = tree.wrapper(wrapper) else {
        return false;
    };
    if node.is_root() || !node.items().is_empty() {
        return false;
    }
    tree.remove_wrapper(wrapper)
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod navigation_tests;

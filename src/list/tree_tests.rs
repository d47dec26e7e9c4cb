use super::*;

fn leaf(tree: &mut ListTree, content: &str) -> ItemId {
    tree.create_item(content.to_string(), ItemMeta::Unordered {})
}

#[test]
fn removed_item_frees_its_subtree() {
    let mut tree = ListTree::new();
    let root = tree.create_wrapper(true);
    let parent = leaf(&mut tree, "parent");
    let child = leaf(&mut tree, "child");
    let children = tree.create_wrapper(false);
    tree.append_item(root, parent);
    tree.attach_children(parent, children);
    tree.append_item(children, child);

    assert!(tree.remove_item(parent));
    assert!(tree.item(parent).is_none());
    assert!(tree.item(child).is_none());
    assert!(tree.wrapper(children).is_none());
    assert_eq!(tree.live_item_count(), 0);
    assert!(tree.wrapper(root).unwrap().items().is_empty());
}

#[test]
fn freed_slots_are_reused_and_stale_ids_stay_dead() {
    let mut tree = ListTree::new();
    let root = tree.create_wrapper(true);
    let old = leaf(&mut tree, "old");
    tree.append_item(root, old);
    tree.remove_item(old);

    let new = leaf(&mut tree, "new");
    assert_ne!(old, new);
    assert_eq!(tree.items.slots.len(), 1);
    assert!(tree.item(old).is_none());
    assert!(!tree.set_content(old, "ghost".to_string()));
    assert_eq!(tree.content(new), Some("new"));
}

#[test]
fn rebuilding_a_list_does_not_grow_the_arenas() {
    let mut tree = ListTree::new();
    let mut root = tree.create_wrapper(true);
    for round in 0..50 {
        tree.remove_wrapper(root);
        root = tree.create_wrapper(true);
        for n in 0..3 {
            let item = leaf(&mut tree, &format!("{round}.{n}"));
            tree.append_item(root, item);
        }
    }
    assert_eq!(tree.live_item_count(), 3);
    assert!(tree.items.slots.len() <= 6);
    assert!(tree.wrappers.slots.len() <= 2);
}

#[test]
fn an_item_cannot_move_below_itself() {
    let mut tree = ListTree::new();
    let root = tree.create_wrapper(true);
    let parent = leaf(&mut tree, "parent");
    let children = tree.create_wrapper(false);
    tree.append_item(root, parent);
    tree.attach_children(parent, children);

    assert!(!tree.append_item(children, parent));
    assert_eq!(tree.root_of(parent), Some(root));
}

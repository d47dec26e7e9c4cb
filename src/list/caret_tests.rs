use super::*;
use crate::list::ItemMeta;
use crate::list::content::plain_text;

struct Sample {
    tree: ListTree,
    root: WrapperId,
    a: ItemId,
    b: ItemId,
    c: ItemId,
}

/// a("abc") with child b("b"), followed by c("longer").
fn sample() -> Sample {
    let mut tree = ListTree::new();
    let root = tree.create_wrapper(true);
    let a = tree.create_item("abc".to_string(), ItemMeta::Unordered {});
    tree.append_item(root, a);
    let children = tree.create_wrapper(false);
    tree.attach_children(a, children);
    let b = tree.create_item("b".to_string(), ItemMeta::Unordered {});
    tree.append_item(children, b);
    let c = tree.create_item("longer".to_string(), ItemMeta::Unordered {});
    tree.append_item(root, c);
    Sample { tree, root, a, b, c }
}

#[test]
fn anchor_clamps_offset_and_checks_root() {
    let mut s = sample();
    assert_eq!(Caret::new(s.a, 99).anchor(&s.tree, s.root), Some((s.a, 3)));
    assert_eq!(Caret::new(s.b, 0).anchor(&s.tree, s.root), Some((s.b, 0)));

    let other_root = s.tree.create_wrapper(true);
    assert_eq!(Caret::new(s.a, 0).anchor(&s.tree, other_root), None);

    s.tree.remove_item(s.c);
    assert_eq!(Caret::new(s.c, 0).anchor(&s.tree, s.root), None);
}

#[test]
fn start_and_end_checks() {
    let s = sample();
    assert!(Caret::at_start(s.a).is_at_start());
    assert!(Caret::at_end(&s.tree, s.a).is_at_end(&s.tree));
    assert!(!Caret::new(s.a, 1).is_at_end(&s.tree));
}

#[test]
fn extract_to_end_leaves_the_head() {
    let mut s = sample();
    let tail = Caret::new(s.c, 2).extract_to_end(&mut s.tree);
    assert_eq!(tail.as_deref(), Some("nger"));
    assert_eq!(s.tree.content(s.c), Some("lo"));
}

#[test]
fn typing_inserts_escaped_text() {
    let mut s = sample();
    let mut caret = Caret::new(s.a, 1);
    assert!(caret.insert_text(&mut s.tree, "<"));
    assert_eq!(s.tree.content(s.a).map(plain_text).as_deref(), Some("a<bc"));
    assert_eq!(caret.offset, 2);
}

#[test]
fn delete_backward_removes_one_character() {
    let mut s = sample();
    let mut caret = Caret::new(s.a, 2);
    assert!(caret.delete_backward(&mut s.tree));
    assert_eq!(s.tree.content(s.a), Some("ac"));
    assert_eq!(caret.offset, 1);

    let mut start = Caret::at_start(s.a);
    assert!(!start.delete_backward(&mut s.tree));
}

#[test]
fn horizontal_moves_cross_items_in_document_order() {
    let s = sample();
    let mut caret = Caret::at_end(&s.tree, s.a);
    assert!(caret.move_right(&s.tree, s.root));
    assert_eq!(caret, Caret::at_start(s.b));

    assert!(caret.move_left(&s.tree, s.root));
    assert_eq!(caret, Caret::new(s.a, 3));

    let mut last = Caret::at_end(&s.tree, s.c);
    assert!(!last.move_right(&s.tree, s.root));
}

#[test]
fn vertical_moves_clamp_the_offset() {
    let s = sample();
    let mut caret = Caret::new(s.a, 2);
    assert!(caret.move_down(&s.tree, s.root));
    assert_eq!(caret, Caret::new(s.b, 1));
    assert!(caret.move_down(&s.tree, s.root));
    assert_eq!(caret, Caret::new(s.c, 1));

    let mut first = Caret::at_start(s.a);
    assert!(!first.move_up(&s.tree, s.root));
}

#[test]
fn home_and_end() {
    let s = sample();
    let mut caret = Caret::new(s.c, 3);
    caret.move_end(&s.tree);
    assert_eq!(caret.offset, 6);
    caret.move_home();
    assert_eq!(caret.offset, 0);
}

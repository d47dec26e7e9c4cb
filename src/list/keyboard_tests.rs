use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::*;
use crate::list::navigation::get_wrapper_items;
use crate::list::{
    BlockCommand, BlockCommands, BlockData, ItemMeta, ListConfig, ListData, ListItem,
};

fn item(content: &str, items: Vec<ListItem>) -> ListItem {
    ListItem::new(content, ItemMeta::Unordered {}).with_items(items)
}

fn tabulator(items: Vec<ListItem>) -> ListTabulator {
    tabulator_with(ListStyle::Unordered, items, ListConfig::default())
}

fn tabulator_with(style: ListStyle, items: Vec<ListItem>, config: ListConfig) -> ListTabulator {
    let data = ListData::new(style).with_items(items).restyle(style);
    let mut list = ListTabulator::new(Some(data), config, false);
    list.render();
    list
}

fn find(list: &ListTabulator, content: &str) -> ItemId {
    let root = list.root().unwrap();
    get_wrapper_items(list.tree(), root, false)
        .into_iter()
        .find(|id| list.tree().content(*id) == Some(content))
        .unwrap_or_else(|| panic!("no item with content {content:?}"))
}

fn outline(list: &ListTabulator) -> Vec<String> {
    fn walk(items: &[ListItem], depth: usize, out: &mut Vec<String>) {
        for item in items {
            out.push(format!("{}{}", "  ".repeat(depth), item.content));
            walk(&item.items, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(&list.save(None).items, 0, &mut out);
    out
}

fn press(
    list: &mut ListTabulator,
    code: KeyCode,
    modifiers: KeyModifiers,
    caret: &mut Caret,
    host: &mut BlockCommands,
) -> KeyOutcome {
    let key = KeyPress::new(KeyEvent::new(code, modifiers));
    list.handle_key(&key, caret, host)
}

fn enter(list: &mut ListTabulator, caret: &mut Caret, host: &mut BlockCommands) -> KeyOutcome {
    press(list, KeyCode::Enter, KeyModifiers::NONE, caret, host)
}

fn backspace(list: &mut ListTabulator, caret: &mut Caret) -> KeyOutcome {
    let mut host = BlockCommands::new(0);
    press(list, KeyCode::Backspace, KeyModifiers::NONE, caret, &mut host)
}

fn tab(list: &mut ListTabulator, caret: &mut Caret) -> KeyOutcome {
    let mut host = BlockCommands::new(0);
    press(list, KeyCode::Tab, KeyModifiers::NONE, caret, &mut host)
}

fn shift_tab(list: &mut ListTabulator, caret: &mut Caret) -> KeyOutcome {
    let mut host = BlockCommands::new(0);
    press(list, KeyCode::BackTab, KeyModifiers::SHIFT, caret, &mut host)
}

#[test]
fn classifies_list_keys() {
    let intent = |code, modifiers| KeyIntent::from_event(&KeyEvent::new(code, modifiers));
    assert_eq!(intent(KeyCode::Enter, KeyModifiers::NONE), Some(KeyIntent::Enter));
    assert_eq!(intent(KeyCode::Backspace, KeyModifiers::NONE), Some(KeyIntent::Backspace));
    assert_eq!(intent(KeyCode::Tab, KeyModifiers::NONE), Some(KeyIntent::Indent));
    assert_eq!(intent(KeyCode::Tab, KeyModifiers::SHIFT), Some(KeyIntent::Outdent));
    assert_eq!(intent(KeyCode::BackTab, KeyModifiers::SHIFT), Some(KeyIntent::Outdent));
    assert_eq!(intent(KeyCode::Char('a'), KeyModifiers::NONE), None);

    let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    assert_eq!(KeyIntent::from_event(&release), None);
}

#[test]
fn enter_splits_item_at_caret() {
    let mut list = tabulator(vec![item("ABCD", vec![])]);
    let target = find(&list, "ABCD");
    let mut caret = Caret::new(target, 2);
    let mut host = BlockCommands::new(0);

    let outcome = enter(&mut list, &mut caret, &mut host);

    assert_eq!(outcome, KeyOutcome::CONSUMED);
    assert_eq!(outline(&list), vec!["AB", "CD"]);
    assert_eq!(caret, Caret::new(find(&list, "CD"), 0));
    assert_eq!(list.save(None).item_count(), 2);
    assert!(host.is_empty());
}

#[test]
fn enter_split_hands_children_to_new_item() {
    let mut list = tabulator(vec![item("AB", vec![item("x", vec![])])]);
    let target = find(&list, "AB");
    let mut caret = Caret::new(target, 1);
    let mut host = BlockCommands::new(0);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["A", "B", "  x"]);
}

#[test]
fn enter_split_keeps_inline_markup_balanced() {
    let mut list = tabulator(vec![item("<b>bold</b> text", vec![])]);
    let target = find(&list, "<b>bold</b> text");
    let mut caret = Caret::new(target, 2);
    let mut host = BlockCommands::new(0);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["<b>bo</b>", "<b>ld</b> text"]);
}

#[test]
fn enter_on_trailing_empty_item_leaves_the_list() {
    let mut list = tabulator(vec![item("a", vec![]), item("", vec![])]);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(2);

    let outcome = enter(&mut list, &mut caret, &mut host);

    assert_eq!(outcome, KeyOutcome::CONSUMED);
    assert_eq!(outline(&list), vec!["a"]);
    assert_eq!(
        host.commands(),
        &[
            BlockCommand::Insert {
                index: 3,
                block: BlockData::empty_paragraph(),
            },
            BlockCommand::Focus {
                index: 3,
                position: CaretPosition::Start,
            },
        ]
    );
}

#[test]
fn enter_on_empty_nested_item_outdents_it() {
    let mut list = tabulator(vec![item("a", vec![item("b", vec![]), item("", vec![])])]);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(0);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["a", "  b", ""]);
    assert!(host.is_empty());
}

#[test]
fn enter_on_empty_middle_item_splits_the_list() {
    let mut list = tabulator(vec![
        item("a", vec![]),
        item("", vec![]),
        item("b", vec![item("b1", vec![])]),
        item("c", vec![]),
    ]);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(3);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["a"]);
    let expected_tail = ListData::new(ListStyle::Unordered).with_items(vec![
        item("b", vec![item("b1", vec![])]),
        item("c", vec![]),
    ]);
    assert_eq!(
        host.commands(),
        &[
            BlockCommand::Insert {
                index: 4,
                block: BlockData::List(expected_tail),
            },
            BlockCommand::Insert {
                index: 4,
                block: BlockData::empty_paragraph(),
            },
            BlockCommand::Focus {
                index: 4,
                position: CaretPosition::Start,
            },
        ]
    );
}

#[test]
fn split_ordered_list_restarts_numbering() {
    let mut list = tabulator_with(
        ListStyle::Ordered,
        vec![item("a", vec![]), item("", vec![]), item("b", vec![])],
        ListConfig::default(),
    );
    list.change_start_with(5);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(0);

    enter(&mut list, &mut caret, &mut host);

    let Some(BlockCommand::Insert {
        block: BlockData::List(tail),
        ..
    }) = host.commands().first()
    else {
        panic!("expected a list block to be inserted");
    };
    assert_eq!(tail.style, ListStyle::Ordered);
    assert_eq!(tail.start, Some(1));
    assert_eq!(list.save(None).start, Some(5));
}

#[test]
fn splitting_at_an_empty_item_with_children_lifts_them_to_the_new_list() {
    let mut list = tabulator(vec![
        item("a", vec![]),
        item("", vec![item("x", vec![]), item("y", vec![])]),
        item("b", vec![]),
    ]);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(0);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["a"]);
    let Some(BlockCommand::Insert {
        index: 1,
        block: BlockData::List(tail),
    }) = host.commands().first()
    else {
        panic!("expected a list block to be inserted after the current one");
    };
    assert_eq!(
        tail.items,
        vec![item("x", vec![item("y", vec![])]), item("b", vec![])]
    );
}

#[test]
fn enter_on_empty_first_item_turns_it_into_a_paragraph_before_the_list() {
    let mut list = tabulator(vec![item("", vec![]), item("b", vec![])]);
    let empty = find(&list, "");
    let mut caret = Caret::at_start(empty);
    let mut host = BlockCommands::new(4);

    enter(&mut list, &mut caret, &mut host);

    assert_eq!(outline(&list), vec!["b"]);
    assert_eq!(
        host.commands(),
        &[
            BlockCommand::Insert {
                index: 4,
                block: BlockData::empty_paragraph(),
            },
            BlockCommand::Focus {
                index: 4,
                position: CaretPosition::Start,
            },
        ]
    );
}

#[test]
fn enter_while_composing_changes_nothing() {
    let mut list = tabulator(vec![item("ABCD", vec![])]);
    let target = find(&list, "ABCD");
    let mut caret = Caret::new(target, 2);
    let mut host = BlockCommands::new(0);
    let key = KeyPress::new(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).composing(true);

    let outcome = list.handle_key(&key, &mut caret, &mut host);

    assert_eq!(outcome, KeyOutcome::CONSUMED);
    assert_eq!(outline(&list), vec!["ABCD"]);
    assert_eq!(caret, Caret::new(target, 2));
}

#[test]
fn tab_nests_item_under_previous_sibling() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![])]);
    let b = find(&list, "b");
    let mut caret = Caret::at_start(b);

    assert_eq!(tab(&mut list, &mut caret), KeyOutcome::CONSUMED);

    assert_eq!(outline(&list), vec!["a", "  b"]);
    assert_eq!(caret, Caret::new(b, 1));
}

#[test]
fn tab_on_first_item_is_refused() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![])]);
    let mut caret = Caret::at_start(find(&list, "a"));

    tab(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "b"]);
}

#[test]
fn tab_respects_max_level() {
    let mut list = tabulator_with(
        ListStyle::Unordered,
        vec![item("a", vec![item("b", vec![]), item("c", vec![])])],
        ListConfig::default().with_max_level(2),
    );
    let before = list.save(None);
    let mut caret = Caret::at_start(find(&list, "c"));

    tab(&mut list, &mut caret);

    assert_eq!(list.save(None), before);
}

#[test]
fn tab_lifts_children_of_the_indented_item() {
    let mut list = tabulator(vec![
        item("a", vec![item("a1", vec![])]),
        item("b", vec![item("c", vec![])]),
    ]);
    let mut caret = Caret::at_start(find(&list, "b"));

    tab(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "  a1", "  b", "  c"]);
    assert!(!has_sublist(list.tree(), find(&list, "b")));
}

#[test]
fn shift_tab_pulls_following_siblings_along() {
    let mut list = tabulator(vec![item(
        "a",
        vec![item("b", vec![]), item("c", vec![]), item("d", vec![])],
    )]);
    let mut caret = Caret::at_start(find(&list, "c"));

    assert_eq!(shift_tab(&mut list, &mut caret), KeyOutcome::CONSUMED);

    assert_eq!(outline(&list), vec!["a", "  b", "c", "  d"]);
}

#[test]
fn shift_tab_drops_the_emptied_wrapper() {
    let mut list = tabulator(vec![item("a", vec![item("b", vec![])])]);
    let mut caret = Caret::at_start(find(&list, "b"));

    shift_tab(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "b"]);
    assert_eq!(
        get_children_wrapper(list.tree(), find(&list, "a")),
        None
    );
}

#[test]
fn shift_tab_on_first_level_is_a_no_op() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![])]);
    let mut caret = Caret::at_start(find(&list, "b"));

    shift_tab(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "b"]);
}

#[test]
fn indent_then_outdent_restores_the_list() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![]), item("c", vec![])]);
    let before = list.save(None);
    let mut caret = Caret::at_start(find(&list, "b"));

    tab(&mut list, &mut caret);
    assert_eq!(outline(&list), vec!["a", "  b", "c"]);
    shift_tab(&mut list, &mut caret);

    assert_eq!(list.save(None), before);
}

#[test]
fn backspace_at_start_merges_into_previous_item() {
    let mut list = tabulator(vec![item("X", vec![]), item("Y", vec![])]);
    let x = find(&list, "X");
    let mut caret = Caret::at_start(find(&list, "Y"));

    let outcome = backspace(&mut list, &mut caret);

    assert_eq!(outcome, KeyOutcome::CONSUMED);
    assert_eq!(outline(&list), vec!["XY"]);
    assert_eq!(caret, Caret::new(x, 1));
    assert_eq!(list.save(None).item_count(), 1);
}

#[test]
fn backspace_merges_into_deepest_descendant_of_previous_sibling() {
    let mut list = tabulator(vec![
        item("a", vec![item("b", vec![item("c", vec![])])]),
        item("d", vec![]),
    ]);
    let mut caret = Caret::at_start(find(&list, "d"));

    backspace(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "  b", "    cd"]);
}

#[test]
fn backspace_appends_children_to_previous_target() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![item("c", vec![])])]);
    let mut caret = Caret::at_start(find(&list, "b"));

    backspace(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["ab", "  c"]);
}

#[test]
fn backspace_on_first_child_merges_into_parent_and_prepends_children() {
    let mut list = tabulator(vec![item(
        "a",
        vec![item("b", vec![item("c", vec![])]), item("d", vec![])],
    )]);
    let mut caret = Caret::at_start(find(&list, "b"));

    backspace(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["ab", "  c", "  d"]);
}

#[test]
fn backspace_inside_text_is_left_to_native_deletion() {
    let mut list = tabulator(vec![item("a", vec![item("b", vec![])]), item("c", vec![])]);
    let mut caret = Caret::new(find(&list, "c"), 1);

    let outcome = backspace(&mut list, &mut caret);
    assert_eq!(outcome, KeyOutcome::IGNORED);

    let mut nested = Caret::new(find(&list, "b"), 1);
    let outcome = backspace(&mut list, &mut nested);
    assert_eq!(
        outcome,
        KeyOutcome {
            prevent_default: false,
            stop_propagation: true,
        }
    );
    assert_eq!(outline(&list), vec!["a", "  b", "c"]);
}

#[test]
fn backspace_at_start_of_the_list_is_left_to_the_host() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![])]);
    let mut caret = Caret::at_start(find(&list, "a"));

    let outcome = backspace(&mut list, &mut caret);

    assert_eq!(
        outcome,
        KeyOutcome {
            prevent_default: true,
            stop_propagation: false,
        }
    );
    assert_eq!(outline(&list), vec!["a", "b"]);
}

#[test]
fn read_only_list_ignores_keys() {
    let data = ListData::new(ListStyle::Unordered).with_items(vec![item("a", vec![]), item("b", vec![])]);
    let mut list = ListTabulator::new(Some(data), ListConfig::default(), true);
    list.render();
    let mut caret = Caret::at_start(find(&list, "b"));

    assert_eq!(tab(&mut list, &mut caret), KeyOutcome::IGNORED);
    assert_eq!(outline(&list), vec!["a", "b"]);
}

#[test]
fn keys_for_carets_outside_the_list_do_nothing() {
    let mut list = tabulator(vec![item("a", vec![]), item("b", vec![])]);
    let stale = find(&list, "b");
    list.render();
    let mut caret = Caret::at_start(stale);

    tab(&mut list, &mut caret);

    assert_eq!(outline(&list), vec!["a", "b"]);
}

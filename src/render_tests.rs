use ratatui::style::Modifier;

use super::*;
use crate::list::{ListConfig, ListData, ListItem, ListStyle, ListTabulator};

fn unordered(content: &str, items: Vec<ListItem>) -> ListItem {
    ListItem::new(content, ItemMeta::Unordered {}).with_items(items)
}

fn rendered(data: ListData) -> ListTabulator {
    let mut list = ListTabulator::new(Some(data), ListConfig::default(), false);
    list.render();
    list
}

fn project(list: &ListTabulator, caret: Option<&Caret>, width: usize) -> RenderResult {
    render_list(
        list.tree(),
        list.root().unwrap(),
        list.renderer(),
        caret,
        width,
        &Theme::default(),
    )
}

fn line_texts(result: &RenderResult) -> Vec<String> {
    result
        .lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

#[test]
fn nested_bullets_are_indented() {
    let list = rendered(ListData::new(ListStyle::Unordered).with_items(vec![
        unordered("a", vec![unordered("b", vec![unordered("c", vec![])])]),
        unordered("two &amp; three", vec![]),
    ]));
    let result = project(&list, None, 80);
    assert_eq!(
        line_texts(&result),
        vec!["• a", "  ◦ b", "    ▪ c", "• two & three"]
    );
    assert_eq!(result.total_lines, 4);
    assert_eq!(result.cursor, None);
}

#[test]
fn ordered_root_uses_start_and_counter_type() {
    let list = rendered(ListData {
        style: ListStyle::Ordered,
        start: Some(3),
        counter_type: Some(CounterType::UpperRoman),
        items: vec![
            ListItem::new("a", ItemMeta::default_for(ListStyle::Ordered)),
            ListItem::new("b", ItemMeta::default_for(ListStyle::Ordered)),
        ],
    });
    assert_eq!(line_texts(&project(&list, None, 80)), vec!["III. a", "IV. b"]);
}

#[test]
fn nested_ordered_levels_read_the_owner_meta() {
    let child = |content: &str| ListItem::new(content, ItemMeta::default_for(ListStyle::Ordered));
    let parent = ListItem::new(
        "parent",
        ItemMeta::Ordered {
            start: Some(5),
            counter_type: Some(CounterType::LowerAlpha),
        },
    )
    .with_items(vec![child("x"), child("y")]);
    let list = rendered(ListData::new(ListStyle::Ordered).with_items(vec![parent]));
    assert_eq!(
        line_texts(&project(&list, None, 80)),
        vec!["1. parent", "   e. x", "   f. y"]
    );
}

#[test]
fn checklist_shows_checkbox_state() {
    let theme = Theme::default();
    let list = rendered(ListData::new(ListStyle::Checklist).with_items(vec![
        ListItem::new("done", ItemMeta::Checklist { checked: true }),
        ListItem::new("open", ItemMeta::Checklist { checked: false }),
    ]));
    let result = project(&list, None, 80);
    assert_eq!(line_texts(&result), vec!["[✓] done", "[ ] open"]);

    let done = result.lines[0]
        .spans
        .iter()
        .find(|span| span.content == "done")
        .unwrap();
    assert_eq!(done.style.fg, Some(theme.checked_fg));
    let open = result.lines[1]
        .spans
        .iter()
        .find(|span| span.content == "open")
        .unwrap();
    assert_eq!(open.style.fg, None);
}

#[test]
fn long_items_wrap_below_the_marker() {
    let list = rendered(
        ListData::new(ListStyle::Unordered).with_items(vec![unordered("alpha beta gamma", vec![])]),
    );
    let result = project(&list, None, 12);
    assert_eq!(line_texts(&result), vec!["• alpha beta", "  gamma"]);
}

#[test]
fn cursor_follows_the_caret() {
    let list = rendered(ListData::new(ListStyle::Unordered).with_items(vec![
        unordered("abc", vec![]),
        unordered("alpha beta gamma", vec![]),
    ]));
    let first = list.first_item().unwrap();
    let result = project(&list, Some(&Caret::new(first, 2)), 80);
    assert_eq!(
        result.cursor,
        Some(CursorVisualPosition { line: 0, column: 4 })
    );

    let root = list.root().unwrap();
    let second = list.tree().wrapper(root).unwrap().items()[1];
    let result = project(&list, Some(&Caret::new(second, 11)), 12);
    assert_eq!(
        result.cursor,
        Some(CursorVisualPosition { line: 2, column: 2 })
    );
}

#[test]
fn cursor_in_an_empty_item_sits_after_the_marker() {
    let list = rendered(ListData::new(ListStyle::Checklist));
    let item = list.first_item().unwrap();
    let result = project(&list, Some(&Caret::at_start(item)), 80);
    assert_eq!(line_texts(&result), vec!["[ ]"]);
    assert_eq!(
        result.cursor,
        Some(CursorVisualPosition { line: 0, column: 4 })
    );
}

#[test]
fn cursor_at_the_end_of_an_item() {
    let list = rendered(ListData::new(ListStyle::Unordered).with_items(vec![unordered("<b>ab</b>", vec![])]));
    let item = list.first_item().unwrap();
    let result = project(&list, Some(&Caret::new(item, 2)), 80);
    assert_eq!(
        result.cursor,
        Some(CursorVisualPosition { line: 0, column: 4 })
    );
}

#[test]
fn inline_markup_maps_to_styles() {
    let theme = Theme::default();
    let list = rendered(ListData::new(ListStyle::Unordered).with_items(vec![unordered(
        "<b>bold</b> <i>it</i> <a href=\"x\">link</a> <mark>hi</mark>",
        vec![],
    )]));
    let result = project(&list, None, 80);
    let span = |text: &str| {
        result.lines[0]
            .spans
            .iter()
            .find(|span| span.content == text)
            .unwrap()
            .style
    };
    assert!(span("bold").add_modifier.contains(Modifier::BOLD));
    assert!(span("it").add_modifier.contains(Modifier::ITALIC));
    assert_eq!(span("link").fg, Some(theme.link_color));
    assert_eq!(span("hi").bg, Some(theme.highlight_bg));
}

#[test]
fn paragraphs_render_without_prefix() {
    let result = render_paragraph("hello world", Some(5), 80, &Theme::default());
    assert_eq!(line_texts(&result), vec!["hello world"]);
    assert_eq!(
        result.cursor,
        Some(CursorVisualPosition { line: 0, column: 5 })
    );

    let empty = render_paragraph("", Some(0), 80, &Theme::default());
    assert_eq!(line_texts(&empty), vec![""]);
    assert_eq!(
        empty.cursor,
        Some(CursorVisualPosition { line: 0, column: 0 })
    );
}

#[test]
fn counter_labels() {
    assert_eq!(counter_label(4, CounterType::Numeric), "4");
    assert_eq!(counter_label(1994, CounterType::UpperRoman), "MCMXCIV");
    assert_eq!(counter_label(9, CounterType::LowerRoman), "ix");
    assert_eq!(counter_label(1, CounterType::UpperAlpha), "A");
    assert_eq!(counter_label(27, CounterType::LowerAlpha), "aa");
}

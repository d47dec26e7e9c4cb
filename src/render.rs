use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::list::content::{TextRun, text_runs};
use crate::list::navigation::get_children_wrapper;
use crate::list::{Caret, CounterType, ItemId, ItemMeta, ListRenderer, ListTree, WrapperId};
use crate::theme::Theme;

const BULLETS: [&str; 3] = ["• ", "◦ ", "▪ "];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

/// Lays out the list below `root` for a terminal of `width` columns. The
/// cursor position is reported when `caret` points into the list.
pub fn render_list(
    tree: &ListTree,
    root: WrapperId,
    renderer: ListRenderer,
    caret: Option<&Caret>,
    width: usize,
    theme: &Theme,
) -> RenderResult {
    let mut projection = Projection {
        tree,
        renderer,
        caret: caret.copied(),
        theme,
        canvas: Canvas::new(width.max(1)),
    };
    projection.render_wrapper(root, "", 0);
    projection.canvas.finish()
}

/// Lays out a paragraph block holding inline markup.
pub fn render_paragraph(
    content: &str,
    cursor: Option<usize>,
    width: usize,
    theme: &Theme,
) -> RenderResult {
    let mut canvas = Canvas::new(width.max(1));
    let fragments = collect_fragments(content, Style::default(), cursor, theme);
    let lines = wrap_fragments(&fragments, &[], &[], canvas.wrap_width);
    canvas.consume_lines(lines);
    canvas.finish()
}

/// Label of an ordered item counter, without the trailing dot.
pub fn counter_label(value: u32, counter_type: CounterType) -> String {
    match counter_type {
        CounterType::Numeric => value.to_string(),
        CounterType::UpperRoman => roman(value),
        CounterType::LowerRoman => roman(value).to_lowercase(),
        CounterType::UpperAlpha => alpha(value),
        CounterType::LowerAlpha => alpha(value).to_lowercase(),
    }
}

fn roman(mut value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if value == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    for (step, numeral) in NUMERALS {
        while value >= step {
            out.push_str(numeral);
            value -= step;
        }
    }
    out
}

fn alpha(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(char::from(b'A' + (value % 26) as u8));
        value /= 26;
    }
    letters.iter().rev().collect()
}

struct Projection<'a> {
    tree: &'a ListTree,
    renderer: ListRenderer,
    caret: Option<Caret>,
    theme: &'a Theme,
    canvas: Canvas,
}

impl Projection<'_> {
    fn render_wrapper(&mut self, wrapper: WrapperId, prefix: &str, depth: usize) {
        let tree = self.tree;
        let Some(node) = tree.wrapper(wrapper) else {
            return;
        };
        let (start, counter_type) = self.counter_base(wrapper);
        for (index, &item) in node.items().iter().enumerate() {
            let value = start.saturating_add(index as u32);
            let marker = self.marker(item, depth, value, counter_type);
            let continuation = format!("{}{}", prefix, " ".repeat(visible_width(&marker)));
            self.render_item(item, prefix, &marker, &continuation);
            if let Some(children) = get_children_wrapper(tree, item) {
                self.render_wrapper(children, &continuation, depth + 1);
            }
        }
    }

    /// First counter value and numbering scheme of a wrapper. The root reads
    /// them from the list, nested levels from the meta of the owning item.
    fn counter_base(&self, wrapper: WrapperId) -> (u32, CounterType) {
        let Some(node) = self.tree.wrapper(wrapper) else {
            return (1, CounterType::default());
        };
        if node.is_root() {
            return (node.start.unwrap_or(1), node.counter_type.unwrap_or_default());
        }
        match node
            .owner()
            .and_then(|owner| self.tree.item(owner))
            .map(|owner| &owner.meta)
        {
            Some(ItemMeta::Ordered {
                start,
                counter_type,
            }) => (start.unwrap_or(1), counter_type.unwrap_or_default()),
            _ => (1, CounterType::default()),
        }
    }

    fn marker(&self, item: ItemId, depth: usize, value: u32, counter_type: CounterType) -> String {
        match self.renderer {
            ListRenderer::Unordered => BULLETS[depth % BULLETS.len()].to_string(),
            ListRenderer::Ordered => format!("{}. ", counter_label(value, counter_type)),
            ListRenderer::Checklist => {
                if self.is_checked(item) {
                    "[✓] ".to_string()
                } else {
                    "[ ] ".to_string()
                }
            }
        }
    }

    fn is_checked(&self, item: ItemId) -> bool {
        self.tree
            .item(item)
            .and_then(|node| node.meta.checked())
            .unwrap_or(false)
    }

    fn render_item(&mut self, item: ItemId, prefix: &str, marker: &str, continuation: &str) {
        let content = self.tree.content(item).unwrap_or_default();
        let base = if self.renderer == ListRenderer::Checklist && self.is_checked(item) {
            self.theme.checked_style()
        } else {
            Style::default()
        };
        let cursor = self
            .caret
            .filter(|caret| caret.item == item)
            .map(|caret| caret.offset);
        let fragments = collect_fragments(content, base, cursor, self.theme);

        let first_prefix = [
            LineSegment::plain(prefix),
            LineSegment {
                text: marker.to_string(),
                style: self.theme.marker_style(self.caret.is_some()),
            },
        ];
        let continuation_prefix = [LineSegment::plain(continuation)];
        let lines = wrap_fragments(
            &fragments,
            &first_prefix,
            &continuation_prefix,
            self.canvas.wrap_width,
        );
        self.canvas.consume_lines(lines);
    }
}

struct Canvas {
    wrap_width: usize,
    cursor: Option<CursorVisualPosition>,
    lines: Vec<Line<'static>>,
}

impl Canvas {
    fn new(wrap_width: usize) -> Self {
        Self {
            wrap_width,
            cursor: None,
            lines: Vec::new(),
        }
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .filter(|segment| !segment.text.is_empty())
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            if let Some(column) = output.cursor {
                self.cursor = Some(CursorVisualPosition {
                    line: self.lines.len(),
                    column,
                });
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

impl LineSegment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            style: Style::default(),
        }
    }
}

#[derive(Clone)]
struct LineOutput {
    spans: Vec<LineSegment>,
    cursor: Option<u16>,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    cursor: Option<usize>,
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

fn merge_style(base: Style, run: &TextRun, theme: &Theme) -> Style {
    let mut style = base;
    if run.has_tag(&["b", "strong"]) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if run.has_tag(&["i", "em"]) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if run.has_tag(&["u", "ins"]) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if run.has_tag(&["s", "strike", "del"]) {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if run.has_tag(&["code"]) {
        style = style.add_modifier(Modifier::DIM);
    }
    if run.has_tag(&["mark"]) {
        style = style.patch(theme.highlight_style());
    }
    if run.has_tag(&["a"]) {
        style = style.patch(theme.link_style());
    }
    style
}

/// Splits inline markup into words and whitespace. `cursor` is a visible
/// character offset and is attached to the fragment it falls into.
fn collect_fragments(
    content: &str,
    base: Style,
    cursor: Option<usize>,
    theme: &Theme,
) -> Vec<FragmentItem> {
    let mut collector = FragmentCollector::default();
    let mut offset = 0;
    let mut last_style = base;
    for run in text_runs(content) {
        let style = merge_style(base, &run, theme);
        last_style = style;
        for ch in run.text.chars() {
            if cursor == Some(offset) {
                collector.pending_cursor = true;
            }
            offset += 1;
            collector.push_char(ch, style);
        }
    }
    if cursor.is_some_and(|cursor| cursor >= offset) {
        collector.pending_cursor = true;
    }
    collector.finish(last_style)
}

#[derive(Default)]
struct FragmentCollector {
    fragments: Vec<FragmentItem>,
    builder: Option<TokenBuilder>,
    pending_cursor: bool,
}

impl FragmentCollector {
    fn push_char(&mut self, ch: char, style: Style) {
        match ch {
            '\r' => {}
            '\n' => {
                self.flush(style);
                self.fragments.push(FragmentItem::LineBreak);
            }
            '\t' => {
                for _ in 0..4 {
                    self.push_visible(' ', style);
                }
            }
            _ => self.push_visible(ch, style),
        }
    }

    fn push_visible(&mut self, ch: char, style: Style) {
        let is_whitespace = ch.is_whitespace();
        let continues = self
            .builder
            .as_ref()
            .is_some_and(|existing| existing.matches(style, is_whitespace));
        if !continues {
            if let Some(existing) = self.builder.take() {
                self.fragments.push(FragmentItem::Token(existing.finish()));
            }
            self.builder = Some(TokenBuilder::new(style, is_whitespace));
        }
        if let Some(current) = self.builder.as_mut() {
            current.take_cursor(&mut self.pending_cursor);
            current.push_char(ch);
        }
    }

    /// Ends the current token. A pending cursor with no token to attach to
    /// gets a zero-width fragment of its own.
    fn flush(&mut self, style: Style) {
        if let Some(mut token) = self.builder.take() {
            token.take_cursor(&mut self.pending_cursor);
            self.fragments.push(FragmentItem::Token(token.finish()));
        } else if self.pending_cursor {
            self.pending_cursor = false;
            self.fragments.push(FragmentItem::Token(Fragment {
                text: String::new(),
                style,
                kind: FragmentKind::Word,
                width: 0,
                cursor: Some(0),
            }));
        }
    }

    fn finish(mut self, style: Style) -> Vec<FragmentItem> {
        self.flush(style);
        self.fragments
    }
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    cursor: Option<usize>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            cursor: None,
        }
    }

    /// Tokens break on style changes as well, so one fragment maps to one span.
    fn matches(&self, style: Style, is_whitespace: bool) -> bool {
        self.style == style
            && matches!(
                (self.kind, is_whitespace),
                (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
            )
    }

    fn take_cursor(&mut self, pending: &mut bool) {
        if *pending {
            self.cursor = Some(self.width);
            *pending = false;
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            cursor: self.cursor,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &[LineSegment],
    continuation_prefix: &[LineSegment],
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > builder.prefix_width
                        && builder.width + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix);
                    }
                    builder.consume_pending(&mut pending_whitespace);
                    builder.append_token(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    cursor: Option<u16>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &[LineSegment]) -> Self {
        let prefix_width = prefix.iter().map(|segment| visible_width(&segment.text)).sum();
        Self {
            segments: prefix.to_vec(),
            cursor: None,
            width: prefix_width,
            prefix_width,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        if let Some(offset) = fragment.cursor {
            self.cursor = Some((self.width + offset) as u16);
        }
        if !fragment.text.is_empty() {
            self.width += fragment.width;
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
        }
    }

    fn build_line(self) -> LineOutput {
        LineOutput {
            spans: self.segments,
            cursor: self.cursor,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;

use tdoc::{ChecklistItem, Paragraph, Span};

use super::content::{entity_at, escape_text};
use super::data::{ItemMeta, ListData, ListItem, ListStyle};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// Foreign markup handed to the list on paste.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    Text(String),
}

impl Markup {
    pub fn element(tag: &str, children: Vec<Markup>) -> Self {
        Markup::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        Markup::Text(text.to_string())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Markup::Element { tag, .. } => Some(tag),
            Markup::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Markup] {
        match self {
            Markup::Element { children, .. } => children,
            Markup::Text(_) => &[],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Markup::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            Markup::Text(_) => None,
        }
    }

    fn is_tag(&self, name: &str) -> bool {
        self.tag().is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    pub fn text_content(&self) -> String {
        match self {
            Markup::Text(text) => text.clone(),
            Markup::Element { children, .. } => children.iter().map(Markup::text_content).collect(),
        }
    }

    /// Reads the first element of an HTML fragment. Unclosed elements are
    /// closed at the end of input and stray `<` characters are kept as text.
    pub fn parse(source: &str) -> Option<Markup> {
        let mut parser = MarkupParser::new(source);
        parser.run();
        parser
            .finish()
            .into_iter()
            .find(|node| matches!(node, Markup::Element { .. }))
    }
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Markup>,
}

struct MarkupParser<'a> {
    source: &'a str,
    pos: usize,
    roots: Vec<Markup>,
    stack: Vec<OpenElement>,
    text: String,
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            roots: Vec::new(),
            stack: Vec::new(),
            text: String::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.source.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.flush_text();
                self.pos = match rest.find("-->") {
                    Some(end) => self.pos + end + 3,
                    None => self.source.len(),
                };
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.flush_text();
                self.pos = match rest.find('>') {
                    Some(end) => self.pos + end + 1,
                    None => self.source.len(),
                };
            } else if rest.starts_with("</") && self.closing_tag() {
                continue;
            } else if rest.starts_with('<') && self.opening_tag() {
                continue;
            } else if let Some((len, ch)) = entity_at(rest) {
                self.text.push(ch);
                self.pos += len;
            } else if let Some(ch) = rest.chars().next() {
                self.text.push(ch);
                self.pos += ch.len_utf8();
            }
        }
    }

    fn closing_tag(&mut self) -> bool {
        let rest = self.rest();
        let name: String = rest[2..]
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric())
            .collect();
        if name.is_empty() {
            return false;
        }
        let Some(end) = rest.find('>') else {
            return false;
        };
        self.flush_text();
        self.pos += end + 1;
        let name = name.to_ascii_lowercase();
        if let Some(depth) = self.stack.iter().rposition(|open| open.tag == name) {
            while self.stack.len() > depth {
                self.close_top();
            }
        }
        true
    }

    fn opening_tag(&mut self) -> bool {
        let rest = self.rest();
        let name: String = rest[1..]
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric())
            .collect();
        if name.is_empty() || !name.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return false;
        }
        let Some((attrs, consumed, self_closing)) = parse_attributes(&rest[1 + name.len()..]) else {
            return false;
        };
        self.flush_text();
        self.pos += 1 + name.len() + consumed;

        let tag = name.to_ascii_lowercase();
        if tag == "li" {
            self.close_open_list_item();
        }
        let element = OpenElement {
            tag,
            attrs,
            children: Vec::new(),
        };
        if self_closing || VOID_ELEMENTS.contains(&element.tag.as_str()) {
            self.push_node(Markup::Element {
                tag: element.tag,
                attrs: element.attrs,
                children: Vec::new(),
            });
        } else {
            self.stack.push(element);
        }
        true
    }

    /// A new `<li>` ends the previous one of the same list.
    fn close_open_list_item(&mut self) {
        let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| matches!(open.tag.as_str(), "li" | "ul" | "ol"))
        else {
            return;
        };
        if self.stack[depth].tag == "li" {
            while self.stack.len() > depth {
                self.close_top();
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(open) = self.stack.pop() {
            self.push_node(Markup::Element {
                tag: open.tag,
                attrs: open.attrs,
                children: open.children,
            });
        }
    }

    fn push_node(&mut self, node: Markup) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        self.push_node(Markup::Text(text));
    }

    fn finish(mut self) -> Vec<Markup> {
        self.flush_text();
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.roots
    }
}

/// Parses the attribute section of a tag up to and including `>`. Returns
/// the attributes, the number of bytes consumed and whether the tag closes
/// itself.
fn parse_attributes(source: &str) -> Option<(Vec<(String, String)>, usize, bool)> {
    let bytes = source.as_bytes();
    let mut attrs = Vec::new();
    let mut idx = 0;
    let mut self_closing = false;

    loop {
        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        match *bytes.get(idx)? {
            b'>' => return Some((attrs, idx + 1, self_closing)),
            b'/' => {
                self_closing = true;
                idx += 1;
                continue;
            }
            _ => {}
        }

        let name_start = idx;
        while idx < bytes.len()
            && !bytes[idx].is_ascii_whitespace()
            && !matches!(bytes[idx], b'=' | b'>' | b'/')
        {
            idx += 1;
        }
        let name = source[name_start..idx].to_ascii_lowercase();
        self_closing = false;

        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        let mut value = String::new();
        if bytes.get(idx) == Some(&b'=') {
            idx += 1;
            while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
                idx += 1;
            }
            match *bytes.get(idx)? {
                quote @ (b'"' | b'\'') => {
                    let close = source[idx + 1..].find(quote as char)?;
                    value = source[idx + 1..idx + 1 + close].to_string();
                    idx += close + 2;
                }
                _ => {
                    let value_start = idx;
                    while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>' {
                        idx += 1;
                    }
                    value = source[value_start..idx].to_string();
                }
            }
        }
        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
}

/// Converts a pasted `<ul>`, `<ol>` or `<li>` into list data. Only direct
/// `<li>` children are items; an item's sub-items come from its first direct
/// child list of the same kind. Returns `None` for any other root.
pub fn normalize(markup: &Markup) -> Option<ListData> {
    let tag = markup.tag()?.to_ascii_lowercase();
    let style = match tag.as_str() {
        "ol" => ListStyle::Ordered,
        "ul" | "li" => ListStyle::Unordered,
        _ => return None,
    };
    let list_tag = if style == ListStyle::Ordered { "ol" } else { "ul" };

    let items = if tag == "li" {
        vec![pasted_item(markup, list_tag, style)]
    } else {
        pasted_items(markup, list_tag, style)
    };
    Some(ListData::new(style).with_items(items))
}

fn pasted_items(list: &Markup, list_tag: &str, style: ListStyle) -> Vec<ListItem> {
    list.children()
        .iter()
        .filter(|child| child.is_tag("li"))
        .map(|child| pasted_item(child, list_tag, style))
        .collect()
}

fn pasted_item(item: &Markup, list_tag: &str, style: ListStyle) -> ListItem {
    let sub_items = item
        .children()
        .iter()
        .find(|child| child.is_tag(list_tag))
        .map(|sublist| pasted_items(sublist, list_tag, style))
        .unwrap_or_default();
    let text = first_text(item);
    ListItem::new(escape_text(text.trim()), ItemMeta::default_for(style)).with_items(sub_items)
}

/// Text of the first meaningful child node. Nested lists carry no item text.
fn first_text(item: &Markup) -> String {
    let first = item.children().iter().find(|child| match child {
        Markup::Text(text) => !text.trim().is_empty(),
        Markup::Element { .. } => true,
    });
    match first {
        Some(Markup::Text(text)) => text.clone(),
        Some(element) if !["ul", "ol", "li"].iter().any(|tag| element.is_tag(tag)) => {
            element.text_content()
        }
        _ => String::new(),
    }
}

/// Builds paste markup from a list paragraph of a `tdoc` document.
pub fn markup_from_paragraph(paragraph: &Paragraph) -> Option<Markup> {
    match paragraph {
        Paragraph::UnorderedList { entries } => Some(entries_markup("ul", entries)),
        Paragraph::OrderedList { entries } => Some(entries_markup("ol", entries)),
        Paragraph::Checklist { items } => Some(Markup::element(
            "ul",
            items.iter().map(checklist_item_markup).collect(),
        )),
        _ => None,
    }
}

fn entries_markup(tag: &str, entries: &[Vec<Paragraph>]) -> Markup {
    let items = entries
        .iter()
        .map(|entry| {
            let mut children = Vec::new();
            for paragraph in entry {
                match markup_from_paragraph(paragraph) {
                    Some(list) => children.push(list),
                    None if children.is_empty() && paragraph.paragraph_type().is_leaf() => {
                        children.push(Markup::Text(spans_text(paragraph.content())));
                    }
                    None => {}
                }
            }
            Markup::element("li", children)
        })
        .collect();
    Markup::element(tag, items)
}

fn checklist_item_markup(item: &ChecklistItem) -> Markup {
    let mut children = vec![Markup::Text(spans_text(&item.content))];
    if !item.children.is_empty() {
        children.push(Markup::element(
            "ul",
            item.children.iter().map(checklist_item_markup).collect(),
        ));
    }
    Markup::element("li", children)
}

fn spans_text(spans: &[Span]) -> String {
    let mut text = String::new();
    for span in spans {
        text.push_str(&span.text);
        text.push_str(&spans_text(&span.children));
    }
    text
}

#[cfg(test)]
#[path = "paste_tests.rs"]
mod paste_tests;

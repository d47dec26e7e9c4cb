//! Inline rich-text content of a list item.
//!
//! Content is stored as inline markup (`<b>`, `<i>`, `<a href="…">`, entities).
//! Caret offsets count visible characters: tags are zero-width, an entity is
//! a single character.

const VOID_ELEMENTS: &[&str] = &["br", "img", "wbr", "hr"];

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Text,
    Open(String),
    Close(String),
    Void,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub tags: Vec<String>,
}

impl TextRun {
    pub fn has_tag(&self, names: &[&str]) -> bool {
        self.tags.iter().any(|tag| names.contains(&tag.as_str()))
    }
}

fn tokenize(content: &str) -> Vec<Token> {
    let bytes = content.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'<' {
            if let Some((kind, end)) = parse_tag(content, idx) {
                if text_start < idx {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        start: text_start,
                        end: idx,
                    });
                }
                tokens.push(Token {
                    kind,
                    start: idx,
                    end,
                });
                idx = end;
                text_start = end;
                continue;
            }
        }
        idx += 1;
    }

    if text_start < bytes.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            start: text_start,
            end: bytes.len(),
        });
    }
    tokens
}

fn parse_tag(content: &str, start: usize) -> Option<(TokenKind, usize)> {
    let rest = &content[start + 1..];
    let closing = rest.starts_with('/');
    let name_part = if closing { &rest[1..] } else { rest };
    let first = name_part.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let end = start + 1 + tag_end(rest)?;
    let name: String = name_part
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let raw = &content[start..end];

    let kind = if closing {
        TokenKind::Close(name)
    } else if raw.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
        TokenKind::Void
    } else {
        TokenKind::Open(name)
    };
    Some((kind, end))
}

/// Byte length of a tag body up to and including its `>`. A `>` inside a
/// quoted attribute value does not end the tag.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, byte) in rest.bytes().enumerate() {
        match (quote, byte) {
            (Some(open), _) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(idx + 1),
            (None, _) => {}
        }
    }
    None
}

/// Resolves an entity at the start of `text`, returning its byte length and
/// the character it stands for.
pub(crate) fn entity_at(text: &str) -> Option<(usize, char)> {
    if !text.starts_with('&') {
        return None;
    }
    let semi = text[1..].find(';').filter(|idx| *idx > 0 && *idx <= 10)? + 1;
    let body = &text[1..semi];
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or(body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((semi + 1, ch))
}

/// Byte ranges of the visible units of a text token, paired with the
/// character each one displays.
fn units(text: &str) -> Vec<(usize, usize, char)> {
    let mut result = Vec::new();
    let mut idx = 0;
    while idx < text.len() {
        if let Some((len, ch)) = entity_at(&text[idx..]) {
            result.push((idx, idx + len, ch));
            idx += len;
            continue;
        }
        let Some(ch) = text[idx..].chars().next() else {
            break;
        };
        result.push((idx, idx + ch.len_utf8(), ch));
        idx += ch.len_utf8();
    }
    result
}

pub fn visible_len(content: &str) -> usize {
    tokenize(content)
        .iter()
        .filter(|token| token.kind == TokenKind::Text)
        .map(|token| units(&content[token.start..token.end]).len())
        .sum()
}

pub fn plain_text(content: &str) -> String {
    let mut text = String::new();
    for token in tokenize(content) {
        if token.kind == TokenKind::Text {
            text.extend(units(&content[token.start..token.end]).iter().map(|u| u.2));
        }
    }
    text
}

pub fn is_blank(content: &str) -> bool {
    plain_text(content).trim().is_empty()
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Splits `content` at a visible offset. Elements open at the split point are
/// closed at the end of the head and reopened at the start of the tail.
pub fn split_at(content: &str, offset: usize) -> (String, String) {
    let total = visible_len(content);
    if offset >= total {
        return (content.to_string(), String::new());
    }
    if offset == 0 {
        return (String::new(), content.to_string());
    }

    let tokens = tokenize(content);
    let mut head = String::new();
    let mut open: Vec<(String, &str)> = Vec::new();
    let mut count = 0;
    let mut idx = 0;
    let mut tail_start = content.len();

    while idx < tokens.len() {
        let token = &tokens[idx];
        let raw = &content[token.start..token.end];
        if count == offset {
            if let TokenKind::Close(name) = &token.kind {
                head.push_str(raw);
                pop_open(&mut open, name);
                idx += 1;
                continue;
            }
            tail_start = token.start;
            break;
        }
        match &token.kind {
            TokenKind::Text => {
                let text_units = units(raw);
                if count + text_units.len() <= offset {
                    head.push_str(raw);
                    count += text_units.len();
                } else {
                    let split = text_units[offset - count].0;
                    head.push_str(&raw[..split]);
                    tail_start = token.start + split;
                    count = offset;
                    break;
                }
            }
            TokenKind::Open(name) => {
                head.push_str(raw);
                open.push((name.clone(), raw));
            }
            TokenKind::Close(name) => {
                head.push_str(raw);
                pop_open(&mut open, name);
            }
            TokenKind::Void => head.push_str(raw),
        }
        idx += 1;
    }

    let mut tail = String::new();
    for (name, raw) in open.iter().rev() {
        head.push_str("</");
        head.push_str(name);
        head.push('>');
        tail.insert_str(0, raw);
    }
    tail.push_str(&content[tail_start..]);

    (head, tail)
}

fn pop_open(open: &mut Vec<(String, &str)>, name: &str) {
    if let Some(pos) = open.iter().rposition(|(open_name, _)| open_name == name) {
        open.remove(pos);
    }
}

/// Byte position at which text typed at `offset` is inserted. Typing joins
/// the run of the character before the caret.
fn insertion_point(content: &str, tokens: &[Token], offset: usize) -> usize {
    let mut count = 0;
    for token in tokens.iter().filter(|token| token.kind == TokenKind::Text) {
        let text_units = units(&content[token.start..token.end]);
        if offset == 0 {
            return token.start;
        }
        if count < offset && offset <= count + text_units.len() {
            return token.start + text_units[offset - count - 1].1;
        }
        count += text_units.len();
    }
    if offset == 0 {
        if let Some(first_close) = tokens
            .iter()
            .find(|token| matches!(token.kind, TokenKind::Close(_)))
        {
            return first_close.start;
        }
    }
    content.len()
}

pub fn insert_text_at(content: &str, offset: usize, text: &str) -> String {
    let tokens = tokenize(content);
    let position = insertion_point(content, &tokens, offset);
    let mut result = String::with_capacity(content.len() + text.len());
    result.push_str(&content[..position]);
    result.push_str(&escape_text(text));
    result.push_str(&content[position..]);
    result
}

/// Removes the visible character ending at `offset`. Elements that wrapped
/// only that character are removed with it.
pub fn remove_before(content: &str, offset: usize) -> String {
    if offset == 0 {
        return content.to_string();
    }
    let tokens = tokenize(content);
    let mut count = 0;
    for (position, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Text {
            continue;
        }
        let text_units = units(&content[token.start..token.end]);
        if count < offset && offset <= count + text_units.len() {
            let (start, end, _) = text_units[offset - count - 1];
            let mut range = token.start + start..token.start + end;
            if text_units.len() == 1 {
                range = emptied_elements(&tokens, position);
            }
            let mut result = content.to_string();
            result.replace_range(range, "");
            return result;
        }
        count += text_units.len();
    }
    content.to_string()
}

/// Byte range of the text token at `position` widened over the elements
/// whose only content it is.
fn emptied_elements(tokens: &[Token], position: usize) -> std::ops::Range<usize> {
    let mut range = tokens[position].start..tokens[position].end;
    let (mut before, mut after) = (position, position + 1);
    while before > 0 && after < tokens.len() {
        match (&tokens[before - 1].kind, &tokens[after].kind) {
            (TokenKind::Open(open), TokenKind::Close(close)) if open == close => {
                range = tokens[before - 1].start..tokens[after].end;
                before -= 1;
                after += 1;
            }
            _ => break,
        }
    }
    range
}

/// Visible text split into runs, each carrying the names of the elements
/// wrapping it (outermost first).
pub fn text_runs(content: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    for token in tokenize(content) {
        match token.kind {
            TokenKind::Text => {
                let text: String = units(&content[token.start..token.end])
                    .iter()
                    .map(|unit| unit.2)
                    .collect();
                runs.push(TextRun {
                    text,
                    tags: open.clone(),
                });
            }
            TokenKind::Open(name) => open.push(name),
            TokenKind::Close(name) => {
                if let Some(pos) = open.iter().rposition(|open_name| *open_name == name) {
                    open.remove(pos);
                }
            }
            TokenKind::Void => {}
        }
    }
    runs
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod content_tests;

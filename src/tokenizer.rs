//! Finds class lists in generated markup.
//!
//! Only the values of `class=` and `className=` attributes are read. A value
//! may be a quoted string, a template literal, or one of those wrapped in
//! braces (`className={"..."}`). Everything else in the source is ignored,
//! and malformed code around an attribute does not stop the scan.

/// A single class name and the byte offset where it starts in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassToken<'s> {
    pub value: &'s str,
    pub start: usize,
}

impl ClassToken<'_> {
    pub fn end(&self) -> usize {
        self.start + self.value.len()
    }
}

/// One whitespace-separated piece of a class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'s> {
    Class(ClassToken<'s>),
    /// A word built around a template interpolation such as `bg-${tone}`.
    /// It is never validated and is kept as written.
    Dynamic(&'s str),
}

/// A class attribute value. `start..end` is the byte span of the value
/// without its quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAttribute<'s> {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub pieces: Vec<Piece<'s>>,
}

impl<'s> ClassAttribute<'s> {
    /// The static class names of this attribute, in order.
    pub fn tokens(&self) -> impl Iterator<Item = ClassToken<'s>> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Class(token) => Some(*token),
            Piece::Dynamic(_) => None,
        })
    }
}

const CLASS: &str = "class";
const CLASS_NAME: &str = "className";

/// Every class attribute in `source`, in document order.
pub fn class_attributes(source: &str) -> Vec<ClassAttribute<'_>> {
    let mut found = Vec::new();
    let mut resume = 0;
    for (idx, _) in source.match_indices(CLASS) {
        // Inside a value that was already read.
        if idx < resume {
            continue;
        }
        let name = if source[idx..].starts_with(CLASS_NAME) {
            CLASS_NAME
        } else {
            CLASS
        };
        if !is_attr_boundary(source, idx, name.len()) {
            continue;
        }
        let Some(attribute) = parse_attribute(source, idx, name) else {
            continue;
        };
        log::trace!(
            "{name} attribute at byte {} with {} piece(s)",
            attribute.start,
            attribute.pieces.len()
        );
        resume = attribute.end;
        found.push(attribute);
    }
    found
}

/// Every static class name in `source`, in document order. Duplicates are
/// kept.
pub fn tokenize(source: &str) -> Vec<ClassToken<'_>> {
    class_attributes(source)
        .iter()
        .flat_map(|attribute| attribute.tokens().collect::<Vec<_>>())
        .collect()
}

/// Splits a bare class string on whitespace. `base` is added to every
/// offset, for strings that were cut out of a larger text.
pub fn split_classes(classes: &str, base: usize) -> Vec<ClassToken<'_>> {
    let mut tokens = Vec::new();
    let mut word_start = None;
    for (idx, ch) in classes.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = word_start.take() {
                tokens.push(ClassToken {
                    value: &classes[start..idx],
                    start: base + start,
                });
            }
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if let Some(start) = word_start {
        tokens.push(ClassToken {
            value: &classes[start..],
            start: base + start,
        });
    }
    tokens
}

fn parse_attribute<'s>(source: &'s str, idx: usize, name: &'static str) -> Option<ClassAttribute<'s>> {
    let mut pos = skip_whitespace(source, idx + name.len());
    if !source[pos..].starts_with('=') {
        return None;
    }
    pos = skip_whitespace(source, pos + 1);

    let (mut quote, _) = next_char(source, pos)?;
    // Backslash escapes only exist in JavaScript strings, not in markup.
    let mut escapes = false;
    if quote == '{' {
        pos = skip_whitespace(source, pos + 1);
        quote = next_char(source, pos)?.0;
        escapes = true;
    }
    match quote {
        '"' | '\'' => {}
        '`' => escapes = true,
        _ => return None,
    }

    let start = pos + 1;
    let (pieces, end) = scan_class_list(source, start, quote, escapes)?;
    Some(ClassAttribute {
        name,
        start,
        end,
        pieces,
    })
}

/// Reads words up to the closing `quote`. Returns the pieces and the offset
/// of the closing quote, or `None` when the value never closes.
fn scan_class_list(source: &str, start: usize, quote: char, escapes: bool) -> Option<(Vec<Piece<'_>>, usize)> {
    let mut pieces = Vec::new();
    let mut word_start = None;
    let mut dynamic = false;
    let mut idx = start;

    while let Some((ch, size)) = next_char(source, idx) {
        if ch == quote {
            push_word(source, &mut pieces, word_start.take(), idx, &mut dynamic);
            return Some((pieces, idx));
        }
        if ch.is_whitespace() {
            push_word(source, &mut pieces, word_start.take(), idx, &mut dynamic);
            idx += size;
            continue;
        }
        word_start.get_or_insert(idx);

        if escapes && ch == '\\' {
            idx += size;
            if let Some((_, escaped)) = next_char(source, idx) {
                idx += escaped;
            }
            continue;
        }
        if quote == '`' && ch == '$' && source[idx + size..].starts_with('{') {
            dynamic = true;
            idx = skip_braced_expression(source, idx + size + 1);
            continue;
        }
        idx += size;
    }
    None
}

fn push_word<'s>(
    source: &'s str,
    pieces: &mut Vec<Piece<'s>>,
    start: Option<usize>,
    end: usize,
    dynamic: &mut bool,
) {
    let Some(start) = start else {
        return;
    };
    let value = &source[start..end];
    if std::mem::take(dynamic) {
        pieces.push(Piece::Dynamic(value));
    } else {
        pieces.push(Piece::Class(ClassToken { value, start }));
    }
}

/// Skips past the `}` closing an interpolation whose `${` ends just before
/// `idx`.
fn skip_braced_expression(source: &str, mut idx: usize) -> usize {
    let mut depth = 1;
    while let Some((ch, size)) = next_char(source, idx) {
        idx += size;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    idx
}

fn is_attr_boundary(source: &str, idx: usize, len: usize) -> bool {
    let prev = source[..idx].chars().next_back();
    let next = source[idx + len..].chars().next();

    let prev_ok = prev.map_or(true, |c| !is_name_char(c));
    let next_ok = next.map_or(false, |c| c.is_whitespace() || c == '=');
    prev_ok && next_ok
}

// Characters that can continue an attribute or identifier name.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '$' | '.' | ':')
}

fn skip_whitespace(source: &str, mut idx: usize) -> usize {
    while let Some((ch, size)) = next_char(source, idx) {
        if !ch.is_whitespace() {
            break;
        }
        idx += size;
    }
    idx
}

fn next_char(source: &str, idx: usize) -> Option<(char, usize)> {
    source.get(idx..)?.chars().next().map(|ch| (ch, ch.len_utf8()))
}

#![forbid(unsafe_code)]

//! Element locators.
//!
//! Registration options name handles and items with a small selector
//! language: type (`li`), class (`.drag-handle`), id (`#inbox`), universal
//! (`*`), compounds (`li.note.pinned`), descendant chains (`.card .grip`) and
//! comma-separated alternatives (`.grip, button`).

use std::fmt;
use std::str::FromStr;

/// Error produced when a selector string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one of its comma alternatives) is blank.
    Empty,
    /// A `.` or `#` was not followed by a name.
    MissingName { offset: usize },
    /// A character outside the supported grammar.
    Unexpected { ch: char, offset: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::MissingName { offset } => {
                write!(f, "expected a name after prefix at byte {offset}")
            }
            Self::Unexpected { ch, offset } => {
                write!(f, "unexpected character {ch:?} at byte {offset}")
            }
        }
    }
}

impl std::error::Error for SelectorError {}

/// What a selector needs to know about a candidate element.
pub trait Matchable: Sized {
    /// Element type name, e.g. `"li"`.
    fn tag(&self) -> &str;
    /// Unique element id, if any.
    fn element_id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    /// The enclosing element, if any.
    fn parent_element(&self) -> Option<Self>;
}

/// One compound selector such as `li.note#first`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches<M: Matchable>(&self, el: &M) -> bool {
        self.tag.as_deref().is_none_or(|tag| el.tag() == tag)
            && self
                .id
                .as_deref()
                .is_none_or(|id| el.element_id() == Some(id))
            && self.classes.iter().all(|class| el.has_class(class))
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    /// Alternatives; each one is a descendant chain, outermost first.
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        let mut base = 0;
        for part in input.split(',') {
            let chain = parse_chain(part, base)?;
            alternatives.push(chain);
            base += part.len() + 1;
        }
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// The selector that matches every element.
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            alternatives: vec![vec![Compound::default()]],
        }
    }

    /// Source text, trimmed.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `el` matches any alternative.
    pub fn matches<M: Matchable>(&self, el: &M) -> bool {
        self.alternatives
            .iter()
            .any(|chain| chain_matches(chain, el))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn chain_matches<M: Matchable>(chain: &[Compound], el: &M) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(el) {
        return false;
    }
    // Descendant-only chains can be matched greedily, innermost first.
    let mut remaining = ancestors.iter().rev().peekable();
    let mut cursor = el.parent_element();
    while let Some(want) = remaining.peek() {
        let Some(current) = cursor else {
            return false;
        };
        if want.matches(&current) {
            remaining.next();
        }
        cursor = current.parent_element();
    }
    true
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_chain(part: &str, base: usize) -> Result<Vec<Compound>, SelectorError> {
    let mut chain = Vec::new();
    let mut word_start = None;
    // Trailing sentinel flushes the last word.
    for (idx, ch) in part.char_indices().chain(std::iter::once((part.len(), ' '))) {
        if ch.is_whitespace() {
            if let Some(start) = word_start.take() {
                chain.push(parse_compound(&part[start..idx], base + start)?);
            }
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if chain.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(chain)
}

fn parse_compound(word: &str, base: usize) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = word.char_indices().peekable();

    match chars.peek() {
        Some(&(_, '*')) => {
            chars.next();
        }
        Some(&(_, ch)) if is_name_char(ch) => {
            let mut tag = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if !is_name_char(ch) {
                    break;
                }
                tag.push(ch);
                chars.next();
            }
            compound.tag = Some(tag);
        }
        _ => {}
    }

    while let Some((idx, prefix)) = chars.next() {
        if prefix != '.' && prefix != '#' {
            return Err(SelectorError::Unexpected {
                ch: prefix,
                offset: base + idx,
            });
        }
        let mut name = String::new();
        while let Some(&(_, ch)) = chars.peek() {
            if !is_name_char(ch) {
                break;
            }
            name.push(ch);
            chars.next();
        }
        if name.is_empty() {
            return Err(SelectorError::MissingName { offset: base + idx });
        }
        if prefix == '.' {
            compound.classes.push(name);
        } else {
            compound.id = Some(name);
        }
    }
    Ok(compound)
}

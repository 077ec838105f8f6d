//! A small CSS selector subset: compound selectors (`li`, `.acfb-data`,
//! `span.label`, `#q`, `*`) joined by the descendant combinator.

use std::fmt;
use std::str::FromStr;

use crate::error::{ChipfieldError, Result};

/// One compound selector, e.g. `span.label` or `.acfb-data`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// `None` matches any tag (also written `*`).
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
}

/// A descendant chain of compound selectors, matched right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let parts = input
            .split_whitespace()
            .map(|chunk| parse_compound(input, chunk))
            .collect::<Result<Vec<_>>>()?;

        if parts.is_empty() {
            return Err(invalid(input, "empty selector"));
        }
        Ok(Self { parts })
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.parts
    }

    /// The rightmost compound: the one the matched element itself must satisfy.
    pub fn subject(&self) -> &Compound {
        // parse() guarantees at least one part
        &self.parts[self.parts.len() - 1]
    }

    /// `self other`: elements matching `other` inside elements matching `self`.
    pub fn descendant(&self, other: &Selector) -> Selector {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().cloned());
        Selector { parts }
    }
}

impl FromStr for Selector {
    type Err = ChipfieldError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{tag}")?,
            None if self.classes.is_empty() && self.id.is_none() => write!(f, "*")?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

// ─── Parsing ───────────────────────────────────────────────

fn invalid(selector: &str, reason: impl Into<String>) -> ChipfieldError {
    ChipfieldError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(full: &str, chunk: &str) -> Result<Compound> {
    let mut compound = Compound::default();
    let mut rest = chunk;

    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped;
    } else {
        let tag_len: usize = rest
            .chars()
            .take_while(|c| is_ident_char(*c))
            .map(|c| c.len_utf8())
            .sum();
        if tag_len > 0 {
            compound.tag = Some(rest[..tag_len].to_ascii_lowercase());
            rest = &rest[tag_len..];
        }
    }

    while let Some(marker) = rest.chars().next() {
        let body = &rest[marker.len_utf8()..];
        let ident_len: usize = body
            .chars()
            .take_while(|c| is_ident_char(*c))
            .map(|c| c.len_utf8())
            .sum();
        if ident_len == 0 {
            return Err(invalid(full, format!("expected a name after {marker:?}")));
        }
        let ident = body[..ident_len].to_string();

        match marker {
            '.' => compound.classes.push(ident),
            '#' if compound.id.is_none() => compound.id = Some(ident),
            '#' => return Err(invalid(full, "more than one #id in a compound")),
            other => return Err(invalid(full, format!("unsupported character {other:?}"))),
        }
        rest = &body[ident_len..];
    }

    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class() {
        let sel = Selector::parse(".acfb-data").unwrap();
        assert_eq!(sel.compounds().len(), 1);
        assert_eq!(sel.subject().classes, vec!["acfb-data"]);
        assert!(sel.subject().tag.is_none());
    }

    #[test]
    fn test_parse_descendant_chain() {
        let sel = Selector::parse(".acfb-data  span.close").unwrap();
        assert_eq!(sel.compounds().len(), 2);
        assert_eq!(sel.subject().tag.as_deref(), Some("span"));
        assert_eq!(sel.subject().classes, vec!["close"]);
        assert_eq!(sel.to_string(), ".acfb-data span.close");
    }

    #[test]
    fn test_parse_id_and_universal() {
        let sel = Selector::parse("input#q.acfb-input").unwrap();
        assert_eq!(sel.subject().id.as_deref(), Some("q"));
        assert_eq!(sel.subject().tag.as_deref(), Some("input"));

        let any = Selector::parse("*").unwrap();
        assert_eq!(any.subject(), &Compound::default());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("   ").is_err());
        assert!(Selector::parse("li.").is_err());
        assert!(Selector::parse("li>span").is_err());
        assert!(Selector::parse("#a#b").is_err());
    }

    #[test]
    fn test_descendant_join() {
        let found = Selector::parse(".acfb-data").unwrap();
        let label: Selector = "span.label".parse().unwrap();
        assert_eq!(found.descendant(&label).to_string(), ".acfb-data span.label");
    }
}

use crate::dom::host::{FormHost, NodeId};
use crate::error::SelectorError;

// ============================================================================
// Selector model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Prefix,
    Suffix,
    Contains,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub test: Option<(AttrOp, String)>,
}

/// `tag#id.class[attr]` with every part optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
}

/// Compounds joined by descendant combinators; the last one is the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
}

/// Comma-separated list; matches when any member matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub source: String,
    pub selectors: Vec<ComplexSelector>,
}

// ============================================================================
// Parsing
// ============================================================================

struct SelectorParse<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParse<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unsupported(&self, found: char) -> SelectorError {
        SelectorError::Unsupported {
            selector: self.source.to_string(),
            found,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.pos += 1;
            } else if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.unsupported('\\')),
                }
            } else {
                break;
            }
        }
        match out.is_empty() {
            true => Err(self.unsupported(self.peek().unwrap_or(' '))),
            false => Ok(out),
        }
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == q => return Ok(out),
                        Some(c) => out.push(c),
                        None => {
                            return Err(SelectorError::UnterminatedAttribute(
                                self.source.to_string(),
                            ));
                        }
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrSelector { name, test: None });
            }
            Some('=') => None,
            Some('^') => Some(AttrOp::Prefix),
            Some('$') => Some(AttrOp::Suffix),
            Some('*') => Some(AttrOp::Contains),
            Some('~') => Some(AttrOp::Word),
            Some(other) => return Err(self.unsupported(other)),
            None => return Err(SelectorError::UnterminatedAttribute(self.source.to_string())),
        };
        if op.is_some() {
            self.pos += 1;
        }
        let next = self.bump();
        if next != Some('=') {
            return Err(self.unsupported(next.unwrap_or(' ')));
        }

        self.skip_ws();
        let value = self.attr_value()?;
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(SelectorError::UnterminatedAttribute(self.source.to_string()));
        }
        Ok(AttrSelector {
            name,
            test: Some((op.unwrap_or(AttrOp::Equals), value)),
        })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
            }
            Some(c) if c.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                Some(c) if c.is_whitespace() || c == ',' => break,
                None => break,
                Some(other) => return Err(self.unsupported(other)),
            }
        }

        if self.pos == start {
            return Err(self.unsupported(self.peek().unwrap_or(' ')));
        }
        Ok(compound)
    }
}

pub fn parse_selector(source: &str) -> Result<SelectorList, SelectorError> {
    if source.trim().is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut parse = SelectorParse::new(source);
    let mut selectors = Vec::new();
    let mut compounds = Vec::new();

    parse.skip_ws();
    loop {
        compounds.push(parse.compound()?);
        parse.skip_ws();
        match parse.peek() {
            None => {
                selectors.push(ComplexSelector {
                    compounds: std::mem::take(&mut compounds),
                });
                break;
            }
            Some(',') => {
                parse.pos += 1;
                parse.skip_ws();
                selectors.push(ComplexSelector {
                    compounds: std::mem::take(&mut compounds),
                });
            }
            Some('>') | Some('+') | Some('~') | Some(':') => {
                let found = parse.peek().unwrap_or(' ');
                return Err(parse.unsupported(found));
            }
            Some(_) => {}
        }
    }

    Ok(SelectorList {
        source: source.to_string(),
        selectors,
    })
}

/// Rule matchers beginning with one of these glyphs are CSS selectors.
pub fn looks_like_selector(matcher: &str) -> bool {
    matches!(matcher.trim_start().chars().next(), Some('#' | '.' | '['))
}

// ============================================================================
// Matching
// ============================================================================

impl CompoundSelector {
    pub fn matches<H: FormHost + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        let Some(tag) = host.tag_name(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if host.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = host.attr(node, "class").unwrap_or("");
            let classes: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|a| attr_matches(host, node, a))
    }
}

fn attr_matches<H: FormHost + ?Sized>(host: &H, node: NodeId, selector: &AttrSelector) -> bool {
    let Some(actual) = host.attr(node, &selector.name) else {
        return false;
    };
    match &selector.test {
        None => true,
        Some((AttrOp::Equals, v)) => actual == v,
        Some((AttrOp::Prefix, v)) => !v.is_empty() && actual.starts_with(v.as_str()),
        Some((AttrOp::Suffix, v)) => !v.is_empty() && actual.ends_with(v.as_str()),
        Some((AttrOp::Contains, v)) => !v.is_empty() && actual.contains(v.as_str()),
        Some((AttrOp::Word, v)) => actual.split_whitespace().any(|w| w == v),
    }
}

impl ComplexSelector {
    pub fn matches<H: FormHost + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(host, node) {
            return false;
        }

        // Descendant combinators only, so nearest-ancestor greedy matching is exact.
        let mut current = host.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                match current {
                    Some(n) if compound.matches(host, n) => {
                        current = host.parent(n);
                        break;
                    }
                    Some(n) => current = host.parent(n),
                    None => return false,
                }
            }
        }
        true
    }
}

impl SelectorList {
    pub fn matches<H: FormHost + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(host, node))
    }
}

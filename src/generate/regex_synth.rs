use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

use crate::error::{GenerateError, PatternError};
use crate::generate::regex_guard::{check_pattern, parse_braces};

/// Extra repetitions allowed for `*`, `+` and `{n,}`.
const UNBOUNDED_EXTRA: u32 = 3;
/// Synthesized values longer than this are discarded.
pub const MAX_OUTPUT_LEN: usize = 256;
const MAX_ATTEMPTS: usize = 8;

const PRINTABLE: (char, char) = (' ', '~');

// ============================================================================
// Pattern tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    ranges: Vec<(char, char)>,
}

impl CharClass {
    fn of(ranges: &[(char, char)], negated: bool) -> Self {
        Self {
            negated,
            ranges: ranges.to_vec(),
        }
    }

    fn digit(negated: bool) -> Self {
        Self::of(&[('0', '9')], negated)
    }

    fn word(negated: bool) -> Self {
        Self::of(&[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')], negated)
    }

    fn space(negated: bool) -> Self {
        Self::of(&[(' ', ' ')], negated)
    }

    fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&c))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
        if self.negated {
            let candidates: Vec<char> = (PRINTABLE.0..=PRINTABLE.1)
                .filter(|c| c.is_ascii_alphanumeric() && !self.contains(*c))
                .chain((PRINTABLE.0..=PRINTABLE.1).filter(|c| !c.is_ascii_alphanumeric() && !self.contains(*c)))
                .collect();
            // Prefer alphanumerics when any remain.
            let alnum = candidates.iter().take_while(|c| c.is_ascii_alphanumeric()).count();
            let pool = if alnum > 0 { &candidates[..alnum] } else { &candidates[..] };
            return pool.choose(rng).copied();
        }

        let total: u32 = self
            .ranges
            .iter()
            .map(|(lo, hi)| (*hi as u32).saturating_sub(*lo as u32) + 1)
            .sum();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for (lo, hi) in &self.ranges {
            let size = (*hi as u32).saturating_sub(*lo as u32) + 1;
            if pick < size {
                return char::from_u32(*lo as u32 + pick);
            }
            pick -= size;
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Empty,
    Literal(char),
    Class(CharClass),
    Group(Vec<Vec<Piece>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Piece {
    node: Node,
    min: u32,
    max: Option<u32>,
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> PatternError {
        PatternError::Syntax(format!("{message} at offset {}", self.pos))
    }

    fn alternation(&mut self) -> Result<Vec<Vec<Piece>>, PatternError> {
        let mut branches = vec![self.sequence()?];
        while self.eat('|') {
            branches.push(self.sequence()?);
        }
        Ok(branches)
    }

    fn sequence(&mut self) -> Result<Vec<Piece>, PatternError> {
        let mut pieces = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let node = self.atom()?;
            let (min, max) = self.quantifier();
            pieces.push(Piece { node, min, max });
        }
        Ok(pieces)
    }

    fn quantifier(&mut self) -> (u32, Option<u32>) {
        let q = match self.peek() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => {
                let Some(close) = self.chars[self.pos..].iter().position(|c| *c == '}') else {
                    return (1, Some(1));
                };
                let body: String = self.chars[self.pos + 1..self.pos + close].iter().collect();
                match parse_braces(&body) {
                    Some(q) => {
                        self.pos += close;
                        q
                    }
                    None => return (1, Some(1)),
                }
            }
            _ => return (1, Some(1)),
        };
        self.pos += 1;
        if matches!(self.peek(), Some('?') | Some('+')) {
            self.pos += 1;
        }
        q
    }

    fn atom(&mut self) -> Result<Node, PatternError> {
        let c = self.bump().ok_or_else(|| self.error("unexpected end"))?;
        match c {
            '(' => {
                if self.eat('?') {
                    while let Some(c) = self.bump() {
                        match c {
                            ')' => return Ok(Node::Empty),
                            ':' | '>' => break,
                            _ => {}
                        }
                    }
                }
                let inner = self.alternation()?;
                if !self.eat(')') {
                    return Err(self.error("unclosed group"));
                }
                Ok(Node::Group(inner))
            }
            '[' => self.class(),
            '.' => Ok(Node::Class(CharClass::of(&[('a', 'z'), ('A', 'Z'), ('0', '9')], false))),
            '^' | '$' => Ok(Node::Empty),
            '\\' => self.escape(),
            other => Ok(Node::Literal(other)),
        }
    }

    fn escape(&mut self) -> Result<Node, PatternError> {
        let c = self.bump().ok_or_else(|| self.error("trailing backslash"))?;
        Ok(match c {
            'd' => Node::Class(CharClass::digit(false)),
            'D' => Node::Class(CharClass::digit(true)),
            'w' => Node::Class(CharClass::word(false)),
            'W' => Node::Class(CharClass::word(true)),
            's' => Node::Class(CharClass::space(false)),
            'S' => Node::Class(CharClass::space(true)),
            'b' | 'B' | 'A' | 'z' => Node::Empty,
            'n' => Node::Literal('\n'),
            't' => Node::Literal('\t'),
            other => Node::Literal(other),
        })
    }

    fn class(&mut self) -> Result<Node, PatternError> {
        let negated = self.eat('^');
        let mut ranges = Vec::new();
        let mut first = true;

        loop {
            let c = self.bump().ok_or_else(|| self.error("unterminated class"))?;
            if c == ']' && !first {
                break;
            }
            first = false;

            let lo = if c == '\\' {
                let e = self.bump().ok_or_else(|| self.error("trailing backslash"))?;
                match e {
                    'd' => {
                        ranges.push(('0', '9'));
                        continue;
                    }
                    'w' => {
                        ranges.extend(CharClass::word(false).ranges);
                        continue;
                    }
                    's' => {
                        ranges.push((' ', ' '));
                        continue;
                    }
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                }
            } else {
                c
            };

            let is_range = self.peek() == Some('-') && self.chars.get(self.pos + 1).is_some_and(|n| *n != ']');
            if is_range {
                self.pos += 1;
                let mut hi = self.bump().ok_or_else(|| self.error("unterminated range"))?;
                if hi == '\\' {
                    hi = self.bump().ok_or_else(|| self.error("trailing backslash"))?;
                }
                if hi < lo {
                    return Err(self.error("reversed range"));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        Ok(Node::Class(CharClass { negated, ranges }))
    }
}

// ============================================================================
// Template
// ============================================================================

/// A guarded, parsed pattern that can produce matching strings.
#[derive(Debug, Clone)]
pub struct RegexTemplate {
    source: String,
    verifier: Regex,
    root: Vec<Vec<Piece>>,
}

impl RegexTemplate {
    /// Guard, then parse. Invalid syntax and unsafe shapes are both refused.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        check_pattern(pattern)?;
        let verifier = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| PatternError::Syntax(e.to_string()))?;

        let mut parser = Parser {
            chars: pattern.chars().collect(),
            pos: 0,
        };
        let root = parser.alternation()?;
        if parser.pos != parser.chars.len() {
            return Err(parser.error("unbalanced `)`"));
        }
        Ok(Self {
            source: pattern.to_string(),
            verifier,
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.verifier.is_match(value)
    }

    /// A value matching the whole pattern, or `Unsatisfiable` after a few tries.
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, GenerateError> {
        for _ in 0..MAX_ATTEMPTS {
            let mut out = String::new();
            emit_alternation(&self.root, rng, &mut out);
            if out.chars().count() <= MAX_OUTPUT_LEN && self.verifier.is_match(&out) {
                return Ok(out);
            }
        }
        Err(GenerateError::Unsatisfiable(self.source.clone()))
    }
}

fn emit_alternation<R: Rng + ?Sized>(branches: &[Vec<Piece>], rng: &mut R, out: &mut String) {
    if let Some(branch) = branches.choose(rng) {
        emit_sequence(branch, rng, out);
    }
}

fn emit_sequence<R: Rng + ?Sized>(pieces: &[Piece], rng: &mut R, out: &mut String) {
    for piece in pieces {
        let hi = piece.max.unwrap_or(piece.min + UNBOUNDED_EXTRA);
        let count = if hi <= piece.min {
            piece.min
        } else {
            rng.gen_range(piece.min..=hi)
        };
        for _ in 0..count {
            if out.len() > MAX_OUTPUT_LEN {
                return;
            }
            match &piece.node {
                Node::Empty => {}
                Node::Literal(c) => out.push(*c),
                Node::Class(class) => {
                    if let Some(c) = class.sample(rng) {
                        out.push(c);
                    }
                }
                Node::Group(branches) => emit_alternation(branches, rng, out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn classes_and_escapes_parse() {
        let t = RegexTemplate::compile(r"[A-F\d_-]{4}\.[^a-z]").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert!(t.is_match(&t.synthesize(&mut rng).unwrap()));
        }
    }

    #[test]
    fn alternation_picks_a_branch() {
        let t = RegexTemplate::compile("(red|green|blue)-[0-9]").unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let value = t.synthesize(&mut rng).unwrap();
        let (color, digit) = value.split_once('-').unwrap();
        assert!(["red", "green", "blue"].contains(&color));
        assert_eq!(digit.len(), 1);
    }

    #[test]
    fn lookaround_is_a_syntax_error() {
        assert!(matches!(RegexTemplate::compile("(?=a)b"), Err(PatternError::Syntax(_))));
    }
}

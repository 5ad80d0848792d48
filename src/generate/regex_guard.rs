use crate::error::PatternError;

pub const MAX_PATTERN_LEN: usize = 200;

// ============================================================================
// Catastrophic-backtracking screen
// ============================================================================

/// Reject patterns shaped for exponential backtracking.
///
/// This is a syntactic screen, not a proof: it walks the pattern once,
/// tracking for every group whether its body already repeats, whether it
/// can match empty, and what its alternation branches start with. A repeat
/// quantifier applied to such a group is refused.
pub fn check_pattern(pattern: &str) -> Result<(), PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    if chars.len() > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong {
            len: chars.len(),
            limit: MAX_PATTERN_LEN,
        });
    }

    let mut stack = vec![GroupScan::new(0)];
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some(d) if d.is_ascii_digit() && *d != '0' => return Err(PatternError::Backreference),
                    Some('k') if chars.get(i + 2) == Some(&'<') => return Err(PatternError::Backreference),
                    None => return Err(PatternError::Syntax("trailing backslash".into())),
                    _ => {}
                }
                let end = i + 2;
                let atom: String = chars[i..end].iter().collect();
                i = after_atom(&chars, end, &mut stack, Atom::Simple(atom))?;
            }
            '[' => {
                let end = class_end(&chars, i)?;
                let atom: String = chars[i..end].iter().collect();
                i = after_atom(&chars, end, &mut stack, Atom::Simple(atom))?;
            }
            '(' => {
                let mut j = i + 1;
                if chars.get(j) == Some(&'?') {
                    while j < chars.len() && !matches!(chars[j], ':' | ')' | '>') {
                        j += 1;
                    }
                    if chars.get(j) == Some(&')') {
                        // inline flags such as `(?i)`
                        i = j + 1;
                        continue;
                    }
                    j += 1;
                }
                stack.push(GroupScan::new(i));
                i = j;
            }
            ')' => {
                let Some(group) = stack.pop().filter(|_| !stack.is_empty()) else {
                    return Err(PatternError::Syntax("unbalanced `)`".into()));
                };
                i = after_atom(&chars, i + 1, &mut stack, Atom::Group(group))?;
            }
            '|' => {
                if let Some(top) = stack.last_mut() {
                    top.branches.push(Branch::default());
                }
                i += 1;
            }
            '^' | '$' => i += 1,
            c => i = after_atom(&chars, i + 1, &mut stack, Atom::Simple(c.to_string()))?,
        }
    }

    if stack.len() != 1 {
        return Err(PatternError::Syntax("unbalanced `(`".into()));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Branch {
    text: String,
    first_atom: Option<String>,
    /// Every atom so far may match empty.
    optional_only: bool,
    atoms: usize,
}

#[derive(Debug)]
struct GroupScan {
    start: usize,
    branches: Vec<Branch>,
    /// Some atom inside, at any depth, carries a repeat quantifier.
    has_repeat: bool,
    /// ... and at least one of those is unbounded.
    has_unbounded: bool,
}

impl GroupScan {
    fn new(start: usize) -> Self {
        Self {
            start,
            branches: vec![Branch::default()],
            has_repeat: false,
            has_unbounded: false,
        }
    }

    fn can_be_empty(&self) -> bool {
        self.branches.iter().any(|b| b.atoms == 0 || b.optional_only)
    }

    fn has_overlapping_branches(&self) -> bool {
        let b = &self.branches;
        (0..b.len()).any(|i| {
            (i + 1..b.len()).any(|j| {
                b[i].text == b[j].text
                    || matches!((&b[i].first_atom, &b[j].first_atom), (Some(x), Some(y)) if x == y)
            })
        })
    }

    fn text(&self) -> String {
        self.branches
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

enum Atom {
    Simple(String),
    Group(GroupScan),
}

#[derive(Debug, Clone, Copy)]
struct Quantifier {
    min: u32,
    max: Option<u32>,
}

impl Quantifier {
    fn repeats(&self) -> bool {
        self.max.is_none_or(|m| m > 1)
    }

    fn unbounded(&self) -> bool {
        self.max.is_none()
    }
}

fn after_atom(
    chars: &[char],
    at: usize,
    stack: &mut [GroupScan],
    atom: Atom,
) -> Result<usize, PatternError> {
    let (quantifier, next) = match parse_quantifier(chars, at) {
        Some((q, end)) => (Some(q), end),
        None => (None, at),
    };
    let quant_text: String = chars[at..next].iter().collect();

    let repeats = quantifier.is_some_and(|q| q.repeats());
    let unbounded = quantifier.is_some_and(|q| q.unbounded());

    let (atom_text, inner_repeat, inner_unbounded, inner_empty) = match atom {
        Atom::Simple(text) => (text, false, false, false),
        Atom::Group(group) => {
            if repeats && group.has_repeat && (unbounded || group.has_unbounded) {
                return Err(PatternError::NestedQuantifier { offset: group.start });
            }
            if unbounded && group.can_be_empty() {
                return Err(PatternError::RepeatedOptional { offset: group.start });
            }
            if unbounded && group.has_overlapping_branches() {
                return Err(PatternError::OverlappingAlternation { offset: group.start });
            }
            (
                format!("({})", group.text()),
                group.has_repeat,
                group.has_unbounded,
                group.can_be_empty(),
            )
        }
    };

    let Some(top) = stack.last_mut() else {
        return Err(PatternError::Syntax("unbalanced group".into()));
    };
    top.has_repeat |= inner_repeat || repeats;
    top.has_unbounded |= inner_unbounded || unbounded;

    let optional = quantifier.map_or(inner_empty, |q| q.min == 0 || inner_empty);
    if let Some(branch) = top.branches.last_mut() {
        if branch.atoms == 0 {
            branch.first_atom = Some(atom_text.clone());
            branch.optional_only = optional;
        } else {
            branch.optional_only &= optional;
        }
        branch.atoms += 1;
        branch.text.push_str(&atom_text);
        branch.text.push_str(&quant_text);
    }
    Ok(next)
}

/// Parses `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}` plus a lazy/possessive suffix.
fn parse_quantifier(chars: &[char], at: usize) -> Option<(Quantifier, usize)> {
    let (q, mut end) = match chars.get(at)? {
        '*' => (Quantifier { min: 0, max: None }, at + 1),
        '+' => (Quantifier { min: 1, max: None }, at + 1),
        '?' => (Quantifier { min: 0, max: Some(1) }, at + 1),
        '{' => {
            let close = chars[at..].iter().position(|c| *c == '}')? + at;
            let body: String = chars[at + 1..close].iter().collect();
            let (min, max) = parse_braces(&body)?;
            (Quantifier { min, max }, close + 1)
        }
        _ => return None,
    };
    if matches!(chars.get(end), Some('?') | Some('+')) {
        end += 1;
    }
    Some((q, end))
}

/// Body of a `{...}` quantifier as `(min, max)`.
pub(crate) fn parse_braces(body: &str) -> Option<(u32, Option<u32>)> {
    let (min, max) = match body.split_once(',') {
        None => {
            let n = body.trim().parse().ok()?;
            (n, Some(n))
        }
        Some((lo, hi)) => {
            let lo = lo.trim().parse().ok()?;
            let hi = hi.trim();
            let hi = if hi.is_empty() { None } else { Some(hi.parse().ok()?) };
            (lo, hi)
        }
    };
    Some((min, max))
}

/// Index just past the `]` closing the class opened at `open`.
fn class_end(chars: &[char], open: usize) -> Result<usize, PatternError> {
    let mut i = open + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            ']' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(PatternError::Syntax("unterminated character class".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_catastrophic_shapes() {
        for p in [r"(\w+)+$", "(a+)+$", r"(\w*)*$", "(x{2,})+", "(a+)*b"] {
            assert!(
                matches!(check_pattern(p), Err(PatternError::NestedQuantifier { .. })),
                "{p}"
            );
        }
        assert!(matches!(check_pattern("(x?)+"), Err(PatternError::RepeatedOptional { .. })));
        assert!(matches!(check_pattern("(a|)*"), Err(PatternError::RepeatedOptional { .. })));
        assert!(matches!(check_pattern("(a|ab)*c"), Err(PatternError::OverlappingAlternation { .. })));
        assert!(matches!(check_pattern("(a|a)+"), Err(PatternError::OverlappingAlternation { .. })));
        assert_eq!(check_pattern(r"(a)\1"), Err(PatternError::Backreference));
    }

    #[test]
    fn accepts_ordinary_patterns() {
        for p in [
            "EMP[0-9]{6}",
            r"\d{3}-\d{4}",
            r"(\d{3}-){2}\d{4}",
            "[A-Z]{2}(cat|dog)+",
            r"[a-z]+@[a-z]+\.(com|org)",
            "(?i)abc",
            r"[+*?]{1,3}",
        ] {
            assert_eq!(check_pattern(p), Ok(()), "{p}");
        }
    }

    #[test]
    fn length_and_balance_are_checked() {
        let long = "a".repeat(MAX_PATTERN_LEN + 1);
        assert!(matches!(check_pattern(&long), Err(PatternError::TooLong { .. })));
        assert!(matches!(check_pattern("(ab"), Err(PatternError::Syntax(_))));
        assert!(matches!(check_pattern("ab)"), Err(PatternError::Syntax(_))));
    }
}

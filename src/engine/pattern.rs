use std::iter::Peekable;
use std::str::Chars;

use crate::{Error, Result};

const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
    Class { negated: bool, ranges: Vec<(char, char)> },
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Literal(l) => *l == c,
            Token::AnyChar => c != SEPARATOR,
            Token::Class { negated, ranges } => {
                ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != *negated
            }
            // Runs are expanded by Pattern::matches, never matched per char.
            Token::AnyRun => false,
        }
    }
}

/// A compiled shell-glob pattern matched against whole slash-delimited keys.
///
/// `*` and `?` never consume a `/`; the separator only matches literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compiles `pattern`, failing with [`Error::BadPattern`] on invalid syntax.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            let token = match c {
                '*' => {
                    // Consecutive stars behave like one.
                    if tokens.last() == Some(&Token::AnyRun) {
                        continue;
                    }
                    Token::AnyRun
                }
                '?' => Token::AnyChar,
                '[' => parse_class(&mut chars)?,
                '\\' => Token::Literal(chars.next().ok_or(Error::BadPattern)?),
                c => Token::Literal(c),
            };
            tokens.push(token);
        }
        Ok(Self { tokens })
    }

    /// Reports whether the whole of `name` matches the pattern.
    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let tokens = &self.tokens;
        let (mut t, mut n) = (0, 0);
        // Token index after the most recent star, and where its run ends.
        // Only the latest star ever backtracks.
        let mut star: Option<(usize, usize)> = None;

        while n < name.len() {
            match tokens.get(t) {
                Some(Token::AnyRun) => {
                    t += 1;
                    star = Some((t, n));
                    continue;
                }
                Some(token) if token.matches_char(name[n]) => {
                    t += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }
            match star {
                // Grow the run by one char, never across a separator.
                Some((after, end)) if name[end] != SEPARATOR => {
                    star = Some((after, end + 1));
                    t = after;
                    n = end + 1;
                }
                _ => return false,
            }
        }
        tokens[t..].iter().all(|token| *token == Token::AnyRun)
    }
}

/// Parses a class body after the opening `[`, through the closing `]`.
fn parse_class(chars: &mut Peekable<Chars<'_>>) -> Result<Token> {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut ranges = Vec::new();
    loop {
        if !ranges.is_empty() && chars.next_if_eq(&']').is_some() {
            return Ok(Token::Class { negated, ranges });
        }
        let lo = class_char(chars)?;
        let hi = if chars.next_if_eq(&'-').is_some() {
            class_char(chars)?
        } else {
            lo
        };
        ranges.push((lo, hi));
    }
}

fn class_char(chars: &mut Peekable<Chars<'_>>) -> Result<char> {
    match chars.next() {
        None | Some('-') | Some(']') => Err(Error::BadPattern),
        Some('\\') => chars.next().ok_or(Error::BadPattern),
        Some(c) => Ok(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn matches(pattern: &str, name: &str) -> bool {
        Pattern::new(pattern).unwrap().matches(name)
    }

    #[test]
    fn test_literal() {
        assert!(matches("/app/port", "/app/port"));
        assert!(!matches("/app/port", "/app/ports"));
        assert!(!matches("/app/port", "/app/por"));
    }

    #[test]
    fn test_star_stays_within_segment() {
        assert!(matches("/app/db/*", "/app/db/user"));
        assert!(matches("/app/db/*", "/app/db/"));
        assert!(!matches("/app/db/*", "/app/db/user/extra"));
        assert!(matches("/app/*/host1", "/app/upstream/host1"));
        assert!(!matches("/app/*/host1", "/app/upstream/host1/domain"));
        assert!(!matches("/*", "/app/port"));
        assert!(matches("/app/*er*", "/app/upstream_server"));
        assert!(matches("/app/**", "/app/x"));
    }

    #[test]
    fn test_question_mark() {
        assert!(matches("/app/node?", "/app/node1"));
        assert!(!matches("/app/node?", "/app/node12"));
        assert!(!matches("/app?port", "/app/port"));
    }

    #[test]
    fn test_classes() {
        assert!(matches("/node[123]", "/node2"));
        assert!(!matches("/node[123]", "/node4"));
        assert!(matches("/node[0-9]", "/node7"));
        assert!(matches("/node[^0-9]", "/nodex"));
        assert!(!matches("/node[^0-9]", "/node7"));
        assert!(matches("/x[*?]", "/x*"));
        assert!(matches("/x[\\]]", "/x]"));
    }

    #[test]
    fn test_escapes() {
        assert!(matches("/a\\*", "/a*"));
        assert!(!matches("/a\\*", "/ab"));
    }

    #[test]
    fn test_star_backtracks_to_last_star_only() {
        assert!(matches("/*a*b", "/xaxxb"));
        assert!(!matches("/*a*b", "/xaxxb/b"));
        assert!(matches("/*/*x", "/a/bx"));
        assert!(!matches("*/b", "a/c/b"));
        assert!(matches("/a*", "/a"));
        assert!(!matches("/a*b", "/a"));
    }

    #[test]
    fn test_many_stars_stay_linear() {
        let name = format!("/{}", "a".repeat(60));
        let pattern = Pattern::new(&format!("/{}b", "*a".repeat(12))).unwrap();
        let started = Instant::now();
        assert!(!pattern.matches(&name));
        assert!(started.elapsed() < Duration::from_secs(1));

        let pattern = Pattern::new(&format!("/{}", "*a".repeat(12))).unwrap();
        assert!(pattern.matches(&name));
    }

    #[test]
    fn test_bad_patterns() {
        for pattern in ["[]a]", "[", "/a[b", "[^]", "[a-]", "[-a]", "/a\\", "[a\\"] {
            assert!(
                matches!(Pattern::new(pattern), Err(Error::BadPattern)),
                "pattern {:?} should be rejected",
                pattern
            );
        }
    }
}

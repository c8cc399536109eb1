//! Pattern matching for LIKE / ILIKE conditions.
//!
//! SQL LIKE with two wildcards:
//! - `%` matches zero or more characters
//! - `_` matches exactly one character
//!
//! A backslash escapes the next character, so `\%` matches a literal percent
//! sign. Patterns are compiled once into a token list and then matched many
//! times; matching operates on Unicode scalar values.

use alloc::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `_`
    One,
    /// `%`
    Any,
}

/// A compiled LIKE pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LikePattern {
    tokens: Vec<Token>,
    case_insensitive: bool,
}

impl LikePattern {
    /// Compiles a case-sensitive LIKE pattern.
    pub fn new(pattern: &str) -> Self {
        Self::compile(pattern, false)
    }

    /// Compiles a case-insensitive (ILIKE) pattern.
    pub fn new_case_insensitive(pattern: &str) -> Self {
        Self::compile(pattern, true)
    }

    fn compile(pattern: &str, case_insensitive: bool) -> Self {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '%' => {
                    // consecutive % collapse
                    if tokens.last() != Some(&Token::Any) {
                        tokens.push(Token::Any);
                    }
                }
                '_' => tokens.push(Token::One),
                '\\' => push_literal(&mut tokens, chars.next().unwrap_or('\\'), case_insensitive),
                ch => push_literal(&mut tokens, ch, case_insensitive),
            }
        }
        Self {
            tokens,
            case_insensitive,
        }
    }

    /// Returns true if the whole of `value` matches the pattern.
    pub fn matches(&self, value: &str) -> bool {
        let chars: Vec<char> = if self.case_insensitive {
            value.chars().map(fold_case).collect()
        } else {
            value.chars().collect()
        };
        self.matches_chars(&chars)
    }

    fn matches_chars(&self, v: &[char]) -> bool {
        let p = &self.tokens;
        let (mut vi, mut pi) = (0, 0);
        // Position after the last `%` seen, and the value index it resumed at.
        let mut backtrack: Option<(usize, usize)> = None;

        while vi < v.len() {
            match p.get(pi) {
                Some(Token::Any) => {
                    pi += 1;
                    backtrack = Some((pi, vi));
                }
                Some(Token::One) => {
                    pi += 1;
                    vi += 1;
                }
                Some(Token::Literal(ch)) if *ch == v[vi] => {
                    pi += 1;
                    vi += 1;
                }
                _ => match backtrack {
                    Some((after_any, resumed_at)) => {
                        pi = after_any;
                        vi = resumed_at + 1;
                        backtrack = Some((after_any, vi));
                    }
                    None => return false,
                },
            }
        }
        p[pi..].iter().all(|t| *t == Token::Any)
    }
}

fn push_literal(tokens: &mut Vec<Token>, ch: char, case_insensitive: bool) {
    let ch = if case_insensitive { fold_case(ch) } else { ch };
    tokens.push(Token::Literal(ch));
}

/// Lowercases to a single scalar so `_` keeps matching exactly one character.
fn fold_case(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// One-shot case-sensitive LIKE match.
///
/// ```
/// use rill_core::pattern_match::like;
/// assert!(like("hello", "h%o"));
/// assert!(like("hello", "_ello"));
/// assert!(!like("hello", "world"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    LikePattern::new(pattern).matches(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_exact() {
        assert!(like("hello", "hello"));
        assert!(!like("hello", "world"));
        assert!(!like("hello", "hell"));
    }

    #[test]
    fn like_percent() {
        assert!(like("hello", "%"));
        assert!(like("hello", "h%"));
        assert!(like("hello", "%o"));
        assert!(like("hello", "h%o"));
        assert!(like("hello", "%ell%"));
        assert!(like("abcabd", "%abd"));
        assert!(!like("hello", "x%"));
    }

    #[test]
    fn like_underscore() {
        assert!(like("hello", "_ello"));
        assert!(like("hello", "h_llo"));
        assert!(like("hello", "_____"));
        assert!(!like("hello", "______"));
    }

    #[test]
    fn like_combined() {
        assert!(like("hello", "h%_o"));
        assert!(like("hello world", "hello%"));
        assert!(like("hello world", "%world"));
        assert!(!like("ho", "h%_o"));
    }

    #[test]
    fn like_empty() {
        assert!(like("", ""));
        assert!(like("", "%"));
        assert!(!like("", "_"));
        assert!(!like("", "a"));
    }

    #[test]
    fn like_escape() {
        assert!(like("100%", "100\\%"));
        assert!(!like("1000", "100\\%"));
        assert!(like("a_b", "a\\_b"));
        assert!(!like("axb", "a\\_b"));
        assert!(like("a\\", "a\\"));
    }

    #[test]
    fn like_is_case_sensitive() {
        assert!(!like("Hello", "hello"));
        assert!(!LikePattern::new("H%").matches("hello"));
    }

    #[test]
    fn ilike_ignores_case() {
        let pattern = LikePattern::new_case_insensitive("H%LO");
        assert!(pattern.matches("hello"));
        assert!(pattern.matches("HELLO"));
        assert!(!pattern.matches("help"));
    }

    #[test]
    fn ilike_underscore_matches_one_char_with_multi_char_lowercase() {
        // U+0130 lowercases to two scalars.
        let one = LikePattern::new_case_insensitive("_");
        assert!(one.matches("\u{130}"));
        assert!(!LikePattern::new_case_insensitive("__").matches("\u{130}"));
        assert!(LikePattern::new_case_insensitive("\u{130}_").matches("ix"));
    }
}

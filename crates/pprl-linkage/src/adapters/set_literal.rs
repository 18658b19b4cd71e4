//! Restrictive decoder for q-gram set literals
//!
//! Accepted grammar:
//!
//! ```text
//! literal := ws ( "set()" | "{" ws item ( ws "," ws item )* ws [ "," ] ws "}" ) ws
//! item    := '...' | "..."      (escapes: \\ \' \" \n \t)
//! ```
//!
//! Nothing is ever evaluated; any other input is rejected with the byte
//! offset of the first offending character.

use crate::domain::QGramSet;
use crate::error::SetLiteralError;

/// Parse a set literal such as `{'ab', "bc"}` or `set()`
pub fn parse_set_literal(input: &str) -> Result<QGramSet, SetLiteralError> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_whitespace();
    if parser.at_end() {
        return Err(SetLiteralError::Empty);
    }

    let items = if parser.eat_keyword("set()") {
        Vec::new()
    } else {
        parser.items()?
    };

    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(SetLiteralError::TrailingCharacters { offset: parser.pos });
    }
    Ok(items.into_iter().collect())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.input[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), SetLiteralError> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(SetLiteralError::Expected {
                expected,
                offset: self.pos,
            })
        }
    }

    /// `{ item, ... }`; an empty `{}` is a dict literal and rejected
    fn items(&mut self) -> Result<Vec<String>, SetLiteralError> {
        self.expect('{', "'{' or set()")?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if !items.is_empty() && self.peek() == Some('}') {
                self.bump();
                return Ok(items);
            }
            items.push(self.string()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(items);
                }
                _ => {
                    return Err(SetLiteralError::Expected {
                        expected: "',' or '}'",
                        offset: self.pos,
                    })
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, SetLiteralError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => {
                return Err(SetLiteralError::Expected {
                    expected: "quoted string",
                    offset: start,
                })
            }
        };
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(SetLiteralError::UnterminatedString { offset: start }),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => {
                    let escape_at = self.pos - 1;
                    let escaped = match self.bump() {
                        None => return Err(SetLiteralError::UnterminatedString { offset: start }),
                        Some('\\') => '\\',
                        Some('\'') => '\'',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some(other) => {
                            return Err(SetLiteralError::UnsupportedEscape {
                                escape: other,
                                offset: escape_at,
                            })
                        }
                    };
                    value.push(escaped);
                }
                Some('\n') => return Err(SetLiteralError::UnterminatedString { offset: start }),
                Some(c) => value.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_set() {
        let set = parse_set_literal("{'jo', 'oh', 'hn'}").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("jo"));
        assert!(set.contains("hn"));
    }

    #[test]
    fn test_parse_mixed_quotes_and_trailing_comma() {
        let set = parse_set_literal("  { \"ab\" ,'b\\'c', }  ").unwrap();
        assert!(set.contains("ab"));
        assert!(set.contains("b'c"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_empty_set() {
        assert!(parse_set_literal("set()").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = parse_set_literal("{'ab', 'ab', \"ab\"}").unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_escapes() {
        let set = parse_set_literal(r#"{'\\', '\n', '\t', "\""}"#).unwrap();
        for expected in ["\\", "\n", "\t", "\""] {
            assert!(set.contains(expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn test_rejects_calls_and_numbers() {
        assert!(matches!(
            parse_set_literal("__import__('os').system('ls')"),
            Err(SetLiteralError::Expected { offset: 0, .. })
        ));
        assert!(matches!(
            parse_set_literal("{1, 2}"),
            Err(SetLiteralError::Expected { offset: 1, .. })
        ));
        assert!(matches!(
            parse_set_literal("set(['ab'])"),
            Err(SetLiteralError::Expected { offset: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_dict_and_empty_input() {
        assert!(matches!(
            parse_set_literal("{}"),
            Err(SetLiteralError::Expected { offset: 1, .. })
        ));
        assert_eq!(parse_set_literal("   "), Err(SetLiteralError::Empty));
    }

    #[test]
    fn test_rejects_unterminated_string() {
        assert_eq!(
            parse_set_literal("{'ab', 'cd}"),
            Err(SetLiteralError::UnterminatedString { offset: 7 })
        );
    }

    #[test]
    fn test_rejects_unknown_escape() {
        assert_eq!(
            parse_set_literal(r"{'a\x41'}"),
            Err(SetLiteralError::UnsupportedEscape { escape: 'x', offset: 3 })
        );
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        assert_eq!(
            parse_set_literal("{'ab'} or 1"),
            Err(SetLiteralError::TrailingCharacters { offset: 7 })
        );
        assert_eq!(
            parse_set_literal("set() + x"),
            Err(SetLiteralError::TrailingCharacters { offset: 6 })
        );
    }

    #[test]
    fn test_rejects_missing_separator() {
        assert!(matches!(
            parse_set_literal("{'ab' 'cd'}"),
            Err(SetLiteralError::Expected { offset: 6, .. })
        ));
    }
}

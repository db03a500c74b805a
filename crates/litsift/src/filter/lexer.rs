//! Tokenizer for filter queries.

use crate::error::{QueryError, QueryErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Word(String),
    Phrase(String),
    Field { name: String, value: FieldValue },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Word(String),
    Phrase(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub start: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

/// Split a query into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn next_token(&mut self) -> Result<Option<Token>, QueryError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            '"' => TokenKind::Phrase(self.phrase()?),
            _ => self.word_or_field(start)?,
        };

        Ok(Some(Token { kind, start }))
    }

    /// Read a quoted phrase; the cursor is on the opening quote.
    fn phrase(&mut self) -> Result<String, QueryError> {
        let open = self.pos;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(QueryError::new(QueryErrorKind::UnterminatedQuote, open)),
                Some('"') => return Ok(text),
                Some('\\') => match self.peek() {
                    Some(escaped @ ('"' | '\\')) => {
                        self.bump();
                        text.push(escaped);
                    }
                    _ => text.push('\\'),
                },
                Some(other) => text.push(other),
            }
        }
    }

    fn bare_word(&mut self) -> &str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"') {
                break;
            }
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn word_or_field(&mut self, start: usize) -> Result<TokenKind, QueryError> {
        let word = self.bare_word().to_string();

        match word.as_str() {
            "AND" => return Ok(TokenKind::And),
            "OR" => return Ok(TokenKind::Or),
            "NOT" => return Ok(TokenKind::Not),
            _ => {}
        }

        let Some((name, rest)) = word.split_once(':') else {
            return Ok(TokenKind::Word(word));
        };

        let is_field_name = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '_');
        if !is_field_name || rest.starts_with("//") {
            return Ok(TokenKind::Word(word));
        }

        let name = name.to_string();
        if !rest.is_empty() {
            return Ok(TokenKind::Field { name, value: FieldValue::Word(rest.to_string()) });
        }

        if self.peek() == Some('"') {
            let phrase = self.phrase()?;
            return Ok(TokenKind::Field { name, value: FieldValue::Phrase(phrase) });
        }

        Err(QueryError::new(QueryErrorKind::EmptyFieldValue, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn word(s: &str) -> TokenKind {
        TokenKind::Word(s.to_string())
    }

    #[test]
    fn test_words_and_operators() {
        assert_eq!(
            kinds("graph AND (neural OR NOT deep)"),
            vec![
                word("graph"),
                TokenKind::And,
                TokenKind::LParen,
                word("neural"),
                TokenKind::Or,
                TokenKind::Not,
                word("deep"),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_lowercase_operators_are_words() {
        assert_eq!(kinds("cats and dogs"), vec![word("cats"), word("and"), word("dogs")]);
    }

    #[test]
    fn test_phrase_with_escapes() {
        assert_eq!(
            kinds(r#""a \"quoted\" word" "back\\slash""#),
            vec![
                TokenKind::Phrase("a \"quoted\" word".into()),
                TokenKind::Phrase("back\\slash".into()),
            ]
        );
    }

    #[test]
    fn test_field_terms() {
        assert_eq!(
            kinds(r#"title:"deep learning" year:200?"#),
            vec![
                TokenKind::Field {
                    name: "title".into(),
                    value: FieldValue::Phrase("deep learning".into()),
                },
                TokenKind::Field { name: "year".into(), value: FieldValue::Word("200?".into()) },
            ]
        );
    }

    #[test]
    fn test_urls_and_odd_colons_stay_words() {
        assert_eq!(kinds("https://arxiv.org"), vec![word("https://arxiv.org")]);
        assert_eq!(kinds("10.1/x:y"), vec![word("10.1/x:y")]);
        assert_eq!(kinds(":leading"), vec![word(":leading")]);
    }

    #[test]
    fn test_field_value_stops_at_paren() {
        assert_eq!(
            kinds("(title:graph)"),
            vec![
                TokenKind::LParen,
                TokenKind::Field { name: "title".into(), value: FieldValue::Word("graph".into()) },
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_token_offsets() {
        let tokens = tokenize("  ab (cd)").unwrap();
        let starts: Vec<usize> = tokens.iter().map(|t| t.start).collect();
        assert_eq!(starts, vec![2, 5, 6, 8]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"graph "deep learn"#).unwrap_err();
        assert_eq!(err.kind, QueryErrorKind::UnterminatedQuote);
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_empty_field_value() {
        let err = tokenize("title: graph").unwrap_err();
        assert_eq!(err.kind, QueryErrorKind::EmptyFieldValue);
        assert_eq!(err.position, 0);
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::SyntaxError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Identifier(String),
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftAngle,
    RightAngle,
    Comma,
    Colon,
    Question,
    Exclamation,
    Period,
    Ampersand,
    At,
    Arrow,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Identifier(name) => return write!(f, "`{}`", name),
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::LeftAngle => "`<`",
            TokenKind::RightAngle => "`>`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Question => "`?`",
            TokenKind::Exclamation => "`!`",
            TokenKind::Period => "`.`",
            TokenKind::Ampersand => "`&`",
            TokenKind::At => "`@`",
            TokenKind::Arrow => "`->`",
            TokenKind::End => "end of input",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub offset: usize,
}

/// Splits `text` into tokens, always ending with `TokenKind::End`
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = vec![];
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            c if c.is_alphabetic() || c == '_' => {
                let mut end = offset + c.len_utf8();
                while let Some(&(next_offset, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = next_offset + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Identifier(text[offset..end].to_string())
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '<' => TokenKind::LeftAngle,
            '>' => TokenKind::RightAngle,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '!' => TokenKind::Exclamation,
            '.' => TokenKind::Period,
            '&' => TokenKind::Ampersand,
            '@' => TokenKind::At,
            '-' if matches!(chars.peek(), Some((_, '>'))) => {
                chars.next();
                TokenKind::Arrow
            }
            other => {
                return Err(SyntaxError::new(
                    offset,
                    format!("unexpected character `{}`", other),
                ))
            }
        };
        tokens.push(Token { kind, offset });
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: text.len(),
    });
    Ok(tokens)
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Parsers for textual types, function signatures and parameter lists

mod lexer;
mod signature_parser;
mod type_parser;

use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFiles,
    term::{self, termcolor::Buffer},
};
use lexer::{Token, TokenKind};
use std::fmt;

pub use signature_parser::{parse_parameters, parse_signature};
pub use type_parser::parse_type;

/// Malformed type or signature text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset into the parsed text
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    pub fn to_diagnostic<FileId>(&self, file_id: FileId) -> Diagnostic<FileId> {
        Diagnostic::error()
            .with_message(&self.message)
            .with_labels(vec![Label::primary(file_id, self.offset..self.offset)])
    }

    /// Renders the error as a labelled snippet of `source`
    pub fn render(&self, source_name: &str, source: &str) -> String {
        let mut files = SimpleFiles::new();
        let file_id = files.add(source_name, source);
        let mut buffer = Buffer::no_color();
        let config = term::Config::default();
        match term::emit(&mut buffer, &config, &files, &self.to_diagnostic(file_id)) {
            Ok(()) => String::from_utf8_lossy(&buffer.into_inner()).to_string(),
            Err(_) => format!("{}: {}", source_name, self),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for SyntaxError {}

// ============================================================================
// Token cursor
// ============================================================================

/// Cursor over the token stream shared by the type and signature parsers
pub(crate) struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub(crate) fn new(text: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: lexer::tokenize(text)?,
            position: 0,
        })
    }

    fn peek(&self) -> &Token {
        // the lexer always terminates the stream with an end-of-input token
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.position + n).min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Identifier(name) if name == keyword)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.next();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, SyntaxError> {
        if self.at(kind) {
            Ok(self.next())
        } else {
            Err(self.unexpected(&format!("expected {}", kind)))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.next();
                Ok(name)
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        if self.at(&TokenKind::End) {
            Ok(())
        } else {
            Err(SyntaxError::new(
                self.peek().offset,
                format!("Extraneous input {}", self.peek().kind),
            ))
        }
    }

    fn unexpected(&self, expectation: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(token.offset, format!("{}, found {}", expectation, token.kind))
    }
}

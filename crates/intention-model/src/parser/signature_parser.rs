// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::lexer::TokenKind;
use super::{Parser, SyntaxError};
use crate::data::signatures::{FunctionSignature, ParameterSignature};
use crate::data::types::SwiftType;

/// Parses `[mutating] name(parameters) [throws|rethrows] [-> Type]`
pub fn parse_signature(text: &str) -> Result<FunctionSignature, SyntaxError> {
    let mut parser = Parser::new(text)?;
    let signature = parser.parse_function_signature()?;
    parser.expect_end()?;
    Ok(signature)
}

/// Parses a parenthesized parameter list, e.g. `(_ a: Int, to b: String)`
pub fn parse_parameters(text: &str) -> Result<Vec<ParameterSignature>, SyntaxError> {
    let mut parser = Parser::new(text)?;
    let parameters = parser.parse_parameter_clause()?;
    parser.expect_end()?;
    Ok(parameters)
}

impl Parser {
    fn parse_function_signature(&mut self) -> Result<FunctionSignature, SyntaxError> {
        let is_mutating = self.at_keyword("mutating")
            && matches!(self.peek_nth(1).kind, TokenKind::Identifier(_));
        if is_mutating {
            self.next();
        }

        let name = self.expect_identifier()?;
        let parameters = self.parse_parameter_clause()?;

        // throwing is not modelled by signatures
        let _ = self.eat_keyword("throws") || self.eat_keyword("rethrows");

        let return_type = if self.eat(&TokenKind::Arrow) {
            self.parse_type()?
        } else {
            SwiftType::VOID
        };

        Ok(FunctionSignature::new(name, parameters, return_type).with_mutating(is_mutating))
    }

    fn parse_parameter_clause(&mut self) -> Result<Vec<ParameterSignature>, SyntaxError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut parameters = vec![];
        if self.eat(&TokenKind::RightParen) {
            return Ok(parameters);
        }
        loop {
            parameters.push(self.parse_parameter()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RightParen)?;
            return Ok(parameters);
        }
    }

    /// `label? name ':' attributes* inout? type`
    fn parse_parameter(&mut self) -> Result<ParameterSignature, SyntaxError> {
        let first = self.expect_identifier()?;
        let (label, name) = if self.at(&TokenKind::Colon) {
            (Some(first.clone()), first)
        } else {
            let name = self.expect_identifier()?;
            let label = if first == "_" { None } else { Some(first) };
            (label, name)
        };
        self.expect(&TokenKind::Colon)?;

        let mut attributes = self.parse_type_attributes()?;
        if !self.eat_keyword("inout") {
            attributes.extend(self.parse_type_attributes()?);
        }
        let ty = self.parse_type()?.with_block_attributes(attributes);

        Ok(ParameterSignature::new(label, name, ty))
    }
}

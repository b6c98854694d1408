// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::lexer::TokenKind;
use super::{Parser, SyntaxError};
use crate::data::types::{BlockConvention, BlockTypeAttribute, SwiftType};
use std::collections::BTreeSet;

/// Parses a complete type, e.g. `[String: Int?]` or `@escaping (Int) -> Void`
pub fn parse_type(text: &str) -> Result<SwiftType, SyntaxError> {
    let mut parser = Parser::new(text)?;
    let ty = parser.parse_type()?;
    parser.expect_end()?;
    Ok(ty)
}

impl Parser {
    pub(crate) fn parse_type(&mut self) -> Result<SwiftType, SyntaxError> {
        let first = self.parse_postfix_type()?;
        if !self.at(&TokenKind::Ampersand) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(&TokenKind::Ampersand) {
            types.push(self.parse_postfix_type()?);
        }
        Ok(SwiftType::ProtocolComposition(types))
    }

    fn parse_postfix_type(&mut self) -> Result<SwiftType, SyntaxError> {
        let mut ty = self.parse_primary_type()?;
        loop {
            if self.eat(&TokenKind::Question) {
                ty = ty.wrapped_in_optional();
            } else if self.eat(&TokenKind::Exclamation) {
                ty = ty.wrapped_in_implicitly_unwrapped_optional();
            } else if self.at_metatype_suffix() {
                self.next();
                self.next();
                ty = SwiftType::Metatype(Box::new(ty));
            } else {
                return Ok(ty);
            }
        }
    }

    fn at_metatype_suffix(&self) -> bool {
        self.at(&TokenKind::Period)
            && matches!(&self.peek_nth(1).kind, TokenKind::Identifier(name) if name == "Type")
    }

    fn parse_primary_type(&mut self) -> Result<SwiftType, SyntaxError> {
        let attributes_offset = self.peek().offset;
        let attributes = self.parse_type_attributes()?;

        if self.eat(&TokenKind::LeftParen) {
            let mut types = vec![];
            if !self.at(&TokenKind::RightParen) {
                types.push(self.parse_type()?);
                while self.eat(&TokenKind::Comma) {
                    types.push(self.parse_type()?);
                }
            }
            self.expect(&TokenKind::RightParen)?;

            let throws = self.eat_keyword("throws") || self.eat_keyword("rethrows");
            if throws || self.at(&TokenKind::Arrow) {
                self.expect(&TokenKind::Arrow)?;
                let return_type = self.parse_type()?;
                return Ok(SwiftType::block(return_type, types, attributes));
            }
            if !attributes.is_empty() {
                return Err(SyntaxError::new(
                    attributes_offset,
                    "attributes can only be applied to function types",
                ));
            }
            return Ok(match types.len() {
                1 => types.remove(0),
                _ => SwiftType::Tuple(types),
            });
        }

        if !attributes.is_empty() {
            return Err(SyntaxError::new(
                attributes_offset,
                "attributes can only be applied to function types",
            ));
        }

        if self.eat(&TokenKind::LeftBracket) {
            let first = self.parse_type()?;
            let ty = if self.eat(&TokenKind::Colon) {
                let value = self.parse_type()?;
                SwiftType::dictionary(first, value)
            } else {
                SwiftType::array(first)
            };
            self.expect(&TokenKind::RightBracket)?;
            return Ok(ty);
        }

        self.parse_nominal_type()
    }

    fn parse_nominal_type(&mut self) -> Result<SwiftType, SyntaxError> {
        let mut name = self.expect_identifier()?;
        while self.at(&TokenKind::Period) && !self.at_metatype_suffix() {
            self.next();
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }

        let mut generic_args = vec![];
        if self.eat(&TokenKind::LeftAngle) {
            generic_args.push(self.parse_type()?);
            while self.eat(&TokenKind::Comma) {
                generic_args.push(self.parse_type()?);
            }
            self.expect(&TokenKind::RightAngle)?;
        }

        if name == "Void" && generic_args.is_empty() {
            return Ok(SwiftType::VOID);
        }
        Ok(SwiftType::generic(name, generic_args))
    }

    /// `@autoclosure`, `@escaping` and `@convention(c|block|swift)`, in any order
    pub(crate) fn parse_type_attributes(
        &mut self,
    ) -> Result<BTreeSet<BlockTypeAttribute>, SyntaxError> {
        let mut attributes = BTreeSet::new();
        while self.at(&TokenKind::At) {
            let at_offset = self.next().offset;
            let name = self.expect_identifier()?;
            let attribute = match name.as_str() {
                "autoclosure" => BlockTypeAttribute::Autoclosure,
                "escaping" => BlockTypeAttribute::Escaping,
                "convention" => {
                    self.expect(&TokenKind::LeftParen)?;
                    let offset = self.peek().offset;
                    let convention = self.expect_identifier()?;
                    let convention = BlockConvention::from_name(&convention).ok_or_else(|| {
                        SyntaxError::new(
                            offset,
                            format!("unknown calling convention `{}`", convention),
                        )
                    })?;
                    self.expect(&TokenKind::RightParen)?;
                    BlockTypeAttribute::Convention(convention)
                }
                other => {
                    return Err(SyntaxError::new(
                        at_offset,
                        format!("unknown attribute `@{}`", other),
                    ))
                }
            };
            attributes.insert(attribute);
        }
        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nominal_and_collections() {
        assert_eq!(parse_type("Int").unwrap(), SwiftType::int());
        assert_eq!(
            parse_type("[String: [Int]]").unwrap(),
            SwiftType::dictionary(SwiftType::string(), SwiftType::array(SwiftType::int()))
        );
        assert_eq!(
            parse_type("Swift.Result<Int, Error>").unwrap(),
            SwiftType::generic("Swift.Result", vec![SwiftType::int(), SwiftType::named("Error")])
        );
        assert_eq!(parse_type("Void").unwrap(), SwiftType::VOID);
        assert_eq!(parse_type("()").unwrap(), SwiftType::VOID);
    }

    #[test]
    fn test_parse_postfix_types() {
        assert_eq!(
            parse_type("Int?!").unwrap(),
            SwiftType::int()
                .wrapped_in_optional()
                .wrapped_in_implicitly_unwrapped_optional()
        );
        assert_eq!(
            parse_type("Foo.Bar.Type").unwrap(),
            SwiftType::Metatype(Box::new(SwiftType::named("Foo.Bar")))
        );
        assert_eq!(
            parse_type("NSObject & NSCopying").unwrap(),
            SwiftType::ProtocolComposition(vec![
                SwiftType::named("NSObject"),
                SwiftType::named("NSCopying")
            ])
        );
    }

    #[test]
    fn test_parse_block_types() {
        let ty =
            parse_type("(@escaping @convention(block) (Int, String) throws -> Bool)?").unwrap();
        let expected = SwiftType::block(
            SwiftType::bool(),
            vec![SwiftType::int(), SwiftType::string()],
            [
                BlockTypeAttribute::Escaping,
                BlockTypeAttribute::Convention(BlockConvention::Block),
            ],
        )
        .wrapped_in_optional();
        assert_eq!(ty, expected);
        assert_eq!(parse_type(&ty.to_string()).unwrap(), ty);
    }

    #[test]
    fn test_parse_type_errors() {
        assert_eq!(parse_type("[Int").unwrap_err().offset, 4);
        assert_eq!(parse_type("@escaping Int").unwrap_err().offset, 0);
        assert_eq!(parse_type("Int Int").unwrap_err().offset, 4);
        assert!(parse_type("@convention(pascal) () -> Void").is_err());
    }
}

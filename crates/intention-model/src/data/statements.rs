// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Function body statement trees
//!
//! Bodies produced upstream are mostly carried through as opaque source text; only the
//! shapes passes synthesize themselves (returns, assignments, identifiers) are structured.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    Identifier(String),
    MemberAccess {
        base: Box<Expression>,
        member: String,
    },
    Assignment {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Already-rendered expression text
    Unknown(String),
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn assignment(lhs: Expression, rhs: Expression) -> Self {
        Expression::Assignment {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::MemberAccess { base, member } => write!(f, "{}.{}", base, member),
            Expression::Assignment { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Expression::Unknown(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Return(Option<Expression>),
    Expression(Expression),
    /// Already-rendered statement text
    Unknown(String),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Return(None) => write!(f, "return"),
            Statement::Return(Some(value)) => write!(f, "return {}", value),
            Statement::Expression(expression) => write!(f, "{}", expression),
            Statement::Unknown(text) => write!(f, "{}", text),
        }
    }
}

/// Body of a function, initializer or accessor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionBody {
    pub statements: Vec<Statement>,
}

impl FunctionBody {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Placeholder body used when a merged accessor had no implementation
    pub fn empty() -> Self {
        Self::default()
    }

    /// `return <expression>`
    pub fn returning(expression: Expression) -> Self {
        Self::new(vec![Statement::Return(Some(expression))])
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

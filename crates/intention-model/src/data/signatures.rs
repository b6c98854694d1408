// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Function and parameter signatures

use crate::data::types::SwiftType;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How two signatures are compared. Callers always pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureMatchMode {
    /// Objective-C selector identity: static-ness, name and parameter labels, in order
    Selector,
    /// Full structural identity: selector plus parameter names, parameter types and return type
    Structural,
}

/// A single function parameter. `label == None` means the parameter is unlabeled (`_`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSignature {
    pub label: Option<String>,
    pub name: String,
    pub ty: SwiftType,
}

impl ParameterSignature {
    pub fn new(label: Option<String>, name: impl Into<String>, ty: SwiftType) -> Self {
        Self {
            label,
            name: name.into(),
            ty,
        }
    }

    /// Parameter whose label and name are the same identifier
    pub fn labeled(name: impl Into<String>, ty: SwiftType) -> Self {
        let name = name.into();
        Self::new(Some(name.clone()), name, ty)
    }

    /// Parameter with no argument label
    pub fn unlabeled(name: impl Into<String>, ty: SwiftType) -> Self {
        Self::new(None, name, ty)
    }
}

impl fmt::Display for ParameterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) if *label == self.name => write!(f, "{}: {}", self.name, self.ty),
            Some(label) => write!(f, "{} {}: {}", label, self.name, self.ty),
            None => write!(f, "_ {}: {}", self.name, self.ty),
        }
    }
}

/// Selector identity of a method: static-ness plus `[name, label0, label1, ...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorSignature {
    pub is_static: bool,
    pub keywords: Vec<Option<String>>,
}

/// A method or function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub parameters: Vec<ParameterSignature>,
    pub return_type: SwiftType,
    pub is_static: bool,
    pub is_mutating: bool,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterSignature>,
        return_type: SwiftType,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            is_static: false,
            is_mutating: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_mutating(mut self, is_mutating: bool) -> Self {
        self.is_mutating = is_mutating;
        self
    }

    pub fn selector(&self) -> SelectorSignature {
        let mut keywords = vec![Some(self.name.clone())];
        keywords.extend(self.parameters.iter().map(|p| p.label.clone()));
        SelectorSignature {
            is_static: self.is_static,
            keywords,
        }
    }

    /// Compares two signatures under the given mode
    pub fn matches(&self, other: &FunctionSignature, mode: SignatureMatchMode) -> bool {
        match mode {
            SignatureMatchMode::Selector => self.selector() == other.selector(),
            SignatureMatchMode::Structural => self == other,
        }
    }

    /// Whether the two signatures only differ in the optionality of their types
    pub fn differs_only_in_optionality(&self, other: &FunctionSignature) -> bool {
        self.selector() == other.selector()
            && self.return_type.deep_unwrapped_eq(&other.return_type)
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty.deep_unwrapped_eq(&b.ty))
    }

    /// Renders the signature in the form accepted by the signature parser
    pub fn to_signature_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mutating {
            write!(f, "mutating ")?;
        }
        write!(f, "{}({})", self.name, self.parameters.iter().join(", "))?;
        if !self.return_type.is_void() {
            write!(f, " -> {}", self.return_type)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, params: Vec<ParameterSignature>, ret: SwiftType) -> FunctionSignature {
        FunctionSignature::new(name, params, ret)
    }

    #[test]
    fn test_selector_match_ignores_types_and_names() {
        let a = sig(
            "setValue",
            vec![ParameterSignature::unlabeled("v", SwiftType::int())],
            SwiftType::VOID,
        );
        let b = sig(
            "setValue",
            vec![ParameterSignature::unlabeled("other", SwiftType::string())],
            SwiftType::bool(),
        );
        assert!(a.matches(&b, SignatureMatchMode::Selector));
        assert!(!a.matches(&b, SignatureMatchMode::Structural));
    }

    #[test]
    fn test_selector_match_is_label_and_static_sensitive() {
        let a = sig(
            "make",
            vec![ParameterSignature::labeled("value", SwiftType::int())],
            SwiftType::VOID,
        );
        let unlabeled = sig(
            "make",
            vec![ParameterSignature::unlabeled("value", SwiftType::int())],
            SwiftType::VOID,
        );
        assert!(!a.matches(&unlabeled, SignatureMatchMode::Selector));
        assert!(!a.matches(&a.clone().with_static(true), SignatureMatchMode::Selector));
    }

    #[test]
    fn test_render() {
        let s = sig(
            "move",
            vec![
                ParameterSignature::unlabeled("a", SwiftType::int()),
                ParameterSignature::new(Some("to".into()), "b", SwiftType::string()),
                ParameterSignature::labeled("c", SwiftType::bool().wrapped_in_optional()),
            ],
            SwiftType::int(),
        )
        .with_mutating(true);
        assert_eq!(
            s.to_string(),
            "mutating move(_ a: Int, to b: String, c: Bool?) -> Int"
        );
    }

    #[test]
    fn test_differs_only_in_optionality() {
        let a = sig(
            "load",
            vec![ParameterSignature::unlabeled(
                "url",
                SwiftType::named("URL").wrapped_in_implicitly_unwrapped_optional(),
            )],
            SwiftType::VOID,
        );
        let b = sig(
            "load",
            vec![ParameterSignature::unlabeled(
                "url",
                SwiftType::named("URL").wrapped_in_optional(),
            )],
            SwiftType::VOID,
        );
        assert!(a.differs_only_in_optionality(&b));
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Structural type model used by storages and signatures

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Calling convention attached to a block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockConvention {
    C,
    Block,
    Swift,
}

impl BlockConvention {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "c" => Some(BlockConvention::C),
            "block" => Some(BlockConvention::Block),
            "swift" => Some(BlockConvention::Swift),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockConvention::C => "c",
            BlockConvention::Block => "block",
            BlockConvention::Swift => "swift",
        }
    }
}

/// Attribute of a block (function) type. Kept in a set so that attributes coming from
/// different declaration sites combine without duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockTypeAttribute {
    Autoclosure,
    Escaping,
    Convention(BlockConvention),
}

impl fmt::Display for BlockTypeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTypeAttribute::Autoclosure => write!(f, "@autoclosure"),
            BlockTypeAttribute::Escaping => write!(f, "@escaping"),
            BlockTypeAttribute::Convention(convention) => {
                write!(f, "@convention({})", convention.name())
            }
        }
    }
}

/// Target-language type, compared structurally
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwiftType {
    /// Named type, optionally generic. Dotted names denote nested types.
    Nominal {
        name: String,
        generic_args: Vec<SwiftType>,
    },
    /// `T?`
    Optional(Box<SwiftType>),
    /// `T!`, also used for references whose nullability was never annotated
    ImplicitlyUnwrappedOptional(Box<SwiftType>),
    /// `(params) -> return`
    Block {
        return_type: Box<SwiftType>,
        parameters: Vec<SwiftType>,
        attributes: BTreeSet<BlockTypeAttribute>,
    },
    /// Tuple; the empty tuple is `Void`
    Tuple(Vec<SwiftType>),
    /// `T.Type`
    Metatype(Box<SwiftType>),
    /// `A & B`
    ProtocolComposition(Vec<SwiftType>),
}

impl SwiftType {
    pub const VOID: SwiftType = SwiftType::Tuple(Vec::new());

    pub fn named(name: impl Into<String>) -> Self {
        SwiftType::Nominal {
            name: name.into(),
            generic_args: vec![],
        }
    }

    pub fn generic(name: impl Into<String>, generic_args: Vec<SwiftType>) -> Self {
        SwiftType::Nominal {
            name: name.into(),
            generic_args,
        }
    }

    pub fn int() -> Self {
        Self::named("Int")
    }

    pub fn bool() -> Self {
        Self::named("Bool")
    }

    pub fn string() -> Self {
        Self::named("String")
    }

    pub fn any_object() -> Self {
        Self::named("AnyObject")
    }

    pub fn array(element: SwiftType) -> Self {
        Self::generic("Array", vec![element])
    }

    pub fn dictionary(key: SwiftType, value: SwiftType) -> Self {
        Self::generic("Dictionary", vec![key, value])
    }

    pub fn block(
        return_type: SwiftType,
        parameters: Vec<SwiftType>,
        attributes: impl IntoIterator<Item = BlockTypeAttribute>,
    ) -> Self {
        SwiftType::Block {
            return_type: Box::new(return_type),
            parameters,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn wrapped_in_optional(self) -> Self {
        SwiftType::Optional(Box::new(self))
    }

    pub fn wrapped_in_implicitly_unwrapped_optional(self) -> Self {
        SwiftType::ImplicitlyUnwrappedOptional(Box::new(self))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, SwiftType::Tuple(types) if types.is_empty())
    }

    /// Whether this type has an outer optional or implicitly-unwrapped layer
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            SwiftType::Optional(_) | SwiftType::ImplicitlyUnwrappedOptional(_)
        )
    }

    /// Whether the outermost layer carries no nullability annotation
    pub fn is_nullability_unspecified(&self) -> bool {
        matches!(self, SwiftType::ImplicitlyUnwrappedOptional(_))
    }

    /// Strips every outer optional layer: `Int??` and `Int!` both become `Int`
    pub fn deep_unwrapped(&self) -> &SwiftType {
        let mut current = self;
        while let SwiftType::Optional(inner) | SwiftType::ImplicitlyUnwrappedOptional(inner) =
            current
        {
            current = inner.as_ref();
        }
        current
    }

    /// Equality after deep-unwrapping both sides
    pub fn deep_unwrapped_eq(&self, other: &SwiftType) -> bool {
        self.deep_unwrapped() == other.deep_unwrapped()
    }

    /// Block attributes; `None` for any other type
    pub fn block_attributes(&self) -> Option<&BTreeSet<BlockTypeAttribute>> {
        match self {
            SwiftType::Block { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Merges `extra` into this type's block attribute set. Non-block types are unchanged.
    pub fn with_block_attributes(
        mut self,
        extra: impl IntoIterator<Item = BlockTypeAttribute>,
    ) -> Self {
        if let SwiftType::Block { attributes, .. } = &mut self {
            attributes.extend(extra);
        }
        self
    }

    fn needs_parens_under_postfix(&self) -> bool {
        matches!(
            self,
            SwiftType::Block { .. } | SwiftType::ProtocolComposition(_)
        )
    }
}

impl fmt::Display for SwiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwiftType::Nominal { name, generic_args } => {
                match (name.as_str(), generic_args.as_slice()) {
                    ("Array", [element]) => write!(f, "[{}]", element),
                    ("Dictionary", [key, value]) => write!(f, "[{}: {}]", key, value),
                    (_, []) => write!(f, "{}", name),
                    (_, args) => write!(f, "{}<{}>", name, args.iter().join(", ")),
                }
            }
            SwiftType::Optional(inner) | SwiftType::ImplicitlyUnwrappedOptional(inner) => {
                let suffix = if matches!(self, SwiftType::Optional(_)) {
                    "?"
                } else {
                    "!"
                };
                if inner.needs_parens_under_postfix() {
                    write!(f, "({}){}", inner, suffix)
                } else {
                    write!(f, "{}{}", inner, suffix)
                }
            }
            SwiftType::Block {
                return_type,
                parameters,
                attributes,
            } => {
                for attribute in attributes {
                    write!(f, "{} ", attribute)?;
                }
                write!(f, "({}) -> {}", parameters.iter().join(", "), return_type)
            }
            SwiftType::Tuple(types) if types.is_empty() => write!(f, "Void"),
            SwiftType::Tuple(types) => write!(f, "({})", types.iter().join(", ")),
            SwiftType::Metatype(inner) => {
                if inner.needs_parens_under_postfix() {
                    write!(f, "({}).Type", inner)
                } else {
                    write!(f, "{}.Type", inner)
                }
            }
            SwiftType::ProtocolComposition(types) => write!(f, "{}", types.iter().join(" & ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_unwrap_strips_all_optional_layers() {
        let ty = SwiftType::int()
            .wrapped_in_optional()
            .wrapped_in_implicitly_unwrapped_optional();
        assert_eq!(ty.deep_unwrapped(), &SwiftType::int());
        assert!(ty.deep_unwrapped_eq(&SwiftType::int().wrapped_in_optional()));
        assert!(!ty.deep_unwrapped_eq(&SwiftType::string()));
    }

    #[test]
    fn test_rendering() {
        assert_eq!(SwiftType::array(SwiftType::int()).to_string(), "[Int]");
        assert_eq!(
            SwiftType::dictionary(SwiftType::string(), SwiftType::int().wrapped_in_optional())
                .to_string(),
            "[String: Int?]"
        );
        assert_eq!(SwiftType::VOID.to_string(), "Void");
        let block = SwiftType::block(
            SwiftType::VOID,
            vec![SwiftType::int()],
            [BlockTypeAttribute::Escaping],
        );
        assert_eq!(block.to_string(), "@escaping (Int) -> Void");
        assert_eq!(
            block.wrapped_in_optional().to_string(),
            "(@escaping (Int) -> Void)?"
        );
    }

    #[test]
    fn test_block_attributes_merge_as_set() {
        let block = SwiftType::block(SwiftType::VOID, vec![], [BlockTypeAttribute::Escaping])
            .with_block_attributes([
                BlockTypeAttribute::Escaping,
                BlockTypeAttribute::Autoclosure,
            ]);
        assert_eq!(block.block_attributes().map(|a| a.len()), Some(2));
        assert_eq!(
            SwiftType::int().with_block_attributes([BlockTypeAttribute::Escaping]),
            SwiftType::int()
        );
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Value storage descriptors

use crate::data::types::SwiftType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference ownership of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ownership {
    #[default]
    Strong,
    Weak,
    Unowned,
    UnownedUnsafe,
}

impl Ownership {
    pub fn is_default(&self) -> bool {
        matches!(self, Ownership::Strong)
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Strong => write!(f, "strong"),
            Ownership::Weak => write!(f, "weak"),
            Ownership::Unowned => write!(f, "unowned"),
            Ownership::UnownedUnsafe => write!(f, "unowned(unsafe)"),
        }
    }
}

/// Type, ownership and constancy of a stored value. Two storages are equal iff all
/// three components are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueStorage {
    pub ty: SwiftType,
    pub ownership: Ownership,
    pub is_constant: bool,
}

impl ValueStorage {
    pub fn new(ty: SwiftType, ownership: Ownership, is_constant: bool) -> Self {
        Self {
            ty,
            ownership,
            is_constant,
        }
    }

    /// A strong, mutable storage of the given type
    pub fn variable(ty: SwiftType) -> Self {
        Self::new(ty, Ownership::Strong, false)
    }

    /// A strong, constant storage of the given type
    pub fn constant(ty: SwiftType) -> Self {
        Self::new(ty, Ownership::Strong, true)
    }
}

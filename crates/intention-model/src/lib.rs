// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Intention Object Model
//!
//! Mutable declaration nodes produced from Objective-C sources, the signature and type model
//! they are described with, and the known-type abstraction used to reason about types that
//! are not part of the translated sources.

pub mod data;
pub mod known_type;
pub mod known_type_builder;
pub mod parser;

pub use data::history::{HistoryRecord, IntentionHistory};
pub use data::intentions::*;
pub use data::signatures::{
    FunctionSignature, ParameterSignature, SelectorSignature, SignatureMatchMode,
};
pub use data::statements::{Expression, FunctionBody, Statement};
pub use data::storage::{Ownership, ValueStorage};
pub use data::types::{BlockConvention, BlockTypeAttribute, SwiftType};
pub use data::{IntentionCollection, IntentionId, InvariantViolation};
pub use known_type::{
    ConcreteKnownType, KnownConstructor, KnownMethod, KnownProperty, KnownPropertyAccessor,
    KnownProtocolConformance, KnownType, KnownTypeKind, KnownTypeReference, TypeIntentionView,
};
pub use known_type_builder::KnownTypeBuilder;
pub use parser::{parse_parameters, parse_signature, parse_type, SyntaxError};

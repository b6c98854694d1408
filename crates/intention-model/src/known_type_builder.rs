// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Fluent builder for `ConcreteKnownType`
//!
//! Members are de-duplicated structurally; the first registration of a member wins.

use crate::data::signatures::{FunctionSignature, ParameterSignature, SignatureMatchMode};
use crate::data::storage::ValueStorage;
use crate::known_type::{
    ConcreteKnownType, KnownConstructor, KnownMethod, KnownProperty, KnownPropertyAccessor,
    KnownProtocolConformance, KnownTypeKind, KnownTypeReference,
};
use crate::parser::{parse_signature, SyntaxError};

/// Builder that accumulates members into a `ConcreteKnownType`
#[derive(Debug, Clone)]
pub struct KnownTypeBuilder {
    ty: ConcreteKnownType,
}

impl KnownTypeBuilder {
    pub fn new(type_name: impl Into<String>, kind: KnownTypeKind) -> Self {
        Self {
            ty: ConcreteKnownType::new(type_name, kind),
        }
    }

    pub fn supertype(mut self, name: impl Into<String>) -> Self {
        self.ty.supertype = Some(KnownTypeReference::Named(name.into()));
        self
    }

    /// Marks the built type as an extension of `type_name`
    pub fn extension(mut self) -> Self {
        self.ty.is_extension = true;
        self
    }

    /// Adds a constructor.
    ///
    /// # Panics
    /// Panics when a second parameterless constructor is added
    pub fn constructor(mut self, parameters: Vec<ParameterSignature>) -> Self {
        assert!(
            !parameters.is_empty() || self.ty.constructors.iter().all(|c| !c.parameters.is_empty()),
            "BUG: known type `{}` already has a parameterless constructor",
            self.ty.type_name
        );
        self.ty.constructors.push(KnownConstructor {
            parameters,
            is_failable: false,
        });
        self
    }

    /// Adds a method unless one matching it under `mode` already exists
    pub fn method(
        mut self,
        signature: FunctionSignature,
        optional: bool,
        mode: SignatureMatchMode,
    ) -> Self {
        if self
            .ty
            .methods
            .iter()
            .any(|m| m.signature.matches(&signature, mode))
        {
            log::trace!(
                "known type `{}`: skipping duplicate method `{}`",
                self.ty.type_name,
                signature
            );
            return self;
        }
        self.ty.methods.push(KnownMethod {
            signature,
            optional,
        });
        self
    }

    /// Parses `text` as a signature and adds it as a method
    pub fn method_with_text(
        self,
        text: &str,
        optional: bool,
        mode: SignatureMatchMode,
    ) -> Result<Self, SyntaxError> {
        let signature = parse_signature(text)?;
        Ok(self.method(signature, optional, mode))
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        storage: ValueStorage,
        is_static: bool,
        optional: bool,
        accessor: KnownPropertyAccessor,
    ) -> Self {
        let property = KnownProperty {
            name: name.into(),
            storage,
            is_static,
            optional,
            accessor,
        };
        if !contains_member(&self.ty.properties, &property) {
            self.ty.properties.push(property);
        }
        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        storage: ValueStorage,
        is_static: bool,
    ) -> Self {
        let field = KnownProperty {
            name: name.into(),
            storage,
            is_static,
            optional: false,
            accessor: KnownPropertyAccessor::GetterAndSetter,
        };
        if !contains_member(&self.ty.fields, &field) {
            self.ty.fields.push(field);
        }
        self
    }

    pub fn protocol_conformance(mut self, protocol_name: impl Into<String>) -> Self {
        let protocol_name = protocol_name.into();
        if !self
            .ty
            .protocol_conformances
            .iter()
            .any(|c| c.protocol_name == protocol_name)
        {
            self.ty
                .protocol_conformances
                .push(KnownProtocolConformance { protocol_name });
        }
        self
    }

    /// The type accumulated so far. The builder stays usable.
    pub fn build(&self) -> ConcreteKnownType {
        self.ty.clone()
    }
}

/// Properties and fields are keyed by `(name, storage, is_static)`
fn contains_member(members: &[KnownProperty], candidate: &KnownProperty) -> bool {
    members.iter().any(|m| {
        m.name == candidate.name
            && m.storage == candidate.storage
            && m.is_static == candidate.is_static
    })
}

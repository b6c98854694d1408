// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Structural description of a type's shape
//!
//! `KnownType` is implemented both by types assembled with `KnownTypeBuilder` (default
//! framework types, configured types, test doubles) and by `TypeIntentionView`, which projects
//! a type intention of a collection.

use crate::data::intentions::{IntentionKind, PropertyMode, TypeIntention};
use crate::data::signatures::{FunctionSignature, ParameterSignature};
use crate::data::storage::ValueStorage;
use crate::data::{IntentionCollection, IntentionId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownTypeKind {
    Class,
    Struct,
    Protocol,
    Enum,
}

impl KnownTypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            KnownTypeKind::Class => "class",
            KnownTypeKind::Struct => "struct",
            KnownTypeKind::Protocol => "protocol",
            KnownTypeKind::Enum => "enum",
        }
    }
}

/// Reference to another type, either by name or fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnownTypeReference {
    Named(String),
    Known(Box<ConcreteKnownType>),
}

impl KnownTypeReference {
    pub fn name(&self) -> &str {
        match self {
            KnownTypeReference::Named(name) => name,
            KnownTypeReference::Known(ty) => &ty.type_name,
        }
    }
}

impl fmt::Display for KnownTypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownConstructor {
    pub parameters: Vec<ParameterSignature>,
    pub is_failable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMethod {
    pub signature: FunctionSignature,
    /// `@optional` protocol requirement
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KnownPropertyAccessor {
    #[default]
    GetterAndSetter,
    Getter,
}

/// A property or a field; fields use the same shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownProperty {
    pub name: String,
    pub storage: ValueStorage,
    pub is_static: bool,
    pub optional: bool,
    pub accessor: KnownPropertyAccessor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownProtocolConformance {
    pub protocol_name: String,
}

/// Capability set describing a type. Every sequence is in insertion order.
pub trait KnownType {
    fn type_name(&self) -> &str;
    fn kind(&self) -> KnownTypeKind;
    fn supertype(&self) -> Option<KnownTypeReference>;

    /// Whether this describes an extension of `type_name` rather than its declaration
    fn is_extension(&self) -> bool {
        false
    }

    fn known_constructors(&self) -> Vec<KnownConstructor>;
    fn known_methods(&self) -> Vec<KnownMethod>;
    fn known_properties(&self) -> Vec<KnownProperty>;
    fn known_fields(&self) -> Vec<KnownProperty>;
    fn known_protocol_conformances(&self) -> Vec<KnownProtocolConformance>;
}

// ============================================================================
// Concrete known type
// ============================================================================

/// Known type whose members are stored by value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcreteKnownType {
    pub type_name: String,
    pub kind: KnownTypeKind,
    pub supertype: Option<KnownTypeReference>,
    pub is_extension: bool,
    pub constructors: Vec<KnownConstructor>,
    pub methods: Vec<KnownMethod>,
    pub properties: Vec<KnownProperty>,
    pub fields: Vec<KnownProperty>,
    pub protocol_conformances: Vec<KnownProtocolConformance>,
}

impl ConcreteKnownType {
    pub fn new(type_name: impl Into<String>, kind: KnownTypeKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            supertype: None,
            is_extension: false,
            constructors: vec![],
            methods: vec![],
            properties: vec![],
            fields: vec![],
            protocol_conformances: vec![],
        }
    }
}

impl KnownType for ConcreteKnownType {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn kind(&self) -> KnownTypeKind {
        self.kind
    }

    fn supertype(&self) -> Option<KnownTypeReference> {
        self.supertype.clone()
    }

    fn is_extension(&self) -> bool {
        self.is_extension
    }

    fn known_constructors(&self) -> Vec<KnownConstructor> {
        self.constructors.clone()
    }

    fn known_methods(&self) -> Vec<KnownMethod> {
        self.methods.clone()
    }

    fn known_properties(&self) -> Vec<KnownProperty> {
        self.properties.clone()
    }

    fn known_fields(&self) -> Vec<KnownProperty> {
        self.fields.clone()
    }

    fn known_protocol_conformances(&self) -> Vec<KnownProtocolConformance> {
        self.protocol_conformances.clone()
    }
}

// ============================================================================
// Intention view
// ============================================================================

/// Projects a type intention of a collection as a `KnownType`
#[derive(Clone, Copy)]
pub struct TypeIntentionView<'a> {
    collection: &'a IntentionCollection,
    id: IntentionId,
}

impl<'a> TypeIntentionView<'a> {
    /// Returns `None` when `id` is not a type intention
    pub fn new(collection: &'a IntentionCollection, id: IntentionId) -> Option<Self> {
        collection.type_intention(id)?;
        Some(Self { collection, id })
    }

    pub fn id(&self) -> IntentionId {
        self.id
    }

    fn type_intention(&self) -> &'a dyn TypeIntention {
        self.collection
            .type_intention(self.id)
            .unwrap_or_else(|| panic!("BUG: {} is not a type intention", self.id))
    }
}

impl<'a> KnownType for TypeIntentionView<'a> {
    fn type_name(&self) -> &str {
        self.type_intention().type_name()
    }

    fn kind(&self) -> KnownTypeKind {
        match self.collection.kind(self.id) {
            IntentionKind::Protocol(_) => KnownTypeKind::Protocol,
            IntentionKind::Struct(_) => KnownTypeKind::Struct,
            _ => KnownTypeKind::Class,
        }
    }

    fn supertype(&self) -> Option<KnownTypeReference> {
        self.collection.class(self.id)?.supertype()
    }

    fn is_extension(&self) -> bool {
        self.collection.class_extension(self.id).is_some()
    }

    fn known_constructors(&self) -> Vec<KnownConstructor> {
        self.collection
            .initializers_of(self.id)
            .iter()
            .filter_map(|id| self.collection.initializer(*id))
            .map(|init| KnownConstructor {
                parameters: init.parameters.clone(),
                is_failable: init.is_failable,
            })
            .collect()
    }

    fn known_methods(&self) -> Vec<KnownMethod> {
        self.collection
            .methods_of(self.id)
            .iter()
            .filter_map(|id| self.collection.method(*id))
            .map(|method| KnownMethod {
                signature: method.signature.clone(),
                optional: method.is_optional,
            })
            .collect()
    }

    fn known_properties(&self) -> Vec<KnownProperty> {
        self.collection
            .properties_of(self.id)
            .iter()
            .filter_map(|id| self.collection.property(*id))
            .map(|property| {
                let read_only = match property.mode {
                    PropertyMode::Computed(_) => true,
                    PropertyMode::Stored => property.is_source_readonly(),
                    PropertyMode::Property { .. } => false,
                };
                KnownProperty {
                    name: property.name.clone(),
                    storage: property.storage.clone(),
                    is_static: property.is_static,
                    optional: property.is_optional,
                    accessor: if read_only {
                        KnownPropertyAccessor::Getter
                    } else {
                        KnownPropertyAccessor::GetterAndSetter
                    },
                }
            })
            .collect()
    }

    fn known_fields(&self) -> Vec<KnownProperty> {
        self.collection
            .instance_variables_of(self.id)
            .iter()
            .filter_map(|id| self.collection.instance_variable(*id))
            .map(|ivar| KnownProperty {
                name: ivar.name.clone(),
                storage: ivar.storage.clone(),
                is_static: false,
                optional: false,
                accessor: KnownPropertyAccessor::GetterAndSetter,
            })
            .collect()
    }

    fn known_protocol_conformances(&self) -> Vec<KnownProtocolConformance> {
        self.type_intention()
            .protocols()
            .iter()
            .map(|p| KnownProtocolConformance {
                protocol_name: p.protocol_name.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::intentions::*;
    use crate::data::types::SwiftType;

    #[test]
    fn test_view_projects_class_intention() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Foo.m"));
        let class = collection.add_class(
            file,
            ClassGenerationIntention::new("Foo")
                .with_superclass("NSObject")
                .with_protocols(&["NSCopying"]),
        );
        collection.add_instance_variable(
            class,
            InstanceVariableGenerationIntention::new(
                "_x",
                ValueStorage::variable(SwiftType::int()),
            ),
        );
        collection.add_property(
            class,
            PropertyGenerationIntention::new("x", ValueStorage::variable(SwiftType::int()))
                .with_source_attributes(&["nonatomic", "readonly"]),
        );
        collection.add_method(
            class,
            MethodGenerationIntention::new(FunctionSignature::new(
                "reset",
                vec![],
                SwiftType::VOID,
            )),
        );

        let view = TypeIntentionView::new(&collection, class).unwrap();
        assert_eq!(view.type_name(), "Foo");
        assert_eq!(view.kind(), KnownTypeKind::Class);
        assert_eq!(view.supertype().unwrap().name(), "NSObject");
        assert_eq!(view.known_fields()[0].name, "_x");
        assert_eq!(
            view.known_properties()[0].accessor,
            KnownPropertyAccessor::Getter
        );
        assert_eq!(view.known_methods()[0].signature.name, "reset");
        assert_eq!(view.known_protocol_conformances()[0].protocol_name, "NSCopying");
        assert_eq!(view.known_properties()[0].name, "x");
        assert!(TypeIntentionView::new(&collection, file).is_none());
    }
}

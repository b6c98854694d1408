// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Intention node kinds
//!
//! Containers keep their members as ordered handle lists. The lists are only mutable from
//! inside this crate so that every ownership change goes through `IntentionCollection`,
//! which maintains the parent back-references.

use crate::data::history::IntentionHistory;
use crate::data::signatures::{FunctionSignature, ParameterSignature};
use crate::data::statements::FunctionBody;
use crate::data::storage::ValueStorage;
use crate::data::types::SwiftType;
use crate::data::IntentionId;
use crate::known_type::KnownTypeReference;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    Private,
    Fileprivate,
    #[default]
    Internal,
    Public,
    Open,
}

impl AccessLevel {
    pub fn keyword(&self) -> &'static str {
        match self {
            AccessLevel::Private => "private",
            AccessLevel::Fileprivate => "fileprivate",
            AccessLevel::Internal => "internal",
            AccessLevel::Public => "public",
            AccessLevel::Open => "open",
        }
    }
}

/// Location of the foreign-language declaration an intention was created from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

// ============================================================================
// Intention node
// ============================================================================

/// A declaration node. `parent` is a lookup-only back-reference to the container that
/// currently holds this node; it never implies ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intention {
    pub access_level: AccessLevel,
    pub source: Option<SourceLocation>,
    pub history: IntentionHistory,
    pub(crate) parent: Option<IntentionId>,
    pub(crate) kind: IntentionKind,
}

impl Intention {
    pub(crate) fn new(kind: IntentionKind) -> Self {
        Self {
            access_level: AccessLevel::default(),
            source: None,
            history: IntentionHistory::new(),
            parent: None,
            kind,
        }
    }

    pub fn parent(&self) -> Option<IntentionId> {
        self.parent
    }

    pub fn kind(&self) -> &IntentionKind {
        &self.kind
    }
}

/// Which list of a container a member lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSlot {
    Type,
    GlobalFunction,
    Property,
    InstanceVariable,
    Method,
    Initializer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntentionKind {
    File(FileGenerationIntention),
    Class(ClassGenerationIntention),
    ClassExtension(ClassExtensionGenerationIntention),
    Protocol(ProtocolGenerationIntention),
    Struct(StructGenerationIntention),
    Property(PropertyGenerationIntention),
    InstanceVariable(InstanceVariableGenerationIntention),
    Method(MethodGenerationIntention),
    Initializer(InitGenerationIntention),
    GlobalFunction(GlobalFunctionGenerationIntention),
}

impl IntentionKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            IntentionKind::File(_) => "file",
            IntentionKind::Class(_) => "class",
            IntentionKind::ClassExtension(_) => "extension",
            IntentionKind::Protocol(_) => "protocol",
            IntentionKind::Struct(_) => "struct",
            IntentionKind::Property(_) => "property",
            IntentionKind::InstanceVariable(_) => "instance variable",
            IntentionKind::Method(_) => "method",
            IntentionKind::Initializer(_) => "initializer",
            IntentionKind::GlobalFunction(_) => "global function",
        }
    }

    /// The container list this node is stored in; `None` for files, which are roots
    pub fn member_slot(&self) -> Option<MemberSlot> {
        match self {
            IntentionKind::File(_) => None,
            IntentionKind::Class(_)
            | IntentionKind::ClassExtension(_)
            | IntentionKind::Protocol(_)
            | IntentionKind::Struct(_) => Some(MemberSlot::Type),
            IntentionKind::Property(_) => Some(MemberSlot::Property),
            IntentionKind::InstanceVariable(_) => Some(MemberSlot::InstanceVariable),
            IntentionKind::Method(_) => Some(MemberSlot::Method),
            IntentionKind::Initializer(_) => Some(MemberSlot::Initializer),
            IntentionKind::GlobalFunction(_) => Some(MemberSlot::GlobalFunction),
        }
    }

    pub fn as_type_intention(&self) -> Option<&dyn TypeIntention> {
        match self {
            IntentionKind::Class(class) => Some(class),
            IntentionKind::ClassExtension(extension) => Some(extension),
            IntentionKind::Protocol(protocol) => Some(protocol),
            IntentionKind::Struct(structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_instance_variable_container(
        &self,
    ) -> Option<&dyn InstanceVariableContainerIntention> {
        match self {
            IntentionKind::Class(class) => Some(class),
            IntentionKind::ClassExtension(extension) => Some(extension),
            IntentionKind::Struct(structure) => Some(structure),
            _ => None,
        }
    }

    /// Every member list of this node, as `(slot, handles)`
    pub fn member_lists(&self) -> Vec<(MemberSlot, &[IntentionId])> {
        if let IntentionKind::File(file) = self {
            return vec![
                (MemberSlot::Type, file.types.as_slice()),
                (MemberSlot::GlobalFunction, file.global_functions.as_slice()),
            ];
        }
        let mut lists = vec![];
        if let Some(ty) = self.as_type_intention() {
            let data = ty.type_data();
            lists.push((MemberSlot::Property, data.properties.as_slice()));
            lists.push((MemberSlot::Method, data.methods.as_slice()));
            lists.push((MemberSlot::Initializer, data.initializers.as_slice()));
        }
        if let Some(container) = self.as_instance_variable_container() {
            lists.push((MemberSlot::InstanceVariable, container.instance_variables()));
        }
        lists
    }

    pub(crate) fn member_list_mut(&mut self, slot: MemberSlot) -> Option<&mut Vec<IntentionId>> {
        match (self, slot) {
            (IntentionKind::File(file), MemberSlot::Type) => Some(&mut file.types),
            (IntentionKind::File(file), MemberSlot::GlobalFunction) => {
                Some(&mut file.global_functions)
            }
            (IntentionKind::Class(class), MemberSlot::InstanceVariable) => {
                Some(&mut class.instance_variables)
            }
            (IntentionKind::ClassExtension(extension), MemberSlot::InstanceVariable) => {
                Some(&mut extension.instance_variables)
            }
            (IntentionKind::Struct(structure), MemberSlot::InstanceVariable) => {
                Some(&mut structure.instance_variables)
            }
            (kind, slot) => {
                let data = match kind {
                    IntentionKind::Class(class) => &mut class.type_data,
                    IntentionKind::ClassExtension(extension) => &mut extension.type_data,
                    IntentionKind::Protocol(protocol) => &mut protocol.type_data,
                    IntentionKind::Struct(structure) => &mut structure.type_data,
                    _ => return None,
                };
                match slot {
                    MemberSlot::Property => Some(&mut data.properties),
                    MemberSlot::Method => Some(&mut data.methods),
                    MemberSlot::Initializer => Some(&mut data.initializers),
                    _ => None,
                }
            }
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// A nominal type declaration: class, extension, protocol or struct
pub trait TypeIntention {
    fn type_data(&self) -> &TypeGenerationIntention;
    fn type_data_mut(&mut self) -> &mut TypeGenerationIntention;

    fn type_name(&self) -> &str {
        &self.type_data().type_name
    }

    fn protocols(&self) -> &[ProtocolInheritanceIntention] {
        &self.type_data().protocols
    }

    fn properties(&self) -> &[IntentionId] {
        &self.type_data().properties
    }

    fn methods(&self) -> &[IntentionId] {
        &self.type_data().methods
    }

    fn initializers(&self) -> &[IntentionId] {
        &self.type_data().initializers
    }

    fn conforms_to(&self, protocol_name: &str) -> bool {
        self.protocols().iter().any(|p| p.protocol_name == protocol_name)
    }
}

/// A type declaration able to hold instance variables
pub trait InstanceVariableContainerIntention: TypeIntention {
    fn instance_variables(&self) -> &[IntentionId];
}

// ============================================================================
// Files and types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileGenerationIntention {
    pub target_path: String,
    /// Raw preprocessor directives found in the source file, e.g. `#import <UIKit/UIKit.h>`
    pub preprocessor_directives: Vec<String>,
    /// Target-language modules to import
    pub import_directives: Vec<String>,
    pub(crate) types: Vec<IntentionId>,
    pub(crate) global_functions: Vec<IntentionId>,
}

impl FileGenerationIntention {
    pub fn new(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            ..Self::default()
        }
    }

    pub fn with_preprocessor_directives(mut self, directives: Vec<String>) -> Self {
        self.preprocessor_directives = directives;
        self
    }

    pub fn types(&self) -> &[IntentionId] {
        &self.types
    }

    pub fn global_functions(&self) -> &[IntentionId] {
        &self.global_functions
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.global_functions.is_empty()
    }

    /// File name without directory or extension
    pub fn stem(&self) -> &str {
        Path::new(&self.target_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.target_path)
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.target_path)
            .extension()
            .and_then(|s| s.to_str())
    }
}

/// Conformance of a type to a protocol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolInheritanceIntention {
    pub protocol_name: String,
}

impl ProtocolInheritanceIntention {
    pub fn new(protocol_name: impl Into<String>) -> Self {
        Self {
            protocol_name: protocol_name.into(),
        }
    }
}

/// Data shared by all type declarations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeGenerationIntention {
    pub type_name: String,
    pub protocols: Vec<ProtocolInheritanceIntention>,
    pub(crate) properties: Vec<IntentionId>,
    pub(crate) methods: Vec<IntentionId>,
    pub(crate) initializers: Vec<IntentionId>,
}

impl TypeGenerationIntention {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Adds a conformance unless one with the same protocol name exists
    pub fn add_protocol(&mut self, protocol: ProtocolInheritanceIntention) -> bool {
        if self
            .protocols
            .iter()
            .any(|p| p.protocol_name == protocol.protocol_name)
        {
            return false;
        }
        self.protocols.push(protocol);
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassGenerationIntention {
    pub type_data: TypeGenerationIntention,
    pub superclass_name: Option<String>,
    pub(crate) instance_variables: Vec<IntentionId>,
}

impl ClassGenerationIntention {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_data: TypeGenerationIntention::new(type_name),
            ..Self::default()
        }
    }

    pub fn with_superclass(mut self, superclass_name: impl Into<String>) -> Self {
        self.superclass_name = Some(superclass_name.into());
        self
    }

    pub fn with_protocols(mut self, protocols: &[&str]) -> Self {
        for name in protocols {
            self.type_data
                .add_protocol(ProtocolInheritanceIntention::new(*name));
        }
        self
    }

    /// Derived from the superclass name, never stored
    pub fn supertype(&self) -> Option<KnownTypeReference> {
        self.superclass_name
            .as_ref()
            .map(|name| KnownTypeReference::Named(name.clone()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassExtensionGenerationIntention {
    pub type_data: TypeGenerationIntention,
    /// Name of the originating category; `None` or empty for an anonymous class extension
    pub category_name: Option<String>,
    pub(crate) instance_variables: Vec<IntentionId>,
}

impl ClassExtensionGenerationIntention {
    pub fn new(type_name: impl Into<String>, category_name: Option<String>) -> Self {
        Self {
            type_data: TypeGenerationIntention::new(type_name),
            category_name,
            ..Self::default()
        }
    }

    /// An `@interface Foo ()` extension rather than a named category
    pub fn is_anonymous_class_extension(&self) -> bool {
        self.category_name.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolGenerationIntention {
    pub type_data: TypeGenerationIntention,
}

impl ProtocolGenerationIntention {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_data: TypeGenerationIntention::new(type_name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructGenerationIntention {
    pub type_data: TypeGenerationIntention,
    pub(crate) instance_variables: Vec<IntentionId>,
}

impl StructGenerationIntention {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_data: TypeGenerationIntention::new(type_name),
            ..Self::default()
        }
    }
}

macro_rules! impl_type_intention {
    ($($ty:ty),*) => {
        $(impl TypeIntention for $ty {
            fn type_data(&self) -> &TypeGenerationIntention {
                &self.type_data
            }

            fn type_data_mut(&mut self) -> &mut TypeGenerationIntention {
                &mut self.type_data
            }
        })*
    };
}

impl_type_intention!(
    ClassGenerationIntention,
    ClassExtensionGenerationIntention,
    ProtocolGenerationIntention,
    StructGenerationIntention
);

macro_rules! impl_instance_variable_container {
    ($($ty:ty),*) => {
        $(impl InstanceVariableContainerIntention for $ty {
            fn instance_variables(&self) -> &[IntentionId] {
                &self.instance_variables
            }
        })*
    };
}

impl_instance_variable_container!(
    ClassGenerationIntention,
    ClassExtensionGenerationIntention,
    StructGenerationIntention
);

// ============================================================================
// Members
// ============================================================================

/// Accessor setter: the identifier bound to the new value, and the setter body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySetter {
    pub value_identifier: String,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyMode {
    /// Backed by storage; the shape every property starts in
    #[default]
    Stored,
    /// Getter only
    Computed(FunctionBody),
    /// Getter and setter
    Property {
        getter: FunctionBody,
        setter: PropertySetter,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyGenerationIntention {
    pub name: String,
    pub storage: ValueStorage,
    pub is_static: bool,
    /// `@optional` protocol requirement
    pub is_optional: bool,
    /// Attributes written on the source property declaration, e.g. `nonatomic`, `readonly`
    pub source_attributes: Vec<String>,
    pub mode: PropertyMode,
}

impl PropertyGenerationIntention {
    pub fn new(name: impl Into<String>, storage: ValueStorage) -> Self {
        Self {
            name: name.into(),
            storage,
            is_static: false,
            is_optional: false,
            source_attributes: vec![],
            mode: PropertyMode::Stored,
        }
    }

    pub fn with_source_attributes(mut self, attributes: &[&str]) -> Self {
        self.source_attributes = attributes.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn ty(&self) -> &SwiftType {
        &self.storage.ty
    }

    /// Declared `readonly` in the source language
    pub fn is_source_readonly(&self) -> bool {
        self.source_attributes.iter().any(|a| a == "readonly")
    }

    pub fn is_stored(&self) -> bool {
        matches!(self.mode, PropertyMode::Stored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceVariableGenerationIntention {
    pub name: String,
    pub storage: ValueStorage,
}

impl InstanceVariableGenerationIntention {
    pub fn new(name: impl Into<String>, storage: ValueStorage) -> Self {
        Self {
            name: name.into(),
            storage,
        }
    }

    pub fn ty(&self) -> &SwiftType {
        &self.storage.ty
    }

    pub fn is_constant(&self) -> bool {
        self.storage.is_constant
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodGenerationIntention {
    pub signature: FunctionSignature,
    pub body: Option<FunctionBody>,
    /// `@optional` protocol requirement
    pub is_optional: bool,
}

impl MethodGenerationIntention {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: None,
            is_optional: false,
        }
    }

    pub fn with_body(mut self, body: FunctionBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitGenerationIntention {
    pub parameters: Vec<ParameterSignature>,
    pub is_failable: bool,
    pub body: Option<FunctionBody>,
}

impl InitGenerationIntention {
    pub fn new(parameters: Vec<ParameterSignature>) -> Self {
        Self {
            parameters,
            is_failable: false,
            body: None,
        }
    }

    /// Selector-style view of this initializer, named `init`
    pub fn signature(&self) -> FunctionSignature {
        FunctionSignature::new("init", self.parameters.clone(), SwiftType::VOID)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalFunctionGenerationIntention {
    pub signature: FunctionSignature,
    pub body: Option<FunctionBody>,
}

impl GlobalFunctionGenerationIntention {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: None,
        }
    }
}

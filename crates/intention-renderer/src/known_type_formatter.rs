// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Canonical textual rendering of known types and their members.
//!
//! Output is deterministic: a type body lists static fields, static properties, instance
//! fields and instance properties, then (after a blank line) constructors and methods, each
//! group in insertion order.

use crate::swift_writer::{render_to_string, SwiftWriter};
use intention_model::{
    FunctionSignature, KnownConstructor, KnownMethod, KnownProperty, KnownPropertyAccessor,
    KnownType, SwiftType,
};
use itertools::Itertools;

/// Render a known type as a declaration with its members. No trailing newline.
pub fn known_type_to_string(ty: &dyn KnownType) -> String {
    let text = render_to_string(|w| render_known_type(ty, w));
    text.trim_end_matches('\n').to_string()
}

pub fn render_known_type(ty: &dyn KnownType, w: &mut SwiftWriter) {
    let fields = ty.known_fields();
    let properties = ty.known_properties();

    let mut storage = vec![];
    storage.extend(fields.iter().filter(|f| f.is_static).map(field_to_string));
    storage.extend(properties.iter().filter(|p| p.is_static).map(property_to_string));
    storage.extend(fields.iter().filter(|f| !f.is_static).map(field_to_string));
    storage.extend(properties.iter().filter(|p| !p.is_static).map(property_to_string));

    let mut callables = vec![];
    callables.extend(ty.known_constructors().iter().map(constructor_to_string));
    callables.extend(ty.known_methods().iter().map(method_to_string));

    w.block(&type_header(ty), |w| {
        for line in &storage {
            w.line(line);
        }
        if !storage.is_empty() && !callables.is_empty() {
            w.newline();
        }
        for line in &callables {
            w.line(line);
        }
    });
}

/// `class Foo: Base, Proto` / `extension Foo: Proto`
pub fn type_header(ty: &dyn KnownType) -> String {
    let keyword = if ty.is_extension() {
        "extension"
    } else {
        ty.kind().keyword()
    };
    let inheritance = ty
        .supertype()
        .map(|s| s.name().to_string())
        .into_iter()
        .chain(
            ty.known_protocol_conformances()
                .into_iter()
                .map(|c| c.protocol_name),
        )
        .collect_vec();
    if inheritance.is_empty() {
        format!("{} {}", keyword, ty.type_name())
    } else {
        format!("{} {}: {}", keyword, ty.type_name(), inheritance.join(", "))
    }
}

pub fn field_to_string(field: &KnownProperty) -> String {
    let mut text = String::new();
    if field.is_static {
        text.push_str("static ");
    }
    if !field.storage.ownership.is_default() {
        text.push_str(&format!("{} ", field.storage.ownership));
    }
    let keyword = if field.storage.is_constant { "let" } else { "var" };
    text.push_str(&format!("{} {}: {}", keyword, field.name, field.storage.ty));
    text
}

pub fn property_to_string(property: &KnownProperty) -> String {
    let mut text = String::new();
    if property.optional {
        text.push_str("optional ");
    }
    if property.is_static {
        text.push_str("static ");
    }
    if !property.storage.ownership.is_default() {
        text.push_str(&format!("{} ", property.storage.ownership));
    }
    text.push_str(&format!("var {}: {}", property.name, property.storage.ty));
    if property.accessor == KnownPropertyAccessor::Getter {
        text.push_str(" { get }");
    }
    text
}

pub fn constructor_to_string(constructor: &KnownConstructor) -> String {
    format!(
        "init{}({})",
        if constructor.is_failable { "?" } else { "" },
        constructor.parameters.iter().join(", ")
    )
}

pub fn method_to_string(method: &KnownMethod) -> String {
    let mut text = String::new();
    if method.optional {
        text.push_str("optional ");
    }
    text.push_str(&function_declaration(&method.signature));
    text
}

/// `[static ][mutating ]func name(...) -> T`
pub fn function_declaration(signature: &FunctionSignature) -> String {
    let mut text = String::new();
    if signature.is_static {
        text.push_str("static ");
    }
    if signature.is_mutating {
        text.push_str("mutating ");
    }
    text.push_str("func ");
    text.push_str(&signature.clone().with_mutating(false).to_string());
    text
}

/// `Foo.name(_ v: Int) -> String`, as used in change history descriptions
pub fn qualified_signature(type_name: &str, signature: &FunctionSignature) -> String {
    format!("{}.{}", type_name, signature.clone().with_mutating(false))
}

/// `Foo.name: String`
pub fn qualified_property(type_name: &str, name: &str, ty: &SwiftType) -> String {
    format!("{}.{}: {}", type_name, name, ty)
}

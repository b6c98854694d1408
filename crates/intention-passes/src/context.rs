// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Shared state handed to every intention pass.

use crate::options::{IntentionPassOptions, KnownTypeDeclaration};
use indexmap::IndexMap;
use intention_model::{
    parse_parameters, ConcreteKnownType, IntentionCollection, KnownPropertyAccessor, KnownType,
    KnownTypeBuilder, KnownTypeKind, SignatureMatchMode, SwiftType, SyntaxError,
    TypeIntentionView, ValueStorage,
};
use once_cell::sync::Lazy;

/// Framework types every translation can rely on
static DEFAULT_KNOWN_TYPES: Lazy<Vec<ConcreteKnownType>> = Lazy::new(|| {
    default_known_types().unwrap_or_else(|e| panic!("BUG: malformed default known type: {}", e))
});

fn default_known_types() -> Result<Vec<ConcreteKnownType>, SyntaxError> {
    let ns_object_protocol = KnownTypeBuilder::new("NSObjectProtocol", KnownTypeKind::Protocol)
        .method_with_text("isEqual(_ object: Any?) -> Bool", false, SignatureMatchMode::Selector)?
        .method_with_text(
            "isKind(of aClass: AnyClass) -> Bool",
            false,
            SignatureMatchMode::Selector,
        )?
        .method_with_text(
            "isMember(of aClass: AnyClass) -> Bool",
            false,
            SignatureMatchMode::Selector,
        )?
        .method_with_text(
            "responds(to aSelector: Selector!) -> Bool",
            false,
            SignatureMatchMode::Selector,
        )?
        .property(
            "hash",
            ValueStorage::variable(SwiftType::int()),
            false,
            false,
            KnownPropertyAccessor::Getter,
        )
        .property(
            "description",
            ValueStorage::variable(SwiftType::string()),
            false,
            false,
            KnownPropertyAccessor::Getter,
        )
        .property(
            "debugDescription",
            ValueStorage::variable(SwiftType::string()),
            false,
            true,
            KnownPropertyAccessor::Getter,
        );

    let ns_copying = KnownTypeBuilder::new("NSCopying", KnownTypeKind::Protocol)
        .method_with_text("copy(with zone: NSZone?) -> Any", false, SignatureMatchMode::Selector)?;

    let ns_coding = KnownTypeBuilder::new("NSCoding", KnownTypeKind::Protocol)
        .constructor(parse_parameters("(coder aDecoder: NSCoder)")?)
        .method_with_text("encode(with aCoder: NSCoder)", false, SignatureMatchMode::Selector)?;

    Ok(vec![
        ns_object_protocol.build(),
        ns_copying.build(),
        ns_coding.build(),
    ])
}

/// Known types by name, in registration order
#[derive(Debug, Clone, Default)]
pub struct KnownTypeRegistry {
    types: IndexMap<String, ConcreteKnownType>,
}

impl KnownTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the default framework types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for ty in DEFAULT_KNOWN_TYPES.iter() {
            registry.register(ty.clone());
        }
        registry
    }

    /// Registers a type, replacing any type with the same name
    pub fn register(&mut self, ty: ConcreteKnownType) {
        self.types.insert(ty.type_name.clone(), ty);
    }

    /// Registers a type declared in configuration
    pub fn register_declaration(
        &mut self,
        declaration: &KnownTypeDeclaration,
    ) -> Result<(), SyntaxError> {
        let mut builder = KnownTypeBuilder::new(&declaration.name, declaration.kind);
        if let Some(supertype) = &declaration.supertype {
            builder = builder.supertype(supertype);
        }
        for conformance in &declaration.conformances {
            builder = builder.protocol_conformance(conformance);
        }
        for method in &declaration.methods {
            builder = builder.method_with_text(method, false, SignatureMatchMode::Selector)?;
        }
        self.register(builder.build());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ConcreteKnownType> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Options and known types available to passes
#[derive(Debug, Clone)]
pub struct IntentionPassContext {
    pub options: IntentionPassOptions,
    pub known_types: KnownTypeRegistry,
}

impl Default for IntentionPassContext {
    fn default() -> Self {
        Self {
            options: IntentionPassOptions::default(),
            known_types: KnownTypeRegistry::with_defaults(),
        }
    }
}

impl IntentionPassContext {
    /// Builds the context, registering the default types and every type declared in `options`
    pub fn new(options: IntentionPassOptions) -> Result<Self, SyntaxError> {
        let mut known_types = KnownTypeRegistry::with_defaults();
        for declaration in &options.known_types {
            known_types.register_declaration(declaration)?;
        }
        Ok(Self {
            options,
            known_types,
        })
    }

    /// Resolves a protocol by name: protocols declared in `collection` first, then the
    /// registry.
    pub fn resolve_protocol<'a>(
        &'a self,
        collection: &'a IntentionCollection,
        name: &str,
    ) -> Option<Box<dyn KnownType + 'a>> {
        if let Some(view) = collection
            .find_protocol(name)
            .and_then(|id| TypeIntentionView::new(collection, id))
        {
            return Some(Box::new(view) as Box<dyn KnownType + 'a>);
        }
        self.known_types
            .get(name)
            .filter(|ty| ty.kind == KnownTypeKind::Protocol)
            .map(|ty| Box::new(ty.clone()) as Box<dyn KnownType + 'a>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::{FileGenerationIntention, ProtocolGenerationIntention};

    #[test]
    fn test_defaults_are_registered() {
        let registry = KnownTypeRegistry::with_defaults();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["NSObjectProtocol", "NSCopying", "NSCoding"]
        );
        let copying = registry.get("NSCopying").unwrap();
        assert_eq!(copying.methods[0].signature.name, "copy");
        assert_eq!(
            registry.get("NSCoding").unwrap().constructors[0].parameters[0].label.as_deref(),
            Some("coder")
        );
    }

    #[test]
    fn test_declared_types_and_errors() {
        let mut options = IntentionPassOptions::default();
        options.known_types.push(KnownTypeDeclaration {
            name: "Drawable".into(),
            kind: KnownTypeKind::Protocol,
            supertype: None,
            conformances: vec!["NSObjectProtocol".into()],
            methods: vec!["draw(in rect: CGRect)".into()],
        });
        let context = IntentionPassContext::new(options.clone()).unwrap();
        assert_eq!(context.known_types.len(), 4);

        options.known_types[0].methods.push("draw(rect CGRect)".into());
        let error = IntentionPassContext::new(options).unwrap_err();
        assert_eq!(error.offset, 16);
    }

    #[test]
    fn test_collection_protocols_shadow_registry() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("P.h"));
        collection.add_protocol(file, ProtocolGenerationIntention::new("NSCopying"));
        let context = IntentionPassContext::default();

        let resolved = context.resolve_protocol(&collection, "NSCopying").unwrap();
        assert!(resolved.known_methods().is_empty());
        let resolved = context.resolve_protocol(&collection, "NSCoding").unwrap();
        assert_eq!(resolved.known_methods().len(), 1);
        assert!(context.resolve_protocol(&collection, "Missing").is_none());
    }
}

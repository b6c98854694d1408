// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Propagates nullability from protocol requirements into the conforming implementations.
//!
//! Implementations often repeat a protocol requirement without nullability annotations. When a
//! member of a class or extension matches a requirement up to optionality, every
//! nullability-unspecified type in the member takes the requirement's type instead.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use intention_model::{
    FunctionSignature, IntentionCollection, IntentionId, KnownMethod, KnownProperty,
    SignatureMatchMode, SwiftType, TypeIntention,
};
use itertools::Itertools;
use log::{debug, trace};

pub struct ProtocolNullabilityPropagationProcessor();

impl ProtocolNullabilityPropagationProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

/// Requirements collected from every protocol a type conforms to
#[derive(Default)]
struct Requirements {
    methods: Vec<KnownMethod>,
    properties: Vec<KnownProperty>,
}

impl IntentionPass for ProtocolNullabilityPropagationProcessor {
    fn name(&self) -> String {
        "protocol_nullability_propagation".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, context: &IntentionPassContext) {
        let types = collection.class_like_intentions().collect_vec();
        for ty in types {
            let requirements = requirements_of(collection, context, ty);
            if requirements.methods.is_empty() && requirements.properties.is_empty() {
                continue;
            }
            for method in collection.methods_of(ty).to_vec() {
                self.propagate_to_method(collection, ty, method, &requirements);
            }
            for property in collection.properties_of(ty).to_vec() {
                self.propagate_to_property(collection, ty, property, &requirements);
            }
        }
    }
}

impl ProtocolNullabilityPropagationProcessor {
    fn propagate_to_method(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        method: IntentionId,
        requirements: &Requirements,
    ) {
        let Some(signature) = collection.method(method).map(|m| m.signature.clone()) else {
            return;
        };
        let Some(requirement) = requirements.methods.iter().find(|r| {
            r.signature.matches(&signature, SignatureMatchMode::Selector)
                && r.signature.differs_only_in_optionality(&signature)
                && r.signature != signature
        }) else {
            return;
        };

        let propagated = propagated_signature(&signature, &requirement.signature);
        if propagated == signature {
            trace!(
                "{}: {} already carries nullability",
                self.name(),
                collection.describe(method)
            );
            return;
        }
        let description = format!(
            "Propagated nullability from protocol requirement: {} -> {}",
            signature, propagated
        );
        if let Some(data) = collection.method_mut(method) {
            data.signature = propagated;
        }
        self.record(collection, ty, method, description);
    }

    fn propagate_to_property(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
        requirements: &Requirements,
    ) {
        let Some((name, current)) = collection
            .property(property)
            .map(|p| (p.name.clone(), p.ty().clone()))
        else {
            return;
        };
        if !current.is_nullability_unspecified() {
            return;
        }
        let Some(requirement) = requirements
            .properties
            .iter()
            .find(|r| r.name == name && r.storage.ty.deep_unwrapped_eq(&current))
        else {
            return;
        };
        if requirement.storage.ty == current {
            return;
        }

        let description = format!(
            "Propagated nullability from protocol requirement: {}: {} -> {}",
            name, current, requirement.storage.ty
        );
        if let Some(data) = collection.property_mut(property) {
            data.storage.ty = requirement.storage.ty.clone();
        }
        self.record(collection, ty, property, description);
    }

    fn record(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        member: IntentionId,
        description: String,
    ) {
        debug!("{}: {}", self.name(), description);
        let record = collection
            .history_mut(member)
            .record_change(self.name(), description, vec![ty]);
        collection.history_mut(ty).echo(&record);
    }
}

fn requirements_of(
    collection: &IntentionCollection,
    context: &IntentionPassContext,
    ty: IntentionId,
) -> Requirements {
    let mut requirements = Requirements::default();
    let Some(type_intention) = collection.type_intention(ty) else {
        return requirements;
    };
    for conformance in type_intention.protocols() {
        match context.resolve_protocol(collection, &conformance.protocol_name) {
            Some(protocol) => {
                requirements.methods.extend(protocol.known_methods());
                requirements.properties.extend(protocol.known_properties());
            }
            None => trace!("unknown protocol `{}`", conformance.protocol_name),
        }
    }
    requirements
}

/// `current` with each nullability-unspecified type replaced by the requirement's type
fn propagated_signature(
    current: &FunctionSignature,
    requirement: &FunctionSignature,
) -> FunctionSignature {
    let mut propagated = current.clone();
    propagated.return_type = propagated_type(&current.return_type, &requirement.return_type);
    for (param, required) in propagated.parameters.iter_mut().zip(&requirement.parameters) {
        param.ty = propagated_type(&param.ty, &required.ty);
    }
    propagated
}

fn propagated_type(current: &SwiftType, required: &SwiftType) -> SwiftType {
    if current.is_nullability_unspecified() {
        required.clone()
    } else {
        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::*;

    struct Fixture {
        collection: IntentionCollection,
        class: IntentionId,
    }

    fn fixture() -> Fixture {
        let mut collection = IntentionCollection::new();
        let header = collection.add_file(FileGenerationIntention::new("Source.h"));
        let protocol =
            collection.add_protocol(header, ProtocolGenerationIntention::new("DataSource"));
        collection.add_method(
            protocol,
            MethodGenerationIntention::new(
                parse_signature("item(at index: Int, in section: String?) -> AnyObject?").unwrap(),
            ),
        );
        collection.add_property(
            protocol,
            PropertyGenerationIntention::new(
                "title",
                ValueStorage::variable(SwiftType::string().wrapped_in_optional()),
            ),
        );

        let file = collection.add_file(FileGenerationIntention::new("Source.m"));
        let class = collection.add_class(
            file,
            ClassGenerationIntention::new("Source").with_protocols(&["DataSource"]),
        );
        Fixture { collection, class }
    }

    fn run(collection: &mut IntentionCollection) {
        ProtocolNullabilityPropagationProcessor::new()
            .apply(collection, &IntentionPassContext::default());
    }

    #[test]
    fn test_method_types_take_protocol_nullability() {
        let Fixture {
            mut collection,
            class,
        } = fixture();
        let method = collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("item(at index: Int!, in section: String!) -> AnyObject!").unwrap(),
            ),
        );

        run(&mut collection);

        assert_eq!(
            collection.method(method).unwrap().signature.to_string(),
            "item(at index: Int, in section: String?) -> AnyObject?"
        );
        assert_eq!(collection.history(method).len(), 1);
        assert_eq!(collection.history(class).len(), 1);
    }

    #[test]
    fn test_annotated_types_are_kept() {
        let Fixture {
            mut collection,
            class,
        } = fixture();
        let method = collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("item(at index: Int, in section: String) -> AnyObject!").unwrap(),
            ),
        );

        run(&mut collection);

        assert_eq!(
            collection.method(method).unwrap().signature.to_string(),
            "item(at index: Int, in section: String) -> AnyObject?"
        );
    }

    #[test]
    fn test_property_takes_protocol_type() {
        let Fixture {
            mut collection,
            class,
        } = fixture();
        let title = collection.add_property(
            class,
            PropertyGenerationIntention::new(
                "title",
                ValueStorage::variable(
                    SwiftType::string().wrapped_in_implicitly_unwrapped_optional(),
                ),
            ),
        );
        let other = collection.add_property(
            class,
            PropertyGenerationIntention::new(
                "subtitle",
                ValueStorage::variable(
                    SwiftType::string().wrapped_in_implicitly_unwrapped_optional(),
                ),
            ),
        );

        run(&mut collection);

        assert_eq!(collection.property(title).unwrap().ty().to_string(), "String?");
        assert_eq!(collection.property(other).unwrap().ty().to_string(), "String!");
        assert_eq!(collection.history(class).len(), 1);
    }

    #[test]
    fn test_registry_protocols_and_mismatches() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Copy.m"));
        let class = collection.add_class(
            file,
            ClassGenerationIntention::new("Copy").with_protocols(&["NSCopying", "Unknown"]),
        );
        let copy = collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("copy(with zone: NSZone!) -> Any!").unwrap(),
            ),
        );
        let unrelated = collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("copy(with zone: NSZone!, deep: Bool) -> Any!").unwrap(),
            ),
        );

        run(&mut collection);

        assert_eq!(
            collection.method(copy).unwrap().signature.to_string(),
            "copy(with zone: NSZone?) -> Any"
        );
        assert!(collection.history(unrelated).is_empty());
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Swift extensions cannot declare stored properties, so the instance variables and stored
//! properties of an anonymous class extension (`@interface Foo ()`) move into the class
//! itself.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use intention_model::{IntentionCollection, IntentionId, TypeIntention};
use itertools::Itertools;
use log::debug;

pub struct StoredPropertyMaterializationProcessor();

impl StoredPropertyMaterializationProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

impl IntentionPass for StoredPropertyMaterializationProcessor {
    fn name(&self) -> String {
        "stored_property_materialization".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, _context: &IntentionPassContext) {
        let extensions = collection
            .extension_intentions()
            .filter(|id| {
                collection
                    .class_extension(*id)
                    .is_some_and(|e| e.is_anonymous_class_extension())
            })
            .collect_vec();

        for extension in extensions {
            let type_name = match collection.type_intention(extension) {
                Some(ty) => ty.type_name().to_string(),
                None => continue,
            };
            let Some(class) = find_class(collection, &type_name) else {
                continue;
            };
            self.materialize(collection, extension, class);
        }
    }
}

impl StoredPropertyMaterializationProcessor {
    fn materialize(
        &self,
        collection: &mut IntentionCollection,
        extension: IntentionId,
        class: IntentionId,
    ) {
        let stored_properties = collection
            .properties_of(extension)
            .iter()
            .copied()
            .filter(|p| collection.property(*p).is_some_and(|p| p.is_stored()))
            .collect_vec();
        let members = collection
            .instance_variables_of(extension)
            .iter()
            .copied()
            .chain(stored_properties)
            .collect_vec();

        for member in members {
            let description = format!(
                "Moved {} from anonymous extension into {}",
                collection.describe(member),
                collection.describe(class)
            );
            debug!("{}: {}", self.name(), description);
            collection.attach(class, member);
            let record = collection
                .history_mut(member)
                .record_change(self.name(), description, vec![extension, class]);
            collection.history_mut(class).echo(&record);
        }

        if is_empty_extension(collection, extension) {
            debug!(
                "{}: dropping empty {}",
                self.name(),
                collection.describe(extension)
            );
            collection.detach(extension);
        }
    }
}

fn find_class(collection: &IntentionCollection, type_name: &str) -> Option<IntentionId> {
    collection
        .class_intentions()
        .find(|id| collection.type_intention(*id).is_some_and(|t| t.type_name() == type_name))
}

fn is_empty_extension(collection: &IntentionCollection, extension: IntentionId) -> bool {
    collection.properties_of(extension).is_empty()
        && collection.methods_of(extension).is_empty()
        && collection.initializers_of(extension).is_empty()
        && collection.instance_variables_of(extension).is_empty()
        && collection
            .type_intention(extension)
            .is_some_and(|t| t.protocols().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::*;

    fn run(collection: &mut IntentionCollection) {
        StoredPropertyMaterializationProcessor::new()
            .apply(collection, &IntentionPassContext::default());
    }

    #[test]
    fn test_stored_members_move_to_class() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Foo.m"));
        let class = collection.add_class(file, ClassGenerationIntention::new("Foo"));
        let extension = collection
            .add_class_extension(file, ClassExtensionGenerationIntention::new("Foo", None));
        let ivar = collection.add_instance_variable(
            extension,
            InstanceVariableGenerationIntention::new(
                "_cache",
                ValueStorage::variable(SwiftType::any_object()),
            ),
        );
        let stored = collection.add_property(
            extension,
            PropertyGenerationIntention::new("count", ValueStorage::variable(SwiftType::int())),
        );
        let mut computed =
            PropertyGenerationIntention::new("total", ValueStorage::variable(SwiftType::int()));
        computed.mode = PropertyMode::Computed(FunctionBody::empty());
        let computed = collection.add_property(extension, computed);

        run(&mut collection);

        assert_eq!(collection.instance_variables_of(class), &[ivar]);
        assert_eq!(collection.properties_of(class), &[stored]);
        assert_eq!(collection.properties_of(extension), &[computed]);
        assert_eq!(collection.parent(extension), Some(file));
        assert_eq!(collection.history(class).len(), 2);
        assert_eq!(
            collection.history(ivar).entries()[0].tag,
            "stored_property_materialization"
        );
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_emptied_extension_is_dropped() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Foo.m"));
        let class = collection.add_class(file, ClassGenerationIntention::new("Foo"));
        let extension = collection.add_class_extension(
            file,
            ClassExtensionGenerationIntention::new("Foo", Some(String::new())),
        );
        collection.add_property(
            extension,
            PropertyGenerationIntention::new("count", ValueStorage::variable(SwiftType::int())),
        );

        run(&mut collection);

        assert_eq!(collection.file(file).unwrap().types(), &[class]);
        assert!(collection.parent(extension).is_none());
    }

    #[test]
    fn test_named_category_and_unknown_class_are_untouched() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Foo.m"));
        collection.add_class(file, ClassGenerationIntention::new("Foo"));
        let category = collection.add_class_extension(
            file,
            ClassExtensionGenerationIntention::new("Foo", Some("Extras".into())),
        );
        collection.add_property(
            category,
            PropertyGenerationIntention::new("count", ValueStorage::variable(SwiftType::int())),
        );
        let orphan = collection
            .add_class_extension(file, ClassExtensionGenerationIntention::new("Bar", None));
        collection.add_property(
            orphan,
            PropertyGenerationIntention::new("size", ValueStorage::variable(SwiftType::int())),
        );

        run(&mut collection);

        assert_eq!(collection.properties_of(category).len(), 1);
        assert_eq!(collection.properties_of(orphan).len(), 1);
        assert_eq!(collection.parent(orphan), Some(file));
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Collapses getter/setter method pairs into the properties they implement.
//!
//! For a property `p: T`, a getter is a method `p() -> U` and a setter a method
//! `setP(_: U) -> Void`, where `U` equals `T` once every optional layer is stripped from both.
//! A role is only matched when exactly one method qualifies for it.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use crate::naming::setter_name;
use intention_model::{
    AccessLevel, Expression, FunctionBody, FunctionSignature, InstanceVariableGenerationIntention,
    IntentionCollection, IntentionId, MethodGenerationIntention, PropertyMode, PropertySetter,
    TypeIntention,
};
use intention_renderer::{qualified_property, qualified_signature};
use itertools::Itertools;
use log::{debug, trace};

pub struct PropertyMergeProcessor();

impl PropertyMergeProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

impl IntentionPass for PropertyMergeProcessor {
    fn name(&self) -> String {
        "property_merge".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, _context: &IntentionPassContext) {
        let types = collection.class_like_intentions().collect_vec();
        for ty in types {
            let properties = collection.properties_of(ty).to_vec();
            for property in properties {
                self.merge_property(collection, ty, property);
            }
        }
    }
}

/// What was found for one property
enum AccessorMatch {
    Both { getter: IntentionId, setter: IntentionId },
    GetterOnly(IntentionId),
    SetterOnly(IntentionId),
    None,
}

impl PropertyMergeProcessor {
    fn merge_property(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
    ) {
        let Some(data) = collection.property(property) else {
            return;
        };
        if !data.is_stored() {
            return;
        }
        let read_only = data.is_source_readonly();

        match find_accessors(collection, ty, property) {
            AccessorMatch::Both { getter, setter } => {
                self.merge_getter_and_setter(collection, ty, property, getter, setter)
            }
            AccessorMatch::GetterOnly(getter) if read_only => {
                self.merge_read_only_getter(collection, ty, property, getter)
            }
            AccessorMatch::SetterOnly(setter) => {
                self.merge_setter(collection, ty, property, setter)
            }
            AccessorMatch::GetterOnly(_) | AccessorMatch::None => {
                trace!(
                    "{}: no accessor merge for {}",
                    self.name(),
                    collection.describe(property)
                );
            }
        }
    }

    fn merge_getter_and_setter(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
        getter: IntentionId,
        setter: IntentionId,
    ) {
        let (getter_signature, getter_body) = method_parts(collection, getter);
        let (setter_signature, setter_body) = method_parts(collection, setter);
        let value_identifier = setter_signature.parameters[0].name.clone();

        let description = format!(
            "Merged {} and {} into property {}",
            qualified_signature(&type_name(collection, ty), &getter_signature),
            qualified_signature(&type_name(collection, ty), &setter_signature),
            property_text(collection, ty, property),
        );

        // a pair with a missing body becomes an empty placeholder pair
        let (getter_body, setter_body) = match (getter_body, setter_body) {
            (Some(getter_body), Some(setter_body)) => (getter_body, setter_body),
            _ => (FunctionBody::empty(), FunctionBody::empty()),
        };
        if let Some(data) = collection.property_mut(property) {
            data.mode = PropertyMode::Property {
                getter: getter_body,
                setter: PropertySetter {
                    value_identifier,
                    body: setter_body,
                },
            };
        }
        collection.remove(getter);
        collection.remove(setter);

        self.record(collection, ty, property, description, vec![property, getter, setter]);
    }

    fn merge_read_only_getter(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
        getter: IntentionId,
    ) {
        let (getter_signature, getter_body) = method_parts(collection, getter);
        let description = format!(
            "Merged {} into read-only property {}",
            qualified_signature(&type_name(collection, ty), &getter_signature),
            property_text(collection, ty, property),
        );

        if let Some(data) = collection.property_mut(property) {
            data.mode = PropertyMode::Computed(getter_body.unwrap_or_else(FunctionBody::empty));
        }
        collection.remove(getter);

        self.record(collection, ty, property, description, vec![property, getter]);
    }

    /// A setter without a getter needs backing storage the source never declared
    fn merge_setter(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
        setter: IntentionId,
    ) {
        if collection.instance_variable_container(ty).is_none() {
            trace!(
                "{}: {} cannot hold a backing field",
                self.name(),
                collection.describe(ty)
            );
            return;
        }
        let Some(data) = collection.property(property) else {
            return;
        };
        if data.is_static {
            trace!(
                "{}: no backing field for static {}",
                self.name(),
                collection.describe(property)
            );
            return;
        }
        let property_name = data.name.clone();
        let storage = data.storage.clone();
        let (setter_signature, setter_body) = method_parts(collection, setter);
        let setter_text = qualified_signature(&type_name(collection, ty), &setter_signature);
        let property_description = property_text(collection, ty, property);

        collection.remove(setter);

        let Some(setter_body) = setter_body else {
            trace!("{}: dropped bodiless setter {}", self.name(), setter_text);
            return;
        };

        let backing_field_name = format!("_{}", property_name);
        let backing_field = collection.add_instance_variable(
            ty,
            InstanceVariableGenerationIntention::new(&backing_field_name, storage),
        );
        collection.get_mut(backing_field).access_level = AccessLevel::Private;

        if let Some(data) = collection.property_mut(property) {
            data.mode = PropertyMode::Property {
                getter: FunctionBody::returning(Expression::identifier(&backing_field_name)),
                setter: PropertySetter {
                    value_identifier: setter_signature.parameters[0].name.clone(),
                    body: setter_body,
                },
            };
        }

        let description = format!(
            "Merged {} into property {} backed by synthesized field {}",
            setter_text, property_description, backing_field_name
        );
        let record = self.record(
            collection,
            ty,
            property,
            description,
            vec![property, setter, backing_field],
        );
        collection.history_mut(backing_field).echo(&record);
    }

    /// Records a change on the type and echoes it onto the property
    fn record(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        property: IntentionId,
        description: String,
        related: Vec<IntentionId>,
    ) -> intention_model::HistoryRecord {
        debug!("{}: {}", self.name(), description);
        let record = collection
            .history_mut(ty)
            .record_change(self.name(), description, related);
        collection.history_mut(property).echo(&record);
        record
    }
}

/// Finds the unique getter and setter of `property` among the methods of `ty`
fn find_accessors(
    collection: &IntentionCollection,
    ty: IntentionId,
    property: IntentionId,
) -> AccessorMatch {
    let Some(data) = collection.property(property) else {
        return AccessorMatch::None;
    };
    let expected_setter = setter_name(&data.name);
    let property_type = data.ty();

    let methods = collection
        .methods_of(ty)
        .iter()
        .filter_map(|id| collection.method(*id).map(|m| (*id, m)))
        .filter(|(_, m)| m.signature.is_static == data.is_static)
        .collect_vec();

    let getters = methods
        .iter()
        .filter(|(_, m)| {
            let signature = &m.signature;
            signature.name == data.name
                && signature.parameters.is_empty()
                && signature.return_type.deep_unwrapped_eq(property_type)
        })
        .map(|(id, _)| *id);
    let setters = methods
        .iter()
        .filter(|(_, m)| {
            let signature = &m.signature;
            signature.name == expected_setter
                && signature.parameters.len() == 1
                && signature.parameters[0].ty.deep_unwrapped_eq(property_type)
                && signature.return_type.is_void()
        })
        .map(|(id, _)| *id);

    // a role with zero or several candidates is left unmatched
    match (getters.exactly_one().ok(), setters.exactly_one().ok()) {
        (Some(getter), Some(setter)) => AccessorMatch::Both { getter, setter },
        (Some(getter), None) => AccessorMatch::GetterOnly(getter),
        (None, Some(setter)) => AccessorMatch::SetterOnly(setter),
        (None, None) => AccessorMatch::None,
    }
}

fn method_parts(
    collection: &IntentionCollection,
    method: IntentionId,
) -> (FunctionSignature, Option<FunctionBody>) {
    match collection.method(method) {
        Some(MethodGenerationIntention {
            signature, body, ..
        }) => (signature.clone(), body.clone()),
        None => panic!("BUG: {} is not a method", collection.describe(method)),
    }
}

fn type_name(collection: &IntentionCollection, ty: IntentionId) -> String {
    collection
        .type_intention(ty)
        .map(|t| t.type_name().to_string())
        .unwrap_or_default()
}

fn property_text(
    collection: &IntentionCollection,
    ty: IntentionId,
    property: IntentionId,
) -> String {
    match collection.property(property) {
        Some(data) => qualified_property(&type_name(collection, ty), &data.name, data.ty()),
        None => collection.describe(property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::*;

    struct Fixture {
        collection: IntentionCollection,
        class: IntentionId,
        property: IntentionId,
    }

    fn fixture(class_name: &str, property: PropertyGenerationIntention) -> Fixture {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new(format!("{}.m", class_name)));
        let class = collection.add_class(file, ClassGenerationIntention::new(class_name));
        let property = collection.add_property(class, property);
        Fixture {
            collection,
            class,
            property,
        }
    }

    fn method(text: &str, body: Option<&str>) -> MethodGenerationIntention {
        let method = MethodGenerationIntention::new(parse_signature(text).unwrap());
        match body {
            Some(body) => {
                method.with_body(FunctionBody::new(vec![Statement::Unknown(body.into())]))
            }
            None => method,
        }
    }

    fn run(collection: &mut IntentionCollection) {
        PropertyMergeProcessor::new().apply(collection, &IntentionPassContext::default());
    }

    fn method_names(collection: &IntentionCollection, ty: IntentionId) -> Vec<String> {
        collection
            .methods_of(ty)
            .iter()
            .map(|m| collection.method(*m).unwrap().signature.name.clone())
            .collect()
    }

    #[test]
    fn test_getter_and_setter_merge() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("name", ValueStorage::variable(SwiftType::string())),
        );
        collection.add_method(class, method("name() -> String", Some("return _backing")));
        collection.add_method(class, method("setName(_ v: String)", Some("_backing = v")));
        collection.add_method(class, method("reset()", None));

        run(&mut collection);

        assert_eq!(method_names(&collection, class), vec!["reset"]);
        match &collection.property(property).unwrap().mode {
            PropertyMode::Property { getter, setter } => {
                assert_eq!(getter.to_string(), "return _backing");
                assert_eq!(setter.value_identifier, "v");
                assert_eq!(setter.body.to_string(), "_backing = v");
            }
            other => panic!("unexpected mode {:?}", other),
        }

        let history = collection.history(class);
        assert_eq!(history.len(), 1);
        let record = &history.entries()[0];
        assert_eq!(record.tag, "property_merge");
        assert_eq!(
            record.description,
            "Merged Foo.name() -> String and Foo.setName(_ v: String) into property Foo.name: String"
        );
        assert_eq!(collection.history(property).entries(), history.entries());
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_setter_only_synthesizes_backing_field() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Bar",
            PropertyGenerationIntention::new("count", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("setCount(_ v: Int)", Some("store(v)")));

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        let field = collection.find_instance_variable(class, "_count").unwrap();
        assert_eq!(collection.get(field).access_level, AccessLevel::Private);
        assert_eq!(collection.instance_variable(field).unwrap().ty(), &SwiftType::int());
        match &collection.property(property).unwrap().mode {
            PropertyMode::Property { getter, setter } => {
                assert_eq!(getter, &FunctionBody::returning(Expression::identifier("_count")));
                assert_eq!(getter.to_string(), "return _count");
                assert_eq!(setter.value_identifier, "v");
            }
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_bodiless_setter_is_only_removed() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Bar",
            PropertyGenerationIntention::new("count", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("setCount(_ v: Int)", None));

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        assert!(collection.instance_variables_of(class).is_empty());
        assert!(collection.property(property).unwrap().is_stored());
        assert!(collection.history(class).is_empty());
        assert!(collection.history(property).is_empty());
    }

    #[test]
    fn test_static_setter_only_keeps_property_stored() {
        let mut shared = PropertyGenerationIntention::new(
            "shared",
            ValueStorage::variable(SwiftType::named("Foo")),
        );
        shared.is_static = true;
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture("Foo", shared);
        collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("setShared(_ v: Foo)").unwrap().with_static(true),
            )
            .with_body(FunctionBody::new(vec![Statement::Unknown("store(v)".into())])),
        );

        run(&mut collection);

        assert_eq!(method_names(&collection, class), vec!["setShared"]);
        assert!(collection.instance_variables_of(class).is_empty());
        assert!(collection.property(property).unwrap().is_stored());
        assert!(collection.history(class).is_empty());
    }

    #[test]
    fn test_pair_with_bodiless_setter_gets_placeholder_bodies() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("name", ValueStorage::variable(SwiftType::string())),
        );
        collection.add_method(class, method("name() -> String", Some("return _n")));
        collection.add_method(class, method("setName(_ v: String)", None));

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        assert_eq!(
            collection.property(property).unwrap().mode,
            PropertyMode::Property {
                getter: FunctionBody::empty(),
                setter: PropertySetter {
                    value_identifier: "v".into(),
                    body: FunctionBody::empty(),
                },
            }
        );
        assert_eq!(collection.history(class).len(), 1);
    }

    #[test]
    fn test_read_only_getter_becomes_computed() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("area", ValueStorage::variable(SwiftType::int()))
                .with_source_attributes(&["readonly"]),
        );
        collection.add_method(class, method("area() -> Int", None));

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        assert_eq!(
            collection.property(property).unwrap().mode,
            PropertyMode::Computed(FunctionBody::empty())
        );
    }

    #[test]
    fn test_getter_only_on_writable_property_is_untouched() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("area", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("area() -> Int", Some("return 1")));

        run(&mut collection);

        assert_eq!(method_names(&collection, class), vec!["area"]);
        assert!(collection.property(property).unwrap().is_stored());
        assert!(collection.history(class).is_empty());
    }

    #[test]
    fn test_ambiguous_getters_are_not_merged() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("value", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("value() -> Int", Some("return 1")));
        collection.add_method(class, method("value() -> Int?", Some("return 2")));

        run(&mut collection);

        assert_eq!(method_names(&collection, class), vec!["value", "value"]);
        assert!(collection.property(property).unwrap().is_stored());
        assert!(collection.history(property).is_empty());
    }

    #[test]
    fn test_ambiguous_setter_leaves_getter_role_alone() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("value", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("value() -> Int", Some("return 1")));
        collection.add_method(class, method("setValue(_ v: Int)", Some("a")));
        collection.add_method(class, method("setValue(_ v: Int?)", Some("b")));

        run(&mut collection);

        assert_eq!(collection.methods_of(class).len(), 3);
        assert!(collection.property(property).unwrap().is_stored());
    }

    #[test]
    fn test_deep_unwrap_tolerance() {
        let Fixture {
            mut collection,
            class,
            property,
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("value", ValueStorage::variable(SwiftType::int())),
        );
        collection.add_method(class, method("value() -> Int?", None));
        collection.add_method(class, method("setValue(_ v: Int??)", None));

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        assert_eq!(
            collection.property(property).unwrap().mode,
            PropertyMode::Property {
                getter: FunctionBody::empty(),
                setter: PropertySetter {
                    value_identifier: "v".into(),
                    body: FunctionBody::empty(),
                },
            }
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let Fixture {
            mut collection,
            class,
            ..
        } = fixture(
            "Foo",
            PropertyGenerationIntention::new("name", ValueStorage::variable(SwiftType::string())),
        );
        collection.add_method(class, method("name() -> String", Some("return _n")));
        collection.add_method(class, method("setName(_ v: String)", Some("_n = v")));

        run(&mut collection);
        let once = intention_renderer::print_intentions(&collection, true);
        run(&mut collection);

        assert_eq!(intention_renderer::print_intentions(&collection, true), once);
    }
}

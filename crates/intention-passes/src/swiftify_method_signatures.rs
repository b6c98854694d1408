// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Rewrites selector-shaped method names into Swift conventions:
//!
//! - `initWithName(_ name: String)` becomes the initializer `init(name: String)`
//! - a parameterless instance method `init()` becomes an initializer
//! - `loadWithURL(_ url: URL)` becomes `load(withURL url: URL)`
//!
//! Only methods whose first parameter is unlabeled are rewritten, so running the pass again
//! changes nothing.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use crate::naming::lowercase_first;
use intention_model::{
    FunctionSignature, InitGenerationIntention, IntentionCollection, IntentionId, IntentionKind,
    MethodGenerationIntention, ParameterSignature, SignatureMatchMode,
};
use itertools::Itertools;
use log::{debug, trace};

const INIT_WITH_PREFIX: &str = "initWith";
const WITH_INFIX: &str = "With";

pub struct SwiftifyMethodSignaturesProcessor();

impl SwiftifyMethodSignaturesProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

impl IntentionPass for SwiftifyMethodSignaturesProcessor {
    fn name(&self) -> String {
        "swiftify_method_signatures".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, _context: &IntentionPassContext) {
        let types = collection
            .type_intentions()
            .filter(|id| {
                matches!(
                    collection.kind(*id),
                    IntentionKind::Class(_)
                        | IntentionKind::ClassExtension(_)
                        | IntentionKind::Protocol(_)
                )
            })
            .collect_vec();
        for ty in types {
            for method in collection.methods_of(ty).to_vec() {
                self.swiftify(collection, ty, method);
            }
        }
    }
}

impl SwiftifyMethodSignaturesProcessor {
    fn swiftify(&self, collection: &mut IntentionCollection, ty: IntentionId, method: IntentionId) {
        let Some(data) = collection.method(method) else {
            return;
        };
        let signature = data.signature.clone();
        if signature.is_static {
            return;
        }

        if signature.name == "init" && signature.parameters.is_empty() {
            self.convert_to_initializer(collection, ty, method, vec![]);
        } else if let Some(parameters) = init_with_parameters(&signature) {
            self.convert_to_initializer(collection, ty, method, parameters);
        } else if let Some(renamed) = with_renamed_signature(&signature) {
            self.rename(collection, ty, method, renamed);
        }
    }

    fn convert_to_initializer(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        method: IntentionId,
        parameters: Vec<ParameterSignature>,
    ) {
        let Some(MethodGenerationIntention {
            signature, body, ..
        }) = collection.method(method).cloned()
        else {
            return;
        };
        let mut initializer = InitGenerationIntention::new(parameters);
        initializer.is_failable = signature.return_type.is_optional();
        initializer.body = body;

        let init_signature = initializer.signature();
        if collection.initializers_of(ty).iter().any(|id| {
            collection.initializer(*id).is_some_and(|i| {
                i.signature().matches(&init_signature, SignatureMatchMode::Selector)
            })
        }) {
            trace!(
                "{}: {} already declares {}",
                self.name(),
                collection.describe(ty),
                init_signature
            );
            return;
        }

        let description = format!(
            "Converted method {} into initializer {}",
            signature,
            initializer_text(&initializer)
        );
        let (access_level, source, history) = {
            let node = collection.get(method);
            (node.access_level, node.source.clone(), node.history.clone())
        };
        let init = collection.add_initializer(ty, initializer);
        let node = collection.get_mut(init);
        node.access_level = access_level;
        node.source = source;
        node.history = history;
        collection.remove(method);

        self.record(collection, ty, init, description, vec![init, method]);
    }

    fn rename(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        method: IntentionId,
        renamed: FunctionSignature,
    ) {
        let collides = collection.methods_of(ty).iter().any(|id| {
            *id != method
                && collection
                    .method(*id)
                    .is_some_and(|m| m.signature.matches(&renamed, SignatureMatchMode::Selector))
        });
        if collides {
            trace!(
                "{}: renaming {} to {} would collide",
                self.name(),
                collection.describe(method),
                renamed
            );
            return;
        }
        let Some(data) = collection.method_mut(method) else {
            return;
        };
        let description = format!("Swiftified signature {} into {}", data.signature, renamed);
        data.signature = renamed;
        self.record(collection, ty, method, description, vec![method]);
    }

    fn record(
        &self,
        collection: &mut IntentionCollection,
        ty: IntentionId,
        member: IntentionId,
        description: String,
        related: Vec<IntentionId>,
    ) {
        debug!("{}: {}", self.name(), description);
        let record = collection
            .history_mut(member)
            .record_change(self.name(), description, related);
        collection.history_mut(ty).echo(&record);
    }
}

/// Parameters of the initializer an `initWith<X>` method converts to
fn init_with_parameters(signature: &FunctionSignature) -> Option<Vec<ParameterSignature>> {
    let suffix = signature.name.strip_prefix(INIT_WITH_PREFIX)?;
    if !suffix.starts_with(char::is_uppercase) {
        return None;
    }
    let (first, _) = signature.parameters.split_first()?;
    if first.label.is_some() {
        return None;
    }
    let mut parameters = signature.parameters.clone();
    parameters[0].label = Some(lowercase_first(suffix));
    Some(parameters)
}

/// `<base>With<X>(_ ...)` as `<base>(with<X> ...)`
fn with_renamed_signature(signature: &FunctionSignature) -> Option<FunctionSignature> {
    let first = signature.parameters.first()?;
    if first.label.is_some() || signature.name.starts_with("init") {
        return None;
    }
    let (index, _) = signature.name.match_indices(WITH_INFIX).find(|(index, _)| {
        *index > 0
            && signature.name[index + WITH_INFIX.len()..].starts_with(char::is_uppercase)
    })?;
    let base = &signature.name[..index];
    let label = format!("with{}", &signature.name[index + WITH_INFIX.len()..]);

    let mut renamed = signature.clone();
    renamed.name = base.to_string();
    renamed.parameters[0].label = Some(label);
    Some(renamed)
}

fn initializer_text(initializer: &InitGenerationIntention) -> String {
    let signature = initializer.signature();
    let rendered = signature.to_string();
    if initializer.is_failable {
        rendered.replacen("init", "init?", 1)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::*;

    fn class_with_methods(methods: &[&str]) -> (IntentionCollection, IntentionId) {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Foo.m"));
        let class = collection.add_class(file, ClassGenerationIntention::new("Foo"));
        for text in methods {
            collection.add_method(
                class,
                MethodGenerationIntention::new(parse_signature(text).unwrap()),
            );
        }
        (collection, class)
    }

    fn run(collection: &mut IntentionCollection) {
        SwiftifyMethodSignaturesProcessor::new()
            .apply(collection, &IntentionPassContext::default());
    }

    fn signatures(collection: &IntentionCollection, ty: IntentionId) -> Vec<String> {
        collection
            .methods_of(ty)
            .iter()
            .map(|m| collection.method(*m).unwrap().signature.to_string())
            .collect()
    }

    #[test]
    fn test_init_with_becomes_initializer() {
        let (mut collection, class) = class_with_methods(&[
            "initWithName(_ name: String, age: Int) -> Foo?",
            "initWithURLString(_ value: String) -> Foo",
        ]);

        run(&mut collection);

        assert!(collection.methods_of(class).is_empty());
        let initializers = collection
            .initializers_of(class)
            .iter()
            .map(|i| collection.initializer(*i).unwrap())
            .collect_vec();
        assert_eq!(initializers.len(), 2);
        assert_eq!(initializers[0].signature().to_string(), "init(name: String, age: Int)");
        assert!(initializers[0].is_failable);
        assert_eq!(
            initializers[1].signature().to_string(),
            "init(urlString value: String)"
        );
        assert!(!initializers[1].is_failable);
        assert_eq!(collection.history(class).len(), 2);
        assert_eq!(
            collection.history(class).entries()[0].description,
            "Converted method initWithName(_ name: String, age: Int) -> Foo? into initializer init?(name: String, age: Int)"
        );
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_plain_init_and_existing_initializer() {
        let (mut collection, class) = class_with_methods(&["init() -> Foo"]);
        run(&mut collection);
        assert!(collection.methods_of(class).is_empty());
        assert_eq!(collection.initializers_of(class).len(), 1);

        let (mut collection, class) = class_with_methods(&["init() -> Foo"]);
        collection.add_initializer(class, InitGenerationIntention::new(vec![]));
        run(&mut collection);
        assert_eq!(signatures(&collection, class), vec!["init() -> Foo"]);
        assert_eq!(collection.initializers_of(class).len(), 1);
    }

    #[test]
    fn test_with_methods_are_renamed() {
        let (mut collection, class) = class_with_methods(&[
            "loadWithURL(_ url: URL)",
            "doWithout(_ x: Int)",
            "fetch(with url: URL)",
        ]);
        collection.add_method(
            class,
            MethodGenerationIntention::new(
                parse_signature("makeWithValue(_ v: Int) -> Foo").unwrap().with_static(true),
            ),
        );

        run(&mut collection);

        assert_eq!(
            signatures(&collection, class),
            vec![
                "load(withURL url: URL)",
                "doWithout(_ x: Int)",
                "fetch(with url: URL)",
                "makeWithValue(_ v: Int) -> Foo",
            ]
        );
    }

    #[test]
    fn test_collision_blocks_rename() {
        let (mut collection, class) =
            class_with_methods(&["loadWithURL(_ url: URL)", "load(withURL other: URL)"]);
        run(&mut collection);
        assert_eq!(
            signatures(&collection, class),
            vec!["loadWithURL(_ url: URL)", "load(withURL other: URL)"]
        );
    }

    #[test]
    fn test_pass_is_idempotent() {
        let (mut collection, class) = class_with_methods(&[
            "initWithFrame(_ frame: CGRect) -> Foo",
            "drawWithColor(_ color: UIColor)",
        ]);
        run(&mut collection);
        let once = intention_renderer::print_intentions(&collection, true);
        run(&mut collection);
        assert_eq!(intention_renderer::print_intentions(&collection, true), once);
        assert_eq!(signatures(&collection, class), vec!["draw(withColor color: UIColor)"]);
    }
}

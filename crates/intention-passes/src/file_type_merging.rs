// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Merges the declarations of a type split over a header and an implementation file.
//!
//! Every class (and every class extension, keyed by its category) that is declared more than
//! once collapses into a single declaration, preferring the one in an implementation file.
//! Headers are then folded into the implementation file with the same stem, and header files
//! left without content are dropped.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use indexmap::IndexMap;
use intention_model::{
    FunctionSignature, IntentionCollection, IntentionId, IntentionKind, SignatureMatchMode,
    SwiftType, TypeIntention,
};
use itertools::Itertools;
use log::debug;
use std::fmt::{self, Formatter};

pub struct FileTypeMergingProcessor();

impl FileTypeMergingProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

impl IntentionPass for FileTypeMergingProcessor {
    fn name(&self) -> String {
        "file_type_merging".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, context: &IntentionPassContext) {
        for group in self.duplicate_groups(collection) {
            let target = pick_target(collection, context, &group);
            for source in group.into_iter().filter(|id| *id != target) {
                self.merge_type(collection, target, source);
            }
        }
        self.merge_files(collection, context);
    }

    fn dump_result(&self, f: &mut Formatter<'_>, collection: &IntentionCollection) -> fmt::Result {
        writeln!(f, "// files after merging:")?;
        for file in collection.file_intentions() {
            if let Some(data) = collection.file(*file) {
                writeln!(f, "// {} ({} types)", data.target_path, data.types().len())?;
            }
        }
        Ok(())
    }
}

impl FileTypeMergingProcessor {
    /// Classes by name and extensions by `(name, category)`, in declaration order, keeping
    /// only keys declared more than once
    fn duplicate_groups(&self, collection: &IntentionCollection) -> Vec<Vec<IntentionId>> {
        let mut groups: IndexMap<(bool, String, String), Vec<IntentionId>> = IndexMap::new();
        for ty in collection.type_intentions() {
            let key = match collection.kind(ty) {
                IntentionKind::Class(class) => {
                    (false, class.type_data.type_name.clone(), String::new())
                }
                IntentionKind::ClassExtension(extension) => (
                    true,
                    extension.type_data.type_name.clone(),
                    extension.category_name.clone().unwrap_or_default(),
                ),
                _ => continue,
            };
            groups.entry(key).or_default().push(ty);
        }
        groups.into_values().filter(|group| group.len() > 1).collect()
    }

    /// Moves everything `source` declares into `target` and detaches `source`
    fn merge_type(
        &self,
        collection: &mut IntentionCollection,
        target: IntentionId,
        source: IntentionId,
    ) {
        let source_description = collection.describe(source);

        // superclass and conformances
        let superclass = collection.class(source).and_then(|c| c.superclass_name.clone());
        if let (Some(superclass), Some(target_class)) = (superclass, collection.class_mut(target)) {
            if target_class.superclass_name.is_none() {
                target_class.superclass_name = Some(superclass);
            }
        }
        let protocols = collection
            .type_intention(source)
            .map(|t| t.protocols().to_vec())
            .unwrap_or_default();
        if let Some(data) = collection.type_data_mut(target) {
            for protocol in protocols {
                data.add_protocol(protocol);
            }
        }

        for ivar in collection.instance_variables_of(source).to_vec() {
            let name = match collection.instance_variable(ivar) {
                Some(data) => data.name.clone(),
                None => continue,
            };
            if collection.find_instance_variable(target, &name).is_none() {
                collection.attach(target, ivar);
            }
        }

        for property in collection.properties_of(source).to_vec() {
            let name = match collection.property(property) {
                Some(data) => data.name.clone(),
                None => continue,
            };
            if collection.find_property(target, &name).is_none() {
                collection.attach(target, property);
            }
        }

        for method in collection.methods_of(source).to_vec() {
            self.merge_method(collection, target, method);
        }
        for initializer in collection.initializers_of(source).to_vec() {
            self.merge_initializer(collection, target, initializer);
        }

        let description = format!(
            "Merged {} into {}",
            source_description,
            collection.describe(target)
        );
        debug!("{}: {}", self.name(), description);
        let record = collection
            .history_mut(target)
            .record_change(self.name(), description, vec![target, source]);
        collection.history_mut(source).echo(&record);
        collection.detach(source);
    }

    fn merge_method(
        &self,
        collection: &mut IntentionCollection,
        target: IntentionId,
        method: IntentionId,
    ) {
        let Some(source) = collection.method(method).cloned() else {
            return;
        };
        let existing = collection.methods_of(target).iter().copied().find(|id| {
            collection.method(*id).is_some_and(|m| {
                m.signature.matches(&source.signature, SignatureMatchMode::Selector)
            })
        });
        let Some(existing) = existing else {
            collection.attach(target, method);
            return;
        };
        if let Some(data) = collection.method_mut(existing) {
            if data.body.is_none() {
                data.body = source.body;
            }
            data.signature = merged_signature(&data.signature, &source.signature);
            data.is_optional = data.is_optional && source.is_optional;
        }
    }

    fn merge_initializer(
        &self,
        collection: &mut IntentionCollection,
        target: IntentionId,
        initializer: IntentionId,
    ) {
        let Some(source) = collection.initializer(initializer).cloned() else {
            return;
        };
        let source_signature = source.signature();
        let existing = collection.initializers_of(target).iter().copied().find(|id| {
            collection.initializer(*id).is_some_and(|i| {
                i.signature()
                    .matches(&source_signature, SignatureMatchMode::Selector)
            })
        });
        let Some(existing) = existing else {
            collection.attach(target, initializer);
            return;
        };
        if let Some(data) = collection.initializer_mut(existing) {
            if data.body.is_none() {
                data.body = source.body;
            }
            let merged = merged_signature(&data.signature(), &source_signature);
            data.parameters = merged.parameters;
            data.is_failable = data.is_failable || source.is_failable;
        }
    }

    /// Moves the content of every header into the implementation file with the same stem
    fn merge_files(&self, collection: &mut IntentionCollection, context: &IntentionPassContext) {
        let files = collection.file_intentions().to_vec();
        let path_of = |collection: &IntentionCollection, id: IntentionId| {
            collection
                .file(id)
                .map(|f| f.target_path.clone())
                .unwrap_or_default()
        };
        let headers = files
            .iter()
            .copied()
            .filter(|f| context.options.is_header(&path_of(collection, *f)))
            .collect_vec();
        let implementations = files
            .iter()
            .copied()
            .filter(|f| context.options.is_implementation(&path_of(collection, *f)))
            .collect_vec();

        for header in headers {
            let stem = match collection.file(header) {
                Some(file) => file.stem().to_string(),
                None => continue,
            };
            let implementation = implementations
                .iter()
                .copied()
                .find(|f| collection.file(*f).is_some_and(|file| file.stem() == stem));
            if let Some(implementation) = implementation {
                self.merge_file(collection, header, implementation);
            }
            if collection.file(header).is_some_and(|f| f.is_empty()) {
                debug!("{}: removing empty {}", self.name(), collection.describe(header));
                collection.remove_file(header);
            }
        }
    }

    fn merge_file(
        &self,
        collection: &mut IntentionCollection,
        header: IntentionId,
        implementation: IntentionId,
    ) {
        let (types, functions, directives) = match collection.file(header) {
            Some(file) => (
                file.types().to_vec(),
                file.global_functions().to_vec(),
                file.preprocessor_directives.clone(),
            ),
            None => return,
        };
        if types.is_empty() && functions.is_empty() && directives.is_empty() {
            return;
        }
        for member in types.iter().chain(&functions) {
            collection.attach(implementation, *member);
        }
        if let Some(file) = collection.file_mut(implementation) {
            for directive in directives {
                if !file.preprocessor_directives.contains(&directive) {
                    file.preprocessor_directives.push(directive);
                }
            }
        }
        if let Some(file) = collection.file_mut(header) {
            file.preprocessor_directives.clear();
        }

        let description = format!(
            "Merged {} into {}",
            collection.describe(header),
            collection.describe(implementation)
        );
        debug!("{}: {}", self.name(), description);
        collection
            .history_mut(implementation)
            .record_change(self.name(), description, vec![header]);
    }
}

/// The declaration other duplicates merge into: the first one living in an implementation
/// file, else the first one
fn pick_target(
    collection: &IntentionCollection,
    context: &IntentionPassContext,
    group: &[IntentionId],
) -> IntentionId {
    group
        .iter()
        .copied()
        .find(|ty| {
            collection
                .file_of(*ty)
                .and_then(|f| collection.file(f))
                .is_some_and(|f| context.options.is_implementation(&f.target_path))
        })
        .unwrap_or(group[0])
}

/// Keeps `target`'s signature, taking `source`'s types wherever `target`'s nullability is
/// unspecified and both agree up to optionality
fn merged_signature(target: &FunctionSignature, source: &FunctionSignature) -> FunctionSignature {
    let mut merged = target.clone();
    merged.return_type = merged_type(&target.return_type, &source.return_type);
    for (param, source_param) in merged.parameters.iter_mut().zip(&source.parameters) {
        param.ty = merged_type(&param.ty, &source_param.ty);
    }
    merged
}

fn merged_type(target: &SwiftType, source: &SwiftType) -> SwiftType {
    if target.is_nullability_unspecified()
        && !source.is_nullability_unspecified()
        && target.deep_unwrapped_eq(source)
    {
        source.clone()
    } else {
        target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intention_model::*;

    fn run(collection: &mut IntentionCollection) {
        FileTypeMergingProcessor::new().apply(collection, &IntentionPassContext::default());
    }

    fn method(text: &str) -> MethodGenerationIntention {
        MethodGenerationIntention::new(parse_signature(text).unwrap())
    }

    #[test]
    fn test_header_and_implementation_merge() {
        let mut collection = IntentionCollection::new();
        let header = collection.add_file(
            FileGenerationIntention::new("Foo.h")
                .with_preprocessor_directives(vec!["#import <UIKit/UIKit.h>".into()]),
        );
        let implementation = collection.add_file(FileGenerationIntention::new("Foo.m"));

        let declared = collection.add_class(
            header,
            ClassGenerationIntention::new("Foo")
                .with_superclass("UIView")
                .with_protocols(&["NSCopying"]),
        );
        collection.add_property(
            declared,
            PropertyGenerationIntention::new("name", ValueStorage::variable(SwiftType::string())),
        );
        collection.add_method(declared, method("load(_ url: URL) -> String?"));
        collection.add_method(declared, method("reset()"));

        let implemented =
            collection.add_class(implementation, ClassGenerationIntention::new("Foo"));
        collection.add_method(
            implemented,
            method("load(_ url: URL!) -> String!")
                .with_body(FunctionBody::new(vec![Statement::Unknown("fetch(url)".into())])),
        );

        run(&mut collection);

        assert_eq!(collection.file_intentions(), &[implementation]);
        let classes = collection.class_intentions().collect_vec();
        assert_eq!(classes, vec![implemented]);
        let class = collection.class(implemented).unwrap();
        assert_eq!(class.superclass_name.as_deref(), Some("UIView"));
        assert!(class.conforms_to("NSCopying"));
        assert_eq!(collection.properties_of(implemented).len(), 1);

        let methods = collection.methods_of(implemented).to_vec();
        assert_eq!(methods.len(), 2);
        let load = collection.method(methods[0]).unwrap();
        assert_eq!(load.signature.to_string(), "load(_ url: URL) -> String?");
        assert_eq!(load.body.as_ref().unwrap().to_string(), "fetch(url)");
        assert_eq!(collection.method(methods[1]).unwrap().name(), "reset");

        assert_eq!(
            collection.file(implementation).unwrap().preprocessor_directives,
            vec!["#import <UIKit/UIKit.h>"]
        );
        assert_eq!(collection.history(implemented).len(), 1);
        assert_eq!(collection.history(declared).len(), 1);
        assert!(collection.parent(declared).is_none());
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_named_categories_stay_apart() {
        let mut collection = IntentionCollection::new();
        let header = collection.add_file(FileGenerationIntention::new("Foo+Extras.h"));
        let implementation = collection.add_file(FileGenerationIntention::new("Foo+Extras.m"));
        collection.add_class_extension(
            header,
            ClassExtensionGenerationIntention::new("Foo", Some("Extras".into())),
        );
        collection.add_class_extension(
            header,
            ClassExtensionGenerationIntention::new("Foo", Some("Other".into())),
        );
        let implemented = collection.add_class_extension(
            implementation,
            ClassExtensionGenerationIntention::new("Foo", Some("Extras".into())),
        );

        run(&mut collection);

        let extensions = collection.extension_intentions().collect_vec();
        assert_eq!(extensions.len(), 2);
        assert!(extensions.contains(&implemented));
        assert_eq!(collection.file(implementation).unwrap().types().len(), 2);
    }

    #[test]
    fn test_header_without_implementation_is_kept() {
        let mut collection = IntentionCollection::new();
        let header = collection.add_file(FileGenerationIntention::new("Protocols.h"));
        collection.add_protocol(header, ProtocolGenerationIntention::new("Drawable"));
        let empty = collection.add_file(FileGenerationIntention::new("Empty.h"));

        run(&mut collection);

        assert_eq!(collection.file_intentions(), &[header]);
        assert!(!collection.file_intentions().contains(&empty));
        assert!(collection.history(header).is_empty());
    }
}

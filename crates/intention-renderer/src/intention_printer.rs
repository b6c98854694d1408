// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Renders a whole intention collection as Swift-like source, one section per file.

use crate::known_type_formatter::{constructor_to_string, function_declaration, type_header};
use crate::swift_writer::{render_to_string, SwiftWriter};
use intention_model::{
    AccessLevel, FunctionBody, IntentionCollection, IntentionId, KnownConstructor,
    PropertyMode, TypeIntentionView, ValueStorage,
};

/// Print every file of `collection`. With `with_history`, each declaration is preceded by
/// its change history as comments.
pub fn print_intentions(collection: &IntentionCollection, with_history: bool) -> String {
    render_to_string(|w| {
        let printer = IntentionPrinter {
            collection,
            with_history,
        };
        for (i, file) in collection.file_intentions().iter().enumerate() {
            if i > 0 {
                w.newline();
            }
            printer.print_file(*file, w);
        }
    })
}

struct IntentionPrinter<'a> {
    collection: &'a IntentionCollection,
    with_history: bool,
}

impl<'a> IntentionPrinter<'a> {
    fn print_file(&self, id: IntentionId, w: &mut SwiftWriter) {
        let Some(file) = self.collection.file(id) else {
            return;
        };
        w.line_fmt(format_args!("// {}", file.target_path));
        self.print_history(id, w);
        for module in &file.import_directives {
            w.line_fmt(format_args!("import {}", module));
        }
        for ty in file.types() {
            w.newline();
            self.print_type(*ty, w);
        }
        for function in file.global_functions() {
            w.newline();
            self.print_history(*function, w);
            if let Some(function) = self.collection.global_function(*function) {
                let declaration = function_declaration(&function.signature);
                self.print_body_or_line(&declaration, function.body.as_ref(), w);
            }
        }
    }

    fn print_type(&self, id: IntentionId, w: &mut SwiftWriter) {
        let Some(view) = TypeIntentionView::new(self.collection, id) else {
            return;
        };
        self.print_history(id, w);
        if let Some(extension) = self.collection.class_extension(id) {
            if let Some(category) = extension.category_name.as_deref().filter(|c| !c.is_empty()) {
                w.line_fmt(format_args!("// category {}", category));
            }
        }
        let header = format!("{}{}", self.access_prefix(id), type_header(&view));
        w.block(&header, |w| {
            for ivar_id in self.collection.instance_variables_of(id) {
                self.print_history(*ivar_id, w);
                if let Some(ivar) = self.collection.instance_variable(*ivar_id) {
                    w.line_fmt(format_args!(
                        "{}{}",
                        self.access_prefix(*ivar_id),
                        storage_declaration(&ivar.name, &ivar.storage)
                    ));
                }
            }
            for property in self.collection.properties_of(id) {
                self.print_property(*property, w);
            }
            for initializer in self.collection.initializers_of(id) {
                self.print_history(*initializer, w);
                if let Some(init) = self.collection.initializer(*initializer) {
                    let declaration = format!(
                        "{}{}",
                        self.access_prefix(*initializer),
                        constructor_to_string(&KnownConstructor {
                            parameters: init.parameters.clone(),
                            is_failable: init.is_failable,
                        })
                    );
                    self.print_body_or_line(&declaration, init.body.as_ref(), w);
                }
            }
            for method in self.collection.methods_of(id) {
                self.print_history(*method, w);
                if let Some(m) = self.collection.method(*method) {
                    let declaration = format!(
                        "{}{}{}",
                        self.access_prefix(*method),
                        if m.is_optional { "optional " } else { "" },
                        function_declaration(&m.signature)
                    );
                    self.print_body_or_line(&declaration, m.body.as_ref(), w);
                }
            }
        });
    }

    fn print_property(&self, id: IntentionId, w: &mut SwiftWriter) {
        let Some(property) = self.collection.property(id) else {
            return;
        };
        self.print_history(id, w);
        let mut declaration = self.access_prefix(id);
        if property.is_optional {
            declaration.push_str("optional ");
        }
        if property.is_static {
            declaration.push_str("static ");
        }
        declaration.push_str(&storage_declaration(&property.name, &property.storage));

        match &property.mode {
            PropertyMode::Stored if property.is_source_readonly() => {
                w.line_fmt(format_args!("{} {{ get }}", declaration))
            }
            PropertyMode::Stored => w.line(&declaration),
            PropertyMode::Computed(getter) => w.block(&declaration, |w| print_body(getter, w)),
            PropertyMode::Property { getter, setter } => w.block(&declaration, |w| {
                w.block("get", |w| print_body(getter, w));
                w.block(&format!("set({})", setter.value_identifier), |w| {
                    print_body(&setter.body, w)
                });
            }),
        }
    }

    fn print_body_or_line(
        &self,
        declaration: &str,
        body: Option<&FunctionBody>,
        w: &mut SwiftWriter,
    ) {
        match body {
            Some(body) => w.block(declaration, |w| print_body(body, w)),
            None => w.line(declaration),
        }
    }

    fn print_history(&self, id: IntentionId, w: &mut SwiftWriter) {
        if !self.with_history {
            return;
        }
        for record in self.collection.history(id).entries() {
            w.line_fmt(format_args!("// {}", record));
        }
    }

    /// Access keyword followed by a space; empty for the default `internal`
    fn access_prefix(&self, id: IntentionId) -> String {
        match self.collection.get(id).access_level {
            AccessLevel::Internal => String::new(),
            level => format!("{} ", level.keyword()),
        }
    }
}

/// `[ownership ]let|var name: T`
fn storage_declaration(name: &str, storage: &ValueStorage) -> String {
    let ownership = if storage.ownership.is_default() {
        String::new()
    } else {
        format!("{} ", storage.ownership)
    };
    let keyword = if storage.is_constant { "let" } else { "var" };
    format!("{}{} {}: {}", ownership, keyword, name, storage.ty)
}

fn print_body(body: &FunctionBody, w: &mut SwiftWriter) {
    for statement in &body.statements {
        w.line(&statement.to_string());
    }
}

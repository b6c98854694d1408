// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Derives Swift module imports from the preprocessor directives of each file.

use crate::context::IntentionPassContext;
use crate::intention_pass_pipeline::IntentionPass;
use intention_model::IntentionCollection;
use itertools::Itertools;
use log::debug;

/// Header directories of the C library and kernel interfaces, all provided by `Darwin`
const DARWIN_HEADER_DIRECTORIES: &[&str] = &["sys", "netinet", "arpa", "mach", "machine"];

const DARWIN_MODULE: &str = "Darwin";

pub struct ImportDirectivesProcessor();

impl ImportDirectivesProcessor {
    pub fn new() -> Box<Self> {
        Box::new(Self())
    }
}

impl IntentionPass for ImportDirectivesProcessor {
    fn name(&self) -> String {
        "import_directives".to_string()
    }

    fn apply(&self, collection: &mut IntentionCollection, _context: &IntentionPassContext) {
        for file in collection.file_intentions().to_vec() {
            let Some(data) = collection.file_mut(file) else {
                continue;
            };
            let modules = data
                .preprocessor_directives
                .iter()
                .filter_map(|d| module_for_directive(d))
                .unique()
                .filter(|m| !data.import_directives.contains(m))
                .collect_vec();
            if modules.is_empty() {
                continue;
            }
            let description = format!("Added imports {}", modules.iter().join(", "));
            data.import_directives.extend(modules);
            debug!("{}: {} in {}", self.name(), description, data.target_path);
            collection
                .history_mut(file)
                .record_change(self.name(), description, vec![]);
        }
    }
}

/// The module a directive imports, or `None` for local and unrecognized directives
pub fn module_for_directive(directive: &str) -> Option<String> {
    let directive = directive.trim();
    if let Some(rest) = directive.strip_prefix("@import") {
        let module = rest.trim().trim_end_matches(';').trim();
        // `@import Foundation.NSString;` imports the top-level module
        return module
            .split('.')
            .next()
            .filter(|m| !m.is_empty())
            .map(str::to_string);
    }

    let rest = directive
        .strip_prefix("#import")
        .or_else(|| directive.strip_prefix("#include"))?
        .trim();
    let header = rest.strip_prefix('<')?.strip_suffix('>')?;
    match header.split_once('/') {
        Some((directory, _)) if DARWIN_HEADER_DIRECTORIES.contains(&directory) => {
            Some(DARWIN_MODULE.to_string())
        }
        Some((module, _)) => Some(module.to_string()),
        None => Some(DARWIN_MODULE.to_string()),
    }
}

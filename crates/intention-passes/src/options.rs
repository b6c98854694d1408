// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use intention_model::KnownTypeKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options of the intention passes. Usually read from the `[passes]` section of a toml
/// config.
///
/// NOTE: any fields carrying structured data must appear at the end for making
/// toml printing work.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntentionPassOptions {
    /// Extensions (without the dot) of files holding declarations only.
    pub header_extensions: Vec<String>,
    /// Extensions (without the dot) of files holding implementations.
    pub implementation_extensions: Vec<String>,

    /// BEGIN OF STRUCTURED OPTIONS. DO NOT ADD VALUE FIELDS AFTER THIS
    /// Additional types passes may resolve protocols against.
    pub known_types: Vec<KnownTypeDeclaration>,
}

impl Default for IntentionPassOptions {
    fn default() -> Self {
        Self {
            header_extensions: vec!["h".to_string()],
            implementation_extensions: vec!["m".to_string(), "mm".to_string()],
            known_types: vec![],
        }
    }
}

impl IntentionPassOptions {
    pub fn is_header(&self, path: &str) -> bool {
        has_extension(path, &self.header_extensions)
    }

    pub fn is_implementation(&self, path: &str) -> bool {
        has_extension(path, &self.implementation_extensions)
    }
}

fn has_extension(path: &str, extensions: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x == e))
}

/// A type declared in configuration. Methods are given as signature text, e.g.
/// `"copy(with zone: NSZone?) -> Any"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnownTypeDeclaration {
    pub name: String,
    pub kind: KnownTypeKind,
    #[serde(default)]
    pub supertype: Option<String>,
    #[serde(default)]
    pub conformances: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use intention_passes::IntentionPassOptions;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Represents options provided to the tool. Most of those options are configured via a toml
/// source; some over the command line flags.
///
/// NOTE: any fields carrying structured data must appear at the end for making
/// toml printing work. When changing this config, use `objc2swift --print-config` to
/// verify this works.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Verbosity level for logging.
    pub verbosity_level: LevelFilter,
    /// Whether to print the change history of every declaration as comments.
    pub print_history: bool,
    /// Where to write the rendered output. Printed to stdout when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// BEGIN OF STRUCTURED OPTIONS. DO NOT ADD VALUE FIELDS AFTER THIS
    /// Options for the intention passes.
    pub passes: IntentionPassOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbosity_level: LevelFilter::Info,
            print_history: false,
            output_path: None,
            passes: IntentionPassOptions::default(),
        }
    }
}

impl Options {
    pub fn from_toml(toml_source: &str) -> anyhow::Result<Options> {
        Ok(toml::from_str(toml_source)?)
    }

    pub fn from_toml_file(toml_file: &Path) -> anyhow::Result<Options> {
        let source = fs::read_to_string(toml_file)
            .with_context(|| format!("cannot read config `{}`", toml_file.display()))?;
        Self::from_toml(&source)
            .with_context(|| format!("invalid config `{}`", toml_file.display()))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let printed = Options::default().to_toml().unwrap();
        let parsed = Options::from_toml(&printed).unwrap();
        assert_eq!(parsed.verbosity_level, LevelFilter::Info);
        assert_eq!(parsed.passes.header_extensions, vec!["h"]);
        assert!(parsed.output_path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let options = Options::from_toml(
            r#"
            verbosity_level = "debug"
            print_history = true

            [passes]
            implementation_extensions = ["m"]
            "#,
        )
        .unwrap();
        assert_eq!(options.verbosity_level, LevelFilter::Debug);
        assert!(options.print_history);
        assert_eq!(options.passes.implementation_extensions, vec!["m"]);
        assert!(Options::from_toml("verbose = true").is_err());
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::options::Options;
use anyhow::{anyhow, Context};
use intention_model::{parse_signature, IntentionCollection};
use intention_passes::{default_intention_passes, IntentionPassContext, IntentionPassOptions};
use intention_renderer::print_intentions;
use log::{debug, info};
use std::{fs, path::Path};

/// Reads a JSON-serialized intention collection and checks its ownership invariants.
pub fn load_collection(path: &Path) -> anyhow::Result<IntentionCollection> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("cannot read intentions `{}`", path.display()))?;
    let collection: IntentionCollection = serde_json::from_str(&source)
        .with_context(|| format!("cannot parse intentions `{}`", path.display()))?;
    collection
        .check_invariants()
        .with_context(|| format!("`{}` holds a malformed intention collection", path.display()))?;
    debug!(
        "loaded {} intentions in {} files from `{}`",
        collection.len(),
        collection.file_intentions().len(),
        path.display()
    );
    Ok(collection)
}

/// Builds the pass context, reporting malformed method signatures of configured known types
/// with a labelled snippet.
pub fn build_context(options: &IntentionPassOptions) -> anyhow::Result<IntentionPassContext> {
    for declaration in &options.known_types {
        for method in &declaration.methods {
            if let Err(error) = parse_signature(method) {
                return Err(anyhow!(
                    "invalid method of known type `{}`:\n{}",
                    declaration.name,
                    error.render(&declaration.name, method)
                ));
            }
        }
    }
    Ok(IntentionPassContext::new(options.clone())?)
}

/// Runs the default passes over `collection` and renders the result. With `dump_base`, the
/// collection is dumped before and after every pass.
pub fn translate(
    collection: &mut IntentionCollection,
    options: &Options,
    dump_base: Option<&str>,
) -> anyhow::Result<String> {
    let context = build_context(&options.passes)?;
    let pipeline = default_intention_passes();
    match dump_base {
        Some(base) => pipeline.run_with_dump(collection, &context, base)?,
        None => pipeline.run(collection, &context)?,
    }
    Ok(print_intentions(collection, options.print_history))
}

/// Translates the collection stored at `input`, writing the result to the configured output
/// path. Returns the rendered output.
pub fn execute(input: &Path, options: &Options, dump_base: Option<&str>) -> anyhow::Result<String> {
    let mut collection = load_collection(input)?;
    let output = translate(&mut collection, options, dump_base)?;
    if let Some(path) = &options.output_path {
        fs::write(path, &output).with_context(|| format!("cannot write output `{}`", path))?;
        info!("wrote `{}`", path);
    }
    Ok(output)
}

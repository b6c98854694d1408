// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::IntentionPassContext;
use anyhow::anyhow;
use intention_model::IntentionCollection;
use intention_renderer::print_intentions;
use log::{debug, warn};
use std::{
    fmt::{self, Formatter},
    fs,
};

/// A trait describing a rewrite pass over an intention collection.
pub trait IntentionPass {
    /// Returns a name for this pass. This should be suitable as a file suffix, and is used as
    /// the tag of every history record the pass writes.
    fn name(&self) -> String;

    /// Rewrites the collection in place. A pass never fails on a candidate it cannot match;
    /// it leaves the candidate untouched.
    fn apply(&self, collection: &mut IntentionCollection, context: &IntentionPassContext);

    /// A function which creates a dump of the pass results, for debugging.
    fn dump_result(
        &self,
        _f: &mut Formatter<'_>,
        _collection: &IntentionCollection,
    ) -> fmt::Result {
        Ok(())
    }
}

pub struct PassResultDisplay<'a> {
    pub collection: &'a IntentionCollection,
    pub pass: &'a dyn IntentionPass,
}

impl fmt::Display for PassResultDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.pass.dump_result(f, self.collection)
    }
}

/// An ordered pipeline of intention passes.
#[derive(Default)]
pub struct IntentionPassPipeline {
    passes: Vec<Box<dyn IntentionPass>>,
}

impl IntentionPassPipeline {
    /// Adds a pass to this pipeline. Passes are run in the order they have been added.
    pub fn add_pass(&mut self, pass: Box<dyn IntentionPass>) {
        self.passes.push(pass)
    }

    pub fn passes(&self) -> &[Box<dyn IntentionPass>] {
        &self.passes
    }

    pub fn pass_names(&self) -> Vec<String> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Runs every pass over the whole collection, in order. After each pass the collection
    /// invariants are checked; a pass leaving the collection invalid aborts the run.
    pub fn run_with_hook<H1, H2>(
        &self,
        collection: &mut IntentionCollection,
        context: &IntentionPassContext,
        hook_before_pipeline: H1,
        hook_after_each_pass: H2,
    ) -> anyhow::Result<()>
    where
        H1: Fn(&IntentionCollection),
        H2: Fn(usize, &dyn IntentionPass, &IntentionCollection),
    {
        hook_before_pipeline(collection);
        for (step_count, pass) in self.passes.iter().enumerate() {
            debug!("running intention pass `{}`", pass.name());
            pass.apply(collection, context);
            debug!("finished intention pass `{}`", pass.name());
            hook_after_each_pass(step_count + 1, pass.as_ref(), collection);
            collection.check_invariants().map_err(|e| {
                anyhow!(
                    "intention pass `{}` left the collection in an invalid state: {}",
                    pass.name(),
                    e
                )
            })?;
        }
        Ok(())
    }

    /// Run the pipeline with no hooks in effect
    pub fn run(
        &self,
        collection: &mut IntentionCollection,
        context: &IntentionPassContext,
    ) -> anyhow::Result<()> {
        self.run_with_hook(collection, context, |_| {}, |_, _, _| {})
    }

    /// Runs the pipeline, dumping the collection before the pipeline as well as after each
    /// pass to `<base>_<step>_<pass>.intentions`.
    pub fn run_with_dump(
        &self,
        collection: &mut IntentionCollection,
        context: &IntentionPassContext,
        dump_base_name: &str,
    ) -> anyhow::Result<()> {
        self.run_with_hook(
            collection,
            context,
            |collection| {
                Self::dump_to_file(dump_base_name, 0, "input", &print_intentions(collection, true))
            },
            |step_count, pass, collection| {
                Self::dump_to_file(
                    dump_base_name,
                    step_count,
                    &pass.name(),
                    &Self::get_per_pass_dump(collection, pass),
                )
            },
        )
    }

    fn get_per_pass_dump(collection: &IntentionCollection, pass: &dyn IntentionPass) -> String {
        let mut dump = format!("{}", PassResultDisplay { collection, pass });
        if !dump.is_empty() {
            dump = format!("{}\n\n", dump);
        }
        dump.push_str(&print_intentions(collection, true));
        dump
    }

    fn dump_to_file(base_name: &str, step_count: usize, suffix: &str, content: &str) {
        let dump = format!("{}\n", content.trim());
        let file_name = format!("{}_{}_{}.intentions", base_name, step_count, suffix);
        debug!("dumping intentions to `{}`", file_name);
        if let Err(e) = fs::write(&file_name, dump) {
            warn!("cannot write intention dump `{}`: {}", file_name, e);
        }
    }
}

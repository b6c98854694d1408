// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

pub mod context;
pub mod file_type_merging;
pub mod import_directives;
pub mod intention_pass_pipeline;
pub mod naming;
pub mod options;
pub mod pass_factory;
pub mod property_merge;
pub mod protocol_nullability_propagation;
pub mod stored_property_materialization;
pub mod swiftify_method_signatures;

pub use context::{IntentionPassContext, KnownTypeRegistry};
pub use intention_pass_pipeline::{IntentionPass, IntentionPassPipeline};
pub use options::{IntentionPassOptions, KnownTypeDeclaration};
pub use pass_factory::default_intention_passes;

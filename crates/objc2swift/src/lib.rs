// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

pub mod options;
pub mod translate;

pub use options::Options;
pub use translate::{build_context, execute, load_collection, translate};

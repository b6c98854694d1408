// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::{
    file_type_merging::FileTypeMergingProcessor, import_directives::ImportDirectivesProcessor,
    intention_pass_pipeline::IntentionPassPipeline, property_merge::PropertyMergeProcessor,
    protocol_nullability_propagation::ProtocolNullabilityPropagationProcessor,
    stored_property_materialization::StoredPropertyMaterializationProcessor,
    swiftify_method_signatures::SwiftifyMethodSignaturesProcessor,
};

/// Allocates the passes run over every translated collection.
pub fn default_intention_passes() -> IntentionPassPipeline {
    // NOTE: the order of these passes is important!
    let mut pipeline = IntentionPassPipeline::default();
    pipeline.add_pass(FileTypeMergingProcessor::new());
    pipeline.add_pass(StoredPropertyMaterializationProcessor::new());
    pipeline.add_pass(ProtocolNullabilityPropagationProcessor::new());
    pipeline.add_pass(PropertyMergeProcessor::new());
    pipeline.add_pass(SwiftifyMethodSignaturesProcessor::new());
    pipeline.add_pass(ImportDirectivesProcessor::new());
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pass_order() {
        assert_eq!(
            default_intention_passes().pass_names(),
            vec![
                "file_type_merging",
                "stored_property_materialization",
                "protocol_nullability_propagation",
                "property_merge",
                "swiftify_method_signatures",
                "import_directives",
            ]
        );
    }
}

// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

pub mod intention_printer;
pub mod known_type_formatter;
pub mod swift_writer;

pub use intention_printer::print_intentions;
pub use known_type_formatter::{
    constructor_to_string, field_to_string, function_declaration, known_type_to_string,
    method_to_string, property_to_string, qualified_property, qualified_signature,
};
pub use swift_writer::{render_to_string, SwiftWriter};

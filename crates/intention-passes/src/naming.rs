// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Identifier case helpers

pub fn uppercase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the leading character, or the leading acronym (`URLString` -> `urlString`)
pub fn lowercase_first(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let upper_run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match upper_run {
        0 => 0,
        1 => 1,
        n if n == chars.len() => n,
        // keep the last capital of an acronym when it starts the next word
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i < lowered {
                c.to_lowercase().collect::<String>()
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Setter selector name for a property, e.g. `name` -> `setName`
pub fn setter_name(property_name: &str) -> String {
    format!("set{}", uppercase_first(property_name))
}

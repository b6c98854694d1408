// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Line-based writer for Swift-like text with four-space indentation.

const INDENT: &str = "    ";

/// Tracks indentation and handles line-based output into a `String`.
#[derive(Debug)]
pub struct SwiftWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl SwiftWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    /// Write a string, indenting at line starts. Blank lines are never indented.
    pub fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.out.push('\n');
                self.at_line_start = true;
            } else {
                if self.at_line_start {
                    for _ in 0..self.indent {
                        self.out.push_str(INDENT);
                    }
                }
                self.at_line_start = false;
                self.out.push(c);
            }
        }
    }

    /// Write a complete line.
    pub fn line(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.write("\n");
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes `header {`, the indented body and a closing `}` line.
    pub fn block<F>(&mut self, header: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.line(&format!("{} {{", header));
        self.indent();
        body(self);
        self.dedent();
        self.line("}");
    }

    /// Write a formatted line.
    pub fn line_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        self.line(&args.to_string());
    }

    pub fn into_inner(self) -> String {
        self.out
    }
}

impl Default for SwiftWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render to a string.
pub fn render_to_string<F>(f: F) -> String
where
    F: FnOnce(&mut SwiftWriter),
{
    let mut writer = SwiftWriter::new();
    f(&mut writer);
    writer.into_inner()
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Value formatters: typed closures from a monitored value to display text.
//!
//! A formatter owns its scratch buffer. The label prefix is written once at
//! construction and every call only truncates back to it, so steady-state
//! refreshes do not allocate. Because of that scratch state a formatter is
//! used through `&mut self`; each monitor unit holds its own copy, cloned
//! from a prototype cached by [`FormatterFactory`].

mod dictionary;
mod factory;
mod options;
mod processor;
mod scalar;
mod sequence;

pub use dictionary::{dictionary_processor, DictionaryFormatter, EntryProcessorFormatter, MapLike};
pub use factory::FormatterFactory;
pub use options::{ColorScheme, FormatOptions, Rgb};
pub use processor::{exact_processor, NamedProcessor, ProcessorFormatter};
pub use scalar::{
    BoolFormatter, DerefFormatter, DisplayFormatter, FormattableFormatter, NullGuardFormatter,
    NullableFormatter, TrackedFormatter, VectorFormatter,
};
pub use sequence::{
    sequence_processor, DisplayList, ElementProcessorFormatter, EnumerableFormatter, SequenceFormatter,
    SequenceLike,
};

/// Text rendered in place of a missing value.
pub const NULL_TEXT: &str = "null";

pub trait ValueFormatter<V>: Send + Sync {
    /// Render `value` (or the null sentinel for `None`) and return the text.
    fn format(&mut self, value: Option<&V>) -> &str;

    /// Text produced by the last call to [`format`](ValueFormatter::format).
    fn text(&self) -> &str;

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>>;
}

/// Reusable output buffer with a fixed prefix.
#[derive(Debug, Clone)]
pub(crate) struct Scratch {
    buffer: String,
    prefix_len: usize,
}

impl Scratch {
    /// Single-line output: `label: value`.
    pub(crate) fn inline(label: &str) -> Self {
        let mut buffer = String::with_capacity(label.len() + 32);
        if !label.is_empty() {
            buffer.push_str(label);
            buffer.push_str(": ");
        }
        Self::from_prefix(buffer)
    }

    /// Multi-line output: `label:` followed by element lines.
    pub(crate) fn block(label: &str) -> Self {
        let mut buffer = String::with_capacity(label.len() + 64);
        if !label.is_empty() {
            buffer.push_str(label);
            buffer.push(':');
        }
        Self::from_prefix(buffer)
    }

    fn from_prefix(buffer: String) -> Self {
        let prefix_len = buffer.len();
        Self { buffer, prefix_len }
    }

    /// Reset to the prefix and hand out the buffer for appending.
    pub(crate) fn begin(&mut self) -> &mut String {
        self.buffer.truncate(self.prefix_len);
        &mut self.buffer
    }

    pub(crate) fn has_label(&self) -> bool {
        self.prefix_len > 0
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buffer
    }
}

pub(crate) fn push_colored(out: &mut String, color: Rgb, rich_text: bool, write: impl FnOnce(&mut String)) {
    if rich_text {
        out.push_str("<color=");
        push_rgb(out, color);
        out.push('>');
        write(out);
        out.push_str("</color>");
    } else {
        write(out);
    }
}

fn push_rgb(out: &mut String, color: Rgb) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push('#');
    for channel in [color.0, color.1, color.2] {
        out.push(HEX[(channel >> 4) as usize] as char);
        out.push(HEX[(channel & 0x0F) as usize] as char);
    }
}

pub(crate) fn push_bool(out: &mut String, value: bool, options: &FormatOptions) {
    let color = if value {
        options.colors.true_color
    } else {
        options.colors.false_color
    };
    push_colored(out, color, options.rich_text, |out| {
        out.push_str(if value { "true" } else { "false" })
    });
}

/// Start a collection element line: newline, indent, prefix and index.
pub(crate) fn push_element_head(out: &mut String, index: usize, options: &FormatOptions) {
    use std::fmt::Write;

    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..options.indent {
        out.push(' ');
    }
    if let Some(prefix) = &options.element_prefix {
        out.push_str(prefix);
    }
    if options.show_index {
        let _ = write!(out, "[{index}]: ");
    }
}

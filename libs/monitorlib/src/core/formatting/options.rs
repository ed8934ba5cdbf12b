// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color, written `#RRGGBB` in settings files and markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{s}', expected #RRGGBB"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Colors used by rich-text markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub true_color: Rgb,
    pub false_color: Rgb,
    pub x_color: Rgb,
    pub y_color: Rgb,
    pub z_color: Rgb,
    pub w_color: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            true_color: Rgb(0x7F, 0xD6, 0x4F),
            false_color: Rgb(0xE0, 0x4F, 0x4F),
            x_color: Rgb(0xF3, 0x6B, 0x6B),
            y_color: Rgb(0x8E, 0xD8, 0x6B),
            z_color: Rgb(0x6B, 0x9C, 0xF3),
            w_color: Rgb(0xD8, 0xD8, 0xD8),
        }
    }
}

impl ColorScheme {
    pub fn component(&self, index: usize) -> Rgb {
        match index {
            0 => self.x_color,
            1 => self.y_color,
            2 => self.z_color,
            _ => self.w_color,
        }
    }
}

/// Everything a formatter needs besides the value itself. Part of the
/// formatter cache key, so two profiles with equal options share one
/// prototype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatOptions {
    pub label: String,
    pub format: Option<String>,
    /// Spaces before each element line of collections.
    pub indent: usize,
    pub show_index: bool,
    pub element_prefix: Option<String>,
    pub rich_text: bool,
    pub colors: ColorScheme,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            label: String::new(),
            format: None,
            indent: 2,
            show_index: false,
            element_prefix: None,
            rich_text: false,
            colors: ColorScheme::default(),
        }
    }
}

impl FormatOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_show_index(mut self, show_index: bool) -> Self {
        self.show_index = show_index;
        self
    }

    pub fn with_element_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.element_prefix = Some(prefix.into());
        self
    }

    pub fn with_rich_text(mut self, rich_text: bool) -> Self {
        self.rich_text = rich_text;
        self
    }

    pub fn with_colors(mut self, colors: ColorScheme) -> Self {
        self.colors = colors;
        self
    }
}

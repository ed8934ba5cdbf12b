// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Observation markers attached to members and types.

use crate::core::values::Literal;

/// Built-in value predicates for visibility gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    IsNull,
    NotNull,
    True,
    False,
    Positive,
    Negative,
    Zero,
    NonZero,
    NullOrEmpty,
    NotNullOrEmpty,
    NullOrWhitespace,
    NotNullOrWhitespace,
    CollectionEmpty,
    CollectionNotEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }
}

/// Visibility-condition descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowIf {
    /// Predicate over the monitored value.
    Condition(Condition),
    /// Comparison of the monitored value against a constant.
    Compare(Comparison, Literal),
    /// Zero-argument predicate: a named static method of the declaring type.
    StaticMethod(String),
    /// Named instance method of the declaring type, bound per target.
    InstanceMethod(String),
}

/// Member-level observation marker.
///
/// `None` fields fall back to type-level defaults and then to settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorMarker {
    pub label: Option<String>,
    pub format: Option<String>,
    pub processor: Option<String>,
    pub show_if: Option<ShowIf>,
    pub update_event: Option<String>,
    pub tags: Vec<String>,
    pub enabled: Option<bool>,
    pub indent: Option<usize>,
    pub show_index: Option<bool>,
    pub element_prefix: Option<String>,
    pub rich_text: Option<bool>,
    pub font_size: Option<u16>,
    pub group: Option<String>,
    pub writable: bool,
    pub args: Vec<Literal>,
}

impl MonitorMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_processor(mut self, name: impl Into<String>) -> Self {
        self.processor = Some(name.into());
        self
    }

    pub fn with_show_if(mut self, show_if: ShowIf) -> Self {
        self.show_if = Some(show_if);
        self
    }

    pub fn with_update_event(mut self, event: impl Into<String>) -> Self {
        self.update_event = Some(event.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_show_index(mut self, show_index: bool) -> Self {
        self.show_index = Some(show_index);
        self
    }

    pub fn with_element_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.element_prefix = Some(prefix.into());
        self
    }

    pub fn with_rich_text(mut self, rich_text: bool) -> Self {
        self.rich_text = Some(rich_text);
        self
    }

    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Literal>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Apply type-level defaults. The member's own settings win; tags are
    /// appended without duplicates.
    pub fn merged_with(&self, ty: &TypeMarker) -> MonitorMarker {
        let defaults = &ty.defaults;
        let mut merged = MonitorMarker {
            label: self.label.clone().or_else(|| defaults.label.clone()),
            format: self.format.clone().or_else(|| defaults.format.clone()),
            processor: self.processor.clone().or_else(|| defaults.processor.clone()),
            show_if: self.show_if.clone().or_else(|| defaults.show_if.clone()),
            update_event: self
                .update_event
                .clone()
                .or_else(|| defaults.update_event.clone()),
            tags: self.tags.clone(),
            enabled: self.enabled.or(defaults.enabled),
            indent: self.indent.or(defaults.indent),
            show_index: self.show_index.or(defaults.show_index),
            element_prefix: self
                .element_prefix
                .clone()
                .or_else(|| defaults.element_prefix.clone()),
            rich_text: self.rich_text.or(defaults.rich_text),
            font_size: self.font_size.or(defaults.font_size),
            group: self.group.clone().or_else(|| defaults.group.clone()),
            writable: self.writable || defaults.writable,
            args: self.args.clone(),
        };
        for tag in defaults.tags.iter().chain(ty.tags.iter()) {
            if !merged.tags.contains(tag) {
                merged.tags.push(tag.clone());
            }
        }
        merged
    }
}

/// Type-level marker: opt-out flag, shared tags, and defaults for every
/// marked member of the type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMarker {
    pub exclude: bool,
    pub tags: Vec<String>,
    pub defaults: MonitorMarker,
}

impl TypeMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluded() -> Self {
        Self {
            exclude: true,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_defaults(mut self, defaults: MonitorMarker) -> Self {
        self.defaults = defaults;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_settings_win_over_type_defaults() {
        let ty = TypeMarker::new().with_defaults(
            MonitorMarker::new()
                .with_format("F2")
                .with_label("ignored")
                .with_indent(4),
        );
        let member = MonitorMarker::new().with_label("Health");
        let merged = member.merged_with(&ty);

        assert_eq!(merged.label.as_deref(), Some("Health"));
        assert_eq!(merged.format.as_deref(), Some("F2"));
        assert_eq!(merged.indent, Some(4));
    }

    #[test]
    fn test_tags_are_appended_once() {
        let ty = TypeMarker::new().with_tag("player").with_tag("combat");
        let member = MonitorMarker::new().with_tag("combat").with_tag("hp");
        let merged = member.merged_with(&ty);
        assert_eq!(merged.tags, vec!["combat", "hp", "player"]);
    }

    #[test]
    fn test_args_are_not_inherited() {
        let ty = TypeMarker::new()
            .with_defaults(MonitorMarker::new().with_args([Literal::Int(1)]));
        let merged = MonitorMarker::new().merged_with(&ty);
        assert!(merged.args.is_empty());
    }
}

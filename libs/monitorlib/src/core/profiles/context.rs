// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::info::ProfileInfo;
use crate::core::config::MonitorSettings;
use crate::core::formatting::{FormatOptions, FormatterFactory, ValueFormatter};
use crate::core::marker::MonitorMarker;
use crate::core::scan::{ScanIssue, ScanIssueKind, Severity};
use crate::core::types::{MemberDescriptor, MethodHandle, NamedMethod, TypeDescriptor, UpcastPath};
use crate::core::validation::{Validator, ValidatorFactory};
use crate::core::values::MonitorValue;
use std::any::type_name;
use std::sync::Arc;

/// Everything a binding needs to compile one member into a profile.
///
/// `declaring` is the type the profile is registered under; `holder` is the
/// type that declares the member and `path` leads from the first to the
/// second. They are the same type, with an empty path, unless the member is
/// inherited from a closed generic ancestor.
pub struct ProfileContext<'a> {
    declaring: &'a Arc<TypeDescriptor>,
    holder: &'a Arc<TypeDescriptor>,
    path: UpcastPath,
    member: &'a MemberDescriptor,
    marker: &'a MonitorMarker,
    settings: &'a MonitorSettings,
    formatters: &'a FormatterFactory,
    issues: Vec<ScanIssue>,
}

impl<'a> ProfileContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        declaring: &'a Arc<TypeDescriptor>,
        holder: &'a Arc<TypeDescriptor>,
        path: UpcastPath,
        member: &'a MemberDescriptor,
        marker: &'a MonitorMarker,
        settings: &'a MonitorSettings,
        formatters: &'a FormatterFactory,
    ) -> Self {
        Self {
            declaring,
            holder,
            path,
            member,
            marker,
            settings,
            formatters,
            issues: Vec::new(),
        }
    }

    pub fn declaring(&self) -> &Arc<TypeDescriptor> {
        self.declaring
    }

    pub fn holder(&self) -> &Arc<TypeDescriptor> {
        self.holder
    }

    pub fn path(&self) -> &UpcastPath {
        &self.path
    }

    pub fn member(&self) -> &MemberDescriptor {
        self.member
    }

    pub fn marker(&self) -> &MonitorMarker {
        self.marker
    }

    pub fn settings(&self) -> &MonitorSettings {
        self.settings
    }

    pub fn formatters(&self) -> &FormatterFactory {
        self.formatters
    }

    pub fn label(&self) -> String {
        self.marker
            .label
            .clone()
            .unwrap_or_else(|| self.member.name().to_string())
    }

    /// Marker options over settings defaults.
    pub fn format_options(&self) -> FormatOptions {
        let formatting = &self.settings.formatting;
        FormatOptions {
            label: self.label(),
            format: self.marker.format.clone(),
            indent: self.marker.indent.unwrap_or(formatting.default_indent),
            show_index: self.marker.show_index.unwrap_or(formatting.show_index),
            element_prefix: self.marker.element_prefix.clone(),
            rich_text: self.marker.rich_text.unwrap_or(formatting.rich_text),
            colors: formatting.colors.clone(),
        }
    }

    /// Setters are used only when the binding has one, the marker asks for
    /// it and settings allow it.
    pub fn writable(&self, binding_can_write: bool) -> bool {
        binding_can_write && self.marker.writable && self.settings.enable_setters
    }

    /// Look up a named method on the declaring type, then on its ancestors.
    /// Returns the method with the path from the declaring type to its owner.
    pub fn find_method(&self, name: &str) -> Option<(NamedMethod, UpcastPath)> {
        if let Some(method) = self.declaring.method(name) {
            return Some((method.clone(), UpcastPath::new()));
        }
        self.declaring
            .ancestors()
            .into_iter()
            .find_map(|(ancestor, path)| ancestor.method(name).map(|m| (m.clone(), path)))
    }

    /// Custom processor named by the marker if it fits `V`, the factory's
    /// formatter otherwise.
    pub fn build_formatter<V: MonitorValue>(&mut self) -> Box<dyn ValueFormatter<V>> {
        let options = self.format_options();
        if let Some(name) = self.marker.processor.clone() {
            match self.find_method(&name) {
                Some((method, _)) => match method.handle() {
                    MethodHandle::Processor(processor) => {
                        if let Some(formatter) = V::processor_formatter(processor.handle(), &options) {
                            return formatter;
                        }
                        self.warn(
                            ScanIssueKind::CustomProcessor,
                            format!(
                                "processor '{}' with signature {} does not accept {}, using default formatting",
                                name,
                                processor.signature(),
                                type_name::<V>()
                            ),
                        );
                    }
                    _ => self.warn(
                        ScanIssueKind::CustomProcessor,
                        format!("'{name}' is not a value processor, using default formatting"),
                    ),
                },
                None => self.warn(
                    ScanIssueKind::CustomProcessor,
                    format!("processor '{name}' not found, using default formatting"),
                ),
            }
        }
        self.formatters.create::<V>(&options)
    }

    pub fn build_validator<V: MonitorValue>(&mut self) -> Option<Validator<V>> {
        let show_if = self.marker.show_if.clone()?;
        ValidatorFactory::create::<V>(&show_if, self)
    }

    pub fn info(&self, value_type: &str, writable: bool, has_validator: bool) -> ProfileInfo {
        ProfileInfo {
            declaring_type: self.declaring.key().clone(),
            declaring_type_name: self.declaring.name().to_string(),
            holder_type: self.holder.name().to_string(),
            origin: self.holder.origin_key().clone(),
            member_name: self.member.name().to_string(),
            member_kind: self.member.kind(),
            is_static: self.member.is_static(),
            value_type: value_type.to_string(),
            label: self.label(),
            tags: self.marker.tags.clone(),
            group: self.marker.group.clone(),
            update_event: self.marker.update_event.clone(),
            enabled_by_default: self.marker.enabled.unwrap_or(true),
            font_size: self.marker.font_size,
            writable,
            has_validator,
        }
    }

    pub fn warn(&mut self, kind: ScanIssueKind, message: impl Into<String>) {
        self.push(Severity::Warning, kind, message);
    }

    pub fn push(&mut self, severity: Severity, kind: ScanIssueKind, message: impl Into<String>) {
        self.issues.push(
            ScanIssue::new(severity, kind, message)
                .on_type(self.declaring.name())
                .on_member(self.member.name()),
        );
    }

    /// Issues raised while building, to be merged into the scan report.
    pub fn take_issues(&mut self) -> Vec<ScanIssue> {
        std::mem::take(&mut self.issues)
    }
}

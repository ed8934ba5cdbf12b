// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::context::ProfileContext;
use super::info::ProfileInfo;
use super::source::{ValueSink, ValueSource};
use super::unit::{BoundTarget, MonitorProfile, MonitorUnit, Target};
use crate::core::error::ProfileError;
use crate::core::formatting::ValueFormatter;
use crate::core::types::UpcastPath;
use crate::core::validation::Validator;
use crate::core::values::MonitorValue;
use std::any::{type_name, Any};
use std::sync::Arc;

/// Profile of a field, property or method returning `V`.
pub struct ValueProfile<V: MonitorValue> {
    info: ProfileInfo,
    path: UpcastPath,
    source: Arc<dyn ValueSource<V>>,
    sink: Option<Arc<dyn ValueSink<V>>>,
    formatter: Box<dyn ValueFormatter<V>>,
    validator: Option<Validator<V>>,
}

impl<V: MonitorValue> ValueProfile<V> {
    /// Compile with the formatter and validator `cx` selects. `sink` is
    /// dropped unless the member may be written.
    pub fn build(
        cx: &mut ProfileContext<'_>,
        source: Arc<dyn ValueSource<V>>,
        sink: Option<Arc<dyn ValueSink<V>>>,
    ) -> Self {
        let formatter = cx.build_formatter::<V>();
        let validator = cx.build_validator::<V>();
        let sink = sink.filter(|_| cx.writable(true));
        let info = cx.info(type_name::<V>(), sink.is_some(), validator.is_some());
        Self {
            info,
            path: cx.path().clone(),
            source,
            sink,
            formatter,
            validator,
        }
    }

    /// Read the value from `holder` and render it with `formatter`.
    fn render(&self, holder: Option<&dyn Any>, formatter: &mut dyn ValueFormatter<V>) {
        self.source.read(holder, &mut |value| {
            formatter.format(value);
        });
    }
}

impl<V: MonitorValue> MonitorProfile for ValueProfile<V> {
    fn info(&self) -> &ProfileInfo {
        &self.info
    }

    fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    fn can_write(&self) -> bool {
        self.sink.is_some()
    }

    fn create_unit_via(
        self: Arc<Self>,
        target: Option<Target>,
        entry: &UpcastPath,
    ) -> Result<Box<dyn MonitorUnit>, ProfileError> {
        let target = BoundTarget::bind(&self.info, target, entry, &self.path)?;
        let formatter = self.formatter.clone_box();
        let enabled = self.info.enabled_by_default;
        Ok(Box::new(ValueUnit {
            profile: self,
            target,
            formatter,
            enabled,
        }))
    }
}

struct ValueUnit<V: MonitorValue> {
    profile: Arc<ValueProfile<V>>,
    target: BoundTarget,
    formatter: Box<dyn ValueFormatter<V>>,
    enabled: bool,
}

impl<V: MonitorValue> MonitorUnit for ValueUnit<V> {
    fn profile(&self) -> Arc<dyn MonitorProfile> {
        self.profile.clone()
    }

    fn info(&self) -> &ProfileInfo {
        &self.profile.info
    }

    fn refresh(&mut self) -> &str {
        let profile = &self.profile;
        let formatter = &mut *self.formatter;
        let rendered = self
            .target
            .with_holder(|holder| profile.render(holder, &mut *formatter));
        if rendered.is_none() {
            formatter.format(None);
        }
        self.formatter.text()
    }

    fn text(&self) -> &str {
        self.formatter.text()
    }

    fn is_visible(&self) -> bool {
        let Some(validator) = &self.profile.validator else {
            return self.target.is_alive();
        };
        let profile = &self.profile;
        let holder_target = &self.target;
        self.target
            .with_declaring(|declaring| {
                validator.is_satisfied(declaring, |visit| {
                    holder_target.with_holder(|holder| profile.source.read(holder, visit));
                })
            })
            .unwrap_or(false)
    }

    fn is_target_alive(&self) -> bool {
        self.target.is_alive()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn write_value(&mut self, value: Box<dyn Any + Send>) -> Result<(), ProfileError> {
        let Some(sink) = &self.profile.sink else {
            return Err(ProfileError::ReadOnly(self.profile.info.member_name.clone()));
        };
        let value = value.downcast::<V>().map_err(|_| ProfileError::ValueType {
            member: self.profile.info.member_name.clone(),
            expected: type_name::<V>().to_string(),
        })?;
        let written = self
            .target
            .with_holder(|holder| sink.write(holder, *value))
            .unwrap_or(false);
        if written {
            Ok(())
        } else {
            Err(ProfileError::TargetMismatch {
                expected: self.profile.info.holder_type.clone(),
            })
        }
    }
}

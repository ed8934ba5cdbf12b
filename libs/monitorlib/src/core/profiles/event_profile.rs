// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::context::ProfileContext;
use super::info::ProfileInfo;
use super::source::EventAccess;
use super::unit::{BoundTarget, MonitorProfile, MonitorUnit, Target};
use crate::core::error::ProfileError;
use crate::core::formatting::{FormatOptions, NULL_TEXT};
use crate::core::types::UpcastPath;
use crate::core::validation::Validator;
use crate::core::values::{EventSource, SubscriberCountPolicy};
use std::any::Any;
use std::fmt::Write;
use std::sync::Arc;

/// Profile of an event: renders the subscriber count, and optionally the
/// subscriber names one per line. Visibility gates see the count.
pub struct EventProfile {
    info: ProfileInfo,
    path: UpcastPath,
    access: Arc<dyn EventAccess>,
    policy: SubscriberCountPolicy,
    show_subscribers: bool,
    options: FormatOptions,
    validator: Option<Validator<usize>>,
}

impl EventProfile {
    pub fn build(cx: &mut ProfileContext<'_>, access: Arc<dyn EventAccess>) -> Self {
        let validator = cx.build_validator::<usize>();
        let info = cx.info("event", false, validator.is_some());
        let events = &cx.settings().events;
        Self {
            info,
            path: cx.path().clone(),
            access,
            policy: events.subscriber_count_policy,
            show_subscribers: events.show_subscribers,
            options: cx.format_options(),
            validator,
        }
    }

    fn count(&self, holder: Option<&dyn Any>) -> Option<usize> {
        let mut count = None;
        self.access
            .with_source(holder, &mut |source| count = source.map(|s| self.policy.count(s)));
        count
    }

    fn render(&self, source: Option<&dyn EventSource>, out: &mut String) {
        if !self.options.label.is_empty() {
            out.push_str(&self.options.label);
            out.push_str(": ");
        }
        let Some(source) = source else {
            out.push_str(NULL_TEXT);
            return;
        };
        let _ = write!(out, "{}", self.policy.count(source));
        if self.show_subscribers {
            let mut index = 0;
            source.for_each_subscriber(&mut |name| {
                crate::core::formatting::push_element_head(out, index, &self.options);
                out.push_str(name);
                index += 1;
            });
        }
    }
}

impl MonitorProfile for EventProfile {
    fn info(&self) -> &ProfileInfo {
        &self.info
    }

    fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    fn can_write(&self) -> bool {
        false
    }

    fn create_unit_via(
        self: Arc<Self>,
        target: Option<Target>,
        entry: &UpcastPath,
    ) -> Result<Box<dyn MonitorUnit>, ProfileError> {
        let target = BoundTarget::bind(&self.info, target, entry, &self.path)?;
        let enabled = self.info.enabled_by_default;
        Ok(Box::new(EventUnit {
            profile: self,
            target,
            text: String::new(),
            enabled,
        }))
    }
}

struct EventUnit {
    profile: Arc<EventProfile>,
    target: BoundTarget,
    text: String,
    enabled: bool,
}

impl MonitorUnit for EventUnit {
    fn profile(&self) -> Arc<dyn MonitorProfile> {
        self.profile.clone()
    }

    fn info(&self) -> &ProfileInfo {
        &self.profile.info
    }

    fn refresh(&mut self) -> &str {
        self.text.clear();
        let profile = &self.profile;
        let text = &mut self.text;
        let rendered = self.target.with_holder(|holder| {
            profile
                .access
                .with_source(holder, &mut |source| profile.render(source, text));
        });
        if rendered.is_none() {
            profile.render(None, text);
        }
        &self.text
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn is_visible(&self) -> bool {
        let Some(validator) = &self.profile.validator else {
            return self.target.is_alive();
        };
        let profile = &self.profile;
        let target = &self.target;
        target
            .with_declaring(|declaring| {
                validator.is_satisfied(declaring, |visit| {
                    let count = target.with_holder(|holder| profile.count(holder)).flatten();
                    visit(count.as_ref());
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

    fn write_value(&mut self, _value: Box<dyn Any + Send>) -> Result<(), ProfileError> {
        Err(ProfileError::ReadOnly(self.profile.info.member_name.clone()))
    }
}

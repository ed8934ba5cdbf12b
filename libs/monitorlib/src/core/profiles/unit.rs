// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::info::ProfileInfo;
use crate::core::error::ProfileError;
use crate::core::types::UpcastPath;
use std::any::Any;
use std::sync::{Arc, Weak};

/// An observed instance. Units only hold it weakly.
pub type Target = Arc<dyn Any + Send + Sync>;

/// A compiled, target-agnostic recipe for observing one member.
pub trait MonitorProfile: Send + Sync {
    fn info(&self) -> &ProfileInfo;

    fn has_validator(&self) -> bool;

    fn can_write(&self) -> bool;

    /// Bind to a target whose concrete type is reached from the declaring
    /// type through `entry` (empty when the target is of the declaring type
    /// itself).
    fn create_unit_via(
        self: Arc<Self>,
        target: Option<Target>,
        entry: &UpcastPath,
    ) -> Result<Box<dyn MonitorUnit>, ProfileError>;

    /// Bind to `target`: `None` for static profiles, an instance of the
    /// declaring type otherwise.
    fn create_unit(self: Arc<Self>, target: Option<Target>) -> Result<Box<dyn MonitorUnit>, ProfileError> {
        self.create_unit_via(target, &UpcastPath::new())
    }
}

/// A profile bound to a target, with its own formatter state.
pub trait MonitorUnit: Send {
    fn profile(&self) -> Arc<dyn MonitorProfile>;

    fn info(&self) -> &ProfileInfo;

    /// Read the member and render it.
    fn refresh(&mut self) -> &str;

    /// Text of the last refresh.
    fn text(&self) -> &str;

    /// Evaluate the visibility gate. Always true without one; always false
    /// once the target is gone.
    fn is_visible(&self) -> bool;

    fn is_target_alive(&self) -> bool;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Write a value back through the member's setter.
    fn write_value(&mut self, value: Box<dyn Any + Send>) -> Result<(), ProfileError>;
}

impl dyn MonitorUnit {
    pub fn write<T: Any + Send>(&mut self, value: T) -> Result<(), ProfileError> {
        self.write_value(Box::new(value))
    }
}

/// Unit-side handle on a target.
pub(crate) enum BoundTarget {
    Static,
    Instance {
        target: Weak<dyn Any + Send + Sync>,
        /// Target to declaring type.
        entry: UpcastPath,
        /// Target to holder type.
        holder: UpcastPath,
    },
}

impl BoundTarget {
    /// Validate `target` against `info` and combine `entry` with the
    /// profile's own path from its declaring type to the holder.
    pub(crate) fn bind(
        info: &ProfileInfo,
        target: Option<Target>,
        entry: &UpcastPath,
        holder_path: &UpcastPath,
    ) -> Result<Self, ProfileError> {
        match (info.is_static, target) {
            (true, None) => Ok(BoundTarget::Static),
            (true, Some(_)) => Err(ProfileError::UnexpectedTarget(info.member_name.clone())),
            (false, None) => Err(ProfileError::MissingTarget(info.member_name.clone())),
            (false, Some(target)) => {
                let declaring = entry.resolve(&*target).map(|v| v.type_id());
                if declaring.is_none() || declaring != info.declaring_type.type_id() {
                    return Err(ProfileError::TargetMismatch {
                        expected: info.declaring_type_name.clone(),
                    });
                }
                Ok(BoundTarget::Instance {
                    target: Arc::downgrade(&target),
                    entry: entry.clone(),
                    holder: entry.join(holder_path),
                })
            }
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        match self {
            BoundTarget::Static => true,
            BoundTarget::Instance { target, .. } => target.strong_count() > 0,
        }
    }

    /// Run `f` with the holder instance. `None` when the target is gone;
    /// static units always run with no holder.
    pub(crate) fn with_holder<R>(&self, f: impl FnOnce(Option<&dyn Any>) -> R) -> Option<R> {
        match self {
            BoundTarget::Static => Some(f(None)),
            BoundTarget::Instance { target, holder, .. } => {
                let target = target.upgrade()?;
                Some(f(holder.resolve(&*target)))
            }
        }
    }

    /// Run `f` with the instance of the declaring type.
    pub(crate) fn with_declaring<R>(&self, f: impl FnOnce(Option<&dyn Any>) -> R) -> Option<R> {
        match self {
            BoundTarget::Static => Some(f(None)),
            BoundTarget::Instance { target, entry, .. } => {
                let target = target.upgrade()?;
                Some(f(entry.resolve(&*target)))
            }
        }
    }
}

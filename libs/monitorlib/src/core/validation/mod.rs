// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Visibility gates built from `show_if` markers.

mod condition;

pub use condition::ValueCheck;

use crate::core::marker::ShowIf;
use crate::core::profiles::ProfileContext;
use crate::core::scan::ScanIssueKind;
use crate::core::types::{InstancePredicate, MethodHandle, UpcastPath};
use crate::core::values::MonitorValue;
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Decides whether a unit is shown.
pub enum Validator<V> {
    /// Zero-argument static predicate.
    Static(fn() -> bool),
    /// Predicate over the monitored value.
    Value(ValueCheck, PhantomData<fn(&V)>),
    /// Instance predicate, reached from the declaring type through `path`.
    Instance {
        path: UpcastPath,
        predicate: Arc<dyn InstancePredicate>,
    },
}

impl<V: MonitorValue> Validator<V> {
    pub fn value(check: ValueCheck) -> Self {
        Validator::Value(check, PhantomData)
    }

    /// Evaluate against the declaring instance (`None` for statics). `read`
    /// lends the current value and is only called for value predicates.
    pub fn is_satisfied(
        &self,
        declaring: Option<&dyn Any>,
        read: impl FnOnce(&mut dyn FnMut(Option<&V>)),
    ) -> bool {
        match self {
            Validator::Static(predicate) => predicate(),
            Validator::Value(check, _) => {
                let mut satisfied = false;
                read(&mut |value| satisfied = check.test(value));
                satisfied
            }
            Validator::Instance { path, predicate } => declaring
                .and_then(|d| path.resolve(d))
                .and_then(|owner| predicate.test(owner))
                .unwrap_or(false),
        }
    }
}

impl<V> fmt::Debug for Validator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Static(_) => f.write_str("Validator::Static"),
            Validator::Value(check, _) => write!(f, "Validator::Value({check})"),
            Validator::Instance { predicate, .. } => {
                write!(f, "Validator::Instance({})", predicate.receiver())
            }
        }
    }
}

/// Builds the visibility gate for a member.
pub struct ValidatorFactory;

impl ValidatorFactory {
    /// `None` (with a warning on `cx`) when the condition does not fit the
    /// member's value type or the named method is missing or of the wrong
    /// kind.
    pub fn create<V: MonitorValue>(show_if: &ShowIf, cx: &mut ProfileContext<'_>) -> Option<Validator<V>> {
        match show_if {
            ShowIf::Condition(condition) => {
                Self::value_check(ValueCheck::Condition(*condition), cx)
            }
            ShowIf::Compare(op, operand) => {
                Self::value_check(ValueCheck::Compare(*op, operand.clone()), cx)
            }
            ShowIf::StaticMethod(name) => match cx.find_method(name) {
                Some((method, _)) => match method.handle() {
                    MethodHandle::StaticPredicate(predicate) => Some(Validator::Static(*predicate)),
                    _ => {
                        cx.warn(
                            ScanIssueKind::Validator,
                            format!("'{name}' is not a static predicate fn() -> bool"),
                        );
                        None
                    }
                },
                None => {
                    cx.warn(
                        ScanIssueKind::Validator,
                        format!("static predicate '{name}' not found"),
                    );
                    None
                }
            },
            ShowIf::InstanceMethod(name) => {
                if cx.member().is_static() {
                    cx.warn(
                        ScanIssueKind::Validator,
                        format!("instance predicate '{name}' can not gate a static member"),
                    );
                    return None;
                }
                match cx.find_method(name) {
                    Some((method, path)) => match method.handle() {
                        MethodHandle::InstancePredicate(predicate) => Some(Validator::Instance {
                            path,
                            predicate: predicate.clone(),
                        }),
                        _ => {
                            cx.warn(
                                ScanIssueKind::Validator,
                                format!("'{name}' is not an instance predicate fn(&Self) -> bool"),
                            );
                            None
                        }
                    },
                    None => {
                        cx.warn(
                            ScanIssueKind::Validator,
                            format!("instance predicate '{name}' not found"),
                        );
                        None
                    }
                }
            }
        }
    }

    fn value_check<V: MonitorValue>(check: ValueCheck, cx: &mut ProfileContext<'_>) -> Option<Validator<V>> {
        if check.supports(&V::SHAPE) {
            Some(Validator::value(check))
        } else {
            cx.warn(
                ScanIssueKind::Validator,
                format!("condition '{check}' does not apply to {}", type_name::<V>()),
            );
            None
        }
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::numeric_format::{format_float, format_integer, FormatSpec};
use crate::core::formatting::{
    exact_processor, DerefFormatter, FormatOptions, FormatterFactory, NullableFormatter,
    TrackedFormatter, ValueFormatter,
};
use serde::Serialize;
use std::any::Any;
use std::fmt::Write;
use std::sync::atomic::{
    AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering,
};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Coarse category of a monitored value, drives formatter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    Boolean,
    Numeric,
    Text,
    Vector,
    Dictionary,
    Sequence,
    Enumerable,
    Tracked,
    Value,
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ValueShape {
    pub category: ValueCategory,
    /// The value has a "no value" state (`Option`, `Weak`).
    pub nullable: bool,
    /// The value honors numeric format strings through [`MonitorValue::format_with`].
    pub formattable: bool,
}

impl ValueShape {
    pub const fn value(category: ValueCategory) -> Self {
        Self {
            category,
            nullable: false,
            formattable: false,
        }
    }

    pub const fn reference(category: ValueCategory) -> Self {
        Self {
            category,
            nullable: true,
            formattable: false,
        }
    }

    pub const fn with_formattable(mut self) -> Self {
        self.formattable = true;
        self
    }

    pub const fn with_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.category == ValueCategory::Numeric
    }

    pub fn is_text(&self) -> bool {
        self.category == ValueCategory::Text
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.category,
            ValueCategory::Sequence | ValueCategory::Dictionary | ValueCategory::Enumerable
        )
    }
}

/// Read-only view of a value for visibility predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe<'a> {
    Null,
    Bool(bool),
    /// Integers keep their exact value.
    Int(i128),
    Number(f64),
    Text(&'a str),
    Collection(usize),
    Opaque,
}

/// Components of a vector-like value, rendered one by one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Components {
    pub values: [f32; 4],
    pub len: usize,
    pub names: [&'static str; 4],
}

impl Components {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.names
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .take(self.len)
    }
}

/// A type whose values can be observed by a monitor unit.
///
/// The associated [`ValueShape`] is what the formatter factory and the
/// validator factory look at; containers and wrappers override
/// [`create_formatter`](MonitorValue::create_formatter) so their element
/// types get specialized formatters.
pub trait MonitorValue: Send + Sync + 'static {
    const SHAPE: ValueShape;

    fn write_display(&self, out: &mut String);

    fn probe(&self) -> Probe<'_> {
        Probe::Opaque
    }

    fn is_null(&self) -> bool {
        false
    }

    /// Render with an explicit format string. `false` when the spec does
    /// not apply to this value.
    fn format_with(&self, _spec: &FormatSpec, _out: &mut String) -> bool {
        false
    }

    fn components(&self) -> Option<Components> {
        None
    }

    fn create_formatter(
        factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>>
    where
        Self: Sized,
    {
        factory.dispatch::<Self>(options)
    }

    /// Build a formatter around a user processor if its signature fits this
    /// value type.
    fn processor_formatter(
        handle: &(dyn Any + Send + Sync),
        options: &FormatOptions,
    ) -> Option<Box<dyn ValueFormatter<Self>>>
    where
        Self: Sized,
    {
        exact_processor::<Self>(handle, options)
    }
}

impl MonitorValue for bool {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Boolean);

    fn write_display(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Bool(*self)
    }
}

macro_rules! impl_monitor_integer {
    ($($ty:ty),*) => {
        $(
            impl MonitorValue for $ty {
                const SHAPE: ValueShape =
                    ValueShape::value(ValueCategory::Numeric).with_formattable();

                fn write_display(&self, out: &mut String) {
                    let _ = write!(out, "{self}");
                }

                fn probe(&self) -> Probe<'_> {
                    Probe::Int(*self as i128)
                }

                fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
                    format_integer(*self as i128, <$ty>::BITS, spec, out)
                }
            }
        )*
    };
}

impl_monitor_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_monitor_float {
    ($($ty:ty),*) => {
        $(
            impl MonitorValue for $ty {
                const SHAPE: ValueShape =
                    ValueShape::value(ValueCategory::Numeric).with_formattable();

                fn write_display(&self, out: &mut String) {
                    let _ = write!(out, "{self}");
                }

                fn probe(&self) -> Probe<'_> {
                    Probe::Number(*self as f64)
                }

                fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
                    format_float(*self as f64, spec, out)
                }
            }
        )*
    };
}

impl_monitor_float!(f32, f64);

macro_rules! impl_monitor_atomic_integer {
    ($($atomic:ty),*) => {
        $(
            impl MonitorValue for $atomic {
                const SHAPE: ValueShape =
                    ValueShape::value(ValueCategory::Numeric).with_formattable();

                fn write_display(&self, out: &mut String) {
                    self.load(Ordering::Relaxed).write_display(out);
                }

                fn probe(&self) -> Probe<'_> {
                    Probe::Int(self.load(Ordering::Relaxed) as i128)
                }

                fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
                    self.load(Ordering::Relaxed).format_with(spec, out)
                }
            }
        )*
    };
}

impl_monitor_atomic_integer!(AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize);

impl MonitorValue for AtomicBool {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Boolean);

    fn write_display(&self, out: &mut String) {
        self.load(Ordering::Relaxed).write_display(out);
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Bool(self.load(Ordering::Relaxed))
    }
}

impl MonitorValue for char {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Value);

    fn write_display(&self, out: &mut String) {
        out.push(*self);
    }
}

impl MonitorValue for String {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Text);

    fn write_display(&self, out: &mut String) {
        out.push_str(self);
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Text(self)
    }
}

impl MonitorValue for &'static str {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Text);

    fn write_display(&self, out: &mut String) {
        out.push_str(self);
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Text(self)
    }
}

impl MonitorValue for Arc<str> {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Text);

    fn write_display(&self, out: &mut String) {
        out.push_str(self);
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Text(self)
    }
}

impl MonitorValue for Duration {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Value).with_formattable();

    fn write_display(&self, out: &mut String) {
        let _ = write!(out, "{self:?}");
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Number(self.as_secs_f64())
    }

    fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
        format_float(self.as_secs_f64(), spec, out)
    }
}

impl MonitorValue for () {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Value);

    fn write_display(&self, out: &mut String) {
        out.push_str("()");
    }
}

impl<T: MonitorValue> MonitorValue for Option<T> {
    const SHAPE: ValueShape = T::SHAPE.with_nullable();

    fn write_display(&self, out: &mut String) {
        match self {
            Some(value) => value.write_display(out),
            None => out.push_str(crate::core::formatting::NULL_TEXT),
        }
    }

    fn probe(&self) -> Probe<'_> {
        match self {
            Some(value) => value.probe(),
            None => Probe::Null,
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Some(value) => value.is_null(),
            None => true,
        }
    }

    fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
        match self {
            Some(value) => value.format_with(spec, out),
            None => false,
        }
    }

    fn components(&self) -> Option<Components> {
        self.as_ref().and_then(|v| v.components())
    }

    fn create_formatter(
        factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>> {
        Box::new(NullableFormatter::new(factory.create::<T>(options), options))
    }
}

impl<T: MonitorValue> MonitorValue for Weak<T> {
    const SHAPE: ValueShape = ValueShape::reference(ValueCategory::Tracked);

    fn write_display(&self, out: &mut String) {
        match self.upgrade() {
            Some(value) => value.write_display(out),
            None => out.push_str(crate::core::formatting::NULL_TEXT),
        }
    }

    fn probe(&self) -> Probe<'_> {
        let Some(value) = self.upgrade() else {
            return Probe::Null;
        };
        let probe = match value.probe() {
            Probe::Bool(b) => Probe::Bool(b),
            Probe::Int(n) => Probe::Int(n),
            Probe::Number(n) => Probe::Number(n),
            Probe::Collection(n) => Probe::Collection(n),
            Probe::Null => Probe::Null,
            Probe::Text(_) | Probe::Opaque => Probe::Opaque,
        };
        probe
    }

    fn is_null(&self) -> bool {
        self.strong_count() == 0
    }

    fn create_formatter(
        factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>> {
        Box::new(TrackedFormatter::new(factory.create::<T>(options), options))
    }
}

impl<T: MonitorValue> MonitorValue for Arc<T> {
    const SHAPE: ValueShape = T::SHAPE;

    fn write_display(&self, out: &mut String) {
        (**self).write_display(out);
    }

    fn probe(&self) -> Probe<'_> {
        (**self).probe()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
        (**self).format_with(spec, out)
    }

    fn components(&self) -> Option<Components> {
        (**self).components()
    }

    fn create_formatter(
        factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>> {
        Box::new(DerefFormatter::<Arc<T>, T>::new(
            factory.create::<T>(options),
            |v| &**v,
        ))
    }
}

impl<T: MonitorValue> MonitorValue for Box<T> {
    const SHAPE: ValueShape = T::SHAPE;

    fn write_display(&self, out: &mut String) {
        (**self).write_display(out);
    }

    fn probe(&self) -> Probe<'_> {
        (**self).probe()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
        (**self).format_with(spec, out)
    }

    fn components(&self) -> Option<Components> {
        (**self).components()
    }

    fn create_formatter(
        factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>> {
        Box::new(DerefFormatter::<Box<T>, T>::new(
            factory.create::<T>(options),
            |v| &**v,
        ))
    }
}

macro_rules! impl_monitor_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: MonitorValue),+> MonitorValue for ($($name,)+) {
            const SHAPE: ValueShape = ValueShape::value(ValueCategory::Value);

            fn write_display(&self, out: &mut String) {
                out.push('(');
                let mut first = true;
                $(
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    self.$idx.write_display(out);
                )+
                let _ = first;
                out.push(')');
            }
        }
    };
}

impl_monitor_tuple!(A: 0);
impl_monitor_tuple!(A: 0, B: 1);
impl_monitor_tuple!(A: 0, B: 1, C: 2);
impl_monitor_tuple!(A: 0, B: 1, C: 2, D: 3);

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::{push_bool, push_colored, FormatOptions, Scratch, ValueFormatter, NULL_TEXT};
use crate::core::values::{FormatSpec, MonitorValue, Probe};
use std::fmt::Write;
use std::marker::PhantomData;
use std::sync::Weak;

/// `label: true` / `label: false`, colorized in rich-text mode.
pub struct BoolFormatter<V> {
    options: FormatOptions,
    scratch: Scratch,
    _value: PhantomData<fn(&V)>,
}

impl<V> BoolFormatter<V> {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            options: options.clone(),
            scratch: Scratch::inline(&options.label),
            _value: PhantomData,
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for BoolFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let out = self.scratch.begin();
        match value {
            None => out.push_str(NULL_TEXT),
            Some(v) => match v.probe() {
                Probe::Bool(b) => push_bool(out, b, &self.options),
                Probe::Null => out.push_str(NULL_TEXT),
                _ => v.write_display(out),
            },
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            _value: PhantomData,
        })
    }
}

/// Per-component breakdown of vector-like values: `label: x: 1 y: 2`.
pub struct VectorFormatter<V> {
    options: FormatOptions,
    scratch: Scratch,
    _value: PhantomData<fn(&V)>,
}

impl<V> VectorFormatter<V> {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            options: options.clone(),
            scratch: Scratch::inline(&options.label),
            _value: PhantomData,
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for VectorFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let out = self.scratch.begin();
        match value.map(|v| (v, v.components())) {
            None => out.push_str(NULL_TEXT),
            Some((_, Some(components))) => {
                for (i, (name, component)) in components.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let color = self.options.colors.component(i);
                    push_colored(out, color, self.options.rich_text, |out| {
                        let _ = write!(out, "{name}: {component}");
                    });
                }
            }
            Some((v, None)) => {
                if v.is_null() {
                    out.push_str(NULL_TEXT);
                } else {
                    v.write_display(out);
                }
            }
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            _value: PhantomData,
        })
    }
}

/// Values that accept an explicit format string.
pub struct FormattableFormatter<V> {
    spec: FormatSpec,
    scratch: Scratch,
    _value: PhantomData<fn(&V)>,
}

impl<V> FormattableFormatter<V> {
    pub fn new(format: &str, options: &FormatOptions) -> Self {
        Self {
            spec: FormatSpec::parse(format),
            scratch: Scratch::inline(&options.label),
            _value: PhantomData,
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for FormattableFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let out = self.scratch.begin();
        match value {
            Some(v) if !v.is_null() => {
                if !v.format_with(&self.spec, out) {
                    v.write_display(out);
                }
            }
            _ => out.push_str(NULL_TEXT),
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            spec: self.spec.clone(),
            scratch: self.scratch.clone(),
            _value: PhantomData,
        })
    }
}

/// Value-shaped fallback: label plus the raw value.
pub struct DisplayFormatter<V> {
    scratch: Scratch,
    _value: PhantomData<fn(&V)>,
}

impl<V> DisplayFormatter<V> {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            scratch: Scratch::inline(&options.label),
            _value: PhantomData,
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for DisplayFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let out = self.scratch.begin();
        match value {
            Some(v) => v.write_display(out),
            None => out.push_str(NULL_TEXT),
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            scratch: self.scratch.clone(),
            _value: PhantomData,
        })
    }
}

/// Reference-shaped fallback: label plus a null-guarded display.
pub struct NullGuardFormatter<V> {
    scratch: Scratch,
    _value: PhantomData<fn(&V)>,
}

impl<V> NullGuardFormatter<V> {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            scratch: Scratch::inline(&options.label),
            _value: PhantomData,
        }
    }
}

impl<V: MonitorValue> ValueFormatter<V> for NullGuardFormatter<V> {
    fn format(&mut self, value: Option<&V>) -> &str {
        let out = self.scratch.begin();
        match value {
            Some(v) if !v.is_null() => v.write_display(out),
            _ => out.push_str(NULL_TEXT),
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<V>> {
        Box::new(Self {
            scratch: self.scratch.clone(),
            _value: PhantomData,
        })
    }
}

/// `Option<T>`: `None` becomes the null sentinel, `Some` goes to the
/// formatter specialized for `T`.
pub struct NullableFormatter<T> {
    inner: Box<dyn ValueFormatter<T>>,
}

impl<T> NullableFormatter<T> {
    pub fn new(inner: Box<dyn ValueFormatter<T>>, _options: &FormatOptions) -> Self {
        Self { inner }
    }
}

impl<T: MonitorValue> ValueFormatter<Option<T>> for NullableFormatter<T> {
    fn format(&mut self, value: Option<&Option<T>>) -> &str {
        self.inner.format(value.and_then(Option::as_ref))
    }

    fn text(&self) -> &str {
        self.inner.text()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<Option<T>>> {
        Box::new(Self {
            inner: self.inner.clone_box(),
        })
    }
}

/// Engine-tracked references: a dropped target renders as null even though
/// the handle itself still exists.
pub struct TrackedFormatter<T> {
    inner: Box<dyn ValueFormatter<T>>,
}

impl<T> TrackedFormatter<T> {
    pub fn new(inner: Box<dyn ValueFormatter<T>>, _options: &FormatOptions) -> Self {
        Self { inner }
    }
}

impl<T: MonitorValue> ValueFormatter<Weak<T>> for TrackedFormatter<T> {
    fn format(&mut self, value: Option<&Weak<T>>) -> &str {
        match value.and_then(Weak::upgrade) {
            Some(alive) => self.inner.format(Some(&*alive)),
            None => self.inner.format(None),
        }
    }

    fn text(&self) -> &str {
        self.inner.text()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<Weak<T>>> {
        Box::new(Self {
            inner: self.inner.clone_box(),
        })
    }
}

/// Smart pointers format as their pointee.
pub struct DerefFormatter<O, T> {
    inner: Box<dyn ValueFormatter<T>>,
    deref: fn(&O) -> &T,
}

impl<O, T> DerefFormatter<O, T> {
    pub fn new(inner: Box<dyn ValueFormatter<T>>, deref: fn(&O) -> &T) -> Self {
        Self { inner, deref }
    }
}

impl<O: 'static, T: MonitorValue> ValueFormatter<O> for DerefFormatter<O, T> {
    fn format(&mut self, value: Option<&O>) -> &str {
        let deref = self.deref;
        self.inner.format(value.map(deref))
    }

    fn text(&self) -> &str {
        self.inner.text()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<O>> {
        Box::new(Self {
            inner: self.inner.clone_box(),
            deref: self.deref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatting::{ColorScheme, Rgb};
    use crate::core::values::Vec2;
    use std::sync::Arc;

    #[test]
    fn test_bool_rich_text() {
        let colors = ColorScheme {
            true_color: Rgb(0, 255, 0),
            ..ColorScheme::default()
        };
        let options = FormatOptions::labeled("Alive")
            .with_rich_text(true)
            .with_colors(colors);
        let mut formatter = BoolFormatter::<bool>::new(&options);
        assert_eq!(
            formatter.format(Some(&true)),
            "Alive: <color=#00FF00>true</color>"
        );
        assert_eq!(formatter.format(None), "Alive: null");
    }

    #[test]
    fn test_vector_rich_text_colors_each_component() {
        let options = FormatOptions::labeled("P").with_rich_text(true);
        let mut formatter = VectorFormatter::<Vec2>::new(&options);
        let text = formatter.format(Some(&Vec2::new(1.0, 2.0))).to_string();
        let colors = ColorScheme::default();
        assert_eq!(
            text,
            format!(
                "P: <color={}>x: 1</color> <color={}>y: 2</color>",
                colors.x_color, colors.y_color
            )
        );
    }

    #[test]
    fn test_formattable_falls_back_to_display() {
        let mut formatter = FormattableFormatter::<u32>::new("yyyy", &FormatOptions::labeled("N"));
        assert_eq!(formatter.format(Some(&12)), "N: 12");
    }

    #[test]
    fn test_tracked_reference_after_drop() {
        let target = Arc::new(7u32);
        let weak = Arc::downgrade(&target);
        let options = FormatOptions::labeled("Target");
        let mut formatter = TrackedFormatter::new(Box::new(DisplayFormatter::<u32>::new(&options)), &options);
        assert_eq!(formatter.format(Some(&weak)), "Target: 7");
        drop(target);
        assert_eq!(formatter.format(Some(&weak)), "Target: null");
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let mut formatter = DisplayFormatter::<f64>::new(&FormatOptions::labeled("V"));
        let first = formatter.format(Some(&0.1)).to_string();
        let second = formatter.format(Some(&0.1)).to_string();
        assert_eq!(first, second);
    }
}

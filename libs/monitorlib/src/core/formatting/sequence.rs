// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::processor::exact_processor;
use super::{push_bool, push_element_head, FormatOptions, FormatterFactory, Scratch, ValueFormatter, NULL_TEXT};
use crate::core::values::{MonitorValue, Probe, ValueCategory, ValueShape};
use std::any::Any;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::fmt::Write;

/// Homogeneous, ordered collection of monitor values.
pub trait SequenceLike: Send + Sync + 'static {
    type Element: MonitorValue;

    fn element_count(&self) -> usize;

    fn for_each_element(&self, visit: &mut dyn FnMut(usize, &Self::Element));
}

fn write_element_value<E: MonitorValue>(element: &E, _options: &FormatOptions, out: &mut String) {
    element.write_display(out);
}

fn write_element_reference<E: MonitorValue>(element: &E, _options: &FormatOptions, out: &mut String) {
    if element.is_null() {
        out.push_str(NULL_TEXT);
    } else {
        element.write_display(out);
    }
}

fn write_element_bool<E: MonitorValue>(element: &E, options: &FormatOptions, out: &mut String) {
    match element.probe() {
        Probe::Bool(b) => push_bool(out, b, options),
        Probe::Null => out.push_str(NULL_TEXT),
        _ => element.write_display(out),
    }
}

type ElementWriter<E> = fn(&E, &FormatOptions, &mut String);

/// One line per element, optionally index-prefixed.
///
/// The element path is picked once at construction: booleans are
/// colorized, nullable elements are null-guarded, everything else is
/// written directly.
pub struct SequenceFormatter<S: SequenceLike> {
    options: FormatOptions,
    scratch: Scratch,
    write_element: ElementWriter<S::Element>,
}

impl<S: SequenceLike> SequenceFormatter<S> {
    pub fn new(options: &FormatOptions) -> Self {
        let shape = <S::Element as MonitorValue>::SHAPE;
        let write_element: ElementWriter<S::Element> = if shape.category == ValueCategory::Boolean {
            write_element_bool::<S::Element>
        } else if shape.nullable {
            write_element_reference::<S::Element>
        } else {
            write_element_value::<S::Element>
        };
        Self {
            options: options.clone(),
            scratch: Scratch::block(&options.label),
            write_element,
        }
    }
}

pub(crate) fn push_block_null(scratch: &mut Scratch) {
    let labeled = scratch.has_label();
    let out = scratch.begin();
    if labeled {
        out.push(' ');
    }
    out.push_str(NULL_TEXT);
}

impl<S: SequenceLike> ValueFormatter<S> for SequenceFormatter<S> {
    fn format(&mut self, value: Option<&S>) -> &str {
        let Some(sequence) = value else {
            push_block_null(&mut self.scratch);
            return self.scratch.as_str();
        };
        let out = self.scratch.begin();
        let options = &self.options;
        let write_element = self.write_element;
        sequence.for_each_element(&mut |index, element| {
            push_element_head(out, index, options);
            write_element(element, options, out);
        });
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<S>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            write_element: self.write_element,
        })
    }
}

enum ElementProcessor<E> {
    Plain(fn(&E) -> String),
    Indexed(fn(&E, usize) -> String),
}

impl<E> Clone for ElementProcessor<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ElementProcessor<E> {}

/// Sequence rendered through a user processor applied per element.
pub struct ElementProcessorFormatter<S: SequenceLike> {
    options: FormatOptions,
    scratch: Scratch,
    processor: ElementProcessor<S::Element>,
}

impl<S: SequenceLike> ValueFormatter<S> for ElementProcessorFormatter<S> {
    fn format(&mut self, value: Option<&S>) -> &str {
        let Some(sequence) = value else {
            push_block_null(&mut self.scratch);
            return self.scratch.as_str();
        };
        let out = self.scratch.begin();
        let options = &self.options;
        let processor = self.processor;
        sequence.for_each_element(&mut |index, element| {
            push_element_head(out, index, options);
            match processor {
                ElementProcessor::Plain(f) => out.push_str(&f(element)),
                ElementProcessor::Indexed(f) => out.push_str(&f(element, index)),
            }
        });
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<S>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            processor: self.processor,
        })
    }
}

/// Accepted processor signatures for sequences: the whole value, one
/// element, or one element with its index.
pub fn sequence_processor<S: SequenceLike + MonitorValue>(
    handle: &(dyn Any + Send + Sync),
    options: &FormatOptions,
) -> Option<Box<dyn ValueFormatter<S>>> {
    if let Some(formatter) = exact_processor::<S>(handle, options) {
        return Some(formatter);
    }
    let processor = if let Some(f) = handle.downcast_ref::<fn(&S::Element) -> String>() {
        ElementProcessor::Plain(*f)
    } else if let Some(f) = handle.downcast_ref::<fn(&S::Element, usize) -> String>() {
        ElementProcessor::Indexed(*f)
    } else {
        return None;
    };
    Some(Box::new(ElementProcessorFormatter::<S> {
        options: options.clone(),
        scratch: Scratch::block(&options.label),
        processor,
    }))
}

fn write_inline<S: SequenceLike>(sequence: &S, out: &mut String) {
    out.push('[');
    sequence.for_each_element(&mut |index, element| {
        if index > 0 {
            out.push_str(", ");
        }
        element.write_display(out);
    });
    out.push(']');
}

macro_rules! impl_sequence {
    ($([$($generics:tt)*] $ty:ty => |$s:ident, $visit:ident| $iter:expr;)*) => {
        $(
            impl<$($generics)*> SequenceLike for $ty {
                type Element = T;

                fn element_count(&self) -> usize {
                    self.len()
                }

                fn for_each_element(&self, $visit: &mut dyn FnMut(usize, &T)) {
                    let $s = self;
                    for (index, element) in $iter.enumerate() {
                        $visit(index, element);
                    }
                }
            }

            impl<$($generics)*> MonitorValue for $ty {
                const SHAPE: ValueShape = ValueShape::value(ValueCategory::Sequence);

                fn write_display(&self, out: &mut String) {
                    write_inline(self, out);
                }

                fn probe(&self) -> Probe<'_> {
                    Probe::Collection(self.len())
                }

                fn create_formatter(
                    _factory: &FormatterFactory,
                    options: &FormatOptions,
                ) -> Box<dyn ValueFormatter<Self>> {
                    Box::new(SequenceFormatter::<Self>::new(options))
                }

                fn processor_formatter(
                    handle: &(dyn Any + Send + Sync),
                    options: &FormatOptions,
                ) -> Option<Box<dyn ValueFormatter<Self>>> {
                    sequence_processor::<Self>(handle, options)
                }
            }
        )*
    };
}

impl_sequence! {
    [T: MonitorValue] Vec<T> => |s, visit| s.iter();
    [T: MonitorValue] VecDeque<T> => |s, visit| s.iter();
    [T: MonitorValue] Box<[T]> => |s, visit| s.iter();
    [T: MonitorValue, const N: usize] [T; N] => |s, visit| s.iter();
    [T: MonitorValue, H: Send + Sync + 'static] HashSet<T, H> => |s, visit| s.iter();
    [T: MonitorValue] BTreeSet<T> => |s, visit| s.iter();
}

/// Heterogeneous list of displayable items with no static element type.
#[derive(Default)]
pub struct DisplayList(Vec<Box<dyn fmt::Display + Send + Sync>>);

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl fmt::Display + Send + Sync + 'static) {
        self.0.push(Box::new(item));
    }

    pub fn with(mut self, item: impl fmt::Display + Send + Sync + 'static) -> Self {
        self.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DisplayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|item| item.to_string()))
            .finish()
    }
}

impl MonitorValue for DisplayList {
    const SHAPE: ValueShape = ValueShape::value(ValueCategory::Enumerable);

    fn write_display(&self, out: &mut String) {
        out.push('[');
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{item}");
        }
        out.push(']');
    }

    fn probe(&self) -> Probe<'_> {
        Probe::Collection(self.0.len())
    }

    fn create_formatter(
        _factory: &FormatterFactory,
        options: &FormatOptions,
    ) -> Box<dyn ValueFormatter<Self>> {
        Box::new(EnumerableFormatter {
            options: options.clone(),
            scratch: Scratch::block(&options.label),
        })
    }
}

/// Untyped enumerable: one line per item through `Display`.
pub struct EnumerableFormatter {
    options: FormatOptions,
    scratch: Scratch,
}

impl ValueFormatter<DisplayList> for EnumerableFormatter {
    fn format(&mut self, value: Option<&DisplayList>) -> &str {
        let Some(list) = value else {
            push_block_null(&mut self.scratch);
            return self.scratch.as_str();
        };
        let out = self.scratch.begin();
        for (index, item) in list.0.iter().enumerate() {
            push_element_head(out, index, &self.options);
            let _ = write!(out, "{item}");
        }
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<DisplayList>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
        })
    }
}

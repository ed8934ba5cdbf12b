// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::processor::exact_processor;
use super::sequence::push_block_null;
use super::{push_element_head, FormatOptions, FormatterFactory, Scratch, ValueFormatter, NULL_TEXT};
use crate::core::values::{MonitorValue, Probe, ValueCategory, ValueShape};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};

/// Keyed collection of monitor values.
pub trait MapLike: Send + Sync + 'static {
    type Key: MonitorValue;
    type Item: MonitorValue;

    fn entry_count(&self) -> usize;

    fn for_each_entry(&self, visit: &mut dyn FnMut(usize, &Self::Key, &Self::Item));
}

fn write_plain<T: MonitorValue>(value: &T, out: &mut String) {
    value.write_display(out);
}

fn write_guarded<T: MonitorValue>(value: &T, out: &mut String) {
    if value.is_null() {
        out.push_str(NULL_TEXT);
    } else {
        value.write_display(out);
    }
}

fn entry_value_value<K: MonitorValue, W: MonitorValue>(key: &K, item: &W, out: &mut String) {
    out.push('[');
    write_plain(key, out);
    out.push_str(", ");
    write_plain(item, out);
    out.push(']');
}

fn entry_value_reference<K: MonitorValue, W: MonitorValue>(key: &K, item: &W, out: &mut String) {
    out.push('[');
    write_plain(key, out);
    out.push_str(", ");
    write_guarded(item, out);
    out.push(']');
}

fn entry_reference_value<K: MonitorValue, W: MonitorValue>(key: &K, item: &W, out: &mut String) {
    out.push('[');
    write_guarded(key, out);
    out.push_str(", ");
    write_plain(item, out);
    out.push(']');
}

fn entry_reference_reference<K: MonitorValue, W: MonitorValue>(
    key: &K,
    item: &W,
    out: &mut String,
) {
    out.push('[');
    write_guarded(key, out);
    out.push_str(", ");
    write_guarded(item, out);
    out.push(']');
}

type EntryWriter<K, W> = fn(&K, &W, &mut String);

/// One `[key, value]` line per entry. The entry writer is chosen once by
/// key and value nullability.
pub struct DictionaryFormatter<M: MapLike> {
    options: FormatOptions,
    scratch: Scratch,
    write_entry: EntryWriter<M::Key, M::Item>,
}

impl<M: MapLike> DictionaryFormatter<M> {
    pub fn new(options: &FormatOptions) -> Self {
        let key_nullable = <M::Key as MonitorValue>::SHAPE.nullable;
        let item_nullable = <M::Item as MonitorValue>::SHAPE.nullable;
        let write_entry: EntryWriter<M::Key, M::Item> = match (key_nullable, item_nullable) {
            (false, false) => entry_value_value::<M::Key, M::Item>,
            (false, true) => entry_value_reference::<M::Key, M::Item>,
            (true, false) => entry_reference_value::<M::Key, M::Item>,
            (true, true) => entry_reference_reference::<M::Key, M::Item>,
        };
        Self {
            options: options.clone(),
            scratch: Scratch::block(&options.label),
            write_entry,
        }
    }
}

impl<M: MapLike> ValueFormatter<M> for DictionaryFormatter<M> {
    fn format(&mut self, value: Option<&M>) -> &str {
        let Some(map) = value else {
            push_block_null(&mut self.scratch);
            return self.scratch.as_str();
        };
        let out = self.scratch.begin();
        let options = &self.options;
        let write_entry = self.write_entry;
        map.for_each_entry(&mut |index, key, item| {
            push_element_head(out, index, options);
            write_entry(key, item, out);
        });
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<M>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            write_entry: self.write_entry,
        })
    }
}

/// Dictionary rendered through a user `fn(&K, &W) -> String`.
pub struct EntryProcessorFormatter<M: MapLike> {
    options: FormatOptions,
    scratch: Scratch,
    processor: fn(&M::Key, &M::Item) -> String,
}

impl<M: MapLike> ValueFormatter<M> for EntryProcessorFormatter<M> {
    fn format(&mut self, value: Option<&M>) -> &str {
        let Some(map) = value else {
            push_block_null(&mut self.scratch);
            return self.scratch.as_str();
        };
        let out = self.scratch.begin();
        let options = &self.options;
        let processor = self.processor;
        map.for_each_entry(&mut |index, key, item| {
            push_element_head(out, index, options);
            out.push_str(&processor(key, item));
        });
        self.scratch.as_str()
    }

    fn text(&self) -> &str {
        self.scratch.as_str()
    }

    fn clone_box(&self) -> Box<dyn ValueFormatter<M>> {
        Box::new(Self {
            options: self.options.clone(),
            scratch: self.scratch.clone(),
            processor: self.processor,
        })
    }
}

pub fn dictionary_processor<M: MapLike + MonitorValue>(
    handle: &(dyn Any + Send + Sync),
    options: &FormatOptions,
) -> Option<Box<dyn ValueFormatter<M>>> {
    if let Some(formatter) = exact_processor::<M>(handle, options) {
        return Some(formatter);
    }
    let processor = *handle.downcast_ref::<fn(&M::Key, &M::Item) -> String>()?;
    Some(Box::new(EntryProcessorFormatter::<M> {
        options: options.clone(),
        scratch: Scratch::block(&options.label),
        processor,
    }))
}

fn write_inline<M: MapLike>(map: &M, out: &mut String) {
    out.push('{');
    map.for_each_entry(&mut |index, key, item| {
        if index > 0 {
            out.push_str(", ");
        }
        key.write_display(out);
        out.push_str(": ");
        item.write_display(out);
    });
    out.push('}');
}

macro_rules! impl_dictionary {
    ($([$($generics:tt)*] $ty:ty;)*) => {
        $(
            impl<$($generics)*> MapLike for $ty {
                type Key = K;
                type Item = W;

                fn entry_count(&self) -> usize {
                    self.len()
                }

                fn for_each_entry(&self, visit: &mut dyn FnMut(usize, &K, &W)) {
                    for (index, (key, item)) in self.iter().enumerate() {
                        visit(index, key, item);
                    }
                }
            }

            impl<$($generics)*> MonitorValue for $ty {
                const SHAPE: ValueShape = ValueShape::value(ValueCategory::Dictionary);

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
                    Box::new(DictionaryFormatter::<Self>::new(options))
                }

                fn processor_formatter(
                    handle: &(dyn Any + Send + Sync),
                    options: &FormatOptions,
                ) -> Option<Box<dyn ValueFormatter<Self>>> {
                    dictionary_processor::<Self>(handle, options)
                }
            }
        )*
    };
}

impl_dictionary! {
    [K: MonitorValue, W: MonitorValue, H: Send + Sync + 'static] HashMap<K, W, H>;
    [K: MonitorValue, W: MonitorValue] BTreeMap<K, W>;
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::scalar::{
    BoolFormatter, DisplayFormatter, FormattableFormatter, NullGuardFormatter, VectorFormatter,
};
use super::{FormatOptions, ValueFormatter};
use crate::core::values::{MonitorValue, ValueCategory};
use parking_lot::Mutex;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Prototype<V>(Box<dyn ValueFormatter<V>>);

/// Builds and memoizes value formatters.
///
/// Prototypes are cached per `(value type, options)`; callers always get
/// their own clone, never the cached instance.
pub struct FormatterFactory {
    cache: Mutex<HashMap<(TypeId, FormatOptions), Arc<dyn Any + Send + Sync>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for FormatterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterFactory {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Formatter for `V`, specialized by the value type's own
    /// [`MonitorValue::create_formatter`].
    pub fn create<V: MonitorValue>(&self, options: &FormatOptions) -> Box<dyn ValueFormatter<V>> {
        let key = (TypeId::of::<V>(), options.clone());
        let cached = self.cache.lock().get(&key).cloned();
        if let Some(entry) = cached {
            if let Some(prototype) = entry.downcast_ref::<Prototype<V>>() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return prototype.0.clone_box();
            }
        }

        // Built without holding the lock: container formatters recurse
        // into `create` for their element types.
        let built = V::create_formatter(self, options);
        let copy = built.clone_box();
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(value_type = type_name::<V>(), label = %options.label, "Built formatter prototype");
        self.cache
            .lock()
            .insert(key, Arc::new(Prototype(built)) as Arc<dyn Any + Send + Sync>);
        copy
    }

    /// Default dispatch by value shape for types that do not specialize
    /// their formatter. First match wins.
    pub fn dispatch<V: MonitorValue>(&self, options: &FormatOptions) -> Box<dyn ValueFormatter<V>> {
        let shape = V::SHAPE;
        match shape.category {
            ValueCategory::Boolean => return Box::new(BoolFormatter::new(options)),
            ValueCategory::Vector if options.format.is_none() => {
                return Box::new(VectorFormatter::new(options));
            }
            _ => {}
        }

        if shape.formattable {
            if let Some(format) = &options.format {
                return Box::new(FormattableFormatter::new(format, options));
            }
        }

        if shape.nullable {
            Box::new(NullGuardFormatter::new(options))
        } else {
            Box::new(DisplayFormatter::new(options))
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn cache_hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::{Vec2, Vec3};

    #[test]
    fn test_prototypes_are_cached_per_type_and_options() {
        let factory = FormatterFactory::new();
        let options = FormatOptions::labeled("Speed");

        let mut first = factory.create::<f32>(&options);
        let mut second = factory.create::<f32>(&options);
        factory.create::<i32>(&options);
        factory.create::<f32>(&FormatOptions::labeled("Other"));

        assert_eq!(factory.cached_len(), 3);
        assert_eq!(factory.cache_hits(), 1);
        assert_eq!(first.format(Some(&1.5)), "Speed: 1.5");
        assert_eq!(second.format(Some(&2.0)), "Speed: 2");
        // Clones do not share scratch buffers.
        assert_eq!(first.text(), "Speed: 1.5");
    }

    #[test]
    fn test_dispatch_order() {
        let factory = FormatterFactory::new();
        let mut flag = factory.create::<bool>(&FormatOptions::labeled("On"));
        assert_eq!(flag.format(Some(&true)), "On: true");

        let mut vector = factory.create::<Vec2>(&FormatOptions::labeled("Pos"));
        assert_eq!(vector.format(Some(&Vec2::new(1.0, 2.0))), "Pos: x: 1 y: 2");

        let mut formatted = factory.create::<Vec3>(&FormatOptions::labeled("Dir").with_format("F1"));
        assert_eq!(
            formatted.format(Some(&Vec3::new(1.0, 0.0, 0.3))),
            "Dir: (1.0, 0.0, 0.3)"
        );

        let mut number = factory.create::<f64>(&FormatOptions::labeled("Ratio").with_format("P0"));
        assert_eq!(number.format(Some(&0.5)), "Ratio: 50%");
    }

    #[test]
    fn test_missing_value_renders_null_sentinel() {
        let factory = FormatterFactory::new();
        let mut text = factory.create::<String>(&FormatOptions::labeled("Name"));
        assert_eq!(text.format(None), "Name: null");
        let mut opt = factory.create::<Option<String>>(&FormatOptions::labeled("Name"));
        assert_eq!(opt.format(Some(&None)), "Name: null");
        assert_eq!(opt.format(Some(&Some("Ada".into()))), "Name: Ada");
    }
}

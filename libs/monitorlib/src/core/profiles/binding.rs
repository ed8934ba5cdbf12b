// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::context::ProfileContext;
use super::event_profile::EventProfile;
use super::source::{EventAccess, MethodSource, StaticMethodSource, ValueSink, ValueSource};
use super::unit::MonitorProfile;
use super::value_profile::ValueProfile;
use crate::core::error::ProfileError;
use crate::core::types::{MemberKind, MethodShape, TypeKey, ValueTypeInfo};
use crate::core::values::{describe_args, FromArgs, MonitorValue};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed accessor factory attached to a member descriptor.
///
/// Building monomorphizes a profile for the member's value type; the
/// binding itself is the only place that type is known.
pub trait MemberBinding: Send + Sync {
    fn kind(&self) -> MemberKind;

    fn is_static(&self) -> bool;

    fn value_type(&self) -> ValueTypeInfo;

    /// Type the accessor reads from. `None` for static members.
    fn holder_type(&self) -> Option<TypeKey>;

    fn can_write(&self) -> bool {
        false
    }

    fn method_shape(&self) -> Option<MethodShape> {
        None
    }

    fn build(&self, cx: &mut ProfileContext<'_>) -> Result<Arc<dyn MonitorProfile>, ProfileError>;
}

/// Fields and properties, instance or static.
pub struct ValueBinding<V: MonitorValue> {
    kind: MemberKind,
    holder: Option<TypeKey>,
    source: Arc<dyn ValueSource<V>>,
    sink: Option<Arc<dyn ValueSink<V>>>,
}

impl<V: MonitorValue> ValueBinding<V> {
    pub fn new(
        kind: MemberKind,
        holder: Option<TypeKey>,
        source: Arc<dyn ValueSource<V>>,
        sink: Option<Arc<dyn ValueSink<V>>>,
    ) -> Self {
        Self {
            kind,
            holder,
            source,
            sink,
        }
    }
}

impl<V: MonitorValue> MemberBinding for ValueBinding<V> {
    fn kind(&self) -> MemberKind {
        self.kind
    }

    fn is_static(&self) -> bool {
        self.holder.is_none()
    }

    fn value_type(&self) -> ValueTypeInfo {
        ValueTypeInfo::of::<V>()
    }

    fn holder_type(&self) -> Option<TypeKey> {
        self.holder.clone()
    }

    fn can_write(&self) -> bool {
        self.sink.is_some()
    }

    fn build(&self, cx: &mut ProfileContext<'_>) -> Result<Arc<dyn MonitorProfile>, ProfileError> {
        Ok(Arc::new(ValueProfile::build(
            cx,
            self.source.clone(),
            self.sink.clone(),
        )))
    }
}

/// Instance method whose arguments come from the marker.
pub struct MethodBinding<D, A, V> {
    call: fn(&D, &A) -> V,
    shape: MethodShape,
    _args: PhantomData<fn() -> A>,
}

impl<D, A, V> MemberBinding for MethodBinding<D, A, V>
where
    D: Any + Send + Sync,
    A: FromArgs + Send + Sync + 'static,
    V: MonitorValue,
{
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn is_static(&self) -> bool {
        false
    }

    fn value_type(&self) -> ValueTypeInfo {
        ValueTypeInfo::of::<V>()
    }

    fn holder_type(&self) -> Option<TypeKey> {
        Some(TypeKey::of::<D>())
    }

    fn method_shape(&self) -> Option<MethodShape> {
        Some(self.shape)
    }

    fn build(&self, cx: &mut ProfileContext<'_>) -> Result<Arc<dyn MonitorProfile>, ProfileError> {
        let args = decode_args::<A>(cx)?;
        let source = Arc::new(MethodSource {
            call: self.call,
            args,
        });
        Ok(Arc::new(ValueProfile::<V>::build(cx, source, None)))
    }
}

/// Static method whose arguments come from the marker.
pub struct StaticMethodBinding<A, V> {
    call: fn(&A) -> V,
    shape: MethodShape,
}

impl<A, V> MemberBinding for StaticMethodBinding<A, V>
where
    A: FromArgs + Send + Sync + 'static,
    V: MonitorValue,
{
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn is_static(&self) -> bool {
        true
    }

    fn value_type(&self) -> ValueTypeInfo {
        ValueTypeInfo::of::<V>()
    }

    fn holder_type(&self) -> Option<TypeKey> {
        None
    }

    fn method_shape(&self) -> Option<MethodShape> {
        Some(self.shape)
    }

    fn build(&self, cx: &mut ProfileContext<'_>) -> Result<Arc<dyn MonitorProfile>, ProfileError> {
        let args = decode_args::<A>(cx)?;
        let source = Arc::new(StaticMethodSource {
            call: self.call,
            args,
        });
        Ok(Arc::new(ValueProfile::<V>::build(cx, source, None)))
    }
}

fn decode_args<A: FromArgs>(cx: &ProfileContext<'_>) -> Result<A, ProfileError> {
    let args = &cx.marker().args;
    A::from_args(args).ok_or_else(|| ProfileError::ArgumentMismatch {
        member: cx.member().name().to_string(),
        args: describe_args(args),
    })
}

pub struct EventBinding {
    holder: Option<TypeKey>,
    access: Arc<dyn EventAccess>,
}

impl MemberBinding for EventBinding {
    fn kind(&self) -> MemberKind {
        MemberKind::Event
    }

    fn is_static(&self) -> bool {
        self.holder.is_none()
    }

    fn value_type(&self) -> ValueTypeInfo {
        ValueTypeInfo::unbound("event")
    }

    fn holder_type(&self) -> Option<TypeKey> {
        self.holder.clone()
    }

    fn build(&self, cx: &mut ProfileContext<'_>) -> Result<Arc<dyn MonitorProfile>, ProfileError> {
        Ok(Arc::new(EventProfile::build(cx, self.access.clone())))
    }
}

/// Binding constructors, used by `#[derive(Monitored)]` and
/// `#[monitor_members]` and by hand-written descriptors.
pub mod bind {
    use super::*;
    use crate::core::profiles::source::{
        InstanceAccess, InstanceEvent, InstanceSink, StaticAccess, StaticEvent, StaticSink,
    };
    use crate::core::values::EventSource;

    fn value<V: MonitorValue>(
        kind: MemberKind,
        holder: Option<TypeKey>,
        source: Arc<dyn ValueSource<V>>,
        sink: Option<Arc<dyn ValueSink<V>>>,
    ) -> Arc<dyn MemberBinding> {
        Arc::new(ValueBinding::new(kind, holder, source, sink))
    }

    pub fn field<D: Any + Send + Sync, V: MonitorValue>(get: fn(&D) -> &V) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Borrow(get)),
            None,
        )
    }

    pub fn field_with_setter<D: Any + Send + Sync, V: MonitorValue>(
        get: fn(&D) -> &V,
        set: fn(&D, V),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Borrow(get)),
            Some(Arc::new(InstanceSink(set))),
        )
    }

    /// A field whose value may be absent: reads as the null sentinel.
    pub fn optional_field<D: Any + Send + Sync, V: MonitorValue>(
        get: fn(&D) -> Option<&V>,
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Optional(get)),
            None,
        )
    }

    /// A field behind a lock or other guard.
    pub fn visit_field<D: Any + Send + Sync, V: MonitorValue>(
        lend: fn(&D, &mut dyn FnMut(Option<&V>)),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Visit(lend)),
            None,
        )
    }

    pub fn visit_field_with_setter<D: Any + Send + Sync, V: MonitorValue>(
        lend: fn(&D, &mut dyn FnMut(Option<&V>)),
        set: fn(&D, V),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Visit(lend)),
            Some(Arc::new(InstanceSink(set))),
        )
    }

    pub fn property<D: Any + Send + Sync, V: MonitorValue>(get: fn(&D) -> V) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Property,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Compute(get)),
            None,
        )
    }

    pub fn property_with_setter<D: Any + Send + Sync, V: MonitorValue>(
        get: fn(&D) -> V,
        set: fn(&D, V),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Property,
            Some(TypeKey::of::<D>()),
            Arc::new(InstanceAccess::Compute(get)),
            Some(Arc::new(InstanceSink(set))),
        )
    }

    pub fn static_field<V: MonitorValue>(get: fn() -> &'static V) -> Arc<dyn MemberBinding> {
        value(MemberKind::Field, None, Arc::new(StaticAccess::Borrow(get)), None)
    }

    pub fn static_visit<V: MonitorValue>(lend: fn(&mut dyn FnMut(Option<&V>))) -> Arc<dyn MemberBinding> {
        value(MemberKind::Field, None, Arc::new(StaticAccess::Visit(lend)), None)
    }

    pub fn static_visit_with_setter<V: MonitorValue>(
        lend: fn(&mut dyn FnMut(Option<&V>)),
        set: fn(V),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Field,
            None,
            Arc::new(StaticAccess::Visit(lend)),
            Some(Arc::new(StaticSink(set))),
        )
    }

    pub fn static_property<V: MonitorValue>(get: fn() -> V) -> Arc<dyn MemberBinding> {
        value(MemberKind::Property, None, Arc::new(StaticAccess::Compute(get)), None)
    }

    pub fn static_property_with_setter<V: MonitorValue>(
        get: fn() -> V,
        set: fn(V),
    ) -> Arc<dyn MemberBinding> {
        value(
            MemberKind::Property,
            None,
            Arc::new(StaticAccess::Compute(get)),
            Some(Arc::new(StaticSink(set))),
        )
    }

    /// Instance method called with the marker's arguments decoded into `A`.
    pub fn method<D, A, V>(call: fn(&D, &A) -> V) -> Arc<dyn MemberBinding>
    where
        D: Any + Send + Sync,
        A: FromArgs + Send + Sync + 'static,
        V: MonitorValue,
    {
        method_with_out_params(call, true, 0)
    }

    /// Instance method with out parameters; `V` is the tuple of the
    /// return value (if any) and the out values.
    pub fn method_with_out_params<D, A, V>(
        call: fn(&D, &A) -> V,
        returns_value: bool,
        out_params: usize,
    ) -> Arc<dyn MemberBinding>
    where
        D: Any + Send + Sync,
        A: FromArgs + Send + Sync + 'static,
        V: MonitorValue,
    {
        Arc::new(MethodBinding {
            call,
            shape: MethodShape {
                returns_value,
                out_params,
                params: A::ARITY,
            },
            _args: PhantomData,
        })
    }

    pub fn static_method<A, V>(call: fn(&A) -> V) -> Arc<dyn MemberBinding>
    where
        A: FromArgs + Send + Sync + 'static,
        V: MonitorValue,
    {
        static_method_with_out_params(call, true, 0)
    }

    pub fn static_method_with_out_params<A, V>(
        call: fn(&A) -> V,
        returns_value: bool,
        out_params: usize,
    ) -> Arc<dyn MemberBinding>
    where
        A: FromArgs + Send + Sync + 'static,
        V: MonitorValue,
    {
        Arc::new(StaticMethodBinding {
            call,
            shape: MethodShape {
                returns_value,
                out_params,
                params: A::ARITY,
            },
        })
    }

    pub fn event<D: Any + Send + Sync, E: EventSource + 'static>(get: fn(&D) -> &E) -> Arc<dyn MemberBinding> {
        Arc::new(EventBinding {
            holder: Some(TypeKey::of::<D>()),
            access: Arc::new(InstanceEvent(get)),
        })
    }

    pub fn static_event<E: EventSource + 'static>(get: fn() -> &'static E) -> Arc<dyn MemberBinding> {
        Arc::new(EventBinding {
            holder: None,
            access: Arc::new(StaticEvent(get)),
        })
    }
}

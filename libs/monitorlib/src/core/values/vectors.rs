// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Small fixed-size numeric tuples rendered component by component.

use super::numeric_format::{format_float, FormatSpec};
use super::shapes::{Components, MonitorValue, ValueCategory, ValueShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

const XYZW: [&str; 4] = ["x", "y", "z", "w"];
const RGBA: [&str; 4] = ["r", "g", "b", "a"];

macro_rules! vector_type {
    ($(#[$doc:meta])* $name:ident { $($field:ident : $idx:literal),+ }, $names:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: f32),+
        }

        impl $name {
            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts = [$(self.$field),+];
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }

        impl MonitorValue for $name {
            const SHAPE: ValueShape = ValueShape::value(ValueCategory::Vector).with_formattable();

            fn write_display(&self, out: &mut String) {
                let _ = write!(out, "{self}");
            }

            fn format_with(&self, spec: &FormatSpec, out: &mut String) -> bool {
                if spec.is_custom() {
                    return false;
                }
                out.push('(');
                let parts = [$(self.$field),+];
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    format_float(*part as f64, spec, out);
                }
                out.push(')');
                true
            }

            fn components(&self) -> Option<Components> {
                let mut values = [0.0f32; 4];
                $(values[$idx] = self.$field;)+
                Some(Components {
                    values,
                    len: [$($idx),+].len(),
                    names: $names,
                })
            }
        }
    };
}

vector_type!(
    /// Two-component vector.
    Vec2 { x: 0, y: 1 },
    XYZW
);
vector_type!(
    /// Three-component vector.
    Vec3 { x: 0, y: 1, z: 2 },
    XYZW
);
vector_type!(
    /// Four-component vector.
    Vec4 { x: 0, y: 1, z: 2, w: 3 },
    XYZW
);
vector_type!(
    /// Rotation quaternion.
    Quat { x: 0, y: 1, z: 2, w: 3 },
    XYZW
);
vector_type!(
    /// Linear color with alpha.
    Rgba { r: 0, g: 1, b: 2, a: 3 },
    RGBA
);

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);
}

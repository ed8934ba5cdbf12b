// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

/// Constant carried by a marker: method arguments and comparison operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value as i64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

/// Renders a slice of literals as `(a, b, c)` for diagnostics.
pub fn describe_args(args: &[Literal]) -> String {
    let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// Conversion from a marker literal to a typed method argument.
pub trait FromLiteral: Sized {
    fn from_literal(literal: &Literal) -> Option<Self>;
}

macro_rules! impl_from_literal_int {
    ($($ty:ty),*) => {
        $(
            impl FromLiteral for $ty {
                fn from_literal(literal: &Literal) -> Option<Self> {
                    match literal {
                        Literal::Int(v) => <$ty>::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_literal_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromLiteral for f64 {
    fn from_literal(literal: &Literal) -> Option<Self> {
        literal.as_f64()
    }
}

impl FromLiteral for f32 {
    fn from_literal(literal: &Literal) -> Option<Self> {
        literal.as_f64().map(|v| v as f32)
    }
}

impl FromLiteral for bool {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromLiteral for String {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromLiteral for char {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Text(v) => {
                let mut chars = v.chars();
                let first = chars.next()?;
                chars.next().is_none().then_some(first)
            }
            _ => None,
        }
    }
}

impl<T: FromLiteral> FromLiteral for Option<T> {
    fn from_literal(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Null => Some(None),
            other => T::from_literal(other).map(Some),
        }
    }
}

/// Decoding of a whole marker argument list into a method's parameter
/// tuple. The literal count must match exactly.
pub trait FromArgs: Sized {
    const ARITY: usize;

    fn from_args(args: &[Literal]) -> Option<Self>;
}

impl FromArgs for () {
    const ARITY: usize = 0;

    fn from_args(args: &[Literal]) -> Option<Self> {
        args.is_empty().then_some(())
    }
}

macro_rules! impl_from_args {
    ($arity:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: FromLiteral),+> FromArgs for ($($name,)+) {
            const ARITY: usize = $arity;

            fn from_args(args: &[Literal]) -> Option<Self> {
                if args.len() != $arity {
                    return None;
                }
                Some(($($name::from_literal(&args[$idx])?,)+))
            }
        }
    };
}

impl_from_args!(1 => A: 0);
impl_from_args!(2 => A: 0, B: 1);
impl_from_args!(3 => A: 0, B: 1, C: 2);
impl_from_args!(4 => A: 0, B: 1, C: 2, D: 3);

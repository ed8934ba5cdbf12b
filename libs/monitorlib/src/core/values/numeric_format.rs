// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Numeric format strings (`F2`, `N0`, `P1`, `E3`, `X8`, `D4`, `0.00`, ...).
//!
//! Parsed once when a formatter is built; applied on every refresh without
//! intermediate allocation beyond what `write!` needs.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatSpec {
    /// `F<n>`: fixed point.
    Fixed(usize),
    /// `N<n>`: fixed point with thousands separators.
    Number(usize),
    /// `P<n>`: value scaled by 100 with a percent sign.
    Percent(usize),
    /// `E<n>`: scientific notation, `1.23E+004`.
    Exponent { precision: usize, upper: bool },
    /// `X<n>`: hexadecimal, integers only.
    Hex { width: usize, upper: bool },
    /// `D<n>`: zero-padded decimal, integers only.
    Decimal(usize),
    /// Picture pattern such as `0.00`, `#.##` or `#,##0.0`.
    Pattern {
        min_integer_digits: usize,
        required_decimals: usize,
        optional_decimals: usize,
        grouping: bool,
    },
    /// Anything else, handed to the value unchanged.
    Custom(String),
}

impl FormatSpec {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let mut chars = text.chars();
        let Some(letter) = chars.next() else {
            return FormatSpec::Custom(String::new());
        };
        let rest = chars.as_str();

        if letter.is_ascii_alphabetic() && rest.chars().all(|c| c.is_ascii_digit()) {
            let digits = if rest.is_empty() {
                None
            } else {
                rest.parse::<usize>().ok()
            };
            match letter {
                'F' | 'f' => return FormatSpec::Fixed(digits.unwrap_or(2)),
                'N' | 'n' => return FormatSpec::Number(digits.unwrap_or(2)),
                'P' | 'p' => return FormatSpec::Percent(digits.unwrap_or(2)),
                'E' | 'e' => {
                    return FormatSpec::Exponent {
                        precision: digits.unwrap_or(6),
                        upper: letter == 'E',
                    };
                }
                'X' | 'x' => {
                    return FormatSpec::Hex {
                        width: digits.unwrap_or(0),
                        upper: letter == 'X',
                    };
                }
                'D' | 'd' => return FormatSpec::Decimal(digits.unwrap_or(0)),
                _ => {}
            }
        }

        if !text.is_empty() && text.chars().all(|c| matches!(c, '0' | '#' | '.' | ',')) {
            let (integer, fraction) = match text.split_once('.') {
                Some((i, f)) => (i, f),
                None => (text, ""),
            };
            if !fraction.contains('.') {
                return FormatSpec::Pattern {
                    min_integer_digits: integer.chars().filter(|c| *c == '0').count(),
                    required_decimals: fraction.chars().filter(|c| *c == '0').count(),
                    optional_decimals: fraction.chars().filter(|c| *c == '#').count(),
                    grouping: integer.contains(','),
                };
            }
        }

        FormatSpec::Custom(text.to_string())
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, FormatSpec::Custom(_))
    }
}

/// Apply `spec` to a floating point value. Returns `false` when the spec
/// does not apply to floats (hex, decimal, custom).
pub fn format_float(value: f64, spec: &FormatSpec, out: &mut String) -> bool {
    match spec {
        FormatSpec::Fixed(precision) => {
            let _ = write!(out, "{value:.precision$}");
        }
        FormatSpec::Number(precision) => {
            let start = out.len();
            let _ = write!(out, "{value:.precision$}");
            group_digits(out, start);
        }
        FormatSpec::Percent(precision) => {
            let scaled = value * 100.0;
            let _ = write!(out, "{scaled:.precision$}%");
        }
        FormatSpec::Exponent { precision, upper } => push_exponent(value, *precision, *upper, out),
        FormatSpec::Pattern {
            min_integer_digits,
            required_decimals,
            optional_decimals,
            grouping,
        } => push_pattern(
            value,
            *min_integer_digits,
            *required_decimals,
            *optional_decimals,
            *grouping,
            out,
        ),
        FormatSpec::Hex { .. } | FormatSpec::Decimal(_) | FormatSpec::Custom(_) => return false,
    }
    true
}

/// Apply `spec` to an integer of `bits` width. Negative values in hex are
/// rendered as two's complement of that width.
pub fn format_integer(value: i128, bits: u32, spec: &FormatSpec, out: &mut String) -> bool {
    match spec {
        FormatSpec::Hex { width, upper } => {
            let mask = if bits >= 128 {
                u128::MAX
            } else {
                (1u128 << bits) - 1
            };
            let raw = (value as u128) & mask;
            if *upper {
                let _ = write!(out, "{raw:0width$X}");
            } else {
                let _ = write!(out, "{raw:0width$x}");
            }
        }
        FormatSpec::Decimal(width) => {
            if value < 0 {
                out.push('-');
            }
            let magnitude = value.unsigned_abs();
            let _ = write!(out, "{magnitude:0width$}");
        }
        FormatSpec::Number(precision) => {
            let start = out.len();
            push_fixed_integer(value, *precision, out);
            group_digits(out, start);
        }
        FormatSpec::Fixed(precision) => push_fixed_integer(value, *precision, out),
        FormatSpec::Custom(_) => return false,
        other => return format_float(value as f64, other, out),
    }
    true
}

fn push_fixed_integer(value: i128, precision: usize, out: &mut String) {
    if precision == 0 {
        let _ = write!(out, "{value}");
    } else {
        let _ = write!(out, "{value}.{:0<precision$}", "");
    }
}

/// Insert thousands separators into the integer part of the number written
/// at `out[start..]`. The number is ASCII, optionally signed.
fn group_digits(out: &mut String, start: usize) {
    let digits = if out[start..].starts_with('-') { start + 1 } else { start };
    let mut at = out[digits..].find('.').map_or(out.len(), |dot| digits + dot);
    while at > digits + 3 {
        at -= 3;
        out.insert(at, ',');
    }
}

fn push_exponent(value: f64, precision: usize, upper: bool, out: &mut String) {
    let start = out.len();
    let _ = write!(out, "{value:.precision$e}");
    // NaN and infinities carry no exponent.
    let Some(e) = out[start..].find('e').map(|i| start + i) else {
        return;
    };
    let exponent: i32 = out[e + 1..].parse().unwrap_or(0);
    out.truncate(e);
    let sign = if exponent < 0 { '-' } else { '+' };
    let letter = if upper { 'E' } else { 'e' };
    let _ = write!(out, "{letter}{sign}{:03}", exponent.unsigned_abs());
}

fn push_pattern(
    value: f64,
    min_integer_digits: usize,
    required: usize,
    optional: usize,
    grouping: bool,
    out: &mut String,
) {
    let start = out.len();
    let precision = required + optional;
    let _ = write!(out, "{:.precision$}", value.abs());
    if optional > 0 {
        if let Some(dot) = out[start..].find('.') {
            let keep = start + dot + 1 + required;
            while out.len() > keep && out.ends_with('0') {
                out.pop();
            }
            if out.ends_with('.') {
                out.pop();
            }
        }
    }

    let negative = value < 0.0 && out[start..].bytes().any(|b| b != b'0' && b != b'.');
    let integer_end = out[start..].find('.').map_or(out.len(), |dot| start + dot);
    let integer_len = integer_end - start;
    if min_integer_digits == 0 && out[start..integer_end].eq("0") {
        out.replace_range(start..integer_end, "");
        if out.len() == start {
            out.push('0');
        }
    } else {
        for _ in integer_len..min_integer_digits {
            out.insert(start, '0');
        }
    }

    if negative {
        out.insert(start, '-');
    }
    if grouping {
        group_digits(out, start);
    }
}

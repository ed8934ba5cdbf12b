// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Attribute parsing for `#[monitor(...)]`
//!
//! The same attribute marks struct fields, impl-block methods and the type
//! itself. Member options become a `MonitorMarker`; type options become a
//! `TypeMarker` whose defaults reuse the member options.

use syn::{
    meta::ParseNestedMeta, punctuated::Punctuated, Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta,
    Result, Token, UnOp,
};

/// A constant in a marker: comparison operand or method argument.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralSpec {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// `show_if = ...`
#[derive(Debug, Clone, PartialEq)]
pub enum ShowIfSpec {
    /// `show_if = Positive`
    Condition(String),
    /// `show_if = Greater(3)`
    Compare(String, LiteralSpec),
    /// `show_if = static_method("name")`
    StaticMethod(String),
    /// `show_if = method("name")`
    InstanceMethod(String),
}

const CONDITIONS: &[&str] = &[
    "IsNull",
    "NotNull",
    "True",
    "False",
    "Positive",
    "Negative",
    "Zero",
    "NonZero",
    "NullOrEmpty",
    "NotNullOrEmpty",
    "NullOrWhitespace",
    "NotNullOrWhitespace",
    "CollectionEmpty",
    "CollectionNotEmpty",
];

const COMPARISONS: &[&str] = &[
    "Equal",
    "NotEqual",
    "Greater",
    "GreaterOrEqual",
    "Less",
    "LessOrEqual",
];

/// What a marked impl-block function contributes besides a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodRole {
    #[default]
    Member,
    /// Referenced by `show_if = method(..)` / `static_method(..)`.
    Predicate,
    /// Referenced by `processor = ".."`.
    Processor,
}

/// Parsed `#[monitor(...)]` on a field or method.
#[derive(Debug, Default, Clone)]
pub struct MarkerAttributes {
    /// Any `#[monitor]` attribute was present.
    pub marked: bool,
    pub label: Option<String>,
    pub format: Option<String>,
    pub processor: Option<String>,
    pub show_if: Option<ShowIfSpec>,
    pub update_event: Option<String>,
    pub tags: Vec<String>,
    pub enabled: Option<bool>,
    pub indent: Option<usize>,
    pub show_index: Option<bool>,
    pub element_prefix: Option<String>,
    pub rich_text: Option<bool>,
    pub font_size: Option<u16>,
    pub group: Option<String>,
    pub writable: bool,
    pub args: Vec<LiteralSpec>,

    /// Field: the field is the base part of the type.
    pub base: bool,
    /// Field: the field is an interface part of the type.
    pub interface: bool,
    /// Field or method: an event member.
    pub event: bool,
    /// Field: a `Mutex<V>` / `RwLock<V>` read through its guard.
    pub guarded: bool,
    /// Setter method name: `setter = "set_speed"`.
    pub setter: Option<String>,
    /// Method: profile a zero-argument getter as a method, not a property.
    pub method: bool,
    pub role: MethodRole,
}

impl MarkerAttributes {
    /// Parse every `#[monitor(...)]` in `attrs`.
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("monitor") {
                continue;
            }
            result.marked = true;

            // Bare `#[monitor]`
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if result.parse_option(&meta)? {
                    return Ok(());
                }

                if meta.path.is_ident("base") {
                    result.base = true;
                    return Ok(());
                }
                if meta.path.is_ident("interface") {
                    result.interface = true;
                    return Ok(());
                }
                if meta.path.is_ident("event") {
                    result.event = true;
                    return Ok(());
                }
                if meta.path.is_ident("guarded") {
                    result.guarded = true;
                    return Ok(());
                }
                if meta.path.is_ident("method") {
                    result.method = true;
                    return Ok(());
                }
                if meta.path.is_ident("predicate") {
                    result.role = MethodRole::Predicate;
                    return Ok(());
                }
                if meta.path.is_ident("writable") {
                    result.writable = true;
                    return Ok(());
                }
                if meta.path.is_ident("setter") {
                    result.setter = Some(parse_string_value(&meta)?);
                    return Ok(());
                }
                if meta.path.is_ident("args") {
                    let value = meta.value()?;
                    let content;
                    syn::bracketed!(content in value);
                    let exprs: Punctuated<Expr, Token![,]> = content.parse_terminated(|input| input.parse::<Expr>(), Token![,])?;
                    for expr in &exprs {
                        result.args.push(parse_literal(expr)?);
                    }
                    return Ok(());
                }

                Err(meta.error("unsupported monitor attribute"))
            })?;
        }

        Ok(result)
    }

    /// Options shared by members and type-level defaults. `Ok(false)` when
    /// the key is not one of them.
    fn parse_option(&mut self, meta: &ParseNestedMeta) -> Result<bool> {
        if meta.path.is_ident("label") {
            self.label = Some(parse_string_value(meta)?);
        } else if meta.path.is_ident("format") {
            self.format = Some(parse_string_value(meta)?);
        } else if meta.path.is_ident("processor") {
            // Bare `processor` marks the function itself as a processor.
            if meta.input.peek(Token![=]) {
                self.processor = Some(parse_string_value(meta)?);
            } else {
                self.role = MethodRole::Processor;
            }
        } else if meta.path.is_ident("update_event") {
            self.update_event = Some(parse_string_value(meta)?);
        } else if meta.path.is_ident("element_prefix") {
            self.element_prefix = Some(parse_string_value(meta)?);
        } else if meta.path.is_ident("group") {
            self.group = Some(parse_string_value(meta)?);
        } else if meta.path.is_ident("tag") {
            self.tags.push(parse_string_value(meta)?);
        } else if meta.path.is_ident("tags") {
            let value = meta.value()?;
            let content;
            syn::bracketed!(content in value);
            let tags: Punctuated<LitStr, Token![,]> = content.parse_terminated(|input| input.parse::<LitStr>(), Token![,])?;
            self.tags.extend(tags.iter().map(LitStr::value));
        } else if meta.path.is_ident("enabled") {
            self.enabled = Some(parse_bool_flag(meta)?);
        } else if meta.path.is_ident("show_index") {
            self.show_index = Some(parse_bool_flag(meta)?);
        } else if meta.path.is_ident("rich_text") {
            self.rich_text = Some(parse_bool_flag(meta)?);
        } else if meta.path.is_ident("indent") {
            self.indent = Some(parse_int_value(meta)?);
        } else if meta.path.is_ident("font_size") {
            self.font_size = Some(parse_int_value(meta)?);
        } else if meta.path.is_ident("show_if") {
            let expr: Expr = meta.value()?.parse()?;
            self.show_if = Some(parse_show_if(&expr)?);
        } else {
            return Ok(false);
        }
        Ok(true)
    }
}

/// Parsed `#[monitor(...)]` on the type.
#[derive(Debug, Default)]
pub struct TypeAttributes {
    /// A `#[monitor(...)]` was present on the type.
    pub present: bool,
    pub exclude: bool,
    pub compiler_generated: bool,
    /// Pull members from the type's `#[monitor_members]` impl block.
    pub members: bool,
    /// Display name: `name = "..."`.
    pub name: Option<String>,
    /// Member options applied as defaults; its tags are the type tags.
    pub defaults: MarkerAttributes,
}

impl TypeAttributes {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("monitor") {
                continue;
            }
            result.present = true;
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("exclude") {
                    result.exclude = true;
                    return Ok(());
                }
                if meta.path.is_ident("compiler_generated") {
                    result.compiler_generated = true;
                    return Ok(());
                }
                if meta.path.is_ident("members") {
                    result.members = true;
                    return Ok(());
                }
                if meta.path.is_ident("name") {
                    result.name = Some(parse_string_value(&meta)?);
                    return Ok(());
                }
                if meta.path.is_ident("label") || meta.path.is_ident("show_if") || meta.path.is_ident("processor") {
                    return Err(meta.error("only member-level monitor attributes can set this"));
                }
                if result.defaults.parse_option(&meta)? {
                    return Ok(());
                }

                Err(meta.error("unsupported monitor type attribute"))
            })?;
        }

        Ok(result)
    }
}

/// Helper to parse string value from meta
fn parse_string_value(meta: &ParseNestedMeta) -> Result<String> {
    let value: Lit = meta.value()?.parse()?;
    if let Lit::Str(s) = value {
        Ok(s.value())
    } else {
        Err(Error::new_spanned(value, "expected string literal"))
    }
}

/// `flag` or `flag = true/false`
fn parse_bool_flag(meta: &ParseNestedMeta) -> Result<bool> {
    if !meta.input.peek(Token![=]) {
        return Ok(true);
    }
    let value: Lit = meta.value()?.parse()?;
    if let Lit::Bool(b) = value {
        Ok(b.value)
    } else {
        Err(Error::new_spanned(value, "expected true or false"))
    }
}

fn parse_int_value<N>(meta: &ParseNestedMeta) -> Result<N>
where
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    let value: Lit = meta.value()?.parse()?;
    if let Lit::Int(i) = value {
        i.base10_parse()
    } else {
        Err(Error::new_spanned(value, "expected integer literal"))
    }
}

fn parse_show_if(expr: &Expr) -> Result<ShowIfSpec> {
    match expr {
        Expr::Path(path) => {
            let ident = path
                .path
                .get_ident()
                .map(|i| i.to_string())
                .ok_or_else(|| Error::new_spanned(path, "expected a condition name"))?;
            if CONDITIONS.contains(&ident.as_str()) {
                Ok(ShowIfSpec::Condition(ident))
            } else {
                Err(Error::new_spanned(
                    path,
                    format!("unknown condition `{ident}`, expected one of: {}", CONDITIONS.join(", ")),
                ))
            }
        }
        Expr::Call(call) => {
            let Expr::Path(func) = call.func.as_ref() else {
                return Err(Error::new_spanned(&call.func, "expected a comparison or method reference"));
            };
            let name = func
                .path
                .get_ident()
                .map(|i| i.to_string())
                .ok_or_else(|| Error::new_spanned(func, "expected a comparison or method reference"))?;
            if call.args.len() != 1 {
                return Err(Error::new_spanned(call, "expected exactly one argument"));
            }
            let arg = &call.args[0];
            match name.as_str() {
                "method" | "static_method" => {
                    let LiteralSpec::Text(method) = parse_literal(arg)? else {
                        return Err(Error::new_spanned(arg, "expected the method name as a string"));
                    };
                    if name == "method" {
                        Ok(ShowIfSpec::InstanceMethod(method))
                    } else {
                        Ok(ShowIfSpec::StaticMethod(method))
                    }
                }
                op if COMPARISONS.contains(&op) => Ok(ShowIfSpec::Compare(name.clone(), parse_literal(arg)?)),
                _ => Err(Error::new_spanned(
                    func,
                    format!("unknown comparison `{name}`, expected one of: {}", COMPARISONS.join(", ")),
                )),
            }
        }
        _ => Err(Error::new_spanned(
            expr,
            "expected `Condition`, `Comparison(value)`, `method(\"name\")` or `static_method(\"name\")`",
        )),
    }
}

pub fn parse_literal(expr: &Expr) -> Result<LiteralSpec> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Bool(b) => Ok(LiteralSpec::Bool(b.value)),
            Lit::Int(i) => Ok(LiteralSpec::Int(i.base10_parse()?)),
            Lit::Float(f) => Ok(LiteralSpec::Float(f.base10_parse()?)),
            Lit::Str(s) => Ok(LiteralSpec::Text(s.value())),
            Lit::Char(c) => Ok(LiteralSpec::Text(c.value().to_string())),
            other => Err(Error::new_spanned(other, "unsupported literal")),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match parse_literal(&unary.expr)? {
            LiteralSpec::Int(i) => Ok(LiteralSpec::Int(-i)),
            LiteralSpec::Float(f) => Ok(LiteralSpec::Float(-f)),
            _ => Err(Error::new_spanned(expr, "only numbers can be negated")),
        },
        Expr::Path(path) if path.path.is_ident("null") => Ok(LiteralSpec::Null),
        _ => Err(Error::new_spanned(expr, "expected a literal")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_bare_attribute_marks_member() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor] }];
        let result = MarkerAttributes::parse(&attrs).unwrap();
        assert!(result.marked);
        assert_eq!(result.label, None);
    }

    #[test]
    fn test_unmarked_member() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[doc = "hp"] }];
        let result = MarkerAttributes::parse(&attrs).unwrap();
        assert!(!result.marked);
    }

    #[test]
    fn test_parse_member_options() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[monitor(label = "HP", format = "F2", tags = ["combat", "ui"], tag = "hot", indent = 4, rich_text, show_index = false, font_size = 14, writable)]
        }];
        let result = MarkerAttributes::parse(&attrs).unwrap();
        assert_eq!(result.label.as_deref(), Some("HP"));
        assert_eq!(result.format.as_deref(), Some("F2"));
        assert_eq!(result.tags, vec!["combat", "ui", "hot"]);
        assert_eq!(result.indent, Some(4));
        assert_eq!(result.rich_text, Some(true));
        assert_eq!(result.show_index, Some(false));
        assert_eq!(result.font_size, Some(14));
        assert!(result.writable);
    }

    #[test]
    fn test_parse_show_if_forms() {
        let cases: Vec<(Attribute, ShowIfSpec)> = vec![
            (
                parse_quote! { #[monitor(show_if = NotNull)] },
                ShowIfSpec::Condition("NotNull".into()),
            ),
            (
                parse_quote! { #[monitor(show_if = Greater(-2))] },
                ShowIfSpec::Compare("Greater".into(), LiteralSpec::Int(-2)),
            ),
            (
                parse_quote! { #[monitor(show_if = method("is_alive"))] },
                ShowIfSpec::InstanceMethod("is_alive".into()),
            ),
            (
                parse_quote! { #[monitor(show_if = static_method("debug_enabled"))] },
                ShowIfSpec::StaticMethod("debug_enabled".into()),
            ),
        ];
        for (attr, expected) in cases {
            let result = MarkerAttributes::parse(&[attr]).unwrap();
            assert_eq!(result.show_if, Some(expected));
        }
    }

    #[test]
    fn test_unknown_condition_is_an_error() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor(show_if = Sometimes)] }];
        let err = MarkerAttributes::parse(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown condition"));
    }

    #[test]
    fn test_parse_args_and_roles() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor(args = [2, 1.5, "x", true, null])] }];
        let result = MarkerAttributes::parse(&attrs).unwrap();
        assert_eq!(
            result.args,
            vec![
                LiteralSpec::Int(2),
                LiteralSpec::Float(1.5),
                LiteralSpec::Text("x".into()),
                LiteralSpec::Bool(true),
                LiteralSpec::Null,
            ]
        );

        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor(processor)] }];
        assert_eq!(MarkerAttributes::parse(&attrs).unwrap().role, MethodRole::Processor);

        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor(processor = "fmt_hp")] }];
        let result = MarkerAttributes::parse(&attrs).unwrap();
        assert_eq!(result.role, MethodRole::Member);
        assert_eq!(result.processor.as_deref(), Some("fmt_hp"));
    }

    #[test]
    fn test_parse_type_attributes() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[monitor(name = "Hero", tags = ["player"], members, group = "stats", enabled = false)]
        }];
        let result = TypeAttributes::parse(&attrs).unwrap();
        assert_eq!(result.name.as_deref(), Some("Hero"));
        assert!(result.members);
        assert!(!result.exclude);
        assert_eq!(result.defaults.tags, vec!["player"]);
        assert_eq!(result.defaults.group.as_deref(), Some("stats"));
        assert_eq!(result.defaults.enabled, Some(false));
    }

    #[test]
    fn test_type_attributes_reject_member_only_options() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[monitor(label = "x")] }];
        assert!(TypeAttributes::parse(&attrs).is_err());
    }
}

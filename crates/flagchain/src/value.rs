//! Resettable values.
//!
//! A flag never owns the data it writes: it is bound to one field of the flag
//! set's output value through a [`Field`] accessor pair, and remembers the
//! default it must restore on [`Value::reset`]. Resetting always replaces the
//! field with a fresh clone of the default, so container-typed fields never
//! share backing storage with values handed out by an earlier parse.

use std::any::Any;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Failure to parse a flag value from text.
///
/// The offending text is not carried by `Parse`; the flag set wraps this
/// error with the flag name and the raw value. `Invalid` is for
/// [`FlagValue`] implementations that accept the syntax but reject the
/// content, e.g. an [`EnvMap`](crate::EnvMap) entry with an empty key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("parse error")]
    Parse,
    #[error("{0}")]
    Invalid(String),
}

pub type ValueResult<T> = Result<T, ValueError>;

/// Accessor pair binding a flag to one field of the output value `T`.
///
/// Usually built with the [`field!`](crate::field) macro.
pub struct Field<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> Field<T, V> {
    pub const fn new(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'a>(&self, out: &'a T) -> &'a V {
        (self.get)(out)
    }

    pub fn get_mut<'a>(&self, out: &'a mut T) -> &'a mut V {
        (self.get_mut)(out)
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

/// Build a [`Field`] from a field path of the output struct.
///
/// ```
/// use flagchain::{field, ErrorHandling, FlagSet};
///
/// #[derive(Default)]
/// struct Deploy {
///     env: String,
/// }
///
/// let mut set = FlagSet::new("deploy", ErrorHandling::ContinueOnError, Deploy::default());
/// set.flag("env", "dev".to_string(), "target environment", field!(env)).unwrap();
/// assert_eq!(set.output().env, "dev");
/// ```
#[macro_export]
macro_rules! field {
    ($($path:ident).+) => {
        $crate::Field::new(|out| &out.$($path).+, |out| &mut out.$($path).+)
    };
    ($ty:ty, $($path:ident).+) => {
        $crate::Field::<$ty, _>::new(|out| &out.$($path).+, |out| &mut out.$($path).+)
    };
}

/// A storage cell of a flag set, bound to the output value `T`.
///
/// This is the contract the subcommand iterator relies on: every value can be
/// put back to its declared default, repeatedly and at any time.
pub trait Value<T> {
    /// Parse `text` into the bound field.
    ///
    /// On failure the field keeps its previous content.
    fn set(&self, out: &mut T, text: &str) -> ValueResult<()>;

    /// Current value, for downcasting by typed accessors.
    fn get<'a>(&self, out: &'a T) -> &'a dyn Any;

    fn render(&self, out: &T) -> String;

    /// Restore the default. Idempotent.
    fn reset(&self, out: &mut T);

    /// Whether the flag may appear without a value token (`-verbose`).
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Placeholder shown after the flag name in usage text.
    fn type_name(&self) -> &'static str {
        "value"
    }

    fn default_text(&self) -> String;

    /// Whether the default equals the zero value of the type; such defaults
    /// are not printed in usage text.
    fn is_zero_default(&self) -> bool {
        self.default_text().is_empty()
    }
}

/// Scalar types with a textual flag representation.
pub trait Primitive: Clone + Default + 'static {
    const TYPE_NAME: &'static str;
    const IS_BOOL: bool = false;

    fn parse_flag(text: &str) -> ValueResult<Self>;
    fn format_flag(&self) -> String;
}

impl Primitive for bool {
    const TYPE_NAME: &'static str = "";
    const IS_BOOL: bool = true;

    fn parse_flag(text: &str) -> ValueResult<Self> {
        match text {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(ValueError::Parse),
        }
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }
}

impl Primitive for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_flag(text: &str) -> ValueResult<Self> {
        Ok(text.to_string())
    }

    fn format_flag(&self) -> String {
        self.clone()
    }
}

macro_rules! numeric_primitive {
    ($name:literal => $($ty:ty),+) => {
        $(
            impl Primitive for $ty {
                const TYPE_NAME: &'static str = $name;

                fn parse_flag(text: &str) -> ValueResult<Self> {
                    text.parse().map_err(|_| ValueError::Parse)
                }

                fn format_flag(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

numeric_primitive!("int" => i8, i16, i32, i64, isize);
numeric_primitive!("uint" => u8, u16, u32, u64, usize);
numeric_primitive!("float" => f32, f64);

impl Primitive for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn parse_flag(text: &str) -> ValueResult<Self> {
        humantime::parse_duration(text).map_err(|_| ValueError::Parse)
    }

    fn format_flag(&self) -> String {
        humantime::format_duration(*self).to_string()
    }
}

fn parse_text<V: FromStr>(text: &str) -> ValueResult<V> {
    text.parse().map_err(|_| ValueError::Parse)
}

fn format_text<V: Display>(value: &V) -> String {
    value.to_string()
}

/// A single-valued flag: the field is replaced on every `set` (last write
/// wins) and overwritten with a clone of `default` on `reset`.
pub struct Resettable<T, V> {
    field: Field<T, V>,
    default: V,
    parse: fn(&str) -> ValueResult<V>,
    format: fn(&V) -> String,
    type_name: &'static str,
    zero_text: Option<String>,
    is_bool: bool,
}

impl<T, V: Primitive> Resettable<T, V> {
    pub fn new(field: Field<T, V>, default: V) -> Self {
        Self {
            field,
            default,
            parse: V::parse_flag,
            format: V::format_flag,
            type_name: V::TYPE_NAME,
            zero_text: Some(V::default().format_flag()),
            is_bool: V::IS_BOOL,
        }
    }
}

impl<T, V: FromStr + Display + Clone + 'static> Resettable<T, V> {
    /// Bind a user-defined type through its `FromStr`/`Display` impls.
    pub fn text(field: Field<T, V>, default: V) -> Self {
        Self {
            field,
            default,
            parse: parse_text::<V>,
            format: format_text::<V>,
            type_name: "value",
            zero_text: None,
            is_bool: false,
        }
    }
}

impl<T, V> Resettable<T, V> {
    pub fn default_value(&self) -> &V {
        &self.default
    }
}

impl<T, V: Clone + 'static> Value<T> for Resettable<T, V> {
    fn set(&self, out: &mut T, text: &str) -> ValueResult<()> {
        let value = (self.parse)(text)?;
        *self.field.get_mut(out) = value;
        Ok(())
    }

    fn get<'a>(&self, out: &'a T) -> &'a dyn Any {
        self.field.get(out)
    }

    fn render(&self, out: &T) -> String {
        (self.format)(self.field.get(out))
    }

    fn reset(&self, out: &mut T) {
        *self.field.get_mut(out) = self.default.clone();
    }

    fn is_bool_flag(&self) -> bool {
        self.is_bool
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn default_text(&self) -> String {
        (self.format)(&self.default)
    }

    fn is_zero_default(&self) -> bool {
        let text = self.default_text();
        match &self.zero_text {
            Some(zero) => &text == zero,
            None => text.is_empty(),
        }
    }
}

/// A value that owns its own reset semantics, e.g. an accumulating slice.
///
/// Types implementing this are stored directly in the output struct and
/// bound with [`FlagSet::var`](crate::FlagSet::var).
pub trait FlagValue: Any {
    const IS_BOOL: bool = false;

    fn set(&mut self, text: &str) -> ValueResult<()>;
    fn render(&self) -> String;

    /// Must install fresh storage rather than clearing in place.
    fn reset(&mut self);
}

/// Adapter exposing a [`FlagValue`] field as a [`Value`].
pub struct Bound<T, V> {
    field: Field<T, V>,
    default_text: String,
}

impl<T, V: FlagValue> Bound<T, V> {
    /// Resets the field in `out` and records its rendering as the default.
    pub fn new(field: Field<T, V>, out: &mut T) -> Self {
        let value = field.get_mut(out);
        value.reset();
        let default_text = value.render();
        Self {
            field,
            default_text,
        }
    }
}

impl<T, V: FlagValue> Value<T> for Bound<T, V> {
    fn set(&self, out: &mut T, text: &str) -> ValueResult<()> {
        self.field.get_mut(out).set(text)
    }

    fn get<'a>(&self, out: &'a T) -> &'a dyn Any {
        self.field.get(out)
    }

    fn render(&self, out: &T) -> String {
        self.field.get(out).render()
    }

    fn reset(&self, out: &mut T) {
        self.field.get_mut(out).reset();
    }

    fn is_bool_flag(&self) -> bool {
        V::IS_BOOL
    }

    fn default_text(&self) -> String {
        self.default_text.clone()
    }
}

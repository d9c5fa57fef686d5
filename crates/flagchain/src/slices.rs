//! Accumulating flag values.
//!
//! Every occurrence of the flag appends to the slice:
//!
//! ```
//! use flagchain::{field, ErrorHandling, FlagSet, StringSlice};
//!
//! #[derive(Default)]
//! struct Run {
//!     args: StringSlice,
//! }
//!
//! let mut set = FlagSet::new("run", ErrorHandling::ContinueOnError, Run::default());
//! set.var("arg", "extra argument, repeatable", field!(args)).unwrap();
//! set.parse(&["-arg".to_string(), "a".to_string(), "-arg".to_string(), "b".to_string()])
//!     .unwrap();
//! assert_eq!(set.output().args.as_slice(), ["a", "b"]);
//! ```

use std::ops::Deref;

use crate::value::{FlagValue, Primitive, ValueResult};

/// Ordered accumulation of parsed values.
///
/// `reset` swaps in a new empty vector instead of truncating, so a slice
/// cloned out of a previous parse keeps its contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slice<V>(Vec<V>);

pub type StringSlice = Slice<String>;
pub type Int64Slice = Slice<i64>;
pub type Uint64Slice = Slice<u64>;
pub type FloatSlice = Slice<f64>;

impl<V> Slice<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[V] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<V> {
        self.0
    }
}

impl<V> Deref for Slice<V> {
    type Target = [V];

    fn deref(&self) -> &[V] {
        &self.0
    }
}

impl<V> From<Vec<V>> for Slice<V> {
    fn from(values: Vec<V>) -> Self {
        Self(values)
    }
}

impl<V> FromIterator<V> for Slice<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Primitive> FlagValue for Slice<V> {
    /// Appends the parsed value. An empty string is ignored.
    fn set(&mut self, text: &str) -> ValueResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.0.push(V::parse_flag(text)?);
        Ok(())
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(Primitive::format_flag)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn reset(&mut self) {
        self.0 = Vec::new();
    }
}

//! Named flag sets with single-dash long flags (`-name value`).
//!
//! A [`FlagSet`] owns its output value and binds each flag to one of its
//! fields. Parsing stops at the first non-flag argument (or right after
//! `--`); whatever is left is the set's unparsed tail, which is what lets the
//! subcommand iterator hand the rest of argv to the next command.

use std::any::Any;
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

use crate::value::{Bound, Field, FlagValue, Primitive, Resettable, Value, ValueError};

/// What a flag set does when parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    #[default]
    ContinueOnError,
    /// Print the error and usage to stderr, then exit the process with
    /// status 2 (status 0 when help was requested).
    ExitOnError,
}

/// Errors raised while parsing arguments into a flag set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// `-help` or `-h` was given and no flag of that name is defined.
    #[error("flag: help requested")]
    Help,
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for flag -{name}: {source}")]
    InvalidValue {
        name: String,
        value: String,
        source: ValueError,
    },
}

/// Errors in a flag set or command definition. These are programmer errors
/// and surface while building, never while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineError {
    #[error("invalid flag name {0:?}")]
    InvalidName(String),
    #[error("{set} flag redefined: {name}")]
    Redefined { set: String, name: String },
    #[error("invalid default {value:?} for flag -{name}: {source}")]
    InvalidDefault {
        name: String,
        value: String,
        source: ValueError,
    },
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
}

/// One registered flag.
pub struct Flag<T> {
    name: String,
    usage: String,
    value: Box<dyn Value<T>>,
}

impl<T> Flag<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn value(&self) -> &dyn Value<T> {
        self.value.as_ref()
    }
}

/// A command's flag definitions, implemented on its output struct.
///
/// ```
/// use flagchain::{field, DefineError, ErrorHandling, FlagSet, Flags};
///
/// #[derive(Default)]
/// struct Test {
///     verbose: bool,
///     runs: u32,
/// }
///
/// impl Flags for Test {
///     fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
///         set.flag("verbose", false, "verbose output", field!(verbose))?
///             .flag_str("runs", "1", "number of runs", field!(runs))?;
///         Ok(())
///     }
/// }
///
/// let set = FlagSet::<Test>::from_flags("test", ErrorHandling::ContinueOnError).unwrap();
/// assert_eq!(set.output().runs, 1);
/// ```
pub trait Flags: Default + 'static {
    fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError>;
}

/// A named set of flags writing into an output value of type `T`.
pub struct FlagSet<T> {
    name: String,
    handling: ErrorHandling,
    out: T,
    flags: IndexMap<String, Flag<T>>,
    explicit: HashSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl<T: Flags> FlagSet<T> {
    pub fn from_flags(name: impl Into<String>, handling: ErrorHandling) -> Result<Self, DefineError> {
        let mut set = Self::new(name, handling, T::default());
        T::define(&mut set)?;
        Ok(set)
    }
}

impl<T: 'static> FlagSet<T> {
    pub fn new(name: impl Into<String>, handling: ErrorHandling, out: T) -> Self {
        Self {
            name: name.into(),
            handling,
            out,
            flags: IndexMap::new(),
            explicit: HashSet::new(),
            args: Vec::new(),
            parsed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.handling
    }

    pub fn output(&self) -> &T {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut T {
        &mut self.out
    }

    pub fn into_output(self) -> T {
        self.out
    }

    /// Define a flag of a primitive type with a typed default.
    pub fn flag<V: Primitive>(
        &mut self,
        name: &str,
        default: V,
        usage: &str,
        field: Field<T, V>,
    ) -> Result<&mut Self, DefineError> {
        self.value(name, usage, Box::new(Resettable::new(field, default)))
    }

    /// Define a flag of a primitive type whose default is given as text.
    pub fn flag_str<V: Primitive>(
        &mut self,
        name: &str,
        default: &str,
        usage: &str,
        field: Field<T, V>,
    ) -> Result<&mut Self, DefineError> {
        let value = V::parse_flag(default).map_err(|source| DefineError::InvalidDefault {
            name: name.to_string(),
            value: default.to_string(),
            source,
        })?;
        self.flag(name, value, usage, field)
    }

    /// Define a flag of any `FromStr + Display` type.
    pub fn text<V>(
        &mut self,
        name: &str,
        default: &str,
        usage: &str,
        field: Field<T, V>,
    ) -> Result<&mut Self, DefineError>
    where
        V: FromStr + Display + Clone + 'static,
    {
        let value: V = default.parse().map_err(|_| DefineError::InvalidDefault {
            name: name.to_string(),
            value: default.to_string(),
            source: ValueError::Parse,
        })?;
        self.value(name, usage, Box::new(Resettable::text(field, value)))
    }

    /// Define a flag backed by a self-resetting value such as a
    /// [`StringSlice`](crate::StringSlice). The field is reset immediately.
    pub fn var<V: FlagValue>(
        &mut self,
        name: &str,
        usage: &str,
        field: Field<T, V>,
    ) -> Result<&mut Self, DefineError> {
        let bound = Bound::new(field, &mut self.out);
        self.value(name, usage, Box::new(bound))
    }

    /// Register an arbitrary [`Value`]. The value is reset right away so the
    /// output starts from its default.
    pub fn value(
        &mut self,
        name: &str,
        usage: &str,
        value: Box<dyn Value<T>>,
    ) -> Result<&mut Self, DefineError> {
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(DefineError::InvalidName(name.to_string()));
        }
        if self.flags.contains_key(name) {
            return Err(DefineError::Redefined {
                set: self.name.clone(),
                name: name.to_string(),
            });
        }
        value.reset(&mut self.out);
        self.flags.insert(
            name.to_string(),
            Flag {
                name: name.to_string(),
                usage: usage.to_string(),
                value,
            },
        );
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag<T>> {
        self.flags.get(name)
    }

    /// Flags in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &Flag<T>> {
        self.flags.values()
    }

    /// Call `f` for every flag in lexicographical order, set or not.
    pub fn visit_all(&self, mut f: impl FnMut(&Flag<T>, &T)) {
        let mut flags: Vec<&Flag<T>> = self.flags.values().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        for flag in flags {
            f(flag, &self.out);
        }
    }

    /// Current value of flag `name`, if it exists and has type `V`.
    pub fn get<V: 'static>(&self, name: &str) -> Option<&V> {
        self.flags.get(name)?.value.get(&self.out).downcast_ref()
    }

    pub fn render(&self, name: &str) -> Option<String> {
        self.flags.get(name).map(|flag| flag.value.render(&self.out))
    }

    /// Set flag `name` as if it had been given on the command line.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), FlagError> {
        let Some(flag) = self.flags.get(name) else {
            return Err(FlagError::Undefined(name.to_string()));
        };
        flag.value
            .set(&mut self.out, text)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_string(),
                value: text.to_string(),
                source,
            })?;
        self.explicit.insert(name.to_string());
        Ok(())
    }

    /// Whether flag `name` was supplied since the last reset.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    /// Restore every flag to its default.
    pub fn reset(&mut self) {
        for flag in self.flags.values() {
            flag.value.reset(&mut self.out);
        }
        self.explicit.clear();
        tracing::trace!(set = %self.name, "flags reset");
    }

    /// Parse flags from `args`, which must not include the command name.
    pub fn parse(&mut self, args: &[String]) -> Result<(), FlagError> {
        self.parsed = true;
        self.args.clear();
        let result = self.parse_args(args);
        if let Err(err) = &result {
            if self.handling == ErrorHandling::ExitOnError {
                self.exit_with(err);
            }
        }
        result
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Arguments left over after the last parse.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn n_arg(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    fn parse_args(&mut self, args: &[String]) -> Result<(), FlagError> {
        let set = &self.name;
        let out = &mut self.out;
        let explicit = &mut self.explicit;
        let consumed = scan(&self.flags, args, |flag, text| {
            flag.value
                .set(out, text)
                .map_err(|source| FlagError::InvalidValue {
                    name: flag.name.clone(),
                    value: text.to_string(),
                    source,
                })?;
            tracing::trace!(set = %set, flag = %flag.name, value = text, "flag set");
            explicit.insert(flag.name.clone());
            Ok(())
        })?;
        self.args = args[consumed..].to_vec();
        Ok(())
    }

    /// Number of leading `args` a parse would consume, without touching the
    /// output or the explicit set. Values are not validated.
    pub fn skip_flags(&self, args: &[String]) -> Result<usize, FlagError> {
        scan(&self.flags, args, |_, _| Ok(()))
    }

    fn exit_with(&self, err: &FlagError) -> ! {
        if matches!(err, FlagError::Help) {
            eprint!("{}", self.usage());
            std::process::exit(0);
        }
        eprintln!("{err}");
        eprint!("{}", self.usage());
        std::process::exit(2);
    }

    /// Usage text: a heading followed by [`FlagSet::defaults`].
    pub fn usage(&self) -> String {
        if self.name.is_empty() {
            format!("Usage:\n{}", self.defaults())
        } else {
            format!("Usage of {}:\n{}", self.name, self.defaults())
        }
    }

    /// One entry per flag, sorted by name: the flag and its placeholder,
    /// then the indented usage and any non-zero default.
    pub fn defaults(&self) -> String {
        let mut flags: Vec<&Flag<T>> = self.flags.values().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::new();
        for flag in flags {
            let mut line = format!("  -{}", flag.name);
            let (placeholder, usage) = unquote_usage(&flag.usage, flag.value.type_name());
            if !placeholder.is_empty() {
                line.push(' ');
                line.push_str(&placeholder);
            }
            // "  -x" fits on one line with its usage.
            if line.len() <= 4 {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push_str(&usage.replace('\n', "\n    \t"));
            if !flag.value.is_zero_default() {
                let default = flag.value.default_text();
                if flag.value.type_name() == "string" {
                    line.push_str(&format!(" (default {default:?})"));
                } else {
                    line.push_str(&format!(" (default {default})"));
                }
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Walk the flags at the front of `args`, handing each flag and its value
/// text to `visit`. Returns the index of the first unconsumed argument.
fn scan<T>(
    flags: &IndexMap<String, Flag<T>>,
    args: &[String],
    mut visit: impl FnMut(&Flag<T>, &str) -> Result<(), FlagError>,
) -> Result<usize, FlagError> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg.len() < 2 || !arg.starts_with('-') {
            break;
        }
        let mut body = &arg[1..];
        if let Some(long) = body.strip_prefix('-') {
            if long.is_empty() {
                i += 1;
                break;
            }
            body = long;
        }
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(FlagError::BadSyntax(arg.to_string()));
        }
        i += 1;

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let Some(flag) = flags.get(name) else {
            if name == "help" || name == "h" {
                return Err(FlagError::Help);
            }
            return Err(FlagError::Undefined(name.to_string()));
        };

        let text = if flag.value.is_bool_flag() {
            inline.unwrap_or("true")
        } else if let Some(value) = inline {
            value
        } else if let Some(value) = args.get(i) {
            i += 1;
            value.as_str()
        } else {
            return Err(FlagError::MissingValue(name.to_string()));
        };
        visit(flag, text)?;
    }
    Ok(i)
}

/// Split a back-quoted placeholder out of `usage`: "load `file`" yields
/// ("file", "load file"). Without back quotes the type name is used.
fn unquote_usage(usage: &str, type_name: &str) -> (String, String) {
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let end = start + 1 + len;
            let name = &usage[start + 1..end];
            let text = format!("{}{}{}", &usage[..start], name, &usage[end + 1..]);
            return (name.to_string(), text);
        }
    }
    (type_name.to_string(), usage.to_string())
}

/// Object-safe view of a flag set, as driven by the subcommand iterator.
pub trait OptionSet: Any {
    fn name(&self) -> &str;
    fn reset(&mut self);
    fn parse(&mut self, args: &[String]) -> Result<(), FlagError>;

    /// How many leading `args` [`OptionSet::parse`] would consume, leaving
    /// the output untouched.
    fn skip_flags(&self, args: &[String]) -> Result<usize, FlagError>;

    /// Unparsed tail of the last parse.
    fn args(&self) -> &[String];

    fn n_arg(&self) -> usize {
        self.args().len()
    }

    fn parsed(&self) -> bool;
    fn is_explicit(&self, name: &str) -> bool;
    fn render(&self, name: &str) -> Option<String>;
    fn usage(&self) -> String;
    fn defaults(&self) -> String;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn OptionSet {
    /// Typed output of the underlying `FlagSet<T>`.
    pub fn output<T: 'static>(&self) -> Option<&T> {
        self.as_any()
            .downcast_ref::<FlagSet<T>>()
            .map(FlagSet::output)
    }

    pub fn output_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut()
            .downcast_mut::<FlagSet<T>>()
            .map(FlagSet::output_mut)
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&FlagSet<T>> {
        self.as_any().downcast_ref()
    }
}

impl<T: 'static> OptionSet for FlagSet<T> {
    fn name(&self) -> &str {
        FlagSet::name(self)
    }

    fn reset(&mut self) {
        FlagSet::reset(self)
    }

    fn parse(&mut self, args: &[String]) -> Result<(), FlagError> {
        FlagSet::parse(self, args)
    }

    fn skip_flags(&self, args: &[String]) -> Result<usize, FlagError> {
        FlagSet::skip_flags(self, args)
    }

    fn args(&self) -> &[String] {
        FlagSet::args(self)
    }

    fn parsed(&self) -> bool {
        FlagSet::parsed(self)
    }

    fn is_explicit(&self, name: &str) -> bool {
        FlagSet::is_explicit(self, name)
    }

    fn render(&self, name: &str) -> Option<String> {
        FlagSet::render(self, name)
    }

    fn usage(&self) -> String {
        FlagSet::usage(self)
    }

    fn defaults(&self) -> String {
        FlagSet::defaults(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use crate::slices::StringSlice;
    use std::time::Duration;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[derive(Debug, Default, PartialEq)]
    struct Example {
        flag: bool,
        text: String,
        small: u32,
        big: u64,
        int: i32,
        wide: i64,
        real: f64,
        wait: Duration,
        tags: StringSlice,
    }

    impl Flags for Example {
        fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
            set.flag("bool", false, "a boolean", field!(flag))?
                .flag("str", String::new(), "a string", field!(text))?
                .flag("u", 0u32, "unsigned", field!(small))?
                .flag("u64", 0u64, "wide unsigned", field!(big))?
                .flag("i", 0i32, "signed", field!(int))?
                .flag("i64", 0i64, "wide signed", field!(wide))?
                .flag("f64", 0.0f64, "float", field!(real))?
                .flag("d", Duration::ZERO, "duration", field!(wait))?
                .var("tag", "repeatable tag", field!(tags))?;
            Ok(())
        }
    }

    #[test]
    fn parses_every_primitive_kind() {
        let mut set = FlagSet::<Example>::from_flags("test", ErrorHandling::ContinueOnError).unwrap();
        set.parse(&argv(&[
            "-bool", "-str", "hello", "-u", "1", "-u64", "1024", "-i", "-1", "-i64", "-1024",
            "-f64", "-3.5", "-d", "10s", "-tag", "a", "--tag=b",
        ]))
        .unwrap();

        let expected = Example {
            flag: true,
            text: "hello".to_string(),
            small: 1,
            big: 1024,
            int: -1,
            wide: -1024,
            real: -3.5,
            wait: Duration::from_secs(10),
            tags: StringSlice::from(vec!["a".to_string(), "b".to_string()]),
        };
        assert_eq!(set.output(), &expected);
        assert!(set.args().is_empty());
        assert!(set.parsed());
    }

    #[derive(Debug, Default)]
    struct Deploy {
        env: String,
        force: bool,
        retries: u8,
    }

    fn deploy_set() -> FlagSet<Deploy> {
        let mut set = FlagSet::new("deploy", ErrorHandling::ContinueOnError, Deploy::default());
        set.flag("env", "dev".to_string(), "target environment", field!(env))
            .unwrap()
            .flag("force", false, "skip checks", field!(force))
            .unwrap()
            .flag_str("retries", "3", "number of `attempts`", field!(retries))
            .unwrap();
        set
    }

    #[test]
    fn defaults_apply_at_definition() {
        let set = deploy_set();
        assert_eq!(set.output().env, "dev");
        assert_eq!(set.output().retries, 3);
        assert!(!set.parsed());
    }

    #[test]
    fn stops_at_first_positional() {
        let mut set = deploy_set();
        set.parse(&argv(&["-env", "prod", "test", "-force"])).unwrap();
        assert_eq!(set.output().env, "prod");
        assert!(!set.output().force);
        assert_eq!(set.args(), argv(&["test", "-force"]).as_slice());
        assert_eq!(set.n_arg(), 2);
        assert_eq!(set.arg(0), Some("test"));
    }

    #[test]
    fn double_dash_terminates_and_is_consumed() {
        let mut set = deploy_set();
        set.parse(&argv(&["-force", "--", "-env", "x"])).unwrap();
        assert!(set.output().force);
        assert_eq!(set.output().env, "dev");
        assert_eq!(set.args(), argv(&["-env", "x"]).as_slice());
    }

    #[test]
    fn single_dash_is_positional() {
        let mut set = deploy_set();
        set.parse(&argv(&["-", "-force"])).unwrap();
        assert_eq!(set.args(), argv(&["-", "-force"]).as_slice());
    }

    #[test]
    fn bool_flags_accept_inline_values_only() {
        let mut set = deploy_set();
        set.parse(&argv(&["-force=false", "true"])).unwrap();
        assert!(!set.output().force);
        assert_eq!(set.args(), argv(&["true"]).as_slice());

        let err = set.parse(&argv(&["-force=maybe"])).unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { ref name, .. } if name == "force"));
    }

    #[test]
    fn help_is_distinguished_from_failures() {
        let mut set = deploy_set();
        assert_eq!(set.parse(&argv(&["-help"])), Err(FlagError::Help));
        assert_eq!(set.parse(&argv(&["--h"])), Err(FlagError::Help));
        assert_eq!(
            set.parse(&argv(&["-nope"])),
            Err(FlagError::Undefined("nope".to_string()))
        );
    }

    #[test]
    fn reports_syntax_and_value_errors() {
        let mut set = deploy_set();
        assert_eq!(
            set.parse(&argv(&["---env"])),
            Err(FlagError::BadSyntax("---env".to_string()))
        );
        assert_eq!(
            set.parse(&argv(&["-=x"])),
            Err(FlagError::BadSyntax("-=x".to_string()))
        );
        assert_eq!(
            set.parse(&argv(&["-env"])),
            Err(FlagError::MissingValue("env".to_string()))
        );
        let err = set.parse(&argv(&["-retries", "many"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"many\" for flag -retries: parse error"
        );
    }

    #[test]
    fn reset_restores_defaults_and_clears_explicit() {
        let mut set = deploy_set();
        set.parse(&argv(&["-env", "prod", "-retries", "9"])).unwrap();
        assert!(set.is_explicit("env"));
        assert!(!set.is_explicit("force"));

        set.reset();
        assert_eq!(set.output().env, "dev");
        assert_eq!(set.output().retries, 3);
        assert!(!set.is_explicit("env"));
    }

    #[test]
    fn typed_lookup_and_render() {
        let mut set = deploy_set();
        set.set("retries", "5").unwrap();
        assert_eq!(set.get::<u8>("retries"), Some(&5));
        assert_eq!(set.get::<String>("retries"), None);
        assert_eq!(set.render("env").as_deref(), Some("dev"));
        assert!(set.lookup("missing").is_none());

        let mut seen = Vec::new();
        set.visit_all(|flag, out| seen.push(format!("{}={}", flag.name(), flag.value().render(out))));
        assert_eq!(seen, ["env=dev", "force=false", "retries=5"]);
        assert_eq!(
            set.set("missing", "1"),
            Err(FlagError::Undefined("missing".to_string()))
        );
    }

    #[test]
    fn definition_errors_surface_at_build_time() {
        let mut set = deploy_set();
        assert_eq!(
            set.flag("env", String::new(), "again", field!(env)).err(),
            Some(DefineError::Redefined {
                set: "deploy".to_string(),
                name: "env".to_string()
            })
        );
        assert!(matches!(
            set.flag_str("force", "perhaps", "", field!(force)).err(),
            Some(DefineError::InvalidDefault { .. })
        ));
        assert_eq!(
            set.flag("-x", false, "", field!(force)).err(),
            Some(DefineError::InvalidName("-x".to_string()))
        );
        assert_eq!(
            set.flag("a=b", false, "", field!(force)).err(),
            Some(DefineError::InvalidName("a=b".to_string()))
        );
    }

    #[test]
    fn defaults_text_layout() {
        let mut set = deploy_set();
        set.flag("v", false, "verbose output", field!(force)).unwrap();
        let text = set.defaults();
        assert_eq!(
            text,
            "  -env string\n    \ttarget environment (default \"dev\")\n  \
             -force\n    \tskip checks\n  \
             -retries attempts\n    \tnumber of attempts (default 3)\n  \
             -v\tverbose output\n"
        );
        assert!(set.usage().starts_with("Usage of deploy:\n"));
    }

    #[test]
    fn option_set_downcasts_to_output() {
        let mut boxed: Box<dyn OptionSet> = Box::new(deploy_set());
        boxed.parse(&argv(&["-env", "stage"])).unwrap();
        assert_eq!(boxed.output::<Deploy>().map(|d| d.env.as_str()), Some("stage"));
        assert!(boxed.output::<Example>().is_none());
        boxed.output_mut::<Deploy>().unwrap().force = true;
        assert_eq!(boxed.render("force").as_deref(), Some("true"));
    }
}

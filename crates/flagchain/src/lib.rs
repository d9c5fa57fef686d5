//! Chained subcommands over single-dash option sets.
//!
//! A program takes global options followed by any number of commands, each
//! with its own options:
//!
//! ```text
//! prog -v deploy -env prod test -verbose
//! ```
//!
//! Every command is a [`FlagSet`] writing into a plain struct. The
//! [`FlagSetIterator`] (or the [`Commands`] registry wrapping it) walks the
//! arguments one command at a time and resets each matched set to its
//! defaults before parsing, so a command that appears twice never sees values
//! left over from its previous occurrence.
//!
//! ```
//! use flagchain::{field, Commands, DefineError, ErrorHandling, FlagSet, Flags};
//!
//! #[derive(Default)]
//! struct Deploy {
//!     env: String,
//! }
//!
//! impl Flags for Deploy {
//!     fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
//!         set.flag("env", "dev".to_string(), "target environment", field!(env))?;
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Test {
//!     verbose: bool,
//! }
//!
//! impl Flags for Test {
//!     fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
//!         set.flag("verbose", false, "verbose output", field!(verbose))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut commands = Commands::new(ErrorHandling::ContinueOnError);
//! commands
//!     .command::<Deploy>("deploy", "deploy the service")?
//!     .command::<Test>("test", "run the test suite")?;
//!
//! let mut it = commands.parse(["deploy", "-env", "prod", "test", "-verbose"]);
//! let mut seen = Vec::new();
//! while let Some(def) = it.try_next()? {
//!     match def.name.as_str() {
//!         "deploy" => seen.push(format!("deploy to {}", it.output::<Deploy>().unwrap().env)),
//!         "test" => seen.push(format!("test verbose={}", it.output::<Test>().unwrap().verbose)),
//!         _ => unreachable!(),
//!     }
//! }
//! assert_eq!(seen, ["deploy to prod", "test verbose=true"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Around the core sit a few collaborators: config files expanding into
//! arguments ([`parse_config_file`]), layered environments ([`Env`]), struct
//! to argument emission ([`to_args`]) and help rendering
//! ([`usage_with_subcommands`]).

mod args;
mod commands;
mod config;
mod env;
mod flagset;
mod iter;
mod slices;
mod usage;
mod value;

pub use args::{ArgsError, duration, to_args};
pub use commands::{CommandDefinition, CommandIterator, Commands, render_commands, render_flag_sets};
pub use config::{
    ConfigError, ConfigResult, parse_config_file, parse_dotenv_file, parse_environ_file,
    read_config_file, read_dotenv_file, read_environ_file,
};
pub use env::{CapturingEnvMap, Env, EnvError, EnvMap, EnvUsage, Lookup, LookupMode};
pub use flagset::{DefineError, ErrorHandling, Flag, FlagError, FlagSet, Flags, OptionSet};
pub use iter::{ChainError, FlagSetIterator};
pub use slices::{FloatSlice, Int64Slice, Slice, StringSlice, Uint64Slice};
pub use usage::{HelpInfo, usage_with_subcommands};
pub use value::{Bound, Field, FlagValue, Primitive, Resettable, Value, ValueError, ValueResult};

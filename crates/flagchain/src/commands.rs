//! A registry of named commands, each backed by its own flag set.

use std::ptr;

use crate::flagset::{DefineError, ErrorHandling, FlagSet, Flags, OptionSet};
use crate::iter::{ChainError, FlagSetIterator};

/// Presentation data for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
}

/// Command definitions paired with their option sets, in registration order.
///
/// ```
/// use flagchain::{field, Commands, DefineError, ErrorHandling, FlagSet, Flags};
///
/// #[derive(Default)]
/// struct Deploy {
///     env: String,
/// }
///
/// impl Flags for Deploy {
///     fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
///         set.flag("env", "dev".to_string(), "target environment", field!(env))?;
///         Ok(())
///     }
/// }
///
/// let mut commands = Commands::new(ErrorHandling::ContinueOnError);
/// commands.command::<Deploy>("deploy", "ship it").unwrap();
///
/// let mut it = commands.parse(["deploy", "-env", "prod"]);
/// while let Some(def) = it.try_next().unwrap() {
///     assert_eq!(def.name, "deploy");
///     assert_eq!(it.output::<Deploy>().unwrap().env, "prod");
/// }
/// ```
pub struct Commands {
    handling: ErrorHandling,
    defs: Vec<CommandDefinition>,
    sets: Vec<Box<dyn OptionSet>>,
}

impl Commands {
    pub fn new(handling: ErrorHandling) -> Self {
        Self {
            handling,
            defs: Vec::new(),
            sets: Vec::new(),
        }
    }

    /// Register command `name` with a fresh `FlagSet<T>`.
    pub fn command<T: Flags>(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<&mut Self, DefineError> {
        let set = FlagSet::<T>::from_flags(name, self.handling)?;
        self.push(Box::new(set), description)
    }

    /// Register a prebuilt option set under its own name.
    pub fn push(
        &mut self,
        set: Box<dyn OptionSet>,
        description: &str,
    ) -> Result<&mut Self, DefineError> {
        let name = set.name().to_string();
        if self.defs.iter().any(|def| def.name == name) {
            return Err(DefineError::DuplicateCommand(name));
        }
        tracing::trace!(command = %name, "command registered");
        self.defs.push(CommandDefinition {
            name,
            description: description.to_string(),
        });
        self.sets.push(set);
        Ok(self)
    }

    pub fn definitions(&self) -> &[CommandDefinition] {
        &self.defs
    }

    pub fn sets(&self) -> &[Box<dyn OptionSet>] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn definition(&self, name: &str) -> Option<&CommandDefinition> {
        self.defs.iter().find(|def| def.name == name)
    }

    pub fn set(&self, name: &str) -> Option<&(dyn OptionSet + 'static)> {
        let index = self.position(name)?;
        Some(self.sets[index].as_ref())
    }

    pub fn set_mut(&mut self, name: &str) -> Option<&mut (dyn OptionSet + 'static)> {
        let index = self.position(name)?;
        Some(self.sets[index].as_mut())
    }

    /// Typed output of command `name`, as left by the last parse.
    pub fn output<T: 'static>(&self, name: &str) -> Option<&T> {
        self.set(name)?.output::<T>()
    }

    /// The definition registered for `set`, compared by identity.
    pub fn definition_for(&self, set: &(dyn OptionSet + 'static)) -> Option<&CommandDefinition> {
        let index = self.sets.iter().position(|candidate| {
            ptr::addr_eq::<dyn OptionSet, dyn OptionSet>(candidate.as_ref(), set)
        })?;
        self.defs.get(index)
    }

    /// Iterate `args` (without the program name or global flags) as a chain
    /// of commands.
    pub fn parse<I, S>(&mut self, args: I) -> CommandIterator<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandIterator {
            defs: &self.defs,
            inner: FlagSetIterator::new(args, &mut self.sets),
        }
    }

    pub fn render_commands(&self) -> String {
        render_commands(&self.defs)
    }

    pub fn render_flag_sets(&self) -> String {
        render_flag_sets(&self.sets)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|def| def.name == name)
    }
}

/// [`FlagSetIterator`] that also knows each command's definition.
pub struct CommandIterator<'c> {
    defs: &'c [CommandDefinition],
    inner: FlagSetIterator<'c>,
}

impl<'c> CommandIterator<'c> {
    pub fn try_next(&mut self) -> Result<Option<&'c CommandDefinition>, ChainError> {
        let defs = self.defs;
        Ok(self.inner.try_next()?.and_then(|index| defs.get(index)))
    }

    pub fn next(&mut self) -> bool {
        self.inner.next()
    }

    pub fn err(&self) -> Option<&ChainError> {
        self.inner.err()
    }

    /// Definition of the command matched by the last step.
    pub fn definition(&self) -> Option<&'c CommandDefinition> {
        let defs = self.defs;
        defs.get(self.inner.current_index()?)
    }

    pub fn current(&self) -> Option<&(dyn OptionSet + 'static)> {
        self.inner.current()
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn OptionSet + 'static)> {
        self.inner.current_mut()
    }

    pub fn output<T: 'static>(&self) -> Option<&T> {
        self.inner.output::<T>()
    }

    pub fn advance(&mut self, count: usize) -> bool {
        self.inner.advance(count)
    }

    pub fn remaining(&self) -> &[String] {
        self.inner.remaining()
    }
}

/// One line per command, names padded to the longest one.
pub fn render_commands(defs: &[CommandDefinition]) -> String {
    let width = defs.iter().map(|def| def.name.len()).max().unwrap_or(0);
    defs.iter()
        .map(|def| format!("  {:<width$}\t{}\n", def.name, def.description))
        .collect()
}

/// The usage of every set, each preceded by a blank line.
pub fn render_flag_sets(sets: &[Box<dyn OptionSet>]) -> String {
    sets.iter().map(|set| format!("\n{}", set.usage())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[derive(Debug, Default)]
    struct Deploy {
        env: String,
    }

    impl Flags for Deploy {
        fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
            set.flag("env", "dev".to_string(), "target environment", field!(env))?;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Test {
        verbose: bool,
    }

    impl Flags for Test {
        fn define(set: &mut FlagSet<Self>) -> Result<(), DefineError> {
            set.flag("verbose", false, "verbose output", field!(verbose))?;
            Ok(())
        }
    }

    fn commands() -> Commands {
        let mut commands = Commands::new(ErrorHandling::ContinueOnError);
        commands
            .command::<Deploy>("deploy", "deploy the service")
            .unwrap()
            .command::<Test>("test", "run tests")
            .unwrap();
        commands
    }

    #[test]
    fn iterates_with_definitions() {
        let mut commands = commands();
        let mut it = commands.parse(["deploy", "-env", "prod", "test", "-verbose"]);

        let def = it.try_next().unwrap().unwrap();
        assert_eq!(def.description, "deploy the service");
        assert_eq!(it.output::<Deploy>().unwrap().env, "prod");
        assert_eq!(it.definition().map(|d| d.name.as_str()), Some("deploy"));

        assert!(it.next());
        assert!(it.output::<Test>().unwrap().verbose);
        assert!(!it.next());
        assert!(it.err().is_none());
        drop(it);

        assert_eq!(commands.output::<Deploy>("deploy").unwrap().env, "prod");
        assert!(commands.output::<Deploy>("test").is_none());
    }

    #[test]
    fn rejects_duplicate_commands() {
        let mut commands = commands();
        assert_eq!(
            commands.command::<Test>("test", "again").err(),
            Some(DefineError::DuplicateCommand("test".to_string()))
        );
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn finds_definition_by_set_identity() {
        let commands = commands();
        let set = commands.set("test").unwrap();
        assert_eq!(commands.definition_for(set).unwrap().name, "test");
        assert_eq!(commands.definition("deploy").unwrap().description, "deploy the service");
        assert!(commands.definition("nope").is_none());
    }

    #[test]
    fn renders_aligned_command_table() {
        let commands = commands();
        assert_eq!(
            commands.render_commands(),
            "  deploy\tdeploy the service\n  test  \trun tests\n"
        );
        let sets = commands.render_flag_sets();
        assert!(sets.starts_with("\nUsage of deploy:\n"));
        assert!(sets.contains("\nUsage of test:\n  -verbose\n"));
    }
}

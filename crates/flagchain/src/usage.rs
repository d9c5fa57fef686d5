//! Help text for programs taking global flags followed by chained commands.

use crate::commands::Commands;
use crate::flagset::OptionSet;

/// Presentation knobs for [`usage_with_subcommands`].
#[derive(Debug, Clone, Default)]
pub struct HelpInfo {
    /// Program name; the first process argument when empty.
    pub progname: String,
    pub about: String,
    /// Free text printed between the global options and the command table.
    pub command_prefix: String,
    pub skip_printing_commands: bool,
}

impl HelpInfo {
    pub fn new(progname: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
            ..Self::default()
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn skip_printing_commands(mut self, skip: bool) -> Self {
        self.skip_printing_commands = skip;
        self
    }

    fn progname(&self) -> String {
        if !self.progname.is_empty() {
            return self.progname.clone();
        }
        std::env::args().next().unwrap_or_else(|| "prog".to_string())
    }
}

/// Render the full help text.
///
/// Once `global` has been parsed, only the usage of the commands in its
/// remaining arguments is appended; before that every command's usage is.
/// The remaining arguments are walked command by command the way the
/// iterator would, so a flag value that happens to spell a command name is
/// not mistaken for one. The walk stops at the first unknown command or bad
/// flag and never writes to a command's output.
pub fn usage_with_subcommands(info: &HelpInfo, global: &dyn OptionSet, commands: &Commands) -> String {
    let prog = info.progname();
    let mut out = format!("Usage: {prog} [GLOBAL_OPTIONS] (COMMAND [COMMAND_OPTIONS])+\n");
    if !info.about.is_empty() {
        out.push_str(&format!("\n{}\n", info.about));
    }
    out.push_str("\nGLOBAL_OPTIONS:\n");
    out.push_str(&global.defaults());
    if !info.command_prefix.is_empty() {
        out.push_str(&format!("\n{}\n", info.command_prefix));
    }
    if !info.skip_printing_commands {
        out.push_str(&format!(
            "\nCOMMANDS: (type '{prog} COMMAND -help' for command specific help)\n"
        ));
        out.push_str(&commands.render_commands());
    }

    if global.parsed() {
        out.push('\n');
        let mut shown: Vec<&str> = Vec::new();
        let mut rest = global.args();
        while let Some((head, tail)) = rest.split_first() {
            let Some(set) = commands.set(head) else {
                break;
            };
            if !shown.contains(&head.as_str()) {
                out.push('\n');
                out.push_str(&set.usage());
                shown.push(head);
            }
            match set.skip_flags(tail) {
                Ok(consumed) => rest = &tail[consumed..],
                Err(_) => break,
            }
        }
    } else {
        out.push_str("FLAGS FOR ALL COMMANDS:\n");
        out.push_str(&commands.render_flag_sets());
    }
    out
}

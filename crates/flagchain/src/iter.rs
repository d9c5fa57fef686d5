//! Chained subcommand iteration.
//!
//! ```text
//! prog deploy -env prod test -verbose -- extra
//!      ^^^^^^^^^^^^^^^^ ^^^^^^^^^^^^^
//!      step 1           step 2        tail: ["extra"]
//! ```
//!
//! Every step looks the head token up among the option sets by name, resets
//! the matched set to its defaults, parses the following tokens into it and
//! continues with whatever the set declined.

use std::collections::HashMap;

use thiserror::Error;

use crate::flagset::{FlagError, OptionSet};

/// Why iteration stopped without a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The arguments ran out before any command matched.
    #[error("no matching commands")]
    NoMatch,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// The named command was given `-help` or `-h`.
    #[error("{0}: help requested")]
    HelpRequested(String),
    #[error("{command}: {source}")]
    OptionParse { command: String, source: FlagError },
}

impl ChainError {
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Matched(usize),
    Exhausted,
    Failed(ChainError),
}

/// Walks an argument vector, matching one option set per step.
///
/// A failed step is final: every later step reports the same error. Outputs
/// written by earlier successful steps stay as they are.
pub struct FlagSetIterator<'s> {
    args: Vec<String>,
    sets: &'s mut [Box<dyn OptionSet>],
    names: Option<HashMap<String, usize>>,
    state: State,
    matched_once: bool,
}

impl<'s> FlagSetIterator<'s> {
    pub fn new<I, S>(args: I, sets: &'s mut [Box<dyn OptionSet>]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            sets,
            names: None,
            state: State::Idle,
            matched_once: false,
        }
    }

    /// Start over on a new argument vector with the same option sets.
    pub fn restart<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self.state = State::Idle;
        self.matched_once = false;
    }

    /// Take one step. `Ok(Some(index))` names the matched set, `Ok(None)`
    /// means the arguments were consumed after at least one match.
    pub fn try_next(&mut self) -> Result<Option<usize>, ChainError> {
        match &self.state {
            State::Failed(err) => return Err(err.clone()),
            State::Exhausted => return Ok(None),
            State::Idle | State::Matched(_) => {}
        }

        let Some(head) = self.args.first().cloned() else {
            if self.matched_once {
                self.state = State::Exhausted;
                return Ok(None);
            }
            return Err(self.fail(ChainError::NoMatch));
        };

        let Some(index) = self.find(&head) else {
            tracing::trace!(command = %head, "no option set matches");
            return Err(self.fail(ChainError::UnknownCommand(head)));
        };

        let set = &mut self.sets[index];
        set.reset();
        if let Err(err) = set.parse(&self.args[1..]) {
            self.args.remove(0);
            let err = match err {
                FlagError::Help => ChainError::HelpRequested(head),
                source => ChainError::OptionParse {
                    command: head,
                    source,
                },
            };
            return Err(self.fail(err));
        }

        // The command name is consumed even if the set claims more leftovers
        // than it was given.
        let keep = set.n_arg();
        let consumed = self.args.len().saturating_sub(keep).max(1);
        self.args.drain(..consumed);
        self.matched_once = true;
        self.state = State::Matched(index);
        tracing::debug!(command = %head, remaining = keep, "matched command");
        Ok(Some(index))
    }

    /// Take one step, reporting only whether a command matched. The reason
    /// for stopping is available from [`FlagSetIterator::err`].
    pub fn next(&mut self) -> bool {
        matches!(self.try_next(), Ok(Some(_)))
    }

    /// The error that stopped iteration, if any.
    pub fn err(&self) -> Option<&ChainError> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            State::Matched(index) => Some(index),
            _ => None,
        }
    }

    /// The option set matched by the last step.
    pub fn current(&self) -> Option<&(dyn OptionSet + 'static)> {
        let index = self.current_index()?;
        Some(self.sets[index].as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn OptionSet + 'static)> {
        let index = self.current_index()?;
        Some(self.sets[index].as_mut())
    }

    /// Typed output of the current option set.
    pub fn output<T: 'static>(&self) -> Option<&T> {
        self.current()?.output::<T>()
    }

    /// Skip `count` tokens of the remaining arguments, typically positionals
    /// the current command consumed itself. Returns `false` once nothing is
    /// left.
    pub fn advance(&mut self, count: usize) -> bool {
        if count >= self.args.len() {
            self.args.clear();
            false
        } else {
            self.args.drain(..count);
            true
        }
    }

    pub fn remaining(&self) -> &[String] {
        &self.args
    }

    pub fn into_remaining(self) -> Vec<String> {
        self.args
    }

    fn find(&mut self, name: &str) -> Option<usize> {
        let sets = &self.sets;
        let names = self.names.get_or_insert_with(|| {
            let mut names = HashMap::with_capacity(sets.len());
            for (index, set) in sets.iter().enumerate() {
                names.entry(set.name().to_string()).or_insert(index);
            }
            names
        });
        names.get(name).copied()
    }

    fn fail(&mut self, err: ChainError) -> ChainError {
        tracing::debug!(error = %err, "subcommand iteration stopped");
        self.state = State::Failed(err.clone());
        err
    }
}

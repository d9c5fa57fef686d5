//! File-based configuration.
//!
//! A config file is a command line spread over several lines, a la pip's
//! requirement files:
//!
//! ```text
//! # deploy defaults
//! -env prod
//! -load "./file with spaces.txt"   # trailing comments work too
//! ```
//!
//! Environment files hold `KEY=VALUE` lines kept exactly as written. Files
//! that need dotenv quoting and `$VAR` expansion go through
//! [`parse_dotenv_file`] instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shlex::Shlex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file: unbalanced quoting on line {line} (maybe right after {context:?})")]
    Tokenize { line: usize, context: String },
    #[error("failed to parse dotenv file")]
    Dotenv(#[from] dotenvy::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Split a config file into arguments using shell quoting rules.
///
/// Lines that are blank before their first `#` are blanked out; a `#`
/// starting a word comments out the rest of its line. Blanked lines still
/// count towards the line reported for unbalanced quoting.
pub fn parse_config_file(contents: &str) -> ConfigResult<Vec<String>> {
    let cmdline = contents
        .lines()
        .map(|line| match line.split_once('#') {
            Some((before, _)) if before.trim().is_empty() => "",
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut lexer = Shlex::new(&cmdline);
    let args: Vec<String> = lexer.by_ref().collect();
    if lexer.had_error {
        let context = args[args.len().saturating_sub(4)..].join(" ");
        return Err(ConfigError::Tokenize {
            line: lexer.line_no,
            context,
        });
    }
    tracing::debug!(count = args.len(), "config file expanded");
    Ok(args)
}

pub fn read_config_file(path: impl AsRef<Path>) -> ConfigResult<Vec<String>> {
    let contents = read(path.as_ref())?;
    parse_config_file(&String::from_utf8_lossy(&contents))
}

/// Parse `KEY=VALUE` lines in file order.
///
/// Each line is split on its first `=` and both halves are kept verbatim:
/// no quote removal, no trimming, no variable expansion. A `#` is a comment
/// only as the first byte of a line. Lines without an `=` are skipped.
pub fn parse_environ_file(data: &[u8]) -> ConfigResult<Vec<(String, String)>> {
    let text = String::from_utf8_lossy(data);
    let pairs = text
        .split('\n')
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Ok(pairs)
}

pub fn read_environ_file(path: impl AsRef<Path>) -> ConfigResult<Vec<(String, String)>> {
    let data = read(path.as_ref())?;
    parse_environ_file(&data)
}

/// Parse a dotenv file: quoting, `export ` prefixes, inline comments and
/// `$VAR` expansion follow `dotenvy`, and any malformed line fails the file.
///
/// Expansion prefers the process environment over earlier entries of the
/// same file.
pub fn parse_dotenv_file(data: &[u8]) -> ConfigResult<Vec<(String, String)>> {
    let pairs = dotenvy::from_read_iter(data).collect::<Result<Vec<_>, _>>()?;
    Ok(pairs)
}

pub fn read_dotenv_file(path: impl AsRef<Path>) -> ConfigResult<Vec<(String, String)>> {
    let data = read(path.as_ref())?;
    parse_dotenv_file(&data)
}

fn read(path: &Path) -> ConfigResult<Vec<u8>> {
    fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

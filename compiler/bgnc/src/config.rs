//! Command-line configuration.
//!
//! Arguments are parsed by hand: the driver has a handful of flags and no
//! subcommands.

use std::path::PathBuf;

use thiserror::Error;

/// A file path, or `-` for stdin/stdout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    Std,
    Path(PathBuf),
}

impl Stream {
    fn parse(arg: &str) -> Self {
        if arg == "-" {
            Stream::Std
        } else {
            Stream::Path(PathBuf::from(arg))
        }
    }

    /// Name used in messages.
    pub fn display_name(&self) -> String {
        match self {
            Stream::Std => "<stdin>".to_string(),
            Stream::Path(p) => p.display().to_string(),
        }
    }
}

/// Everything a compilation run needs to know.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// JSON ASTs to compile, each independently.
    pub inputs: Vec<Stream>,
    /// Typed AST destination. With several inputs, a directory.
    pub output: Option<Stream>,
    /// Treat expressions left untyped as errors (exit status 2).
    pub unresolved_type_as_error: bool,
    pub no_sort: bool,
    /// Print format names in dependency order.
    pub print_order: bool,
    /// Directories searched for imports after the importing file's own.
    pub search_paths: Vec<PathBuf>,
    /// Decode and validate the inputs, nothing else.
    pub check_ast: bool,
}

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Compile(DriverConfig),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing value for `{0}`")]
    MissingValue(String),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("`{0}` takes no value")]
    UnexpectedValue(String),
    #[error("no input given")]
    NoInput,
    #[error("stdin can only be read once")]
    StdinTwice,
    #[error("writing to stdout needs exactly one input")]
    StdoutForMany,
}

/// Parse the arguments after the program name.
///
/// Options with a value accept both `--flag value` and `--flag=value`.
/// Anything not starting with `-` (and a lone `-`) is an input.
pub fn parse_args(args: &[String]) -> Result<Command, ConfigError> {
    let mut config = DriverConfig::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "-" || !arg.starts_with('-') {
            config.inputs.push(Stream::parse(arg));
            i += 1;
            continue;
        }
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg, None),
        };
        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-i" | "--input" | "-o" | "--output" | "-I" | "--search-path" => {
                let value = match inline {
                    Some(v) => v,
                    None => {
                        i += 1;
                        args.get(i)
                            .map(String::as_str)
                            .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?
                    }
                };
                match flag {
                    "-i" | "--input" => config.inputs.push(Stream::parse(value)),
                    "-o" | "--output" => config.output = Some(Stream::parse(value)),
                    _ => config.search_paths.push(PathBuf::from(value)),
                }
            }
            _ => {
                if inline.is_some() {
                    return Err(ConfigError::UnexpectedValue(flag.to_string()));
                }
                match flag {
                    "--unresolved-type-as-error" => config.unresolved_type_as_error = true,
                    "--no-sort" => config.no_sort = true,
                    "--print-order" => config.print_order = true,
                    "--check-ast" => config.check_ast = true,
                    other => return Err(ConfigError::UnknownOption(other.to_string())),
                }
            }
        }
        i += 1;
    }
    validate(&config)?;
    Ok(Command::Compile(config))
}

fn validate(config: &DriverConfig) -> Result<(), ConfigError> {
    if config.inputs.is_empty() {
        return Err(ConfigError::NoInput);
    }
    if config.inputs.iter().filter(|s| **s == Stream::Std).count() > 1 {
        return Err(ConfigError::StdinTwice);
    }
    if config.output == Some(Stream::Std) && config.inputs.len() > 1 {
        return Err(ConfigError::StdoutForMany);
    }
    Ok(())
}

#[cfg(test)]
mod tests;

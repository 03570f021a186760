use super::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

fn parse(args: &[&str]) -> Result<Command, ConfigError> {
    let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    parse_args(&args)
}

fn config(args: &[&str]) -> DriverConfig {
    match parse(args) {
        Ok(Command::Compile(c)) => c,
        other => panic!("expected a compile command, got {other:?}"),
    }
}

fn path(p: &str) -> Stream {
    Stream::Path(PathBuf::from(p))
}

// ============================================================================
// Inputs and outputs
// ============================================================================

#[test]
fn positional_arguments_are_inputs() {
    let c = config(&["a.json", "b.json"]);
    assert_eq!(c.inputs, vec![path("a.json"), path("b.json")]);
    assert_eq!(c.output, None);
}

#[test]
fn dash_reads_stdin() {
    let c = config(&["-", "-o", "-"]);
    assert_eq!(c.inputs, vec![Stream::Std]);
    assert_eq!(c.output, Some(Stream::Std));
}

#[test]
fn value_flags_accept_both_spellings() {
    let c = config(&["--input=a.json", "--output", "out.json", "-I", "lib", "--search-path=vendor"]);
    assert_eq!(c.inputs, vec![path("a.json")]);
    assert_eq!(c.output, Some(path("out.json")));
    assert_eq!(c.search_paths, vec![PathBuf::from("lib"), PathBuf::from("vendor")]);
}

#[test]
fn switches_are_recorded() {
    let c = config(&[
        "a.json",
        "--unresolved-type-as-error",
        "--no-sort",
        "--print-order",
        "--check-ast",
    ]);
    assert!(c.unresolved_type_as_error);
    assert!(c.no_sort);
    assert!(c.print_order);
    assert!(c.check_ast);
}

#[test]
fn help_wins_over_everything_else() {
    assert_eq!(parse(&["a.json", "--help", "--bogus"]), Ok(Command::Help));
    assert_eq!(parse(&["-V"]), Ok(Command::Version));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_value_is_reported() {
    assert_eq!(
        parse(&["a.json", "--output"]),
        Err(ConfigError::MissingValue("--output".to_string()))
    );
}

#[test]
fn unknown_option_is_reported() {
    assert_eq!(
        parse(&["a.json", "--fast"]),
        Err(ConfigError::UnknownOption("--fast".to_string()))
    );
}

#[test]
fn switch_with_value_is_rejected() {
    assert_eq!(
        parse(&["a.json", "--no-sort=yes"]),
        Err(ConfigError::UnexpectedValue("--no-sort".to_string()))
    );
}

#[test]
fn an_input_is_required() {
    assert_eq!(parse(&["--print-order"]), Err(ConfigError::NoInput));
}

#[test]
fn stdin_is_read_once() {
    assert_eq!(parse(&["-", "--input", "-"]), Err(ConfigError::StdinTwice));
}

#[test]
fn stdout_takes_a_single_input() {
    assert_eq!(
        parse(&["a.json", "b.json", "-o", "-"]),
        Err(ConfigError::StdoutForMany)
    );
}

//! Bgnc CLI

use std::env;

use bgnc::{parse_args, Command};

const USAGE: &str = "\
Usage: bgnc [options] <input.json>...

Reads JSON ASTs, `-` for stdin, and writes them typed.

Options:
  -i, --input <path|->         add an input
  -o, --output <path|->        output file, or directory for several inputs
  -I, --search-path <dir>      look for imports here too (repeatable)
      --unresolved-type-as-error
                               fail (exit 2) when an expression stays untyped
      --no-sort                do not order formats by dependency
      --print-order            print format names in dependency order
      --check-ast              only decode and validate the inputs
  -h, --help                   print this help
  -V, --version                print the version

Set BGN_LOG (or RUST_LOG) to a tracing filter to see the passes at work.";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return;
        }
        Ok(Command::Version) => {
            println!("bgnc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Ok(Command::Compile(config)) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };
    bgnc::init_tracing();
    std::process::exit(bgnc::run(&config));
}

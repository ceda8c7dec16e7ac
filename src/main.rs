mod ast;
mod interpreter;
mod object;
mod parser;
mod scanner;

use std::env::args;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;

use anyhow::{Context, Result};

use interpreter::{eval, new_environment};
use parser::{parse, ParseError};

fn main() -> Result<()> {
    let args = args();
    if args.len() > 2 {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all("Usage: simian [script]".as_bytes())
            .unwrap();
        std::process::exit(64);
    } else if args.len() == 2 {
        // Size is validated
        let script_path = args.skip(1).next().unwrap();
        let mut file = File::open(script_path).context("Unable to open script file")?;
        let mut script = String::new();
        file.read_to_string(&mut script)
            .context("Unable to read script file")?;
        run_script(&script);
    } else {
        run_prompt()?;
    }
    Ok(())
}

fn run_script(code: &str) {
    match parse(code) {
        Ok(program) => {
            let env = new_environment();
            let result = eval(&program, &env);
            if result.is_error() {
                eprintln!("{}", result);
                std::process::exit(70);
            }
        }
        Err(errors) => {
            let mut stderr = std::io::stderr().lock();
            report(&mut stderr, &errors);
            std::process::exit(65);
        }
    }
}

fn run_prompt() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let stdin = std::io::stdin().lock();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();
    // One environment for the whole session so bindings persist across lines
    let env = new_environment();

    loop {
        stdout.write_all("> ".as_bytes())?;
        stdout.flush()?;
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        match parse(&line) {
            Ok(program) => {
                let result = eval(&program, &env);
                writeln!(stdout, "{}", result)?;
            }
            Err(errors) => report(&mut stdout, &errors),
        }
        // Don't keep appending code until the next time
        line.clear();
    }
    Ok(())
}

fn report<W>(write: &mut W, errors: &[ParseError])
where
    W: Write,
{
    for error in errors {
        // If we can't write to our output: so be it
        _ = writeln!(write, "E {}: {}", error.pos, error.message);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::object::Object;

    // The wiring the REPL contract promises: parse errors suppress
    // evaluation, otherwise the program runs against the given environment
    #[test]
    fn test_parse_errors_suppress_evaluation() {
        let result = parse("let x = ;");
        assert!(result.is_err());
    }

    #[test]
    fn test_script_result_shape() {
        let program = parse("let greet = fn(name) { \"hello \" + name }; greet(\"world\")")
            .expect("parses");
        let env = new_environment();
        let result = eval(&program, &env);
        assert_eq!("hello world", result.to_string());
        assert!(!matches!(result, Object::Error(_)));
    }
}

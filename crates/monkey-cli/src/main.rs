use std::{
    io::{self, Write},
    process::ExitCode,
};

use monkey::{Engine, ReplSession, StdPrint, Value};

const PROMPT: &str = ">> ";

fn main() -> ExitCode {
    let mut engine = Engine::Eval;
    let mut file = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--engine" => {
                let Some(name) = args.next() else {
                    eprintln!("--engine requires a value: eval or vm");
                    return ExitCode::FAILURE;
                };
                engine = match parse_engine(&name) {
                    Some(engine) => engine,
                    None => {
                        eprintln!("unknown engine '{name}': expected eval or vm");
                        return ExitCode::FAILURE;
                    }
                };
            }
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            flag if flag.starts_with('-') => {
                eprintln!("unknown option '{flag}'");
                print_usage();
                return ExitCode::FAILURE;
            }
            path => file = Some(path.to_owned()),
        }
    }

    match file {
        Some(path) => run_file(engine, &path),
        None => run_repl(engine),
    }
}

fn parse_engine(name: &str) -> Option<Engine> {
    match name {
        "eval" => Some(Engine::Eval),
        "vm" => Some(Engine::Vm),
        _ => None,
    }
}

fn print_usage() {
    println!("usage: monkey [--engine eval|vm] [script]");
}

/// Executes a whole script as one pipeline run.
fn run_file(engine: Engine, path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error reading {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = ReplSession::new(engine);
    match session.execute(&source, &mut StdPrint) {
        Ok(value) => {
            if !matches!(value, Value::Null) {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Interactive loop: one pipeline run per line, state carried across lines.
fn run_repl(engine: Engine) -> ExitCode {
    let mut session = ReplSession::new(engine);

    loop {
        let Some(line) = read_line(PROMPT) else {
            println!();
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match session.execute(&line, &mut StdPrint) {
            Ok(value) => {
                if !matches!(value, Value::Null) {
                    println!("{value}");
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    ExitCode::SUCCESS
}

/// Reads one line from stdin after printing a prompt.
///
/// Returns `None` on EOF (Ctrl+D).
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return None;
    }
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).ok()?;
    if read == 0 {
        return None;
    }
    Some(input.trim_end_matches(['\r', '\n']).to_owned())
}

//! Demonstration front end for the argot engine
//!
//! Builds a small argument set, evaluates the real command line against it,
//! and prints the resulting destination state plus the introspection
//! listing. Also shows the intended error contract: failures are caught by
//! kind, printed, and turned into a non-zero exit status. The engine
//! itself never exits or logs.
//!
//! ```text
//! argot-inspect -n 3 --mode FAST -t a,b --pair 1,one;2,two in.txt --json
//! ```

use argot::check::{range, values};
use argot::constraint::mutually_exclusive;
use argot::format::lowercase;
use argot::value::{map, scalar, sequence, Handle};
use argot::{ArgRegistry, ParseError, SetupError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::rc::Rc;

struct Destinations {
    count: Handle<i32>,
    mode: Handle<String>,
    tags: Handle<Vec<String>>,
    pairs: Handle<BTreeMap<i32, String>>,
    files: Handle<Vec<String>>,
    json: Handle<bool>,
    quiet: Handle<bool>,
}

impl Destinations {
    fn new() -> Self {
        Destinations {
            count: Rc::new(RefCell::new(1)),
            mode: Rc::new(RefCell::new("slow".to_string())),
            tags: Rc::new(RefCell::new(Vec::new())),
            pairs: Rc::new(RefCell::new(BTreeMap::new())),
            files: Rc::new(RefCell::new(Vec::new())),
            json: Rc::new(RefCell::new(false)),
            quiet: Rc::new(RefCell::new(false)),
        }
    }
}

fn build_registry(dest: &Destinations) -> Result<ArgRegistry, SetupError> {
    let mut args = ArgRegistry::new();
    args.enable_help()?;

    args.add("n,count", scalar(dest.count.clone()), "repetition count")?
        .add_check(range(1.0, 100.0))?;
    args.add("m,mode", scalar(dest.mode.clone()), "run mode")?
        .add_format(lowercase())?
        .add_check(values(["fast", "slow"]))?;
    args.add("t,tag", sequence(dest.tags.clone()), "tags to attach")?
        .set_unique_data()?
        .set_sort_data()?;
    args.add("pair", map(dest.pairs.clone()), "numbered labels")?;
    args.add("-", sequence(dest.files.clone()), "input files")?;
    args.add("j,json", scalar(dest.json.clone()), "print the report as JSON")?;
    args.add("q,quiet", scalar(dest.quiet.clone()), "suppress the state dump")?;
    args.add_constraint(mutually_exclusive("json;quiet"))?;

    Ok(args)
}

fn run() -> Result<(), ExitCode> {
    let dest = Destinations::new();
    let mut args = build_registry(&dest).map_err(|err| {
        eprintln!("argot-inspect: setup error: {err}");
        ExitCode::from(70)
    })?;

    if let Err(err) = args.parse() {
        // Discriminate by kind, the way callers of the engine are meant to.
        let code = match err {
            ParseError::TypeMismatch { .. } => 3,
            ParseError::Check(_) => 4,
            ParseError::Constraint(_) => 5,
            ParseError::MissingMandatory(_) => 6,
            _ => 2,
        };
        eprintln!("argot-inspect: {err}");
        return Err(ExitCode::from(code));
    }

    if args.help_requested() {
        println!("usage: argot-inspect [options] [files...]");
        println!("{}", args.list_arguments(false));
        return Ok(());
    }

    if *dest.json.borrow() {
        match args.report_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("argot-inspect: report serialization failed: {err}");
                return Err(ExitCode::from(74));
            }
        }
        return Ok(());
    }

    if !*dest.quiet.borrow() {
        println!("count : {}", dest.count.borrow());
        println!("mode  : {}", dest.mode.borrow());
        println!("tags  : {:?}", dest.tags.borrow());
        println!("pairs : {:?}", dest.pairs.borrow());
        println!("files : {:?}", dest.files.borrow());
        println!();
        println!("{}", args.list_arguments(false));
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

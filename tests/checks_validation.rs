//! Integration tests for the check chain and value conversion
//!
//! Range boundaries, enumerated values, length and pattern checks,
//! conflicting-check setup errors, type mismatches in attached and
//! separated token forms, and filesystem predicates against both the mock
//! provider and a real temporary directory.

use argot::check::{
    exists, is_absolute, is_directory, length, lower, pattern, predicate, range, size_at_least,
    upper, values, OsFileInfo,
};
use argot::format::{lowercase, uppercase};
use argot::testing::MockFileInfo;
use argot::value::{scalar, sequence, Handle};
use argot::{ArgRegistry, ParseError, SetupError};
use rstest::rstest;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

fn int_arg_with_range(min: f64, max: f64) -> (ArgRegistry, Handle<i32>) {
    let dest: Handle<i32> = Rc::new(RefCell::new(0));
    let mut args = ArgRegistry::new();
    args.add("n", scalar(dest.clone()), "a number")
        .unwrap()
        .add_check(range(min, max))
        .unwrap();
    (args, dest)
}

#[rstest]
#[case("10", true)]
#[case("99", true)]
#[case("50", true)]
#[case("5", false)]
#[case("100", false)]
#[case("9", false)]
fn test_range_boundaries(#[case] value: &str, #[case] accepted: bool) {
    let (mut args, dest) = int_arg_with_range(10.0, 100.0);
    let result = args.parse_tokens(&["-n", value]);
    if accepted {
        result.unwrap();
        assert_eq!(dest.borrow().to_string(), value);
    } else {
        match result.unwrap_err() {
            ParseError::Check(violation) => {
                assert_eq!(violation.value, value);
                assert_eq!(violation.category, argot::check::CheckCategory::Bounds);
            }
            other => panic!("expected bounds violation, got {other:?}"),
        }
    }
}

#[rstest]
#[case(&["-i", "3.5"])]
#[case(&["-i3.5"])]
#[case(&["-i", "myName"])]
#[case(&["-imyName"])]
#[case(&["--int=3.5"])]
fn test_integer_type_mismatch(#[case] tokens: &[&str]) {
    let dest: Handle<i32> = Rc::new(RefCell::new(0));
    let mut args = ArgRegistry::new();
    args.add("i,int", scalar(dest), "an integer").unwrap();

    match args.parse_tokens(tokens).unwrap_err() {
        ParseError::TypeMismatch { name, expected, .. } => {
            assert_eq!(name, "--int");
            assert_eq!(expected, "integer");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
}

#[test]
fn test_conflicting_bound_checks_fail_at_setup() {
    let dest: Handle<i32> = Rc::new(RefCell::new(0));
    let mut args = ArgRegistry::new();
    let spec = args.add("n", scalar(dest), "a number").unwrap();
    spec.add_check(lower(1.0)).unwrap();

    let err = spec.add_check(lower(5.0)).unwrap_err();
    assert!(matches!(err, SetupError::ConflictingCheck { .. }));
    let err = spec.add_check(range(1.0, 9.0)).unwrap_err();
    assert!(matches!(err, SetupError::ConflictingCheck { .. }));
    let err = spec.add_check(upper(9.0)).unwrap_err();
    assert!(matches!(err, SetupError::ConflictingCheck { .. }));
}

#[test]
fn test_conflicting_values_checks_fail_at_setup() {
    let dest: Handle<String> = Rc::new(RefCell::new(String::new()));
    let mut args = ArgRegistry::new();
    let spec = args.add("c", scalar(dest), "a choice").unwrap();
    spec.add_check(values(["a", "b"])).unwrap();

    let err = spec.add_check(values(["c"])).unwrap_err();
    assert!(matches!(err, SetupError::ConflictingCheck { .. }));
}

#[test]
fn test_stackable_checks_run_in_order() {
    let dest: Handle<String> = Rc::new(RefCell::new(String::new()));
    let mut args = ArgRegistry::new();
    args.add("w", scalar(dest), "a word")
        .unwrap()
        .add_check(length(2, 4))
        .unwrap()
        .add_check(pattern("^[a-z]+$").unwrap())
        .unwrap();

    // Too long: the length check fires first and the pattern check never
    // runs, so the reported category is length.
    match args.parse_tokens(&["-w", "TOOLONG"]).unwrap_err() {
        ParseError::Check(violation) => {
            assert_eq!(violation.category, argot::check::CheckCategory::Length);
        }
        other => panic!("expected length violation, got {other:?}"),
    }

    // Right length, wrong shape: now the pattern check fires.
    match args.parse_tokens(&["-w", "ABC"]).unwrap_err() {
        ParseError::Check(violation) => {
            assert_eq!(violation.category, argot::check::CheckCategory::Pattern);
        }
        other => panic!("expected pattern violation, got {other:?}"),
    }

    args.parse_tokens(&["-w", "abc"]).unwrap();
}

#[test]
fn test_enumerated_values_after_case_folding() {
    let dest: Handle<String> = Rc::new(RefCell::new(String::new()));
    let mut args = ArgRegistry::new();
    args.add("m,mode", scalar(dest.clone()), "run mode")
        .unwrap()
        .add_format(lowercase())
        .unwrap()
        .add_check(values(["fast", "slow"]))
        .unwrap();

    // The formatter runs before the check, so FAST is accepted.
    args.parse_tokens(&["--mode", "FAST"]).unwrap();
    assert_eq!(*dest.borrow(), "fast");

    let err = args.parse_tokens(&["--mode", "medium"]).unwrap_err();
    match err {
        ParseError::Check(violation) => {
            assert_eq!(
                violation.category,
                argot::check::CheckCategory::EnumeratedValues
            );
        }
        other => panic!("expected enumerated-values violation, got {other:?}"),
    }
}

#[test]
fn test_formatter_applies_per_element() {
    let dest: Handle<Vec<String>> = Rc::new(RefCell::new(Vec::new()));
    let mut args = ArgRegistry::new();
    args.add("t", sequence(dest.clone()), "tags")
        .unwrap()
        .add_format(uppercase())
        .unwrap();

    args.parse_tokens(&["-t", "one,two"]).unwrap();
    assert_eq!(*dest.borrow(), vec!["ONE", "TWO"]);
}

#[test]
fn test_custom_predicate() {
    let dest: Handle<i32> = Rc::new(RefCell::new(0));
    let mut args = ArgRegistry::new();
    args.add("e", scalar(dest), "an even number")
        .unwrap()
        .add_check(predicate("even", |s| {
            let n: i32 = s.parse().map_err(|_| "not a number".to_string())?;
            if n % 2 == 0 {
                Ok(())
            } else {
                Err(format!("{n} is odd"))
            }
        }))
        .unwrap();

    args.parse_tokens(&["-e", "4"]).unwrap();
    let err = args.parse_tokens(&["-e", "5"]).unwrap_err();
    match err {
        ParseError::Check(violation) => assert_eq!(violation.detail, "5 is odd"),
        other => panic!("expected custom violation, got {other:?}"),
    }
}

#[test]
fn test_filesystem_checks_with_mock_provider() {
    let mock = MockFileInfo::new();
    mock.add_directory("/work");
    mock.add_file("/work/input.csv", 2_048);
    let provider = Rc::new(mock);

    let dir: Handle<PathBuf> = Rc::new(RefCell::new(PathBuf::new()));
    let file: Handle<PathBuf> = Rc::new(RefCell::new(PathBuf::new()));
    let mut args = ArgRegistry::new();
    args.add("d,dir", scalar(dir.clone()), "working directory")
        .unwrap()
        .add_check(is_directory(provider.clone()))
        .unwrap()
        .add_check(is_absolute(provider.clone()))
        .unwrap();
    args.add("f,file", scalar(file.clone()), "input file")
        .unwrap()
        .add_check(exists(provider.clone()))
        .unwrap()
        .add_check(size_at_least(provider.clone(), 1_024))
        .unwrap();

    args.parse_tokens(&["-d", "/work", "-f", "/work/input.csv"])
        .unwrap();
    assert_eq!(*dir.borrow(), PathBuf::from("/work"));

    let err = args
        .parse_tokens(&["-d", "/work/input.csv"])
        .unwrap_err();
    match err {
        ParseError::Check(violation) => {
            assert_eq!(violation.category, argot::check::CheckCategory::Filesystem);
            assert!(violation.detail.contains("not a directory"));
        }
        other => panic!("expected filesystem violation, got {other:?}"),
    }
}

#[test]
fn test_filesystem_checks_against_real_tempdir() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("real.txt");
    std::fs::write(&file_path, b"0123456789").unwrap();
    let provider = Rc::new(OsFileInfo);

    let dest: Handle<PathBuf> = Rc::new(RefCell::new(PathBuf::new()));
    let mut args = ArgRegistry::new();
    args.add("f", scalar(dest.clone()), "input file")
        .unwrap()
        .add_check(exists(provider.clone()))
        .unwrap()
        .add_check(size_at_least(provider, 10))
        .unwrap();

    let token = file_path.to_string_lossy().to_string();
    args.parse_tokens(&["-f", &token]).unwrap();
    assert_eq!(*dest.borrow(), file_path);

    let missing = tmp.path().join("missing.txt").to_string_lossy().to_string();
    let err = args.parse_tokens(&["-f", &missing]).unwrap_err();
    assert!(matches!(err, ParseError::Check(_)));
}

#[test]
fn test_bad_pattern_fails_before_parsing() {
    let err = pattern("[unclosed").unwrap_err();
    assert!(matches!(err, SetupError::BadPattern { .. }));
}

#[test]
fn test_numeric_check_on_non_number_is_type_mismatch() {
    let dest: Handle<String> = Rc::new(RefCell::new(String::new()));
    let mut args = ArgRegistry::new();
    args.add("n", scalar(dest), "numeric string")
        .unwrap()
        .add_check(range(0.0, 10.0))
        .unwrap();

    let err = args.parse_tokens(&["-n", "abc"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::TypeMismatch {
            name: "-n".to_string(),
            value: "abc".to_string(),
            expected: "number",
        }
    );
}

#[test]
fn test_failed_check_leaves_earlier_assignments() {
    let dest: Handle<Vec<i32>> = Rc::new(RefCell::new(Vec::new()));
    let mut args = ArgRegistry::new();
    args.add("i", sequence(dest.clone()), "numbers")
        .unwrap()
        .add_check(range(0.0, 100.0))
        .unwrap();

    // The first usage succeeds, the second fails; no rollback happens.
    let err = args.parse_tokens(&["-i", "10", "-i", "500"]).unwrap_err();
    assert!(matches!(err, ParseError::Check(_)));
    assert_eq!(*dest.borrow(), vec![10]);
}

use std::path::PathBuf;

use clap::Parser;
use flaketrace::cli::{Cli, Commands};

#[test]
fn test_parse_analyze() {
    let cli = Cli::try_parse_from(vec!["flaketrace", "analyze", "target/runs"]).unwrap();

    assert!(!cli.json);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Analyze(args) => {
            assert_eq!(args.dir, PathBuf::from("target/runs"));
            assert!(args.thread_dump.is_none());
            assert!(args.output_dir.is_none());
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_analyze_with_options() {
    let cli = Cli::try_parse_from(vec![
        "flaketrace",
        "analyze",
        "runs",
        "--thread-dump",
        "dump.json",
        "--output-dir",
        "out",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Analyze(args) => {
            assert_eq!(args.thread_dump, Some(PathBuf::from("dump.json")));
            assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_deadlocks() {
    let cli = Cli::try_parse_from(vec!["flaketrace", "--json", "deadlocks", "jstack.json"]).unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Deadlocks(args) => assert_eq!(args.dump, PathBuf::from("jstack.json")),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_classify_repeated_messages() {
    let cli = Cli::try_parse_from(vec![
        "flaketrace",
        "classify",
        "com.example.FooTest.testBar",
        "-m",
        "Timeout after 5s",
        "--message",
        "second attempt",
    ])
    .unwrap();

    match cli.command {
        Commands::Classify(args) => {
            assert_eq!(args.test, "com.example.FooTest.testBar");
            assert_eq!(args.messages, vec!["Timeout after 5s", "second attempt"]);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_global_config_and_verbosity() {
    let cli = Cli::try_parse_from(vec![
        "flaketrace",
        "classify",
        "FooTest",
        "--config",
        "ci.yaml",
        "-vv",
    ])
    .unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    assert_eq!(cli.verbose, 2);
}

#[test]
fn test_missing_subcommand_fails() {
    assert!(Cli::try_parse_from(vec!["flaketrace"]).is_err());
}

#[test]
fn test_analyze_requires_directory() {
    assert!(Cli::try_parse_from(vec!["flaketrace", "analyze"]).is_err());
}

use super::*;

#[test]
fn parse_expr_command() {
    let cli = Cli::try_parse_from(["loam", "expr", "tree.json"]).expect("cli parse should succeed");
    assert_eq!(
        cli.command,
        Command::Expr {
            input: PathBuf::from("tree.json"),
        }
    );
    assert!(!cli.dump_before);
    assert_eq!(cli.config, None);
}

#[test]
fn parse_ssa_command_with_flags_after_input() {
    let cli = Cli::try_parse_from([
        "loam",
        "ssa",
        "block.json",
        "--no-inline",
        "--dump-before",
        "--config",
        "loam.json",
    ])
    .expect("cli parse should succeed");
    assert_eq!(
        cli.command,
        Command::Ssa {
            input: PathBuf::from("block.json"),
        }
    );
    assert!(cli.no_inline);
    assert!(cli.dump_before);
    assert_eq!(cli.config, Some(PathBuf::from("loam.json")));
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["loam"]).is_err());
}

#[test]
fn switches_only_turn_passes_off() {
    let cli = Cli::try_parse_from(["loam", "ssa", "b.json", "--no-sweep", "--no-verify"])
        .expect("cli parse should succeed");
    let mut config = OptimizerConfig {
        inline: false,
        ..OptimizerConfig::default()
    };
    apply_overrides(&mut config, &cli);
    assert!(config.deadcode);
    assert!(!config.sweep);
    assert!(!config.inline);
    assert!(!config.verify);
}

#[test]
fn missing_config_file_is_an_error() {
    let cli = Cli::try_parse_from([
        "loam",
        "expr",
        "tree.json",
        "--config",
        "/nonexistent/loam-config.json",
    ])
    .expect("cli parse should succeed");
    let err = load_config(&cli).expect_err("missing config should fail");
    assert!(matches!(err, LoamError::Io { .. }), "{err}");
}

use super::*;

#[test]
fn no_command_defaults_to_none() {
    let cli = Cli::try_parse_from(["vaxfinder"]).expect("expected valid cli args");

    assert!(cli.command.is_none());
    assert!(cli.search.is_none());
}

#[test]
fn parses_once_command() {
    let cli = Cli::try_parse_from(["vaxfinder", "once"]).expect("expected valid cli args");

    assert!(matches!(cli.command, Some(Commands::Once)));
}

#[test]
fn search_override_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["vaxfinder", "plan", "--search", "alt.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(cli.command, Some(Commands::Plan)));
    assert_eq!(cli.search, Some(PathBuf::from("alt.yaml")));
}

#[test]
fn rejects_unknown_command() {
    assert!(Cli::try_parse_from(["vaxfinder", "book"]).is_err());
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mailpilot",
    version,
    about = "Send documents through a script-hosted mail backend"
)]
pub struct Cli {
    /// Read and write the configuration in this directory instead of the
    /// platform locations.
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend answers.
    Test,
    /// List templates.
    Templates,
    /// List recipients.
    Recipients,
    /// List signatures.
    Signatures,
    /// Show backend settings.
    Settings,
    /// Show or change the local configuration.
    Config(ConfigCmd),
    /// Show which recipient and template each file name selects.
    Match(MatchArgs),
    /// Send a message after the safety check.
    Send(SendArgs),
}

#[derive(Args, Debug)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Set(ConfigSet),
}

#[derive(Args, Debug, Default)]
pub struct ConfigSet {
    #[arg(long)]
    pub gas_url: Option<String>,
    #[arg(long)]
    pub signature: Option<String>,
    #[arg(long)]
    pub auth_id: Option<String>,
    #[arg(long)]
    pub auth_pw: Option<String>,
    /// Corporate suffix ignored by the safety check; repeat for several.
    #[arg(long = "suffix")]
    pub suffixes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination address; defaults to the recipient's email.
    #[arg(long)]
    pub to: Option<String>,
    /// Subject; overrides the template's subject.
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long, conflicts_with = "template")]
    pub body: Option<String>,
    /// Template id or name.
    #[arg(long)]
    pub template: Option<String>,
    /// Recipient id or name; defaults to a match on the first attachment.
    #[arg(long)]
    pub recipient: Option<String>,
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,
    /// Send even when the safety check reports warnings.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "mailpilot",
            "send",
            "--recipient",
            "12",
            "--attach",
            "a.pdf",
            "--attach",
            "b.pdf",
            "--force",
        ])
        .unwrap();

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.recipient.as_deref(), Some("12"));
        assert_eq!(args.attachments, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
        assert!(args.force);
        assert!(args.to.is_none());
    }

    #[test]
    fn test_body_conflicts_with_template() {
        let err = Cli::try_parse_from([
            "mailpilot", "send", "--body", "hi", "--template", "quote",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_match_requires_files() {
        assert!(Cli::try_parse_from(["mailpilot", "match"]).is_err());
    }

    #[test]
    fn test_config_dir_is_global() {
        let cli = Cli::try_parse_from(["mailpilot", "config", "show", "--config-dir", "/tmp/mp"])
            .unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/mp")));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCmd {
                command: ConfigCommand::Show
            })
        ));
    }

    #[test]
    fn test_config_set_suffixes() {
        let cli = Cli::try_parse_from([
            "mailpilot",
            "config",
            "set",
            "--suffix",
            "Inc.",
            "--suffix",
            "Ltd.",
        ])
        .unwrap();
        let Command::Config(ConfigCmd {
            command: ConfigCommand::Set(set),
        }) = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(set.suffixes, vec!["Inc.", "Ltd."]);
        assert!(set.gas_url.is_none());
    }
}

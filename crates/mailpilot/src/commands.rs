//! Subcommand handlers.

use anyhow::{Context, Result, bail};
use mailpilot_core::template::append_signature;
use mailpilot_core::{Config, ConfigPaths, Draft, MailPilot, read_attachment};
use mailpilot_remote::{Attachment, Recipient, Template};

use crate::cli::{Cli, Command, ConfigCommand, ConfigSet, MatchArgs, SendArgs};

pub async fn run(cli: Cli) -> Result<()> {
    let paths = cli
        .config_dir
        .map_or_else(ConfigPaths::discover, ConfigPaths::in_dir);
    let env_url = std::env::var(mailpilot_core::config::GAS_URL_ENV).ok();
    let config = Config::load(&paths, env_url).await;
    let mut service = MailPilot::new(config, paths)?;

    match cli.command {
        Command::Test => test(&service).await,
        Command::Templates => {
            for t in service.templates().await? {
                println!("{}\t{}\t{}", t.id, t.name, t.subject);
            }
            Ok(())
        }
        Command::Recipients => {
            for r in service.recipients().await? {
                println!("{}\t{}\t{}\t{}", r.id, r.name, r.company, r.email);
            }
            Ok(())
        }
        Command::Signatures => {
            for s in service.signatures().await? {
                println!("[{}]\n{}\n", s.name, s.content);
            }
            Ok(())
        }
        Command::Settings => {
            let settings = service.settings().await;
            let mut keys: Vec<_> = settings.settings.iter().collect();
            keys.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in keys {
                println!("{key} = {value}");
            }
            println!("signature:\n{}", settings.signature);
            Ok(())
        }
        Command::Config(cmd) => match cmd.command {
            ConfigCommand::Show => {
                let config = service.config();
                println!("gas_url = {}", config.gas_url);
                println!("basic_auth_id = {}", config.basic_auth_id);
                println!(
                    "basic_auth_pw = {}",
                    if config.basic_auth_pw.is_empty() { "" } else { "********" }
                );
                println!("corporate_suffixes = {:?}", config.safety_rules().corporate_suffixes());
                println!("signature:\n{}", config.signature);
                Ok(())
            }
            ConfigCommand::Set(set) => {
                let updated = apply_config_set(service.config(), set);
                service.update_config(updated).await?;
                println!("Settings saved");
                Ok(())
            }
        },
        Command::Match(args) => match_files(&service, &args).await,
        Command::Send(args) => send(&service, args).await,
    }
}

async fn test(service: &MailPilot) -> Result<()> {
    let probe = service.test_connection().await;
    if probe.success {
        println!("OK: {}", probe.message);
        Ok(())
    } else {
        bail!("connection failed: {}", probe.error)
    }
}

fn apply_config_set(current: &Config, set: ConfigSet) -> Config {
    let mut config = current.clone();
    if let Some(url) = set.gas_url {
        config.gas_url = url;
    }
    if let Some(signature) = set.signature {
        config.signature = signature;
    }
    if let Some(id) = set.auth_id {
        config.basic_auth_id = id;
    }
    if let Some(pw) = set.auth_pw {
        config.basic_auth_pw = pw;
    }
    if !set.suffixes.is_empty() {
        config.corporate_suffixes = set.suffixes;
    }
    config
}

async fn match_files(service: &MailPilot, args: &MatchArgs) -> Result<()> {
    let recipients = service.recipients().await?;
    let templates = service.templates().await?;

    for path in &args.files {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let recipient = service
            .match_recipient(&name, &recipients)
            .map_or_else(|| "-".to_string(), |r| format!("{} ({})", r.name, r.company));
        let template = service
            .match_template(&name, &templates)
            .map_or("-", |t| t.name.as_str());
        println!("{name}\trecipient: {recipient}\ttemplate: {template}");
    }
    Ok(())
}

/// Finds a recipient by exact id, then by exact name.
fn find_recipient<'a>(recipients: &'a [Recipient], key: &str) -> Option<&'a Recipient> {
    recipients
        .iter()
        .find(|r| r.id == key)
        .or_else(|| recipients.iter().find(|r| r.name == key))
}

/// Finds a template by exact id, then by exact name.
fn find_template<'a>(templates: &'a [Template], key: &str) -> Option<&'a Template> {
    templates
        .iter()
        .find(|t| t.id == key)
        .or_else(|| templates.iter().find(|t| t.name == key))
}

/// Chooses the template: explicit key, then the recipient's linked template,
/// then a file-name match on the first attachment.
fn choose_template<'a>(
    service: &MailPilot,
    templates: &'a [Template],
    key: Option<&str>,
    recipient: Option<&Recipient>,
    attachments: &[Attachment],
) -> Result<Option<&'a Template>> {
    if let Some(key) = key {
        return find_template(templates, key)
            .map(Some)
            .with_context(|| format!("no template with id or name {key:?}"));
    }
    if let Some(linked) = recipient
        .filter(|r| !r.template_id.is_empty())
        .and_then(|r| templates.iter().find(|t| t.id == r.template_id))
    {
        return Ok(Some(linked));
    }
    Ok(attachments
        .first()
        .and_then(|a| service.match_template(&a.file_name, templates)))
}

async fn send(service: &MailPilot, args: SendArgs) -> Result<()> {
    let mut attachments = Vec::with_capacity(args.attachments.len());
    for path in &args.attachments {
        let attachment = read_attachment(path)
            .await
            .with_context(|| format!("cannot attach {}", path.display()))?;
        attachments.push(attachment);
    }

    let recipients = service.recipients().await?;
    let recipient = match args.recipient.as_deref() {
        Some(key) => Some(
            find_recipient(&recipients, key)
                .with_context(|| format!("no recipient with id or name {key:?}"))?,
        ),
        None => attachments
            .first()
            .and_then(|a| service.match_recipient(&a.file_name, &recipients)),
    };

    let signature = service.settings().await.signature;
    let draft = if let Some(body) = args.body.as_deref() {
        Draft {
            subject: String::new(),
            body: append_signature(&service.apply_template_variables(body, recipient), &signature),
        }
    } else {
        let templates = service.templates().await?;
        let template = choose_template(
            service,
            &templates,
            args.template.as_deref(),
            recipient,
            &attachments,
        )?
        .context("no body given and no template matched; pass --body or --template")?;
        Draft::from_template(template, recipient, &signature)
    };

    let subject = match args.subject.as_deref() {
        Some(subject) => service.apply_template_variables(subject, recipient),
        None => draft.subject,
    };
    if subject.is_empty() {
        bail!("subject is empty; pass --subject or use a template");
    }

    let to = args
        .to
        .or_else(|| recipient.map(|r| r.email.clone()))
        .filter(|to| !to.trim().is_empty())
        .context("no destination address; pass --to or --recipient")?;

    let warnings = service.validate_send_safety(recipient, &attachments, &draft.body);
    if !warnings.is_empty() {
        for warning in &warnings {
            eprintln!("warning: {warning}");
        }
        if !args.force {
            bail!(
                "sending blocked by {} safety warning(s); re-run with --force to send anyway",
                warnings.len()
            );
        }
        tracing::warn!("Sending despite {} safety warning(s)", warnings.len());
    }

    let response = service
        .send_mail(&to, &subject, &draft.body, &attachments)
        .await?;
    if !response.success {
        tracing::warn!("Backend accepted the send without confirming success");
    }
    tracing::info!("Mail sent to {to} with {} attachment(s)", attachments.len());
    println!("Sent to {to}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipient(id: &str, name: &str, template_id: &str) -> Recipient {
        Recipient {
            id: id.to_string(),
            name: name.to_string(),
            company: "ABC商事".to_string(),
            email: format!("{id}@example.com"),
            template_id: template_id.to_string(),
        }
    }

    fn template(id: &str, name: &str) -> Template {
        Template {
            id: id.to_string(),
            name: name.to_string(),
            subject: format!("{name} for {{{{company}}}}"),
            ..Template::default()
        }
    }

    fn offline_service() -> MailPilot {
        MailPilot::new(Config::default(), ConfigPaths::default()).unwrap()
    }

    #[test]
    fn test_find_recipient_prefers_id() {
        let recipients = vec![recipient("1", "2", ""), recipient("2", "Suzuki", "")];
        assert_eq!(find_recipient(&recipients, "2").unwrap().name, "Suzuki");
        assert_eq!(find_recipient(&recipients, "Suzuki").unwrap().id, "2");
        assert!(find_recipient(&recipients, "Tanaka").is_none());
    }

    #[test]
    fn test_choose_template_order() {
        let service = offline_service();
        let templates = vec![template("t1", "見積書"), template("t2", "請求書")];
        let linked = recipient("1", "Sato", "t2");
        let files = vec![Attachment::new("/x/見積書_ABC.pdf", "見積書_ABC.pdf", "", "application/pdf")];

        let explicit = choose_template(&service, &templates, Some("見積書"), Some(&linked), &files)
            .unwrap()
            .unwrap();
        assert_eq!(explicit.id, "t1");

        let by_link = choose_template(&service, &templates, None, Some(&linked), &files)
            .unwrap()
            .unwrap();
        assert_eq!(by_link.id, "t2");

        let by_file = choose_template(&service, &templates, None, None, &files)
            .unwrap()
            .unwrap();
        assert_eq!(by_file.id, "t1");

        assert!(choose_template(&service, &templates, Some("missing"), None, &files).is_err());
        assert!(choose_template(&service, &templates, None, None, &[]).unwrap().is_none());
    }

    #[test]
    fn test_apply_config_set_keeps_unset_fields() {
        let current = Config {
            gas_url: "https://a.example/exec".to_string(),
            signature: "sig".to_string(),
            ..Config::default()
        };
        let updated = apply_config_set(
            &current,
            ConfigSet {
                auth_id: Some("id".to_string()),
                suffixes: vec!["Inc.".to_string()],
                ..ConfigSet::default()
            },
        );
        assert_eq!(updated.gas_url, "https://a.example/exec");
        assert_eq!(updated.signature, "sig");
        assert_eq!(updated.basic_auth_id, "id");
        assert_eq!(updated.corporate_suffixes, vec!["Inc."]);
    }

    async fn start_backend() -> String {
        use axum::Router;
        use axum::routing::get;

        let app = Router::new().route(
            "/exec",
            get(|| async { r#"{"success":true}"# }).post(|| async { "{}" }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{port}/exec")
    }

    #[tokio::test]
    async fn test_send_without_success_flag_is_not_an_error() {
        let config = Config {
            gas_url: start_backend().await,
            ..Config::default()
        };
        let service = MailPilot::new(config, ConfigPaths::default()).unwrap();

        send(
            &service,
            SendArgs {
                to: Some("a@example.com".to_string()),
                subject: Some("s".to_string()),
                body: Some("b".to_string()),
                template: None,
                recipient: None,
                attachments: Vec::new(),
                force: true,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_send_requires_configuration() {
        let err = send(
            &offline_service(),
            SendArgs {
                to: Some("a@example.com".to_string()),
                subject: Some("s".to_string()),
                body: Some("b".to_string()),
                template: None,
                recipient: None,
                attachments: Vec::new(),
                force: false,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("GAS URL is not configured"));
    }
}

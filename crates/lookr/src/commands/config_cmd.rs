//! Config subcommand handlers.

use std::fmt::Write;

use crate::cli::{ConfigArgs, ConfigCommand, InitArgs};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string());
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(&format_config_redacted(&cfg));
            Ok(())
        }
        ConfigCommand::Init(init) => {
            let mut cfg = config::load_config()?;
            let name = init.name.clone();
            apply_init(&mut cfg, init)?;
            config::save_config(&cfg)?;
            output::print_output(&format!(
                "saved profile '{name}' to {}",
                config::config_path().display()
            ));
            Ok(())
        }
    }
}

fn apply_init(cfg: &mut Config, init: InitArgs) -> Result<(), CliError> {
    url::Url::parse(&init.url).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL {:?}: {e}", init.url),
    })?;

    let profile = Profile {
        base_url: init.url,
        client_id: init.client_id,
        client_secret_env: init.client_secret_env,
        access_token_env: init.access_token_env,
        ..Profile::default()
    };
    if init.set_default || cfg.profiles.is_empty() {
        cfg.default_profile = Some(init.name.clone());
    }
    cfg.profiles.insert(init.name, profile);
    Ok(())
}

/// Format config for display, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "api_version = \"{}\"", cfg.defaults.api_version);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        if let Some(ref v) = p.api_version {
            let _ = writeln!(out, "api_version = \"{v}\"");
        }
        if let Some(ref id) = p.client_id {
            let _ = writeln!(out, "client_id = \"{id}\"");
        }
        if p.client_secret.is_some() {
            let _ = writeln!(out, "client_secret = \"****\"");
        }
        if let Some(ref env) = p.client_secret_env {
            let _ = writeln!(out, "client_secret_env = \"{env}\"");
        }
        if p.access_token.is_some() {
            let _ = writeln!(out, "access_token = \"****\"");
        }
        if let Some(ref env) = p.access_token_env {
            let _ = writeln!(out, "access_token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

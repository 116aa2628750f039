use swi_domain::config::{ClientConfig, ConfigError, ConfigSeverity};

/// Check the loaded config and that a password can actually be resolved
/// in this environment, printing one line per issue.
///
/// Returns `false` when any error is found.
pub fn validate(config: &ClientConfig, config_path: &str) -> bool {
    let password_resolves = config.resolve_password().is_ok();
    let (lines, ok) = report(config, config_path, password_resolves);
    for line in lines {
        println!("{line}");
    }
    ok
}

fn report(config: &ClientConfig, config_path: &str, password_resolves: bool) -> (Vec<String>, bool) {
    let mut issues = config.validate();
    // The static checks only cover an empty `password_env`.
    if !password_resolves && config.password.is_none() && !config.password_env.is_empty() {
        issues.push(ConfigError {
            severity: ConfigSeverity::Error,
            field: "password_env".into(),
            message: format!("env var {} is not set", config.password_env),
        });
    }
    issues.sort_by_key(|issue| issue.severity != ConfigSeverity::Error);

    let errors = issues
        .iter()
        .filter(|issue| issue.severity == ConfigSeverity::Error)
        .count();
    let mut lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
    lines.push(if issues.is_empty() {
        format!("{config_path}: ok, logging in as {} at {}", config.email, config.base_url)
    } else {
        format!(
            "{config_path}: {errors} error(s), {} warning(s)",
            issues.len() - errors
        )
    });
    (lines, errors == 0)
}

/// Dump the resolved config (with all defaults filled in) as TOML.
/// A configured password is masked.
pub fn show(config: &ClientConfig) -> anyhow::Result<()> {
    let mut masked = config.clone();
    if masked.password.is_some() {
        masked.password = Some("********".into());
    }
    let output = toml::to_string_pretty(&masked)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{output}");
    Ok(())
}

use quarry_config::QuarryConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &QuarryConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &QuarryConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.reasoning.is_configured() {
        warnings.push(
            "Reasoning service has no base URL or model; questions will fall back to documents."
                .to_string(),
        );
    }

    for (section, example) in [
        ("QUARRY_REASONING", "QUARRY_REASONING__MODEL"),
        ("QUARRY_CACHE", "QUARRY_CACHE__ANSWER_TTL_SECS"),
        ("QUARRY_ACCESS", "QUARRY_ACCESS__ADMIN_ROLE"),
        ("QUARRY_ROUTING", "QUARRY_ROUTING__INCONCLUSIVE_ROUTE"),
        ("QUARRY_LAKE", "QUARRY_LAKE__PATH"),
    ] {
        let single_underscore = env_keys
            .iter()
            .any(|key| key.starts_with(section) && !key.starts_with(&format!("{section}__")));
        if single_underscore {
            warnings.push(format!(
                "{section}* env vars exist without a double underscore and are ignored (example: {example})."
            ));
        }
    }

    warnings
}

//! Step resolution and config write-back.
//!
//! - [`resolve_step`] accepts either a 1-based step number or a step id.
//! - [`set_config_value`] uses `toml_edit` to change one `section.key`
//!   in the config file without disturbing comments or formatting.

use anyhow::{Context, Result, bail};

use waymark_store::{Project, ProjectStep};

use crate::config::{self, ConfigFile};

/// Find a step by 1-based position or by id. Returns the zero-based index
/// alongside the step.
pub fn resolve_step<'a>(project: &'a Project, query: &str) -> Result<(usize, &'a ProjectStep)> {
    if let Ok(number) = query.trim().parse::<usize>() {
        if number == 0 || number > project.roadmap.len() {
            bail!(
                "step {number} out of range: {} has {} steps",
                project.project_name,
                project.roadmap.len()
            );
        }
        return Ok((number - 1, &project.roadmap[number - 1]));
    }

    project
        .roadmap
        .iter()
        .enumerate()
        .find(|(_, step)| step.id == query)
        .with_context(|| format!("step {query:?} not found in {}", project.project_name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Integer,
    List,
}

const SETTABLE_KEYS: &[(&str, ValueKind)] = &[
    ("server.bind", ValueKind::Text),
    ("server.port", ValueKind::Integer),
    ("server.allowed_origins", ValueKind::List),
    ("server.environment", ValueKind::Text),
    ("providers.gemini_api_key", ValueKind::Text),
    ("providers.mistral_api_key", ValueKind::Text),
    ("providers.gemini_model", ValueKind::Text),
    ("providers.mistral_model", ValueKind::Text),
    ("providers.timeout_secs", ValueKind::Integer),
    ("client.server_url", ValueKind::Text),
    ("storage.state_path", ValueKind::Text),
];

fn to_item(kind: ValueKind, raw: &str) -> Result<toml_edit::Item> {
    Ok(match kind {
        ValueKind::Text => toml_edit::value(raw),
        ValueKind::Integer => {
            let n: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("expected an integer, got {raw:?}"))?;
            toml_edit::value(n)
        }
        ValueKind::List => {
            let array: toml_edit::Array = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            toml_edit::value(array)
        }
    })
}

/// Apply `key = value` to TOML source text, preserving everything else.
pub fn set_value_in(contents: &str, key: &str, value: &str) -> Result<String> {
    let Some((_, kind)) = SETTABLE_KEYS.iter().find(|(k, _)| *k == key) else {
        let known: Vec<&str> = SETTABLE_KEYS.iter().map(|(k, _)| *k).collect();
        bail!("unknown config key {key:?} (expected one of: {})", known.join(", "));
    };
    let Some((section, field)) = key.split_once('.') else {
        bail!("config key {key:?} must be section.field");
    };

    let mut doc: toml_edit::DocumentMut = contents
        .parse()
        .context("failed to parse config file as TOML document")?;

    if !doc.contains_table(section) {
        doc.insert(section, toml_edit::table());
    }
    let table = doc
        .get_mut(section)
        .and_then(|item| item.as_table_mut())
        .with_context(|| format!("[{section}] is not a table"))?;
    table.insert(field, to_item(*kind, value)?);

    let updated = doc.to_string();
    toml::from_str::<ConfigFile>(&updated)
        .with_context(|| format!("setting {key} would produce an invalid config"))?;
    Ok(updated)
}

/// `waymark config set <key> <value>`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = config::config_path();
    let contents = if path.exists() {
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    } else {
        String::new()
    };

    let updated = set_value_in(&contents, key, value)?;
    config::write_config_contents(&updated)?;
    tracing::debug!(key, path = %path.display(), "config value updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::{Category, fallback};

    fn project() -> Project {
        Project::from_roadmap(
            "learn rust",
            Category::Learning,
            &fallback::roadmap("learn rust", Category::Learning),
        )
    }

    #[test]
    fn step_by_number_and_id() {
        let p = project();
        let (index, step) = resolve_step(&p, "3").unwrap();
        assert_eq!(index, 2);
        assert_eq!(step.id, p.roadmap[2].id);

        let id = p.roadmap[5].id.clone();
        let (index, _) = resolve_step(&p, &id).unwrap();
        assert_eq!(index, 5);
    }

    #[test]
    fn step_out_of_range_or_unknown() {
        let p = project();
        assert!(resolve_step(&p, "0").is_err());
        assert!(resolve_step(&p, "9").is_err());
        assert!(resolve_step(&p, "step-nope").is_err());
    }

    #[test]
    fn set_value_preserves_comments() {
        let src = "# my settings\n[server]\n# the port\nport = 3001\n";
        let out = set_value_in(src, "server.port", "4000").unwrap();
        assert!(out.contains("# my settings"));
        assert!(out.contains("# the port"));
        assert!(out.contains("port = 4000"));
    }

    #[test]
    fn set_value_creates_missing_section() {
        let out = set_value_in("", "client.server_url", "http://localhost:3001").unwrap();
        let parsed: ConfigFile = toml::from_str(&out).unwrap();
        assert_eq!(parsed.client.server_url.as_deref(), Some("http://localhost:3001"));
    }

    #[test]
    fn set_value_splits_lists() {
        let out = set_value_in("", "server.allowed_origins", "http://a, http://b").unwrap();
        let parsed: ConfigFile = toml::from_str(&out).unwrap();
        assert_eq!(
            parsed.server.allowed_origins,
            Some(vec!["http://a".to_string(), "http://b".to_string()])
        );
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_bad_numbers() {
        assert!(set_value_in("", "server.colour", "blue").is_err());
        assert!(set_value_in("", "server.port", "lots").is_err());
        assert!(set_value_in("", "server.port", "70000").is_err());
    }
}

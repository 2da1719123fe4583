//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.
//!
//! Bare `$VAR` is left alone so URLs and paths containing `$` survive.

use crate::ConfigError;

/// Variable that had no value and no default.
struct Unset(String);

/// Expand `value` using the process environment.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |name| std::env::var(name).ok())
}

/// Expand an optional field in place.
pub(crate) fn expand_field(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(text) = value.as_mut() {
        *text = expand_env(text, field)?;
    }
    Ok(())
}

/// Expand `value` resolving variables through `lookup`.
fn expand_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, |name| {
        lookup(name).map(Some).ok_or_else(|| Unset(name.to_owned()))
    });
    match expanded {
        Ok(text) => Ok(text.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        }),
    }
}

//! Secret references in `config.toml`.
//!
//! The Google client id and secret may be written as references instead of
//! plain text:
//!
//! - `pass::path/in/store`: first line of `pass show path/in/store`
//! - `env::VAR_NAME`: the value of `$VAR_NAME`
//! - anything else: the literal value

/// A configuration value that may point at a secret stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// An entry in the `pass` password store.
    Pass(&'a str),
    /// An environment variable.
    Env(&'a str),
    /// A literal value.
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Classifies a raw configuration value.
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns true for `pass::` and `env::` values.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Looks the secret up.
    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Pass(path) => resolve_pass(path),
            Self::Env(var) => std::env::var(var)
                .map_err(|_| format!("environment variable `{}` is not set", var)),
            Self::Plain(value) => Ok(value.to_string()),
        }
    }
}

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

/// Masks literal secrets for display; references are shown as written.
pub fn redact(value: &str) -> String {
    if SecretRef::parse(value).is_reference() || value.is_empty() {
        value.to_string()
    } else {
        "********".to_string()
    }
}

fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_values() {
        assert_eq!(SecretRef::parse("pass::google/id"), SecretRef::Pass("google/id"));
        assert_eq!(SecretRef::parse("env::GOOGLE_ID"), SecretRef::Env("GOOGLE_ID"));
        assert_eq!(
            SecretRef::parse("x.apps.googleusercontent.com"),
            SecretRef::Plain("x.apps.googleusercontent.com")
        );
    }

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hello").unwrap(), "hello");
        assert_eq!(resolve("").unwrap(), "");
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_COURSESYNC_TEST_SECRET", "s3cret");
        }
        assert_eq!(resolve("env::_COURSESYNC_TEST_SECRET").unwrap(), "s3cret");
        unsafe {
            std::env::remove_var("_COURSESYNC_TEST_SECRET");
        }
    }

    #[test]
    fn missing_env_var_errors() {
        let err = resolve("env::_COURSESYNC_UNSET_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn missing_pass_entry_errors() {
        assert!(resolve("pass::coursesync/does/not/exist/12345").is_err());
    }

    #[test]
    fn redaction_hides_literals_only() {
        assert_eq!(redact("GOCSPX-abcdef"), "********");
        assert_eq!(redact("env::GOOGLE_SECRET"), "env::GOOGLE_SECRET");
        assert_eq!(redact("pass::google/secret"), "pass::google/secret");
    }
}

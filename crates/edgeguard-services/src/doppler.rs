//! Doppler secret store client implementation.
//!
//! Every operation shells out to the `doppler` CLI scoped to one
//! project/config pair:
//!
//! ```text
//! doppler secrets set <NAME> <VALUE> --project P --config C
//! doppler secrets get <NAME> --project P --config C --plain
//! doppler secrets delete <NAME> --project P --config C --yes
//! doppler secrets download --project P --config C --format json --no-file
//! ```

use async_trait::async_trait;
use edgeguard_core::util::process::{self, CommandOutput};
use edgeguard_types::config::DopplerSettings;
use edgeguard_types::{bail, KeygenError, Result, SecretStore};
use std::collections::BTreeMap;
use tracing::debug;

/// Secret store backed by the Doppler CLI.
///
/// Configuration is fixed at construction and never mutated, so a client
/// can be shared freely.
#[derive(Debug, Clone)]
pub struct DopplerClient {
    settings: DopplerSettings,
}

impl DopplerClient {
    /// Create a new Doppler client.
    pub fn new(settings: DopplerSettings) -> Result<Self> {
        if settings.project.trim().is_empty() || settings.config.trim().is_empty() {
            bail!(Config, "Doppler project and config are required");
        }

        Ok(Self { settings })
    }

    /// Upper-case a secret name; Doppler rejects lower-case names.
    fn normalize(name: &str) -> String {
        name.to_uppercase()
    }

    fn scoped(&self, mut args: Vec<String>) -> Vec<String> {
        args.extend([
            "--project".to_string(),
            self.settings.project.clone(),
            "--config".to_string(),
            self.settings.config.clone(),
        ]);
        args
    }

    /// Arguments for `secrets set`.
    pub fn set_args(&self, name: &str, value: &str) -> Vec<String> {
        self.scoped(vec![
            "secrets".to_string(),
            "set".to_string(),
            Self::normalize(name),
            value.to_string(),
        ])
    }

    /// Arguments for `secrets get --plain`.
    pub fn get_args(&self, name: &str) -> Vec<String> {
        let mut args = self.scoped(vec![
            "secrets".to_string(),
            "get".to_string(),
            Self::normalize(name),
        ]);
        args.push("--plain".to_string());
        args
    }

    /// Arguments for `secrets delete`.
    pub fn delete_args(&self, name: &str) -> Vec<String> {
        let mut args = self.scoped(vec![
            "secrets".to_string(),
            "delete".to_string(),
            Self::normalize(name),
        ]);
        args.push("--yes".to_string());
        args
    }

    /// Arguments for `secrets download` as JSON on stdout.
    pub fn download_args(&self) -> Vec<String> {
        let mut args = self.scoped(vec!["secrets".to_string(), "download".to_string()]);
        args.extend([
            "--format".to_string(),
            "json".to_string(),
            "--no-file".to_string(),
        ]);
        args
    }

    /// Run the doppler binary, mapping spawn failures to store errors.
    async fn exec(&self, args: &[String]) -> Result<CommandOutput> {
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("doppler {} {}", argv.first().unwrap_or(&""), argv.get(1).unwrap_or(&""));

        process::run_async(&self.settings.binary, &argv)
            .await
            .map_err(|e| KeygenError::Store(format!("Failed to run {}: {}", self.settings.binary, e)))
    }

    /// Build the error for a failed call, with secret values redacted.
    fn failure(action: &str, name: &str, output: &CommandOutput, redact: &[&str]) -> KeygenError {
        let detail = process::redact_secrets(&output.combined(), redact);
        KeygenError::Store(format!(
            "doppler CLI error during {} of {} (exit {}): {}",
            action, name, output.code, detail
        ))
    }

    /// Parse the output of `secrets download --format json`.
    ///
    /// The document must be a flat object of string values.
    pub fn parse_download(stdout: &str) -> Result<BTreeMap<String, String>> {
        serde_json::from_str(stdout).map_err(|e| {
            KeygenError::Store(format!(
                "Failed to parse doppler download output as a name -> value map: {}",
                e
            ))
        })
    }
}

/// Whether Doppler's output says the requested secret does not exist.
///
/// A missing project or config is a configuration problem, not a missing
/// secret.
fn reports_missing(output: &CommandOutput) -> bool {
    output
        .combined()
        .to_lowercase()
        .contains("could not find requested secret")
}

#[async_trait]
impl SecretStore for DopplerClient {
    async fn get(&self, name: &str) -> Result<String> {
        let name = Self::normalize(name);
        let output = self.exec(&self.get_args(&name)).await?;

        if !output.success() {
            if reports_missing(&output) {
                return Err(KeygenError::NotFound(name));
            }
            return Err(Self::failure("get", &name, &output, &[]));
        }

        let value = output.stdout.trim_end_matches(['\r', '\n']).to_string();
        if value.is_empty() {
            return Err(KeygenError::NotFound(name));
        }

        Ok(value)
    }

    async fn set(&self, name: &str, value: &str) -> Result<()> {
        let name = Self::normalize(name);
        let output = self.exec(&self.set_args(&name, value)).await?;

        if !output.success() {
            return Err(Self::failure("set", &name, &output, &[value]));
        }

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = Self::normalize(name);
        let output = self.exec(&self.delete_args(&name)).await?;

        if !output.success() {
            if reports_missing(&output) {
                return Err(KeygenError::NotFound(name));
            }
            return Err(Self::failure("delete", &name, &output, &[]));
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>> {
        let output = self.exec(&self.download_args()).await?;

        if !output.success() {
            return Err(Self::failure("download", "all secrets", &output, &[]));
        }

        let secrets = Self::parse_download(&output.stdout)?;
        debug!("Downloaded {} secrets", secrets.len());
        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DopplerClient {
        DopplerClient::new(DopplerSettings {
            project: "edge-guard".to_string(),
            config: "prd".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_project_and_config() {
        assert!(DopplerClient::new(DopplerSettings::default()).is_err());
        assert!(DopplerClient::new(DopplerSettings {
            project: "edge-guard".to_string(),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_command_arguments() {
        let client = client();

        assert_eq!(
            client.set_args("jwt_signing_key_key_1", "c2VjcmV0"),
            vec!["secrets", "set", "JWT_SIGNING_KEY_KEY_1", "c2VjcmV0", "--project", "edge-guard", "--config", "prd"]
        );
        assert_eq!(
            client.get_args("JWT_SIGNING_KEY_KEY_1"),
            vec!["secrets", "get", "JWT_SIGNING_KEY_KEY_1", "--project", "edge-guard", "--config", "prd", "--plain"]
        );
        assert_eq!(
            client.delete_args("JWT_SIGNING_KEY_KEY_1_METADATA"),
            vec!["secrets", "delete", "JWT_SIGNING_KEY_KEY_1_METADATA", "--project", "edge-guard", "--config", "prd", "--yes"]
        );
        assert_eq!(
            client.download_args(),
            vec!["secrets", "download", "--project", "edge-guard", "--config", "prd", "--format", "json", "--no-file"]
        );
    }

    #[test]
    fn test_parse_download() {
        let secrets = DopplerClient::parse_download(
            r#"{"DOPPLER_PROJECT":"edge-guard","JWT_SIGNING_KEY_KEY_1":"c2VjcmV0"}"#,
        )
        .unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets["JWT_SIGNING_KEY_KEY_1"], "c2VjcmV0");

        assert!(DopplerClient::parse_download("not json").is_err());
        assert!(DopplerClient::parse_download(r#"{"NESTED":{"a":1}}"#).is_err());
        assert!(DopplerClient::parse_download(r#"["JWT_SIGNING_KEY_KEY_1"]"#).is_err());
    }

    #[test]
    fn test_failure_redacts_value() {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: "Doppler Error: cannot set c2VjcmV0".to_string(),
            code: 1,
        };
        let err = DopplerClient::failure("set", "JWT_SIGNING_KEY_KEY_1", &output, &["c2VjcmV0"]);
        let msg = err.to_string();
        assert!(msg.contains("***REDACTED***"));
        assert!(!msg.contains("c2VjcmV0"));
        assert!(msg.contains("exit 1"));
    }

    #[test]
    fn test_reports_missing() {
        let missing = CommandOutput {
            stdout: String::new(),
            stderr: "Doppler Error: Could not find requested secret: JWT_SIGNING_KEY_KEY_9".to_string(),
            code: 1,
        };
        assert!(reports_missing(&missing));

        for stderr in [
            "Doppler Error: Invalid Auth token",
            "Doppler Error: Could not find project",
            "Doppler Error: project not found",
            "Doppler Error: Config not found",
        ] {
            let output = CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                code: 1,
            };
            assert!(!reports_missing(&output), "{}", stderr);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_with_stub_binary() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("doppler");
        let mut file = std::fs::File::create(&stub).unwrap();
        writeln!(
            file,
            "#!/bin/sh\ncase \"$2\" in\n  get) printf 'c2VjcmV0\\n' ;;\n  delete) echo 'Doppler Error: Could not find requested secret' >&2; exit 1 ;;\n  download) printf '{{\"JWT_SIGNING_KEY_KEY_1\":\"c2VjcmV0\"}}' ;;\n  set) echo 'Doppler Error: forbidden' >&2; exit 1 ;;\nesac"
        )
        .unwrap();
        drop(file);
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = DopplerClient::new(DopplerSettings {
            project: "edge-guard".to_string(),
            config: "prd".to_string(),
            binary: stub.to_string_lossy().to_string(),
        })
        .unwrap();

        assert_eq!(client.get("jwt_signing_key_key_1").await.unwrap(), "c2VjcmV0");
        assert_eq!(client.list_all().await.unwrap().len(), 1);
        assert!(client.delete("JWT_SIGNING_KEY_KEY_9").await.unwrap_err().is_not_found());

        let err = client.set("JWT_SIGNING_KEY_KEY_2", "dmFsdWU=").await.unwrap_err();
        assert!(err.to_string().contains("forbidden"));
    }
}

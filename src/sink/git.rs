//! Git sink: commits the report into a repository and pushes it

use crate::error::{CollectorError, Result};
use crate::sink::Sink;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

const AUTHOR_NAME: &str = "image-metadata-collector";
const AUTHOR_EMAIL: &str = "image-metadata-collector@localhost";

#[derive(Debug, Clone, Default)]
pub struct GitConfig {
    pub url: String,
    /// Working copy; a temporary directory is used when empty
    pub directory: String,
    pub password: String,
    pub private_key_file: String,
}

pub struct GitSink {
    config: GitConfig,
    file_name: String,
    scratch: Option<TempDir>,
}

impl GitSink {
    pub fn new(config: &GitConfig, file_name: String) -> Result<Self> {
        if config.url.is_empty() {
            return Err(CollectorError::Config("missing Git URL".to_string()));
        }
        if !config.private_key_file.is_empty() && !Path::new(&config.private_key_file).exists() {
            return Err(CollectorError::Config(format!(
                "Git private key file {} does not exist",
                config.private_key_file
            )));
        }

        Ok(Self {
            config: config.clone(),
            file_name,
            scratch: None,
        })
    }

    fn workdir(&mut self) -> Result<PathBuf> {
        if !self.config.directory.is_empty() {
            return Ok(PathBuf::from(&self.config.directory));
        }
        if self.scratch.is_none() {
            self.scratch = Some(tempfile::tempdir()?);
        }
        match &self.scratch {
            Some(dir) => Ok(dir.path().join("repository")),
            None => Err(CollectorError::Git("no working directory".to_string())),
        }
    }

    /// `-c` options that carry credentials for remote operations
    pub fn auth_args(&self) -> Vec<String> {
        if self.config.password.is_empty() {
            return Vec::new();
        }
        let token = STANDARD.encode(format!("x-access-token:{}", self.config.password));
        vec![
            "-c".to_string(),
            format!("http.extraHeader=Authorization: Basic {}", token),
        ]
    }

    fn command(&self, dir: Option<&Path>, remote: bool) -> Command {
        let mut command = Command::new("git");
        if let Some(dir) = dir {
            command.arg("-C").arg(dir);
        }
        if remote {
            command.args(self.auth_args());
        }
        command.env("GIT_TERMINAL_PROMPT", "0");
        if !self.config.private_key_file.is_empty() {
            command.env(
                "GIT_SSH_COMMAND",
                format!(
                    "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=accept-new",
                    self.config.private_key_file
                ),
            );
        }
        command
    }

    async fn git(&self, dir: Option<&Path>, remote: bool, args: &[&str]) -> Result<String> {
        debug!(args = ?args, "Running git");
        let output = self.command(dir, remote).args(args).output().await?;
        if !output.status.success() {
            return Err(CollectorError::Git(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Sink for GitSink {
    async fn write(&mut self, content: &[u8]) -> Result<usize> {
        let dir = self.workdir()?;

        if dir.join(".git").exists() {
            self.git(Some(&dir), true, &["pull", "--ff-only"]).await?;
        } else {
            let target = dir.to_string_lossy().to_string();
            let url = self.config.url.clone();
            self.git(None, true, &["clone", "--depth", "1", &url, &target]).await?;
        }

        let path = dir.join(&self.file_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        let file_name = self.file_name.clone();
        self.git(Some(&dir), false, &["add", "--", &file_name]).await?;
        let status = self
            .git(Some(&dir), false, &["status", "--porcelain", "--", &file_name])
            .await?;
        if status.trim().is_empty() {
            info!(file_name = %file_name, "Report unchanged, nothing to commit");
            return Ok(content.len());
        }

        let message = format!("Update {}", file_name);
        self.git(
            Some(&dir),
            false,
            &[
                "-c",
                &format!("user.name={}", AUTHOR_NAME),
                "-c",
                &format!("user.email={}", AUTHOR_EMAIL),
                "commit",
                "-m",
                &message,
            ],
        )
        .await?;
        self.git(Some(&dir), true, &["push"]).await?;

        info!(file_name = %file_name, url = %self.config.url, "Pushed report to git");
        Ok(content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GitConfig {
        GitConfig {
            url: "https://git.example.com/reports.git".to_string(),
            ..GitConfig::default()
        }
    }

    #[test]
    fn test_url_is_required() {
        let err = GitSink::new(&GitConfig::default(), "out.json".into()).err().unwrap();
        assert!(err.to_string().contains("missing Git URL"));
    }

    #[test]
    fn test_missing_key_file_is_rejected() {
        let config = GitConfig {
            private_key_file: "/nonexistent/id_ed25519".to_string(),
            ..config()
        };
        assert!(GitSink::new(&config, "out.json".into()).is_err());
    }

    #[test]
    fn test_password_becomes_basic_auth_header() {
        let sink = GitSink::new(
            &GitConfig {
                password: "secret".to_string(),
                ..config()
            },
            "out.json".into(),
        )
        .unwrap();
        let args = sink.auth_args();
        assert_eq!(args[0], "-c");
        assert_eq!(
            args[1],
            format!(
                "http.extraHeader=Authorization: Basic {}",
                STANDARD.encode("x-access-token:secret")
            )
        );

        let anonymous = GitSink::new(&config(), "out.json".into()).unwrap();
        assert!(anonymous.auth_args().is_empty());
    }

    #[test]
    fn test_configured_directory_is_used() {
        let mut sink = GitSink::new(
            &GitConfig {
                directory: "/tmp/reports".to_string(),
                ..config()
            },
            "out.json".into(),
        )
        .unwrap();
        assert_eq!(sink.workdir().unwrap(), PathBuf::from("/tmp/reports"));

        let mut scratch = GitSink::new(&config(), "out.json".into()).unwrap();
        let first = scratch.workdir().unwrap();
        assert_eq!(scratch.workdir().unwrap(), first);
    }
}

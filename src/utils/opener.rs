//! Open files in the operating system's default application

use crate::error::OpenerError;
use crate::utils::logging::VerboseLogger;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Default opener command for a platform name as reported by `std::env::consts::OS`
pub fn platform_command(platform: &str) -> Option<Vec<String>> {
    let command: &[&str] = match platform {
        "macos" | "ios" => &["open"],
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => &["xdg-open"],
        "windows" => &["cmd.exe", "/C", "start", ""],
        _ => return None,
    };
    Some(command.iter().map(|part| part.to_string()).collect())
}

/// Spawns a program and waits for it to exit
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Returns the exit code, or `None` if the process was killed by a signal
    async fn launch(&self, program: &str, args: &[String]) -> std::io::Result<Option<i32>>;
}

pub struct SystemLauncher;

#[async_trait]
impl Launcher for SystemLauncher {
    async fn launch(&self, program: &str, args: &[String]) -> std::io::Result<Option<i32>> {
        let status = Command::new(program).args(args).status().await?;
        Ok(status.code())
    }
}

pub struct DefaultOpener<L = SystemLauncher> {
    launcher: L,
    command: Option<Vec<String>>,
    platform: String,
    logger: VerboseLogger,
}

impl DefaultOpener<SystemLauncher> {
    pub fn new() -> Self {
        Self::with_launcher(SystemLauncher)
    }
}

impl Default for DefaultOpener<SystemLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> DefaultOpener<L> {
    pub fn with_launcher(launcher: L) -> Self {
        Self {
            launcher,
            command: None,
            platform: std::env::consts::OS.to_string(),
            logger: VerboseLogger::new(false),
        }
    }

    pub fn with_logger(mut self, logger: VerboseLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Use `command` instead of the platform default
    pub fn with_command(mut self, command: Option<Vec<String>>) -> Self {
        self.command = command;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Full argument vector used to open `path`
    pub fn command_for(&self, path: &Path) -> crate::Result<Vec<String>> {
        let mut command = match &self.command {
            Some(command) => command.clone(),
            None => platform_command(&self.platform).ok_or_else(|| {
                OpenerError::UnsupportedPlatform {
                    platform: self.platform.clone(),
                }
            })?,
        };
        if command.is_empty() {
            return Err(OpenerError::EmptyCommand.into());
        }
        command.push(path.to_string_lossy().to_string());
        Ok(command)
    }

    /// Open `path` and wait for the opener program to exit
    pub async fn open<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpenerError::NotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let command = self.command_for(path)?;
        self.logger
            .log_with_prefix("Opener", &format!("Running {}", command.join(" ")));
        let (program, args) = command.split_first().ok_or(OpenerError::EmptyCommand)?;

        let code = self
            .launcher
            .launch(program, args)
            .await
            .map_err(|source| OpenerError::Launch {
                program: program.clone(),
                source,
            })?;

        match code {
            Some(0) => Ok(()),
            code => Err(OpenerError::ExitStatus {
                program: program.clone(),
                code,
            }
            .into()),
        }
    }
}

/// Open `path` with the platform's default program
pub async fn default_opener<P: AsRef<Path>>(path: P) -> crate::Result<()> {
    DefaultOpener::new().open(path).await
}

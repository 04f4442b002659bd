//! AI assistant.
//!
//! The assistant is a black box: one question in, one answer out. It fails
//! closed on a non-zero exit, empty output, or a timeout.

use std::{path::PathBuf, process::Stdio, sync::Arc, time::Duration};

use async_trait::async_trait;
use cybersecure_common::{AppError, AppResult, config::AssistantConfig};
use tokio::process::Command;

/// Message returned to clients when the assistant fails.
pub const ASSISTANT_FAILED: &str = "AI process failed.";

const NO_OUTPUT: &str = "The AI script failed to produce a response.";

/// Something that answers cybersecurity questions.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answer a question. The answer is already trimmed and non-empty.
    async fn ask(&self, question: &str) -> AppResult<String>;
}

/// Shared assistant handle.
pub type AssistantService = Arc<dyn Assistant>;

/// Build the assistant described by the configuration.
///
/// Without a configured program the canned assistant answers.
#[must_use]
pub fn from_config(config: &AssistantConfig) -> AssistantService {
    match &config.program {
        Some(program) => {
            tracing::info!(program = %program, timeout_secs = config.timeout_secs, "Using process assistant");
            Arc::new(ProcessAssistant::new(
                program.clone(),
                config.args.clone(),
                config.working_dir.clone(),
                Duration::from_secs(config.timeout_secs),
            ))
        }
        None => {
            tracing::info!("No assistant program configured, using canned responses");
            Arc::new(CannedAssistant)
        }
    }
}

fn failed(details: impl Into<String>) -> AppError {
    AppError::Assistant {
        message: ASSISTANT_FAILED.to_string(),
        details: details.into(),
    }
}

/// Runs an external program once per question.
///
/// The question is passed as the last argument. Stdout is the answer and
/// stderr is kept as diagnostics.
#[derive(Debug, Clone)]
pub struct ProcessAssistant {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessAssistant {
    /// Create a process assistant.
    #[must_use]
    pub const fn new(
        program: String,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program,
            args,
            working_dir,
            timeout,
        }
    }
}

#[async_trait]
impl Assistant for ProcessAssistant {
    async fn ask(&self, question: &str) -> AppResult<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(question)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program = %self.program, "Spawning assistant");
        let child = command
            .spawn()
            .map_err(|e| failed(format!("Failed to start assistant: {e}")))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(failed(format!("Failed to read assistant output: {e}"))),
            Err(_) => {
                tracing::warn!(program = %self.program, timeout_secs = self.timeout.as_secs(), "Assistant timed out");
                return Err(failed(format!(
                    "The AI script did not answer within {} seconds.",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let exit_code = output.status.code();
        tracing::debug!(exit_code = ?exit_code, "Assistant exited");

        if !output.status.success() || stdout.is_empty() {
            tracing::warn!(exit_code = ?exit_code, stderr = %stderr, "Assistant failed");
            return Err(failed(if stderr.is_empty() {
                NO_OUTPUT.to_string()
            } else {
                stderr
            }));
        }

        Ok(stdout)
    }
}

/// Keyword-matched answers for deployments without an AI program.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedAssistant;

impl CannedAssistant {
    /// Pick the canned answer for a question.
    #[must_use]
    pub fn answer(question: &str) -> &'static str {
        let q = question.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if mentions(&["threat", "attack"]) {
            "I understand you're concerned about security threats. Can you provide more details about the specific threat you've encountered? I can help you assess the situation and recommend appropriate security measures."
        } else if mentions(&["phishing", "email"]) {
            "Phishing attacks are serious security concerns. If you've received a suspicious email, please don't click any links or download attachments. You can report it through our 'Report Suspicious' tab in the dashboard."
        } else if mentions(&["password", "login"]) {
            "Password security is crucial. I recommend using strong, unique passwords for each account, enabling two-factor authentication, and regularly updating your passwords. Need help with specific password security practices?"
        } else if mentions(&["malware", "virus"]) {
            "Malware detection is important for system security. Keep your antivirus software updated, avoid suspicious downloads, and run regular system scans. If you suspect malware, consider disconnecting from the internet and running a full system scan."
        } else {
            "I'm here to help with cybersecurity questions and concerns. You can ask me about threats, security best practices, how to report incidents, or any other security-related topics. What specific area would you like assistance with?"
        }
    }
}

#[async_trait]
impl Assistant for CannedAssistant {
    async fn ask(&self, question: &str) -> AppResult<String> {
        Ok(Self::answer(question).to_string())
    }
}

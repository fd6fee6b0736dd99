//! Access token resolution.
//!
//! A token comes from, in order: the `GITHUB_TOKEN` setting, the token stored in
//! the global git config by an earlier run, or an interactive prompt with echo
//! off. A prompted token is stored for the next run.

use anyhow::{bail, Context, Result};
use std::{fmt, io, thread};
use tokio::process::Command;
use tokio::sync::oneshot;

/// Persistent home of the access token between runs.
pub trait TokenStore {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, token: &str) -> Result<()>;
}

/// Asks the user for a token when none is configured or stored.
pub trait TokenPrompt {
    async fn prompt(&self) -> Result<String>;
}

/// Stores the token as a key in the user's global git config.
#[derive(Debug, Clone)]
pub struct GitConfigTokenStore {
    key: String,
}

impl GitConfigTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl TokenStore for GitConfigTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        let output = match Command::new("git")
            .args(["config", "--global", "--get", self.key.as_str()])
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(key = %self.key, "Could not run git to read stored token: {}", e);
                return Ok(None);
            }
        };

        // `git config --get` exits 1 when the key is unset.
        if !output.status.success() {
            return Ok(None);
        }

        let token = String::from_utf8(output.stdout).context("stored token is not valid UTF-8")?;
        Ok(non_empty(&token))
    }

    async fn save(&self, token: &str) -> Result<()> {
        let status = Command::new("git")
            .args(["config", "--global", self.key.as_str(), token])
            .status()
            .await
            .context("failed to run git to store the access token")?;

        if !status.success() {
            bail!("git config exited with {status} while storing {}", self.key);
        }

        tracing::info!(key = %self.key, "Stored access token in global git config");
        Ok(())
    }
}

const PROMPT: &str = "GitHub personal access token: ";
const PROMPT_ATTEMPTS: usize = 3;

/// Asks for the token on the terminal with echo turned off.
///
/// The read runs on its own thread so that dropping the prompt future (for
/// example when the user interrupts) never waits on the blocked read.
#[derive(Clone, Copy)]
pub struct TerminalPrompt {
    read_secret: fn(&str) -> io::Result<String>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            read_secret: |prompt| rpassword::prompt_password(prompt),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TerminalPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalPrompt").finish_non_exhaustive()
    }
}

impl TokenPrompt for TerminalPrompt {
    async fn prompt(&self) -> Result<String> {
        let read_secret = self.read_secret;
        let (tx, rx) = oneshot::channel();

        thread::Builder::new()
            .name("token-prompt".to_string())
            .spawn(move || {
                let _ = tx.send(read_token(read_secret));
            })
            .context("failed to start the token prompt")?;

        rx.await.context("token prompt ended without an answer")?
    }
}

/// Reads until a non-empty token is entered, giving up after a few blank answers.
fn read_token(read_secret: fn(&str) -> io::Result<String>) -> Result<String> {
    for _ in 0..PROMPT_ATTEMPTS {
        let answer = read_secret(PROMPT).context("failed to read from the terminal")?;
        if let Some(token) = non_empty(&answer) {
            return Ok(token);
        }
    }
    bail!("no access token entered")
}

/// Picks the access token for this run.
///
/// # Arguments
/// * `configured` - Token given through configuration; used as-is and never stored.
/// * `store` - Where a previously prompted token is kept.
/// * `prompt` - Asked only when neither of the above has a token.
pub async fn resolve_token<S, P>(configured: Option<&str>, store: &S, prompt: &P) -> Result<String>
where
    S: TokenStore,
    P: TokenPrompt,
{
    if let Some(token) = configured.and_then(non_empty) {
        tracing::debug!("Using configured access token");
        return Ok(token);
    }

    if let Some(token) = store.load().await? {
        tracing::debug!("Using stored access token");
        return Ok(token);
    }

    let token = prompt.prompt().await.context("failed to read an access token")?;
    store.save(&token).await?;
    Ok(token)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

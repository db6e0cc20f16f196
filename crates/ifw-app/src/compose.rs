//! Terminal compose client.
//!
//! Reads lines from stdin into a [`DraftSession`] and submits the draft to a
//! running server's `POST /send`. Voice triggers fire after the profile delay
//! while the terminal is idle.

use std::sync::Arc;
use std::time::Instant;

use ifw_core::config::Profile;
use ifw_core::types::TriggerAction;
use ifw_editor::{Clock, DraftSession, SystemClock};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::ComposeArgs;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected the message ({status}): {error}")]
    Rejected { status: u16, error: String },
}

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text appended to the draft.
    Text(String),
    Send,
    Clear,
    Back,
    Forward,
    Show,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Text(line.trim_end_matches(['\r', '\n']).to_string());
    };
    match command.trim().to_ascii_lowercase().as_str() {
        "send" | "s" => Input::Send,
        "clear" | "c" => Input::Clear,
        "back" | "b" => Input::Back,
        "fwd" | "forward" | "f" => Input::Forward,
        "show" => Input::Show,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

/// What the loop should do after an input was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Submit,
    Quit,
}

/// Apply one input to the session.
pub fn apply(session: &mut DraftSession, input: Input) -> Step {
    match input {
        Input::Text(text) => {
            session.append(&text);
            Step::Continue
        }
        Input::Send => Step::Submit,
        Input::Clear => {
            session.clear();
            Step::Continue
        }
        Input::Back => {
            session.back();
            Step::Continue
        }
        Input::Forward => {
            session.forward();
            Step::Continue
        }
        Input::Show | Input::Help | Input::Unknown(_) => Step::Continue,
        Input::Quit => Step::Quit,
    }
}

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// HTTP client for `POST /send`.
#[derive(Debug, Clone)]
pub struct SendClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl SendClient {
    pub fn new(base: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: send_url(base),
            token,
        }
    }

    pub async fn send(&self, text: &str) -> Result<(), ComposeError> {
        let mut request = self.http.post(&self.url).json(&SendBody { text });
        if let Some(token) = &self.token {
            request = request.query(&[("token", token.as_str())]);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let error = response
            .json::<ErrorReply>()
            .await
            .map(|r| r.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
        Err(ComposeError::Rejected {
            status: status.as_u16(),
            error,
        })
    }
}

/// `<base>/send`, tolerating a trailing slash or a pasted page URL with a query.
pub fn send_url(base: &str) -> String {
    let base = base.split(['?', '#']).next().unwrap_or(base);
    format!("{}/send", base.trim_end_matches('/'))
}

/// The draft as shown after each step.
pub fn render(session: &DraftSession) -> String {
    let mut status = String::new();
    if let Some((index, total)) = session.history().position() {
        status.push_str(&format!("[{index}/{total}] "));
    }
    if let Some(pending) = session.trigger().pending() {
        status.push_str(&format!("({} pending) ", pending.action));
    }
    format!("{status}> {}", session.text())
}

const HELP: &str = "Type text to add it to the draft. Commands: :send :clear :back :fwd :show :quit";

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(tokio::time::Instant::from_std(d)).await,
        None => std::future::pending().await,
    }
}

async fn submit(session: &mut DraftSession, client: &SendClient) {
    let Some(text) = session.begin_send() else {
        println!("(nothing to send)");
        return;
    };
    match client.send(&text).await {
        Ok(()) => {
            tracing::info!(chars = text.chars().count(), "Message sent");
            session.finish_send(true);
            println!("sent");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Send failed");
            session.finish_send(false);
            eprintln!("send failed: {e}");
        }
    }
}

/// Run the compose loop until `:quit` or end of input.
pub async fn run(args: &ComposeArgs, profile: &Profile) -> ifw_core::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut session = DraftSession::new(profile, clock)?;
    let client = SendClient::new(&args.url, args.token.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        let deadline = session.deadline();
        tokio::select! {
            // Input first: an edit arriving with a due deadline cancels it.
            biased;
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = parse_line(&line);
                match &input {
                    Input::Help => println!("{HELP}"),
                    Input::Unknown(cmd) => println!("unknown command ':{cmd}'. {HELP}"),
                    _ => {}
                }
                match apply(&mut session, input) {
                    Step::Continue => {}
                    Step::Submit => submit(&mut session, &client).await,
                    Step::Quit => break,
                }
                println!("{}", render(&session));
            }
            _ = wait_for(deadline) => {
                match session.poll() {
                    Some(TriggerAction::Send) => submit(&mut session, &client).await,
                    Some(TriggerAction::Clear) => println!("cleared"),
                    None => {}
                }
                println!("{}", render(&session));
            }
        }
    }
    Ok(())
}

//! Operator prompting and status prompt rendering.

use std::io::{self, BufRead, Write};

use hitdesk_server::ServerStatus;

use crate::shell::session::Session;
use crate::styled_output::{Color, paint_if};

/// Capability for asking the operator a question. Injected into handlers so
/// interactive completion is testable without a TTY.
pub trait PromptSource {
    /// Print `question`, read one line, and return it trimmed.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Production prompt source: stdin/stdout.
pub struct StdinPrompt;

impl PromptSource for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Scripted prompt source for tests: pops pre-canned answers in order.
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

impl PromptSource for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))?;
        self.questions.push(question.to_string());
        Ok(answer)
    }
}

/// Render the status prompt from session state and a point-in-time server
/// status. Pure; recomputed after every command and on blank input.
pub fn render_prompt(session: &Session, server: ServerStatus, colors: bool) -> String {
    let server_tag = match server {
        ServerStatus::Running => paint_if(colors, "on", Color::Green),
        ServerStatus::Stopped => paint_if(colors, "off", Color::Red),
        ServerStatus::Pending => paint_if(colors, "wait", Color::Yellow),
    };
    let mode_tag = if session.mode().is_sandbox() {
        paint_if(colors, "sdbx", Color::Bold)
    } else {
        paint_if(colors, "live", Color::Bold)
    };
    format!(
        "[{} server:{} mode:{} #HITs:{}]$ ",
        paint_if(colors, "hitdesk", Color::Bold),
        server_tag,
        mode_tag,
        session.current_count(),
    )
}

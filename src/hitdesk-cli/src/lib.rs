//! hitdesk CLI library.
//!
//! The interactive operator shell lives here:
//! - `shell/` - grammar registry, validation, session state, prompt
//!   rendering, and the REPL dispatcher
//! - `styled_output` - ANSI color helpers shared by the prompt and handlers

pub mod shell;
pub mod styled_output;

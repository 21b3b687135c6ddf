//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Agent;
use crate::core::Result;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Attach a file path to the next message
    Attach(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub async fn handle_command(
    input: &str,
    agent: &mut Agent,
    session_key: &str,
) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            agent.clear_session(session_key).await;
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "attach" => {
            if args.is_empty() {
                Ok(CommandResult::Handled(
                    "Usage: attach <path>\nThe path is combined with your next message.".to_string(),
                ))
            } else {
                Ok(CommandResult::Attach(args.to_string()))
            }
        }

        "status" => {
            let history = agent.conversation(session_key).await;
            let status = format!(
                "Savant Status:\n\
                 ─────────────────────────────\n\
                 Model:     {}\n\
                 Max steps: {}\n\
                 Tools:     {} registered\n\
                 History:   {} messages\n\
                 Streaming: {}",
                agent.config().model.name,
                agent.config().agent.max_steps,
                agent.tool_count(),
                history.len(),
                if agent.config().streaming.enabled {
                    "on"
                } else {
                    "off"
                }
            );
            Ok(CommandResult::Handled(status))
        }

        "set" => handle_set_command(args, agent),

        _ => {
            // Not a command, treat as normal input
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, agent: &mut Agent) -> Result<CommandResult> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();

    if parts.is_empty() || parts[0].is_empty() {
        return Ok(CommandResult::Handled(
            "Usage: set <model|max-steps|streaming> <value>\n\
             Examples:\n\
               set model gemini-2.0-flash\n\
               set max-steps 6\n\
               set streaming off"
                .to_string(),
        ));
    }

    let key = parts[0].to_lowercase();
    let value = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match key.as_str() {
        "model" => {
            if value.is_empty() {
                return Ok(CommandResult::Handled(format!(
                    "Current model: {}",
                    agent.config().model.name
                )));
            }
            agent.config_mut().set_model(value);
            Ok(CommandResult::Handled(format!("Model set to: {}", value)))
        }

        "max-steps" | "steps" => match value.parse::<usize>() {
            Ok(n) if n > 0 => {
                agent.config_mut().set_max_steps(n);
                Ok(CommandResult::Handled(format!("Max steps set to: {}", n)))
            }
            _ => Ok(CommandResult::Handled(
                "max-steps must be a positive integer".to_string(),
            )),
        },

        "streaming" => {
            let enabled = matches!(value.to_lowercase().as_str(), "on" | "true" | "1" | "yes");
            agent.config_mut().streaming.enabled = enabled;
            Ok(CommandResult::Handled(format!(
                "Streaming: {}",
                if enabled { "ON" } else { "OFF" }
            )))
        }

        _ => Ok(CommandResult::Handled(format!(
            "Unknown setting: {}. Available: model, max-steps, streaming",
            key
        ))),
    }
}

/// Generate help text
fn help_text() -> String {
    r#"Savant Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Savant
  clear, reset     Clear conversation history
  status           Show current configuration
  attach <path>    Attach a file to your next message

  set model <name>         Set the model
  set max-steps <n>        Set the per-turn iteration bound
  set streaming <on|off>   Enable/disable streamed answers

Tips:
  - Ask about an image: attach photo.jpg, then type your question
  - Tool capabilities are supplied by the embedding program
─────────────────────────────────────────────"#
        .to_string()
}

//! Interactive REPL for Savant
//!
//! Provides the main user interaction loop. One fixed session key is used
//! for the lifetime of the process.

use std::io::{self, BufRead, Write};

use crate::agent::Agent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Result, SavantError};

/// Session key used for the whole process run
const SESSION_KEY: &str = "cli";

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
    /// Attachment path queued for the next message
    pending_attachment: Option<String>,
}

impl Repl {
    /// Create a new REPL around an agent
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            pending_attachment: None,
        }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent, SESSION_KEY).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Attach(path)) => {
                    println!("Attached {} to your next message.\n", path);
                    self.pending_attachment = Some(path);
                }
                Ok(CommandResult::Continue(input)) => {
                    if let Err(e) = self.process_input(&input).await {
                        match e {
                            SavantError::SessionBusy(_) => {
                                eprintln!("\nA turn is already running for this session.\n")
                            }
                            other => eprintln!("\nError: {}\n", other),
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Submit one message, streaming the answer when enabled
    async fn process_input(&mut self, input: &str) -> Result<()> {
        let attachment = self.pending_attachment.take();

        if self.agent.config().streaming.enabled {
            print!("\nAssistant:\n");
            io::stdout().flush()?;

            self.agent
                .submit_turn_streaming(
                    SESSION_KEY,
                    input,
                    attachment.as_deref(),
                    Box::new(|token| {
                        print!("{}", token);
                        let _ = io::stdout().flush();
                    }),
                )
                .await?;

            println!("\n");
        } else {
            let answer = self
                .agent
                .submit_turn(SESSION_KEY, input, attachment.as_deref())
                .await?;
            println!("\nAssistant:\n{}\n", answer);
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();

        println!("Savant — Conversational Research Assistant");
        println!("──────────────────────────────────────────");
        println!("Model:     {}", config.model.name);
        println!("Max steps: {}", config.agent.max_steps);
        println!("Tools:     {} registered", self.agent.tool_count());
        println!();
        println!("Commands: help, attach, clear, status, exit");
        println!("──────────────────────────────────────────");
    }
}

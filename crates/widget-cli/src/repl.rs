//! Interactive REPL driving the panel controller
//!
//! Plain lines are sent as chat messages; slash commands cover the panel
//! actions a web page would expose as buttons (new chat, session list,
//! two-step delete).

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use widget_client::HttpBackend;
use widget_core::Sender;
use widget_panel::ChatPanel;

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show help"),
    ("/new", "Create a new chat session"),
    ("/list", "List stored sessions"),
    ("/switch", "Switch to a session: /switch <id>"),
    ("/delete", "Delete a session: /delete <id>"),
    ("/confirm", "Confirm the pending deletion"),
    ("/cancel", "Cancel the pending deletion"),
    ("/exit", "Save and quit"),
];

/// Command completer for reedline
#[derive(Clone)]
struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint("> ").to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// Run the interactive REPL until exit, persisting on the way out
pub async fn run(mut panel: ChatPanel<HttpBackend>) -> anyhow::Result<()> {
    panel.toggle_panel();
    print_greeting(&panel);

    let mut keybindings = default_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        let signal = line_editor.read_line(&prompt);

        match signal {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                if input.starts_with('/') {
                    if !handle_command(input, &mut panel).await {
                        break;
                    }
                    continue;
                }

                panel.set_input(input);
                panel.send_message().await;
                print_last_reply(&panel);
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    // Teardown checkpoint, the page-unload analog
    panel.persist();
    println!("Sessions saved.");
    Ok(())
}

fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('c'),
        ReedlineEvent::CtrlC,
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('d'),
        ReedlineEvent::CtrlD,
    );
    keybindings
}

/// Handle a slash command; returns false when the REPL should exit
async fn handle_command(input: &str, panel: &mut ChatPanel<HttpBackend>) -> bool {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();

    match command {
        "/help" => print_help(),
        "/new" => {
            if panel.new_session().await {
                // current_id is the fresh session after a successful create
                if let Some(id) = panel.store().current_id() {
                    println!("Started chat session {}", id);
                }
            } else {
                println!("Could not create a session. Is the backend running?");
            }
        }
        "/list" => print_sessions(panel),
        "/switch" => match argument {
            Some(id) => {
                panel.switch_session(id);
                if panel.store().current_id() == Some(id) {
                    println!("Switched to session {}", id);
                } else {
                    println!("No session with id {}", id);
                }
            }
            None => println!("Usage: /switch <id>"),
        },
        "/delete" => match argument {
            Some(id) => {
                panel.request_delete(id);
                println!("{}", panel.texts().popup_title);
                println!(
                    "{} Type /confirm to delete {} or /cancel to keep it.",
                    panel.texts().popup_message,
                    id
                );
            }
            None => println!("Usage: /delete <id>"),
        },
        "/confirm" => {
            if panel.pending_delete_id().is_none() {
                println!("Nothing to confirm.");
            } else {
                panel.confirm_delete().await;
                println!("Session deleted.");
            }
        }
        "/cancel" => {
            panel.cancel_delete();
            println!("Deletion cancelled.");
        }
        "/exit" | "/quit" => return false,
        other => println!("Unknown command: {} (try /help)", other),
    }

    true
}

fn print_greeting(panel: &ChatPanel<HttpBackend>) {
    let texts = panel.texts();
    match panel.store().current_id() {
        Some(id) => println!("Resuming chat session {} (use /list to see all).", id),
        None => {
            println!("{}", texts.welcome_message);
            println!("{} Use /new to begin.", texts.welcome_description);
        }
    }
}

fn print_sessions(panel: &ChatPanel<HttpBackend>) {
    if panel.store().is_empty() {
        println!("No stored sessions.");
        return;
    }

    for session in panel.store().sessions() {
        let marker = if panel.store().current_id() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}  ({} messages, created {})",
            marker,
            session.id,
            session.message_count(),
            session.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_last_reply(panel: &ChatPanel<HttpBackend>) {
    if let Some(message) = panel.current_messages().last() {
        if message.sender == Sender::Bot {
            println!("\n{}\n", message.text);
        }
    }
}

fn print_help() {
    println!("Type a message and press Enter to chat.");
    println!();
    for (command, description) in COMMANDS {
        println!("    {:<10} {}", command, description);
    }
}

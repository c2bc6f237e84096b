use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    session::{Locale, Session, SessionEvent, Submission, Turn, TurnKind},
    utils::{log_debug, log_error},
    voice::{VoiceDelivery, VoiceError},
};

use super::shell::{Shell, ShellCommand};

const HELP: &str = "\
Commands:
  :goto <screen>   switch screen (chat opens the assistant)
  :lang <en|hi|pa> change language
  :online on|off   toggle connectivity flag
  :voice           speak a question
  :history         show the conversation so far
  :quit            exit
Anything else is sent to the assistant while on the chat screen.";

/// Line-oriented terminal front end for the shell
pub struct Repl {
    shell: Shell,
    draft: Option<String>,
}

impl Repl {
    pub fn new(shell: Shell) -> Self {
        Self { shell, draft: None }
    }

    pub async fn run(mut self) -> Result<()> {
        self.shell.open_chat();
        if let Some(session) = self.shell.session() {
            for turn in session.turns() {
                print_turn(&turn);
            }
        }
        println!("{}", "Type :help for commands".dimmed());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.print_prompt();
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    log_debug(format!("Rejected input: {}", e));
                    eprintln!("⚠️  {}", e);
                    continue;
                }
            };

            match command {
                ShellCommand::Quit => break,
                ShellCommand::Help => println!("{}", HELP),
                ShellCommand::Say(text) => {
                    let text = match (text.is_empty(), self.draft.take()) {
                        (true, Some(draft)) => draft,
                        _ => text,
                    };
                    self.say(&text).await;
                }
                ShellCommand::Goto(screen) => match self.shell.navigate(&screen) {
                    Some(nav) => {
                        if !nav.to.is_known() {
                            println!("{}", format!("(no view for '{}')", nav.to).dimmed());
                        }
                        if nav.entered_chat() {
                            if let Some(session) = self.shell.session() {
                                for turn in session.turns() {
                                    print_turn(&turn);
                                }
                            }
                        }
                        if nav.left_chat() {
                            self.draft = None;
                        }
                    }
                    None => println!("{}", format!("Already on {}", screen).dimmed()),
                },
                ShellCommand::Lang(locale) => {
                    self.shell.set_locale(locale);
                    println!("🌐 Language: {}", locale.language_name().green());
                }
                ShellCommand::Online(online) => {
                    self.shell.set_online(online);
                    let label = if online { "online".green() } else { "offline".yellow() };
                    println!("📶 Now {}", label);
                }
                ShellCommand::Voice => self.listen().await,
                ShellCommand::History => match self.shell.session() {
                    Some(session) => {
                        for turn in session.turns() {
                            print_turn(&turn);
                        }
                    }
                    None => println!("{}", "Open the chat screen first (:goto chat)".dimmed()),
                },
            }
        }

        self.shell.shutdown();
        Ok(())
    }

    fn print_prompt(&self) {
        let context = self.shell.context();
        let mut label = format!("[{}:{}]", context.screen(), context.locale());
        if !context.is_online() {
            label.push_str(" offline");
        }
        match &self.draft {
            Some(draft) => println!("{} {} {}", label.cyan(), "draft:".dimmed(), draft),
            None => println!("{}", label.cyan()),
        }
    }

    async fn say(&mut self, text: &str) {
        let Some(session) = self.shell.session() else {
            println!("{}", "Open the chat screen first (:goto chat)".dimmed());
            return;
        };

        let events = session.subscribe();
        if let Submission::Dispatched(_) = session.submit(text) {
            follow_reply(session, events, self.shell.context().locale()).await;
        }
    }

    async fn listen(&mut self) {
        println!("🎤 Listening...");
        match self.shell.capture_voice().await {
            Ok(Some(VoiceDelivery::Draft(text))) => {
                println!("Heard: {} {}", text.bold(), "(press enter to send)".dimmed());
                self.draft = Some(text);
            }
            Ok(Some(VoiceDelivery::Submitted(_))) => {
                if let Some(session) = self.shell.session() {
                    let events = session.subscribe();
                    if session.is_awaiting() {
                        follow_reply(session, events, self.shell.context().locale()).await;
                    } else if let Some(turn) = session.last_turn() {
                        print_turn(&turn);
                    }
                }
            }
            Ok(None) => println!("{}", "Didn't catch that.".dimmed()),
            Err(VoiceError::UnsupportedCapability) => {
                println!("{}", "Voice input isn't available here; please type your question.".yellow())
            }
            Err(e) => {
                log_error("🎤", &e);
                eprintln!("⚠️  {}", e);
            }
        }
    }
}

/// Print assistant turns as they land until the session goes idle
async fn follow_reply(
    session: &Session,
    mut events: tokio::sync::broadcast::Receiver<SessionEvent>,
    locale: Locale,
) {
    println!("{}", thinking_label(locale).dimmed());
    loop {
        match events.recv().await {
            Ok(SessionEvent::TurnAppended(turn)) if !turn.is_user() => print_turn(&turn),
            Ok(SessionEvent::AwaitingChanged(false)) | Ok(SessionEvent::Disposed) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {
                session.wait_idle().await;
                if let Some(turn) = session.last_turn() {
                    print_turn(&turn);
                }
                break;
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn thinking_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Thinking...",
        Locale::Hi => "सोच रहा हूँ...",
        Locale::Pa => "ਸੋਚ ਰਿਹਾ ਹਾਂ...",
    }
}

fn print_turn(turn: &Turn) {
    let time = turn.time_label().dimmed();
    if turn.is_user() {
        println!("{} {} {}", time, "You:".blue().bold(), turn.text());
        return;
    }
    let text = match turn.kind() {
        TurnKind::Failure => turn.text().red().to_string(),
        _ => turn.text().to_string(),
    };
    println!("{} {} {}", time, "🌾 Assistant:".green().bold(), text);
}

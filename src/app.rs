use std::time::Instant;

use tracing::warn;

use crate::event::KeyAction;
use crate::model::chat::ChatMessage;
use crate::model::ticket::NormalizedTicket;
use crate::ops;
use crate::session::{Reply, Session};

const CHAT_HISTORY: usize = 200;
const PAGE: usize = 10;
const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    Quit,
}

pub struct App {
    pub session: Session,
    pub selected_ticket: usize,
    pub chat_messages: Vec<ChatMessage>,
    pub input_active: bool,
    pub input_buffer: String,
    /// Position in chars, not bytes.
    pub input_cursor: usize,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            selected_ticket: 0,
            chat_messages: Vec::new(),
            input_active: false,
            input_buffer: String::new(),
            input_cursor: 0,
            flash_message: None,
            should_quit: false,
        }
    }

    pub fn tickets(&self) -> &[NormalizedTicket] {
        self.session.tickets()
    }

    pub fn selected(&self) -> Option<&NormalizedTicket> {
        self.tickets().get(self.selected_ticket)
    }

    pub async fn update(&mut self, action: Action) {
        if let Some((_, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }

        match action {
            Action::Key(key) if self.input_active => self.handle_input_key(key).await,
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => {}
            Action::Quit => self.should_quit = true,
        }
    }

    async fn handle_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up => self.move_selection(-1),
            KeyAction::Down => self.move_selection(1),
            KeyAction::PageUp => self.move_selection(-(PAGE as isize)),
            KeyAction::PageDown => self.move_selection(PAGE as isize),
            KeyAction::Char('q') => self.should_quit = true,
            KeyAction::Char(':') | KeyAction::Char('/') => {
                self.input_active = true;
                self.input_buffer.clear();
                self.input_cursor = 0;
            }
            KeyAction::Char('r') => self.refresh().await,
            KeyAction::Char('a') => self.analyze_selected().await,
            KeyAction::Char('x') => self.chat_messages.clear(),
            _ => {}
        }
    }

    async fn handle_input_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Escape => self.close_input(),
            KeyAction::Select => {
                let line = std::mem::take(&mut self.input_buffer);
                self.close_input();
                self.submit(&line).await;
            }
            KeyAction::Char(c) => {
                let at = self.byte_index(self.input_cursor);
                self.input_buffer.insert(at, c);
                self.input_cursor += 1;
            }
            KeyAction::Backspace => {
                if self.input_cursor > 0 {
                    self.input_cursor -= 1;
                    let at = self.byte_index(self.input_cursor);
                    self.input_buffer.remove(at);
                }
            }
            KeyAction::Left => self.input_cursor = self.input_cursor.saturating_sub(1),
            KeyAction::Right => {
                self.input_cursor = (self.input_cursor + 1).min(self.input_buffer.chars().count())
            }
            _ => {}
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input_buffer
            .char_indices()
            .nth(cursor)
            .map_or(self.input_buffer.len(), |(i, _)| i)
    }

    fn close_input(&mut self) {
        self.input_active = false;
        self.input_buffer.clear();
        self.input_cursor = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.tickets().len();
        if len == 0 {
            self.selected_ticket = 0;
            return;
        }
        let next = self.selected_ticket as isize + delta;
        self.selected_ticket = next.clamp(0, len as isize - 1) as usize;
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), Instant::now()));
    }

    fn push_chat(&mut self, msg: ChatMessage) {
        self.chat_messages.push(msg);
        if self.chat_messages.len() > CHAT_HISTORY {
            let excess = self.chat_messages.len() - CHAT_HISTORY;
            self.chat_messages.drain(..excess);
        }
    }

    async fn submit(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.push_chat(ChatMessage::user(line.trim()));
        match self.session.handle(line).await {
            Reply::Nothing => {}
            Reply::Text(text) => self.push_chat(ChatMessage::assistant(text)),
            Reply::Exit => self.should_quit = true,
        }
        self.move_selection(0);
    }

    async fn refresh(&mut self) {
        self.flash("Refreshing...");
        match self.session.refresh().await {
            Ok(n) => self.flash(format!("Loaded {n} issue(s)")),
            Err(e) => {
                warn!(error = %e, "refresh failed");
                self.flash(format!("Fetch error: {e}"));
            }
        }
        self.move_selection(0);
    }

    async fn analyze_selected(&mut self) {
        let Some(ticket) = self.selected().cloned() else {
            return;
        };
        if let Err(e) = self.session.completer() {
            self.flash(format!("Analyze failed: {e}"));
            return;
        }
        self.push_chat(ChatMessage::system(format!("Analyzing {}...", ticket.key)));
        let result = match self.session.completer() {
            Ok(completer) => ops::insight::analyze(completer, &ticket).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => self.push_chat(ChatMessage::assistant(format!("{}\n{text}", ticket.key))),
            Err(e) => self.flash(format!("Analyze failed: {e}")),
        }
    }
}

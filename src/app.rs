use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::handler::{MessageKind, OutputSink, PriceFetchHandler};
use crate::quote::PriceClient;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Output sink that forwards messages to the UI loop
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<(MessageKind, String)>,
}

impl OutputSink for ChannelSink {
    fn show(&self, kind: MessageKind, message: &str) {
        // Receiver only goes away on shutdown
        let _ = self.tx.send((kind, message.to_string()));
    }
}

pub struct App {
    pub popup: Popup,
    pub should_quit: bool,

    // Stock name text field
    pub input_buffer: String,

    // Output element, overwritten by every message from the sink
    pub output_message: String,
    // None until the first trigger
    pub output_kind: Option<MessageKind>,

    pub handler: PriceFetchHandler,
    pub theme: Theme,

    sink: ChannelSink,
    output_rx: mpsc::UnboundedReceiver<(MessageKind, String)>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let client = PriceClient::new(config.endpoint.clone(), config.timeout());
        let handler = PriceFetchHandler::new(client, config.render_policy());
        let (tx, output_rx) = mpsc::unbounded_channel();

        Self {
            popup: Popup::None,
            should_quit: false,
            input_buffer: String::new(),
            output_message: String::new(),
            output_kind: None,
            handler,
            theme: Theme::from_config(&config.theme),
            sink: ChannelSink { tx },
            output_rx,
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.trigger(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
        Ok(())
    }

    /// Fire one lookup for the current field contents.
    /// Runs in the background so the UI keeps taking input; earlier
    /// lookups are left running.
    pub fn trigger(&mut self) {
        let handler = self.handler.clone();
        let sink = self.sink.clone();
        let input = self.input_buffer.clone();

        tracing::debug!(input = %input, "Price lookup triggered");

        tokio::spawn(async move {
            handler.handle(&input, &sink).await;
        });
    }

    /// Apply any output written since the last frame
    pub async fn tick(&mut self) -> Result<()> {
        while let Ok((kind, message)) = self.output_rx.try_recv() {
            self.output_kind = Some(kind);
            self.output_message = message;
        }
        Ok(())
    }
}

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::handler::{MessageKind, RenderPolicy};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(3), // Stock name input
            Constraint::Min(3),    // Output
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_input_box(f, app, chunks[1]);
    draw_output_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let policy = match app.handler.policy() {
        RenderPolicy::LastWriteWins => "last response wins",
        RenderPolicy::LatestOnly => "latest request only",
    };

    let line = Line::from(vec![
        Span::styled(" pricetap ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(theme.inactive)),
        Span::styled(app.handler.endpoint().to_string(), Style::default().fg(theme.text_dim)),
        Span::styled(" │ ", Style::default().fg(theme.inactive)),
        Span::styled(policy, Style::default().fg(theme.text_dim)),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

fn draw_input_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let is_active = app.popup == Popup::None;
    let border_color = if is_active { theme.accent } else { theme.inactive };

    let block = Block::default()
        .title(Span::styled(" Stock name ", Style::default().fg(border_color)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let input = Paragraph::new(Span::styled(app.input_buffer.as_str(), Style::default().fg(theme.text)))
        .block(block);

    f.render_widget(input, area);

    if is_active {
        // Cursor sits after the last character, clamped to the box
        let typed = u16::try_from(app.input_buffer.chars().count()).unwrap_or(u16::MAX);
        let max_x = area.x.saturating_add(area.width.saturating_sub(2));
        let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
        f.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
    }
}

fn draw_output_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(Span::styled(" Price ", Style::default().fg(theme.inactive)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    let content = match app.output_kind {
        None => Span::styled(
            "Type a stock name and press Enter",
            Style::default().fg(theme.text_dim),
        ),
        Some(MessageKind::Pending) => Span::styled(app.output_message.as_str(), Style::default().fg(theme.warning)),
        Some(MessageKind::Price) => Span::styled(
            app.output_message.as_str(),
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        ),
        Some(MessageKind::Error) => Span::styled(app.output_message.as_str(), Style::default().fg(theme.danger)),
    };

    let output = Paragraph::new(Line::from(content))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(output, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let hints: Vec<(&str, &str)> = vec![
        ("Enter", "Fetch"),
        ("Ctrl+U", "Clear"),
        ("F1", "Help"),
        ("Esc", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 40 { 2 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let header = Style::default().fg(theme.danger).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(theme.accent);
    let dim = Style::default().fg(theme.text_dim);

    let help_text = vec![
        Line::from(Span::styled("═══ Lookup ═══", header)),
        Line::from(vec![Span::styled("  Enter     ", key), Span::raw("Fetch the price for the typed name")]),
        Line::from(vec![Span::styled("  Backspace ", key), Span::raw("Delete last character")]),
        Line::from(vec![Span::styled("  Ctrl+U    ", key), Span::raw("Clear the field")]),
        Line::from(""),
        Line::from(Span::styled("═══ Responses ═══", header)),
        Line::from(Span::raw("  Lookups run in the background and are never cancelled.")),
        Line::from(Span::raw("  Set discard_stale = true to ignore late answers from")),
        Line::from(Span::raw("  older lookups.")),
        Line::from(""),
        Line::from(Span::styled("═══ Quick Start ═══", header)),
        Line::from(vec![Span::styled("  pricetap                 ", key), Span::raw("Launch this TUI")]),
        Line::from(vec![Span::styled("  pricetap --symbol ACME   ", key), Span::raw("Print one price and exit")]),
        Line::from(vec![Span::styled("  pricetap --endpoint URL  ", key), Span::raw("Use another price endpoint")]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", dim),
            Span::styled("F1", key),
            Span::styled("/", dim),
            Span::styled("Esc", key),
            Span::styled(" to close", dim),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" pricetap Help ", key))
                .borders(Borders::ALL)
                .border_style(key),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_draw_shows_input_and_output() {
        let mut app = App::new(&AppConfig::default());
        app.input_buffer = "ACME".to_string();
        app.output_message = "123.45".to_string();
        app.output_kind = Some(MessageKind::Price);

        let screen = render_to_string(&app);
        assert!(screen.contains("ACME"));
        assert!(screen.contains("123.45"));
        assert!(screen.contains("Stock name"));
    }

    #[tokio::test]
    async fn test_draw_huge_input_clamps_cursor() {
        let mut app = App::new(&AppConfig::default());
        app.input_buffer = "A".repeat(70_000);

        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        // Input box spans the full width starting at row 1
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor, Position::new(58, 2));
    }

    #[tokio::test]
    async fn test_draw_help_popup() {
        let mut app = App::new(&AppConfig::default());
        app.popup = Popup::Help;

        let screen = render_to_string(&app);
        assert!(screen.contains("Help"));
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}

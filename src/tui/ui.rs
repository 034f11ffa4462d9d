use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::page::ActionButton;
use crate::tui::app::App;

const HELP: &str = "Enter: press  r: refresh  c: reconnect  x: clear error  q: quit";

pub fn draw(frame: &mut Frame, app: &App) {
    let view = app.view();

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" Crypto Devs Whitelist - {} ", app.network_label));
    let inner = outer.inner(frame.area());
    frame.render_widget(outer, frame.area());

    let [title, description, count, account, button, error, _, footer, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(view.title)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        title,
    );
    frame.render_widget(
        Paragraph::new(view.description).alignment(Alignment::Center),
        description,
    );
    frame.render_widget(
        Paragraph::new(view.count_line.as_str()).alignment(Alignment::Center),
        count,
    );

    let account_line = view
        .account_line
        .clone()
        .unwrap_or_else(|| format!("Contract {}", app.contract));
    frame.render_widget(
        Paragraph::new(account_line)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        account,
    );

    draw_button(frame, view.button, button);

    if let Some(message) = &view.error_line {
        frame.render_widget(
            Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            error,
        );
    }

    frame.render_widget(
        Paragraph::new(view.footer).alignment(Alignment::Center),
        footer,
    );
    frame.render_widget(
        Paragraph::new(HELP)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        help,
    );

    if let Some(message) = &app.alert {
        draw_alert(frame, message);
    }
}

fn draw_button(frame: &mut Frame, button: ActionButton, area: Rect) {
    let [area] = Layout::horizontal([Constraint::Length(48)])
        .flex(Flex::Center)
        .areas(area);

    if !button.is_button() {
        frame.render_widget(
            Paragraph::new(button.label())
                .style(Style::default().fg(Color::Green))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let style = if button.is_enabled() {
        Style::default().fg(Color::Black).bg(Color::Blue)
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(button.label(), style)))
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let [area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(message),
            Line::from(""),
            Line::from(Span::styled(
                "press any key",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Alert "),
        )
        .alignment(Alignment::Center),
        area,
    );
}

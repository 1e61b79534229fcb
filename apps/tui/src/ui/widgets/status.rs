use crate::app::{App, AppScreen};
use crate::domain::TransportType;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

const fn screen_title(screen: AppScreen) -> &'static str {
    match screen {
        AppScreen::Parameters => "Parameters",
        AppScreen::Datasets => "Datasets",
        AppScreen::AnalysisType => "Analysis Type",
        AppScreen::Clustering => "Clustering",
        AppScreen::Metrics => "Centrality",
    }
}

pub fn render_title(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("== Transit Network Analysis ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let selection = app.store.selection();
    let city = if selection.city.is_empty() {
        "-".to_string()
    } else {
        selection.city.clone()
    };
    let transport = if selection.transport.is_empty() {
        "-".to_string()
    } else {
        TransportType::label_for(&selection.transport)
    };
    let session = app
        .actions
        .session()
        .map_or("no session", |kind| kind.label());

    let line = TextLine::from(vec![
        Span::styled(
            screen_title(app.screen),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("City: ", Style::default().fg(Color::Gray)),
        Span::raw(city),
        Span::styled("  Transport: ", Style::default().fg(Color::Gray)),
        Span::raw(transport),
        Span::styled("  Dataset: ", Style::default().fg(Color::Gray)),
        Span::raw(selection.dataset_id.clone().unwrap_or_else(|| "-".to_string())),
        Span::styled("  Session: ", Style::default().fg(Color::Gray)),
        Span::raw(session),
    ]);

    f.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_status(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = status_block.inner(area);
    f.render_widget(status_block, area);

    if let Some(label) = app.loading_label() {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let throbber = Throbber::default()
            .label(label)
            .style(Style::default().fg(Color::Cyan))
            .throbber_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .throbber_set(BRAILLE_SIX);
        let mut state = app.throbber.clone();
        f.render_stateful_widget(throbber, chunks[0], &mut state);

        render_status_message(app, f, chunks[1]);
    } else {
        render_status_message(app, f, inner);
    }
}

fn render_status_message(app: &App, f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(Span::styled(
        app.status_message.clone(),
        Style::default().fg(Color::Green),
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

pub fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let pairs: &[(&str, &str)] = match app.screen {
        AppScreen::Parameters => &[
            ("Tab", "Field"),
            ("↑/↓", "City"),
            ("Enter", "Create dataset"),
            ("F2", "Datasets"),
            ("Esc", "Clear city"),
        ],
        AppScreen::Datasets => &[
            ("Enter", "Open"),
            ("d", "Delete"),
            ("r", "Refresh"),
            ("n", "New"),
            ("q", "Quit"),
        ],
        AppScreen::AnalysisType => &[("↑/↓", "Choose"), ("Enter", "Run"), ("Esc", "Back")],
        AppScreen::Clustering => &[
            ("Tab", "Method"),
            ("↑/↓", "Clusters"),
            ("x", "Start over"),
            ("Esc", "Back"),
        ],
        AppScreen::Metrics => &[
            ("Tab", "Metric"),
            ("←/→", "Slide"),
            ("+/-", "Window"),
            ("x", "Start over"),
            ("Esc", "Back"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in pairs {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(": {action}   "),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled(
        "F1",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(": Help", Style::default().fg(Color::Gray)));

    f.render_widget(
        Paragraph::new(TextLine::from(spans)).alignment(Alignment::Center),
        area,
    );
}

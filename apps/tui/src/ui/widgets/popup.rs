use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// A rectangle of the given percentages, centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

fn key_line(key: &'static str, description: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(
            format!("  {key:<10}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(description),
    ])
}

fn heading(text: &'static str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(Span::styled(
            "Transit Network Analysis",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Register a city's transport network, then explore its communities \
             (Leiden, Louvain) or stop centrality (PageRank, Betweenness).",
        ),
        TextLine::from(""),
        heading("Everywhere:"),
        key_line("F1", "Toggle this help"),
        key_line("F2", "Dataset list"),
        key_line("Esc", "Go back (clears the city filter on Parameters)"),
        key_line("q", "Quit (outside the city field)"),
        TextLine::from(""),
        heading("Parameters:"),
        key_line("type", "Filter cities"),
        key_line("Tab", "Switch between city and transport"),
        key_line("↑/↓ ←/→", "Pick a city / transport"),
        key_line("Enter", "Create the dataset"),
        TextLine::from(""),
        heading("Datasets:"),
        key_line("Enter", "Open dataset"),
        key_line("d", "Delete dataset (confirm with y)"),
        key_line("r", "Refresh"),
        TextLine::from(""),
        heading("Results:"),
        key_line("Tab / m", "Switch method or metric"),
        key_line("←/→", "Slide histogram window"),
        key_line("+/-", "Grow / shrink window"),
        key_line("0", "Reset window"),
        key_line("x", "Clear selection and start over"),
        TextLine::from(""),
        heading("CLI Options:"),
    ];

    let help_text = crate::cli::CliArgs::help_text();
    for line in help_text.lines() {
        if line.starts_with("Usage") || line.starts_with("Options") || line.trim().is_empty() {
            continue;
        }
        lines.push(TextLine::from(line.to_string()));
    }

    lines
}

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(Clear, popup_area);

    let help_block = Block::default()
        .title(" Keyboard shortcuts ")
        .title_bottom(TextLine::from(" F1 / Esc to close ").alignment(Alignment::Center))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    f.render_widget(
        Paragraph::new(Text::from(build_help_lines()))
            .block(help_block)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

/// Blocking error message; dismissed with Enter or Esc.
pub fn render_error_popup(message: &str, f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 30, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Error ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Text::from(vec![
        TextLine::from(""),
        TextLine::from(message.to_string()),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Enter / Esc to dismiss",
            Style::default().fg(Color::Gray),
        )),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

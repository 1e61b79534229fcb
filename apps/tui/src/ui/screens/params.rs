use crate::app::{App, ParamsField};
use crate::domain::TransportType;
use crate::ui::widgets::tables::{scroll_offset, selected_row_style};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

fn field_block(title: &'static str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Green } else { Color::Gray };
    Block::default()
        .title(title)
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

pub fn render_params(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_city_picker(app, f, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(columns[1]);
    render_transport_picker(app, f, right[0]);
    render_summary(app, f, right[1]);
}

fn render_city_picker(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.params.field == ParamsField::City;
    let block = field_block(" City ", focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let cursor = if focused { "_" } else { "" };
    let input = TextLine::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(app.params.city_query.clone()),
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(Paragraph::new(input), chunks[0]);

    let matches = app.params.matching_cities();
    if matches.is_empty() {
        let hint = if app.params.city_query.trim().is_empty() {
            String::new()
        } else {
            format!("No known city matches; \"{}\" will be used as typed", app.params.city_query.trim())
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray))),
            chunks[1],
        );
        return;
    }

    let visible = usize::from(chunks[1].height);
    let offset = scroll_offset(matches.len(), visible, app.params.city_index);
    let lines: Vec<TextLine<'_>> = matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, city)| {
            if index == app.params.city_index {
                let style = if focused {
                    selected_row_style()
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                TextLine::from(Span::styled(format!(" {city} "), style))
            } else {
                TextLine::from(format!(" {city}"))
            }
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)), chunks[1]);
}

fn render_transport_picker(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.params.field == ParamsField::Transport;
    let selected = app.params.selected_transport();

    let lines: Vec<TextLine<'_>> = TransportType::ALL
        .iter()
        .map(|transport| {
            if *transport == selected {
                let style = if focused {
                    selected_row_style()
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                TextLine::from(Span::styled(format!("(•) {}", transport.label()), style))
            } else {
                TextLine::from(format!("( ) {}", transport.label()))
            }
        })
        .collect();

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(field_block(" Transport ", focused)),
        area,
    );
}

fn render_summary(app: &App, f: &mut Frame<'_>, area: Rect) {
    let city = app.params.selected_city().unwrap_or_default();
    let ready = app.params.is_valid();

    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("City:      ", Style::default().fg(Color::Gray)),
            Span::raw(city),
        ]),
        TextLine::from(vec![
            Span::styled("Transport: ", Style::default().fg(Color::Gray)),
            Span::raw(app.params.selected_transport().label()),
        ]),
        TextLine::from(""),
    ];
    lines.push(if ready {
        TextLine::from(Span::styled(
            "Enter: create dataset",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
    } else {
        TextLine::from(Span::styled(
            "Pick a city to continue",
            Style::default().fg(Color::Gray),
        ))
    });

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Selection ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

use crate::app::App;
use crate::domain::TransportType;
use crate::ui::widgets::tables::{header_style, scroll_offset, selected_row_style};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub fn render_datasets(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    if app.datasets.is_empty() {
        let block = Block::default()
            .title("Datasets")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let paragraph = Paragraph::new("No datasets yet. Press n to create one.")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, chunks[0]);
        return;
    }

    let header = Row::new(vec![
        Cell::from("City"),
        Cell::from("Transport"),
        Cell::from("Dataset"),
        Cell::from("Cached"),
    ])
    .style(header_style());

    let total_rows = app.datasets.len();
    let max_visible_rows = usize::from(chunks[0].height.saturating_sub(3));
    let offset = scroll_offset(total_rows, max_visible_rows, app.selected_dataset_index);
    let current = app.store.dataset_id();

    let rows = app
        .datasets
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, dataset)| {
            let cached = app.store.analysis_data(&dataset.dataset_id).map_or_else(
                String::new,
                |entry| {
                    let mut parts = Vec::new();
                    if !entry.clusters.is_empty() {
                        parts.push("clusters");
                    }
                    if !entry.metrics.is_empty() {
                        parts.push("metrics");
                    }
                    parts.join(", ")
                },
            );

            let style = if index == app.selected_dataset_index {
                selected_row_style()
            } else if current == Some(dataset.dataset_id.as_str()) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(dataset.city.clone()),
                Cell::from(TransportType::label_for(&dataset.transport_type)),
                Cell::from(dataset.dataset_id.clone()),
                Cell::from(cached),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Percentage(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    "Datasets ({} of {})",
                    app.selected_dataset_index + 1,
                    total_rows
                ))
                .borders(Borders::ALL),
        )
        .column_spacing(1);

    f.render_widget(table, chunks[0]);

    if app.confirm_delete {
        let name = app
            .selected_dataset()
            .map(|d| format!("{} / {}", d.city, TransportType::label_for(&d.transport_type)))
            .unwrap_or_default();
        let prompt = TextLine::from(vec![
            Span::styled(
                format!("Delete {name}? "),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("y to confirm, any other key to cancel"),
        ]);
        f.render_widget(
            Paragraph::new(prompt).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

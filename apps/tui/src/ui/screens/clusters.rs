use crate::app::App;
use crate::domain::ClusterMethod;
use crate::summary::{cluster_counts, community_sizes, quality_rows};
use crate::ui::widgets::charts::render_cluster_size_chart;
use crate::ui::widgets::tables::{header_style, scroll_offset, selected_row_style};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs};
use ratatui::Frame;

pub fn render_method_tabs(selected: ClusterMethod, f: &mut Frame<'_>, area: Rect) {
    let titles = ClusterMethod::ALL
        .iter()
        .map(|method| TextLine::from(method.label()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(selected.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"))
        .block(Block::default().borders(Borders::BOTTOM));

    f.render_widget(tabs, area);
}

pub fn render_clusters(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(6)])
        .split(area);

    render_method_tabs(app.store.cluster_method(), f, chunks[0]);

    let Some(result) = app.store.current_cluster() else {
        let paragraph = Paragraph::new("No clustering result cached for this method")
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, chunks[1]);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    let counts = cluster_counts(result);
    render_size_summary(app, result.nodes.len(), f, left[0]);
    render_quality(app, f, left[1]);
    render_cluster_table(app, &counts, result.nodes.len(), f, right[0]);
    render_cluster_size_chart(&counts, f, right[1]);
}

fn stat_line(label: &'static str, value: String) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("{label:<18}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ])
}

fn render_size_summary(app: &App, nodes: usize, f: &mut Frame<'_>, area: Rect) {
    let lines = app
        .store
        .current_cluster()
        .and_then(community_sizes)
        .map_or_else(
            || vec![TextLine::from("No communities")],
            |sizes| {
                vec![
                    stat_line("Stops", nodes.to_string()),
                    stat_line("Communities", sizes.communities.to_string()),
                    stat_line("Smallest", sizes.min.to_string()),
                    stat_line("Largest", sizes.max.to_string()),
                    stat_line("Mean size", format!("{:.2}", sizes.mean)),
                    stat_line("Median size", format!("{:.0}", sizes.median)),
                    stat_line("Std deviation", format!("{:.2}", sizes.std_dev)),
                ]
            },
        );

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Community sizes ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn render_quality(app: &App, f: &mut Frame<'_>, area: Rect) {
    let statistics = app
        .store
        .current_cluster()
        .and_then(|result| result.statistics.as_ref());
    let lines: Vec<TextLine<'_>> = quality_rows(statistics)
        .into_iter()
        .map(|(label, value)| stat_line(label, value))
        .collect();

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Partition quality ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

#[allow(clippy::cast_precision_loss)]
fn render_cluster_table(
    app: &App,
    counts: &std::collections::BTreeMap<i64, usize>,
    total_nodes: usize,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let header = Row::new(vec![
        Cell::from("Cluster"),
        Cell::from("Stops"),
        Cell::from("Share"),
    ])
    .style(header_style());

    let total_rows = counts.len();
    let max_visible_rows = usize::from(area.height.saturating_sub(3));
    let offset = scroll_offset(total_rows, max_visible_rows, app.cluster_row_index);

    let rows = counts
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, (cluster_id, size))| {
            let share = if total_nodes == 0 {
                0.0
            } else {
                *size as f64 * 100.0 / total_nodes as f64
            };
            let style = if index == app.cluster_row_index {
                selected_row_style()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("#{cluster_id}")),
                Cell::from(size.to_string()),
                Cell::from(format!("{share:.1}%")),
            ])
            .style(style)
        });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("Clusters ({total_rows})"))
            .borders(Borders::ALL),
    )
    .column_spacing(1);

    f.render_widget(table, area);
}

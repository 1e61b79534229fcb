use crate::app::App;
use crate::domain::{MetricType, TransportType};
use crate::summary::{format_metric, MetricSummary};
use crate::ui::widgets::charts::render_metric_histogram;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

fn render_metric_tabs(selected: MetricType, f: &mut Frame<'_>, area: Rect) {
    let titles = MetricType::ALL
        .iter()
        .map(|metric| TextLine::from(metric.label()))
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

pub fn render_metrics(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(6)])
        .split(area);

    let metric = app.store.metric_type();
    render_metric_tabs(metric, f, chunks[0]);

    let Some(result) = app.store.current_metric() else {
        let paragraph = Paragraph::new("No metric result cached for this metric")
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, chunks[1]);
        return;
    };

    let summary = MetricSummary::from_result(result);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[1]);

    render_summary_card(app, metric, &summary, f, columns[0]);
    render_metric_histogram(metric.label(), &summary.ranked, app.histogram, f, columns[1]);
}

fn render_summary_card(
    app: &App,
    metric: MetricType,
    summary: &MetricSummary,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let selection = app.store.selection();
    let row = |label: &'static str, value: String| {
        TextLine::from(vec![
            Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ])
    };

    let mut lines = vec![
        row("City", selection.city.clone()),
        row("Transport", TransportType::label_for(&selection.transport)),
        row("Stops", summary.nodes.to_string()),
        row(
            match metric {
                MetricType::PageRank => "Max PageRank",
                MetricType::Betweenness => "Max betweenness",
            },
            format_metric(summary.max),
        ),
        TextLine::from(""),
        row("Window", format!("{} stops", app.histogram.size)),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Top stops",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let top = usize::from(area.height.saturating_sub(lines.len() as u16 + 2));
    for node in summary.ranked.iter().take(top) {
        lines.push(TextLine::from(vec![
            Span::raw(format!("{:<20.20} ", node.name)),
            Span::styled(format_metric(node.metric), Style::default().fg(Color::Yellow)),
        ]));
    }

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Summary ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

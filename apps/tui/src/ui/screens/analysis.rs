use crate::api::AnalysisKey;
use crate::app::App;
use crate::domain::AnalysisType;
use crate::ui::widgets::tables::selected_row_style;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_analysis_type(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    let mut lines = Vec::new();
    for (index, analysis_type) in AnalysisType::ALL.iter().enumerate() {
        let text = format!(" {} ", analysis_type.label());
        lines.push(if index == app.analysis_type_index {
            TextLine::from(Span::styled(text, selected_row_style()))
        } else {
            TextLine::from(text)
        });
        lines.push(TextLine::from(""));
    }

    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Choose an analysis ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        ),
        chunks[0],
    );

    render_cache_state(app, f, chunks[1]);
}

/// Which results are already cached for the current dataset.
fn render_cache_state(app: &App, f: &mut Frame<'_>, area: Rect) {
    let mut lines = Vec::new();

    match app.store.dataset_id() {
        None => lines.push(TextLine::from(Span::styled(
            "No dataset selected",
            Style::default().fg(Color::Red),
        ))),
        Some(dataset_id) => {
            for analysis_type in AnalysisType::ALL {
                let missing = app.store.missing(dataset_id, analysis_type);
                let spans: Vec<Span<'_>> = AnalysisKey::required_for(analysis_type)
                    .into_iter()
                    .flat_map(|key| {
                        let (mark, color) = if missing.contains(&key) {
                            ("○", Color::Gray)
                        } else {
                            ("●", Color::Green)
                        };
                        [
                            Span::styled(mark, Style::default().fg(color)),
                            Span::raw(format!(" {}  ", key.label())),
                        ]
                    })
                    .collect();
                lines.push(TextLine::from(spans));
            }
            lines.push(TextLine::from(""));
            lines.push(TextLine::from(Span::styled(
                "Missing results are computed by the service; clustering a large network can take a while.",
                Style::default().fg(Color::Gray),
            )));
        }
    }

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::default().title(" Cached results ").borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

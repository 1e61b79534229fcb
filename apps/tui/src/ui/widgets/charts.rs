use crate::summary::{format_metric, HistogramWindow, RankedNode};
use ratatui::layout::{Alignment, Direction, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line as TextLine;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;
use std::collections::BTreeMap;

const GRADIENT: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (0, 17, 255)),
    (0.25, (0, 255, 255)),
    (0.5, (255, 255, 0)),
    (0.75, (255, 123, 0)),
    (1.0, (255, 0, 0)),
];

/// Blue-to-red heat colour for a value normalised to `0.0..=1.0`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub fn metric_color(norm: f64) -> Color {
    let norm = if norm.is_finite() { norm.clamp(0.0, 1.0) } else { 0.0 };

    for pair in GRADIENT.windows(2) {
        let (lo, (r1, g1, b1)) = pair[0];
        let (hi, (r2, g2, b2)) = pair[1];
        if norm <= hi {
            let t = (norm - lo) / (hi - lo);
            let mix = |a: u8, b: u8| (b as f64 - a as f64).mul_add(t, a as f64).round() as u8;
            return Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2));
        }
    }

    Color::Rgb(255, 0, 0)
}

fn empty_panel(title: &str, message: &str, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

/// Largest communities first.
pub fn render_cluster_size_chart(counts: &BTreeMap<i64, usize>, f: &mut Frame<'_>, area: Rect) {
    if counts.is_empty() {
        empty_panel("Community Sizes", "No clusters", f, area);
        return;
    }

    let mut by_size: Vec<(i64, usize)> = counts.iter().map(|(id, n)| (*id, *n)).collect();
    by_size.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let visible = usize::from(area.width.saturating_sub(2) / 6).max(1);

    let bars: Vec<Bar<'_>> = by_size
        .iter()
        .take(visible)
        .map(|(cluster_id, size)| {
            Bar::default()
                .value(*size as u64)
                .label(TextLine::from(format!("#{cluster_id}")))
                .style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = by_size.first().map_or(1, |(_, size)| *size as u64).max(1);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Community Sizes")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(5);

    f.render_widget(chart, area);
}

/// Horizontal histogram of the ranked nodes inside `window`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_metric_histogram(
    title: &str,
    ranked: &[RankedNode],
    window: HistogramWindow,
    f: &mut Frame<'_>,
    area: Rect,
) {
    if ranked.is_empty() {
        empty_panel(title, "No nodes", f, area);
        return;
    }

    let bounds = window.bounds(ranked.len());
    let heading = format!(
        "{title} - nodes {}..{} of {}",
        bounds.start + 1,
        bounds.end,
        ranked.len()
    );

    let bars: Vec<Bar<'_>> = window
        .slice(ranked)
        .iter()
        .map(|node| {
            Bar::default()
                .value((node.norm * 1000.0).round() as u64)
                .text_value(format_metric(node.metric))
                .label(TextLine::from(node.name.clone()))
                .style(Style::default().fg(metric_color(node.norm)))
                .value_style(Style::default().fg(Color::Black))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(heading)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .max(1000)
        .bar_gap(0)
        .bar_width(1);

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints() {
        assert_eq!(metric_color(0.0), Color::Rgb(0, 17, 255));
        assert_eq!(metric_color(1.0), Color::Rgb(255, 0, 0));
        assert_eq!(metric_color(0.5), Color::Rgb(255, 255, 0));
    }

    #[test]
    fn gradient_interpolates_and_clamps() {
        assert_eq!(metric_color(0.125), Color::Rgb(0, 136, 255));
        assert_eq!(metric_color(-3.0), metric_color(0.0));
        assert_eq!(metric_color(f64::NAN), metric_color(0.0));
        assert_eq!(metric_color(7.0), metric_color(1.0));
    }
}

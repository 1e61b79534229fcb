// UI module for transit-analysis
// Handles all UI rendering functions

pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title and selection
            Constraint::Min(8),    // Screen content
            Constraint::Length(3), // Status / spinner
            Constraint::Length(1), // Shortcuts
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    widgets::status::render_title(app, f, layout[0]);

    match app.screen {
        AppScreen::Parameters => screens::params::render_params(app, f, layout[1]),
        AppScreen::Datasets => screens::datasets::render_datasets(app, f, layout[1]),
        AppScreen::AnalysisType => screens::analysis::render_analysis_type(app, f, layout[1]),
        AppScreen::Clustering => screens::clusters::render_clusters(app, f, layout[1]),
        AppScreen::Metrics => screens::metrics::render_metrics(app, f, layout[1]),
    }

    widgets::status::render_status(app, f, layout[2]);
    widgets::status::render_shortcuts(app, f, layout[3]);

    if app.show_help {
        widgets::popup::render_help_popup(f, f.area());
    }
    if let Some(message) = &app.error_popup {
        widgets::popup::render_error_popup(message, f, f.area());
    }
}

use crate::app::input::helpers::{clamped_back, clamped_forward, PAGE_STEP};
use crate::app::input::screens::handle_common_keys;
use crate::app::state::App;
use crate::summary::cluster_counts;
use crossterm::event::KeyCode;

pub fn handle_clusters_input(app: &mut App, key: KeyCode) {
    if handle_common_keys(app, key) {
        return;
    }

    let total_rows = app
        .store
        .current_cluster()
        .map_or(0, |result| cluster_counts(result).len());

    match key {
        KeyCode::Tab | KeyCode::Char('m') => app.toggle_cluster_method(),
        KeyCode::Char('x') => app.start_over(),
        KeyCode::Up => app.cluster_row_index = clamped_back(app.cluster_row_index, 1),
        KeyCode::Down => {
            app.cluster_row_index = clamped_forward(app.cluster_row_index, 1, total_rows);
        }
        KeyCode::PageUp => app.cluster_row_index = clamped_back(app.cluster_row_index, PAGE_STEP),
        KeyCode::PageDown => {
            app.cluster_row_index = clamped_forward(app.cluster_row_index, PAGE_STEP, total_rows);
        }
        KeyCode::Home => app.cluster_row_index = 0,
        KeyCode::End => app.cluster_row_index = total_rows.saturating_sub(1),
        _ => {}
    }
}

use crate::app::input::helpers::{clamped_back, clamped_forward, PAGE_STEP};
use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub async fn handle_datasets_input(app: &mut App, key: KeyCode) {
    if app.confirm_delete {
        if key == KeyCode::Char('y') {
            app.delete_selected_dataset().await;
        } else {
            app.confirm_delete = false;
            app.status_message = "Delete cancelled".to_string();
        }
        return;
    }

    let total_rows = app.datasets.len();

    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Esc | KeyCode::Char('n') => app.screen = AppScreen::Parameters,
        KeyCode::Char('r') => app.refresh_datasets().await,
        KeyCode::Char('d') | KeyCode::Delete => {
            if total_rows > 0 {
                app.confirm_delete = true;
            }
        }
        KeyCode::Enter => app.select_dataset(),
        KeyCode::Up => app.selected_dataset_index = clamped_back(app.selected_dataset_index, 1),
        KeyCode::Down => {
            app.selected_dataset_index = clamped_forward(app.selected_dataset_index, 1, total_rows);
        }
        KeyCode::PageUp => {
            app.selected_dataset_index = clamped_back(app.selected_dataset_index, PAGE_STEP);
        }
        KeyCode::PageDown => {
            app.selected_dataset_index =
                clamped_forward(app.selected_dataset_index, PAGE_STEP, total_rows);
        }
        KeyCode::Home => app.selected_dataset_index = 0,
        KeyCode::End => app.selected_dataset_index = total_rows.saturating_sub(1),
        _ => {}
    }
}

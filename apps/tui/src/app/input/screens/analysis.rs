use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::input::screens::handle_common_keys;
use crate::app::state::App;
use crate::domain::AnalysisType;
use crossterm::event::KeyCode;

pub fn handle_analysis_type_input(app: &mut App, key: KeyCode) {
    if handle_common_keys(app, key) {
        return;
    }

    let options = AnalysisType::ALL.len();
    match key {
        KeyCode::Up => app.analysis_type_index = wrap_decrement(app.analysis_type_index, options),
        KeyCode::Down => app.analysis_type_index = wrap_increment(app.analysis_type_index, options),
        KeyCode::Enter => {
            if !app.is_loading() {
                app.choose_analysis_type();
            }
        }
        _ => {}
    }
}

use crate::app::input::screens::handle_common_keys;
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_metrics_input(app: &mut App, key: KeyCode) {
    if handle_common_keys(app, key) {
        return;
    }

    let total = app.metric_node_count();
    match key {
        KeyCode::Tab | KeyCode::Char('m') => app.toggle_metric_type(),
        KeyCode::Char('x') => app.start_over(),
        KeyCode::Left => app.histogram.shift_left(),
        KeyCode::Right => app.histogram.shift_right(total),
        KeyCode::Char('+' | '=') => app.histogram.grow(total),
        KeyCode::Char('-') => app.histogram.shrink(total),
        KeyCode::Char('0') => app.histogram.reset(),
        _ => {}
    }
}

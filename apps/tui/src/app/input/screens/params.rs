use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{App, AppScreen, ParamsField};
use crate::domain::TransportType;
use crossterm::event::KeyCode;

pub async fn handle_params_input(app: &mut App, key: KeyCode) {
    match key {
        // Parameters is the first screen: Esc only clears the city filter.
        KeyCode::Esc => {
            if app.params.field == ParamsField::City && !app.params.city_query.is_empty() {
                app.params.city_query.clear();
                app.params.city_index = 0;
            }
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.params.field = match app.params.field {
                ParamsField::City => ParamsField::Transport,
                ParamsField::Transport => ParamsField::City,
            };
            return;
        }
        KeyCode::F(2) => {
            app.screen = AppScreen::Datasets;
            return;
        }
        KeyCode::Enter => {
            app.submit_parameters().await;
            return;
        }
        _ => {}
    }

    match app.params.field {
        ParamsField::City => handle_city_keys(app, key),
        ParamsField::Transport => handle_transport_keys(app, key),
    }
}

fn handle_city_keys(app: &mut App, key: KeyCode) {
    let matches = app.params.matching_cities().len();
    match key {
        KeyCode::Char(ch) => app.params.push_char(ch),
        KeyCode::Backspace => app.params.pop_char(),
        KeyCode::Up => app.params.city_index = wrap_decrement(app.params.city_index, matches),
        KeyCode::Down => app.params.city_index = wrap_increment(app.params.city_index, matches),
        _ => {}
    }
}

fn handle_transport_keys(app: &mut App, key: KeyCode) {
    let options = TransportType::ALL.len();
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Left | KeyCode::Up => {
            app.params.transport_index = wrap_decrement(app.params.transport_index, options);
        }
        KeyCode::Right | KeyCode::Down => {
            app.params.transport_index = wrap_increment(app.params.transport_index, options);
        }
        _ => {}
    }
}

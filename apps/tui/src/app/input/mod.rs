mod helpers;
pub mod screens;

use crate::app::state::App;
use crossterm::event::KeyCode;

/// Routes one key press to the overlay or screen that owns it.
pub async fn handle_input(app: &mut App, key: KeyCode) {
    screens::dispatch_input(app, key).await;
}

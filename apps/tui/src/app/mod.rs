// App module for transit-analysis
// Application state, backend actions and fetch orchestration

pub mod actions;
pub mod fetch;
pub mod input;
pub mod state;

pub use actions::AppActions;
pub use input::handle_input;
pub use state::{App, AppScreen, ParamsField};

use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

mod analysis;
mod clusters;
mod datasets;
mod metrics;
mod params;

pub async fn dispatch_input(app: &mut App, key: KeyCode) {
    if handle_overlays(app, key) {
        return;
    }

    match app.screen {
        AppScreen::Parameters => params::handle_params_input(app, key).await,
        AppScreen::Datasets => datasets::handle_datasets_input(app, key).await,
        AppScreen::AnalysisType => analysis::handle_analysis_type_input(app, key),
        AppScreen::Clustering => clusters::handle_clusters_input(app, key),
        AppScreen::Metrics => metrics::handle_metrics_input(app, key),
    }
}

/// The error popup and the help overlay take every key while shown.
fn handle_overlays(app: &mut App, key: KeyCode) -> bool {
    if app.error_popup.is_some() {
        if matches!(key, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_error();
        }
        return true;
    }

    match key {
        KeyCode::F(1) => app.show_help = !app.show_help,
        KeyCode::Esc if app.show_help => app.show_help = false,
        _ => return app.show_help,
    }
    true
}

/// Keys shared by every screen except the city text field.
fn handle_common_keys(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
            true
        }
        KeyCode::Esc => {
            app.go_back();
            true
        }
        KeyCode::F(2) => {
            app.screen = AppScreen::Datasets;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppActions;
    use crate::config::AppConfig;

    fn app() -> App {
        let config = AppConfig {
            token_path: std::env::temp_dir().join("transit-analysis-input-test.json"),
            ..AppConfig::default()
        };
        App::new(AppActions::from_config(&config).unwrap())
    }

    #[tokio::test]
    async fn error_popup_swallows_keys_until_dismissed() {
        let mut app = app();
        app.error_popup = Some("boom".to_string());

        dispatch_input(&mut app, KeyCode::Char('q')).await;
        assert!(app.running);

        dispatch_input(&mut app, KeyCode::Esc).await;
        assert!(app.error_popup.is_none());
    }

    #[tokio::test]
    async fn typing_q_in_city_field_does_not_quit() {
        let mut app = app();

        dispatch_input(&mut app, KeyCode::Char('q')).await;

        assert!(app.running);
        assert_eq!(app.params.city_query, "q");
    }

    #[tokio::test]
    async fn escape_on_parameters_clears_filter_without_quitting() {
        let mut app = app();
        dispatch_input(&mut app, KeyCode::Char('k')).await;
        dispatch_input(&mut app, KeyCode::Char('a')).await;

        dispatch_input(&mut app, KeyCode::Esc).await;
        assert!(app.running);
        assert_eq!(app.screen, AppScreen::Parameters);
        assert!(app.params.city_query.is_empty());

        dispatch_input(&mut app, KeyCode::Esc).await;
        assert!(app.running);
    }

    #[tokio::test]
    async fn help_overlay_captures_input() {
        let mut app = app();
        app.screen = AppScreen::AnalysisType;

        dispatch_input(&mut app, KeyCode::F(1)).await;
        dispatch_input(&mut app, KeyCode::Char('q')).await;
        assert!(app.show_help);
        assert!(app.running);

        dispatch_input(&mut app, KeyCode::Esc).await;
        assert!(!app.show_help);
        assert_eq!(app.screen, AppScreen::AnalysisType);
    }

    #[tokio::test]
    async fn escape_walks_back_through_screens() {
        let mut app = app();
        app.screen = AppScreen::Metrics;

        dispatch_input(&mut app, KeyCode::Esc).await;
        assert_eq!(app.screen, AppScreen::AnalysisType);
        dispatch_input(&mut app, KeyCode::Esc).await;
        assert_eq!(app.screen, AppScreen::Datasets);
        dispatch_input(&mut app, KeyCode::Esc).await;
        assert_eq!(app.screen, AppScreen::Parameters);
    }
}

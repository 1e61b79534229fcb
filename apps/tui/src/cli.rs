use crate::domain::AnalysisType;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "transit-analysis",
    version,
    about = "Transit network clustering and centrality analysis"
)]
pub struct CliArgs {
    /// Run a command without the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the analysis service URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the session token file
    #[arg(long = "token-file", value_name = "PATH")]
    pub token_file: Option<String>,

    /// Override the log file used by the terminal UI
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List datasets registered for the current session
    Datasets,

    /// Register a dataset for a city and transport type
    Create {
        #[arg(long)]
        city: String,
        #[arg(long)]
        transport: String,
    },

    /// Delete a dataset
    Delete { dataset_id: String },

    /// Fetch every result an analysis type needs for a dataset
    Analyze {
        dataset_id: String,
        #[arg(long = "type", value_parser = parse_analysis_type, default_value = "clustering")]
        analysis_type: AnalysisType,
    },

    /// Obtain and store a session token
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Forget the stored session token
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AuthCommand {
    /// Start a guest session
    Guest,

    /// Email a one-time login code
    RequestCode {
        #[arg(long)]
        email: String,
    },

    /// Exchange a login code for a session token
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
}

fn parse_analysis_type(value: &str) -> Result<AnalysisType, String> {
    AnalysisType::parse(value).ok_or_else(|| {
        format!("unknown analysis type `{value}`, expected clustering or heatmap")
    })
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("TRANSIT_API_URL", url);
        }
        if let Some(path) = &self.token_file {
            std::env::set_var("TRANSIT_TOKEN_PATH", path);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("TRANSIT_LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("TRANSIT_LOG_LEVEL", "debug");
        }
    }

    /// Subcommands only make sense without the UI.
    pub const fn wants_headless(&self) -> bool {
        self.headless || self.command.is_some()
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_type() {
        let args =
            CliArgs::try_parse_from(["transit-analysis", "analyze", "d1", "--type", "heatmap"])
                .unwrap();

        assert_eq!(
            args.command,
            Some(Command::Analyze {
                dataset_id: "d1".to_string(),
                analysis_type: AnalysisType::Heatmap,
            })
        );
        assert!(args.wants_headless());
    }

    #[test]
    fn rejects_unknown_analysis_type() {
        let result =
            CliArgs::try_parse_from(["transit-analysis", "analyze", "d1", "--type", "isochrone"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_auth_subcommands() {
        let args = CliArgs::try_parse_from([
            "transit-analysis",
            "--json",
            "auth",
            "verify",
            "--email",
            "rider@example.com",
            "--code",
            "123456",
        ])
        .unwrap();

        assert!(args.json);
        assert_eq!(
            args.command,
            Some(Command::Auth(AuthCommand::Verify {
                email: "rider@example.com".to_string(),
                code: "123456".to_string(),
            }))
        );
    }

    #[test]
    fn no_subcommand_runs_the_ui() {
        let args = CliArgs::try_parse_from(["transit-analysis", "--api-url", "http://x"]).unwrap();
        assert!(!args.wants_headless());
        assert_eq!(args.api_url.as_deref(), Some("http://x"));
    }

    #[test]
    fn help_mentions_subcommands() {
        let help = CliArgs::help_text();
        assert!(help.contains("analyze"));
        assert!(help.contains("--api-url"));
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::config::{Config, load_config};
use crate::diagram::{Diagram, DiagramState, Interaction};
use crate::fetch::{FetchError, WorkflowClient, decode_workflow_str};
use crate::layout::Direction;
use crate::model::Step;
use crate::render::{SvgSurface, write_output_svg};

#[derive(Parser, Debug)]
#[command(name = "stepflow", version, about = "Workflow dependency-graph renderer")]
pub struct Args {
    /// Workflow endpoint; overrides the configured base URL
    #[arg(long = "url")]
    pub url: Option<String>,

    /// Local workflow JSON file instead of fetching
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Flow direction (LR or TD)
    #[arg(short = 'd', long = "direction", default_value = "LR")]
    pub direction: String,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Print the detail panel for this node id after loading
    #[arg(long = "inspect")]
    pub inspect: Option<String>,

    /// Also copy the inspected record to the clipboard
    #[arg(long = "copy")]
    pub copy: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);
    let direction = Direction::from_token(&args.direction).ok_or_else(|| {
        anyhow::anyhow!("unknown direction `{}` (expected LR or TD)", args.direction)
    })?;

    let outcome = load_steps(&args, &config);
    let mut diagram = Diagram::new(direction, config.layout.clone());
    diagram.resolve(outcome);

    if let DiagramState::Failed(message) = diagram.state() {
        anyhow::bail!("workflow load failed: {message}");
    }

    if let Some(id) = &args.inspect {
        diagram.handle(Interaction::NodeClicked(id.clone()));
        if let Some(details) = diagram.selected_details() {
            println!("{}", details.render_text());
            if args.copy {
                details.copy_to_clipboard();
            }
        }
        diagram.handle(Interaction::PanelClosed);
    }

    let mut surface = SvgSurface::default();
    diagram.sync(&mut surface, config.render.width, config.render.height);
    let svg = surface.render(&config.theme, &config.render);

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let output = args
                .output
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            crate::render::write_output_png(&svg, &output, &config.render)?;
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => {
            anyhow::bail!("png output requires the `png` feature");
        }
    }

    Ok(())
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(url) = &args.url {
        config.fetch.base_url = url.clone();
    }
    config
}

/// Resolves the step list from a local file or the remote endpoint. Both
/// paths share the decode step, so a bad document fails identically.
fn load_steps(args: &Args, config: &Config) -> Result<Vec<Step>, FetchError> {
    if let Some(path) = &args.input {
        tracing::info!(path = %path.display(), "reading workflow from file");
        let contents =
            std::fs::read_to_string(path).map_err(|err| FetchError::Network(err.to_string()))?;
        return decode_workflow_str(&contents);
    }

    let client = WorkflowClient::with_timeout(
        &config.fetch.base_url,
        Duration::from_secs(config.fetch.timeout_secs),
    )?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| FetchError::Network(err.to_string()))?;
    runtime.block_on(client.fetch_steps())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["stepflow"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn url_flag_overrides_configured_base_url() {
        let config = apply_overrides(Config::default(), &args(&["--url", "http://api.example/steps"]));
        assert_eq!(config.fetch.base_url, "http://api.example/steps");
    }

    #[test]
    fn config_base_url_survives_without_flag() {
        let config = apply_overrides(Config::default(), &args(&[]));
        assert_eq!(config.fetch.base_url, "http://localhost:8000/file/return-json/");
    }

    #[test]
    fn direction_tokens_parse_case_insensitively() {
        assert_eq!(Direction::from_token("LR"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_token("td"), Some(Direction::TopDown));
        assert_eq!(Direction::from_token("diagonal"), None);
    }

    #[test]
    fn file_input_shares_the_decode_taxonomy() {
        let path = std::env::temp_dir().join("stepflow-cli-bad-input.json");
        std::fs::write(&path, r#"{"steps":[]}"#).expect("temp write");
        let parsed = load_steps(
            &args(&["--input", path.to_str().expect("utf-8 path")]),
            &Config::default(),
        );
        assert!(matches!(parsed, Err(FetchError::Malformed(_))));
        std::fs::remove_file(path).ok();
    }
}

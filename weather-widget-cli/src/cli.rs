use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use std::io;
use tracing::debug;
use weather_widget_core::{
    Config, DisplayUnit, MemorySink, RunOutcome, Widget, WidgetError, service_from_config,
};

use crate::render::paint;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "City weather widget for the terminal")]
pub struct Cli {
    /// OpenWeather API key; overrides the config file.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API key, default city and unit.
    Configure,

    /// Show current weather and forecast for one city.
    Show {
        /// City name; the configured default city if absent.
        city: Option<String>,

        /// celsius or fahrenheit.
        #[arg(long)]
        unit: Option<DisplayUnit>,
    },

    /// Start on the default city, then read cities from a prompt.
    ///
    /// `:c` / `:f` switch units, `:q` quits.
    Interactive {
        #[arg(long)]
        unit: Option<DisplayUnit>,
    },
}

/// One line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Lookup(String),
    Unit(DisplayUnit),
    Quit,
    Nothing,
}

fn parse_prompt(line: &str) -> PromptAction {
    match line.trim() {
        "" => PromptAction::Nothing,
        ":q" | ":quit" => PromptAction::Quit,
        ":c" => PromptAction::Unit(DisplayUnit::Celsius),
        ":f" => PromptAction::Unit(DisplayUnit::Fahrenheit),
        city => PromptAction::Lookup(city.to_string()),
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(key) = self.api_key {
            config.set_api_key(key);
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, unit } => {
                let widget = build_widget(&config, unit)?;
                let outcome = match city {
                    Some(city) => widget.fetch_weather_for(&city).await,
                    None => widget.on_load().await,
                };
                debug!(?outcome, "lookup finished");

                if let RunOutcome::Failed(WidgetError::EmptyInput) = outcome {
                    bail!("{}", WidgetError::EmptyInput);
                }
                paint(&mut widget.sink(), &mut io::stdout().lock())?;

                if outcome.is_failure() {
                    bail!("No weather available");
                }
                Ok(())
            }
            Command::Interactive { unit } => interactive(&config, unit).await,
        }
    }
}

fn build_widget(config: &Config, unit: Option<DisplayUnit>) -> anyhow::Result<Widget<MemorySink>> {
    let service = service_from_config(config)?;
    let widget = Widget::new(service, MemorySink::new(), config.widget_settings()?);
    widget.set_unit(unit.unwrap_or(config.unit));
    Ok(widget)
}

async fn interactive(config: &Config, unit: Option<DisplayUnit>) -> anyhow::Result<()> {
    let widget = build_widget(config, unit)?;

    widget.on_load().await;
    paint(&mut widget.sink(), &mut io::stdout().lock())?;

    loop {
        let prompt = Text::new("City:").with_help_message(":c / :f switch units, :q quits");
        let line = match prompt.prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read from prompt"),
        };

        match parse_prompt(&line) {
            PromptAction::Nothing => continue,
            PromptAction::Quit => break,
            PromptAction::Unit(unit) => {
                if !widget.set_unit(unit) {
                    continue;
                }
            }
            PromptAction::Lookup(city) => {
                widget.fetch_weather_for(&city).await;
            }
        }
        paint(&mut widget.sink(), &mut io::stdout().lock())?;
    }

    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.default_city = Text::new("Default city:").with_default(&config.default_city).prompt()?;

    let units = DisplayUnit::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units).with_starting_cursor(cursor).prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_actions() {
        assert_eq!(parse_prompt("  "), PromptAction::Nothing);
        assert_eq!(parse_prompt(":q"), PromptAction::Quit);
        assert_eq!(parse_prompt(":f"), PromptAction::Unit(DisplayUnit::Fahrenheit));
        assert_eq!(parse_prompt(" :c "), PromptAction::Unit(DisplayUnit::Celsius));
        assert_eq!(parse_prompt(" New York "), PromptAction::Lookup("New York".into()));
    }

    #[test]
    fn parses_show_with_unit() {
        let cli = Cli::try_parse_from(["weather-widget", "show", "Paris", "--unit", "f"]).unwrap();
        match cli.command {
            Command::Show { city, unit } => {
                assert_eq!(city.as_deref(), Some("Paris"));
                assert_eq!(unit, Some(DisplayUnit::Fahrenheit));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_unit() {
        let err = Cli::try_parse_from(["weather-widget", "show", "--unit", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn build_widget_requires_api_key() {
        let err = build_widget(&Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn build_widget_applies_unit() {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        config.unit = DisplayUnit::Fahrenheit;

        let widget = build_widget(&config, None).unwrap();
        assert_eq!(widget.unit(), DisplayUnit::Fahrenheit);

        let widget = build_widget(&config, Some(DisplayUnit::Celsius)).unwrap();
        assert_eq!(widget.unit(), DisplayUnit::Celsius);
    }
}

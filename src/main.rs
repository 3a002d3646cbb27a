use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use minidash_core::{AppError, Config};
use minidash_currency::{CurrencyConverter, CurrencyView};
use minidash_weather::{WeatherError, WeatherReport, WeatherView, WeatherWidget};

/// Currency converter and weather lookup. Without a subcommand both widgets
/// load as they would on page load.
#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List supported currency codes
    Currencies,
    /// Convert an amount between two currencies
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        from: String,
        to: String,
    },
    /// Current weather for a city, or for the configured location
    Weather {
        #[arg(conflicts_with = "here")]
        city: Vec<String>,
        #[arg(long)]
        here: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    minidash_core::init()?;

    let (config, _) = Config::load_validated()?;
    tracing::info!("Minidash started");

    if let Err(e) = run(&config, cli.command).await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(config: &Config, command: Option<Command>) -> Result<(), AppError> {
    match command {
        None => page_load(config).await,
        Some(Command::Currencies) => {
            let converter = CurrencyConverter::new(&config.currency)?;
            let codes = converter.load_currencies().await?;
            println!("{}", codes.join(" "));
            Ok(())
        }
        Some(Command::Convert { amount, from, to }) => {
            let converter = CurrencyConverter::new(&config.currency)?;
            converter.set_amount(&amount);
            converter.set_pair(&from, &to);
            let result = converter.submit().await;
            print_currency(&converter.view());
            result?;
            Ok(())
        }
        Some(Command::Weather { city, here }) => {
            let widget = WeatherWidget::new(&config.weather)?;
            if here {
                let result = widget.load_initial().await;
                print_weather(&widget.view());
                settle_initial_weather(result)?;
            } else {
                let result = widget.lookup_by_city(&city.join(" ")).await;
                print_weather(&widget.view());
                result?;
            }
            Ok(())
        }
    }
}

/// Missing or denied location is a normal outcome of the initial lookup:
/// the widget already shows the search prompt.
fn settle_initial_weather(
    result: Result<WeatherReport, WeatherError>,
) -> Result<(), WeatherError> {
    match result {
        Ok(_) => Ok(()),
        Err(WeatherError::Location(e)) => {
            tracing::debug!("Initial weather not shown: {}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Both widgets side by side. Failures are already rendered into the views,
/// so they are logged rather than returned.
async fn page_load(config: &Config) -> Result<(), AppError> {
    let converter = Arc::new(CurrencyConverter::new(&config.currency)?);
    let weather = WeatherWidget::new(&config.weather)?;

    let (currencies, initial_weather) =
        tokio::join!(converter.load_currencies(), weather.load_initial());

    if currencies.is_ok() {
        if let Err(e) = converter.convert().await {
            tracing::warn!("Initial conversion failed: {}", e);
        }
    }
    if let Err(e) = settle_initial_weather(initial_weather) {
        tracing::warn!("Initial weather failed: {}", e);
    }

    println!("== Currency ==");
    print_currency(&converter.view());
    println!();
    println!("== Weather ==");
    print_weather(&weather.view());
    Ok(())
}

fn print_currency(view: &CurrencyView) {
    if let Some(error) = &view.error {
        println!("{}", error);
    }
    if let Some(result) = &view.result {
        println!("{}", result.summary);
        println!("{}", result.rate_line);
        println!("{}", result.updated);
    }
}

fn print_weather(view: &WeatherView) {
    if let Some(report) = view.report() {
        for line in report.lines() {
            println!("{}", line);
        }
        println!("{}", report.icon_url());
    } else if let Some(message) = view.message() {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minidash_weather::LocationError;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("minidash").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_subcommand_is_page_load() {
        assert_eq!(parse(&[]).unwrap().command, None);
    }

    #[test]
    fn test_convert_args() {
        let cli = parse(&["convert", "10", "EUR", "USD"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Convert {
                amount: "10".into(),
                from: "EUR".into(),
                to: "USD".into(),
            })
        );
    }

    #[test]
    fn test_convert_accepts_negative_amount() {
        let cli = parse(&["convert", "-5", "EUR", "USD"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Convert { ref amount, .. }) if amount == "-5"));
    }

    #[test]
    fn test_convert_missing_argument_is_rejected() {
        assert!(parse(&["convert", "10", "EUR"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn test_weather_city_words() {
        let cli = parse(&["weather", "New", "York"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Weather {
                city: vec!["New".into(), "York".into()],
                here: false,
            })
        );
    }

    #[test]
    fn test_weather_here_conflicts_with_city() {
        assert!(parse(&["weather", "--here"]).is_ok());
        assert!(parse(&["weather", "--here", "Oslo"]).is_err());
    }

    #[test]
    fn test_denied_location_settles_ok() {
        let denied = Err(WeatherError::Location(LocationError::PermissionDenied));
        assert!(settle_initial_weather(denied).is_ok());

        let unavailable = Err(WeatherError::Location(LocationError::ServiceUnavailable));
        assert!(settle_initial_weather(unavailable).is_ok());
    }

    #[test]
    fn test_lookup_failure_still_fails() {
        let failed = Err(WeatherError::Status { status: 503 });
        assert!(matches!(
            settle_initial_weather(failed),
            Err(WeatherError::Status { status: 503 })
        ));
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use commands::{forecast, list_tickers, serve};

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Stock price forecasting dashboard and CLI tools")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ./stockcast.toml when present)
    #[arg(short, long, global = true, env = "STOCKCAST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server, overriding the configuration
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long)]
        bind_address: Option<String>,
    },
    /// Print the ticker catalog
    Tickers,
    /// Fit a forecast for one ticker and print the last rows
    Forecast {
        /// Ticker label, symbol or slug (e.g. "TCS", "RELIANCE.NS", "icici-bank")
        #[arg(short, long, default_value = "TCS")]
        ticker: String,

        /// Years of prediction
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
        years: u8,

        /// Number of rows to print
        #[arg(long, default_value_t = 5)]
        tail: usize,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.config.as_deref();
        match self.command {
            Commands::Serve { bind_address } => {
                serve(config, bind_address.as_deref()).await?;
            }
            Commands::Tickers => {
                list_tickers();
            }
            Commands::Forecast { ticker, years, tail } => {
                forecast(config, &ticker, years, tail).await?;
            }
        }
        Ok(())
    }
}

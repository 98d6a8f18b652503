// ABOUTME: Command-line arguments for the recursica binary
// ABOUTME: Flags override the matching recursica.toml settings

use clap::{ArgAction, Parser, ValueEnum};
use recursica_types::ThemeMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recursica",
    about = "Compile design tokens and a brand theme into CSS custom properties",
    version
)]
pub struct Cli {
    /// Path to tokens.json
    #[arg(long)]
    pub tokens: Option<PathBuf>,

    /// Path to brand.json
    #[arg(long)]
    pub brand: Option<PathBuf>,

    /// Path to uikit.json
    #[arg(long)]
    pub ui_kit: Option<PathBuf>,

    /// Theme mode: light or dark
    #[arg(long)]
    pub mode: Option<ThemeMode>,

    /// Config file (defaults to <config dir>/recursica/recursica.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON object seeding remembered primary levels
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Css)]
    pub format: OutputFormat,

    /// Skip the AA contrast corrections after the build
    #[arg(long)]
    pub no_compliance: bool,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[value(name = "css")]
    Css,
    #[value(name = "json")]
    Json,
}

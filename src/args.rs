use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = r###"
Moodkin reads the mood of your notes and hatches a creature to match it.

- Analyze: a note goes to the Provider, which answers with a single word describing its emotional tone.
- Generate: a mood and a color become an anime-style ghost creature, drawn by the Provider and saved to your image directory.
- Hatch: both at once, straight from a note.

Provider credentials and endpoints are read from moodkin.toml in your config directory, or from MOODKIN_* environment variables.
"###
)]
pub struct Args {
    /// Path to a moodkin.toml to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcmd: Option<SubCommands>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Detect the mood of a note.
    Analyze(AnalyzeSubCommand),
    /// Draw a creature for a given mood.
    Generate(GenerateSubCommand),
    /// Detect the mood of a note and draw a creature for it.
    Hatch(HatchSubCommand),
}

#[derive(Parser, Debug)]
pub struct AnalyzeSubCommand {
    /// Note text. Read from stdin when omitted.
    pub text: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GenerateSubCommand {
    /// Single-word mood, e.g. `радостный`.
    #[arg(short, long)]
    pub mood: String,

    /// Color hint woven into the prompt, e.g. `голубыми`.
    #[arg(short, long)]
    pub color: String,

    /// Creature name; also the image file name prefix.
    #[arg(short, long)]
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct HatchSubCommand {
    /// Note text. Read from stdin when omitted.
    pub text: Option<String>,

    #[arg(short, long)]
    pub color: String,

    #[arg(short, long)]
    pub name: String,
}

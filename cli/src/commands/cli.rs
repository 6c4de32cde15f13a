use clap::{Args as ClapArgs, Parser, Subcommand};
use pagestate_plugins::AppKind;

#[derive(Parser, Debug)]
#[command(name = "pagestate", version, about = "Drive the pagestate demo apps from a terminal")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Which app to open: library, shop, planner or workout.
    #[arg(long, default_value = "library", global = true)]
    pub app: AppKind,

    /// Keep state in memory only, ignoring the configured storage backend.
    #[arg(long, global = true)]
    pub memory: bool,

    /// Print frames as JSON lines instead of annotated markup.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render the current page.
    Render,
    /// Run one action and print the frames it produced.
    Act(ActArgs),
    /// Search immediately, skipping the typing debounce.
    Search { query: String },
    /// List the actions the app understands.
    Actions,
    /// Forget the app's persisted state.
    Reset,
    /// Interactive session reading one interaction per line.
    Repl,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ActArgs {
    pub action: String,

    /// Payload entries as key=value.
    #[arg(value_parser = parse_pair)]
    pub payload: Vec<(String, String)>,
}

pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

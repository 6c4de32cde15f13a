use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use pagestate_core::dispatch::{Element, Interaction, NoticeLevel, Payload};
use pagestate_core::page::{App, Page};
use pagestate_core::render::Frame;

use super::cli::{parse_pair, Commands};
use crate::error::CliError;
use crate::output::Printer;

/// Per-run settings that do not depend on the app type.
pub struct ShellOptions {
    pub printer: Printer,
    /// Action fired once a second in the REPL, for apps with a live clock.
    pub tick_action: Option<&'static str>,
}

/// One line typed into the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    Help,
    Render,
    /// Typing into the search box; goes through the debounce.
    Type(String),
    /// Clicking an element that carries `data-action` plus `data-*` values.
    Click {
        action: String,
        data: Vec<(String, String)>,
    },
}

pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let cmd = match head {
        "quit" | "exit" => ReplCommand::Quit,
        "help" => ReplCommand::Help,
        "render" => ReplCommand::Render,
        "type" => ReplCommand::Type(rest.trim().to_string()),
        action => ReplCommand::Click {
            action: action.to_string(),
            data: rest
                .split_whitespace()
                .map(parse_pair)
                .collect::<Result<_, _>>()?,
        },
    };
    Ok(Some(cmd))
}

fn click(action: &str, data: &[(String, String)]) -> Interaction {
    let target = data
        .iter()
        .fold(Element::action("button", action), |el, (k, v)| el.data(k, v.as_str()));
    Interaction::click(vec![target, Element::new("main").attr("id", "app")])
}

fn typed(text: &str) -> Interaction {
    Interaction::input(
        vec![
            Element::action("input", "search").attr("id", "search"),
            Element::new("main").attr("id", "app"),
        ],
        text,
    )
}

fn payload(pairs: &[(String, String)]) -> Payload {
    pairs
        .iter()
        .fold(Payload::new(), |p, (k, v)| p.with(k.as_str(), v.as_str()))
}

/// Runs a one-shot command and returns the frames it produced.
pub async fn execute<A: App>(
    page: &mut Page<A>,
    command: &Commands,
) -> Result<Vec<Frame>, CliError> {
    let initial = page.start().await;
    match command {
        Commands::Render => Ok(initial),
        Commands::Act(act) => {
            if !page.dispatcher().handles(&act.action) {
                return Err(CliError::Usage(format!("unknown action {:?}", act.action)));
            }
            Ok(page.run(&act.action, &payload(&act.payload)).await)
        }
        Commands::Search { query } => {
            let payload = Payload::new().with("value", query.as_str());
            Ok(page.run("search", &payload).await)
        }
        Commands::Actions | Commands::Reset | Commands::Repl => Ok(Vec::new()),
    }
}

pub async fn run<A: App>(
    mut page: Page<A>,
    command: Commands,
    opts: ShellOptions,
) -> Result<i32, CliError> {
    match command {
        Commands::Actions => {
            let mut names: Vec<&str> = page.dispatcher().actions().collect();
            names.sort_unstable();
            for name in names {
                let note = if page.dispatcher().is_debounced(name) {
                    " (debounced)"
                } else {
                    ""
                };
                println!("{name}{note}");
            }
            Ok(0)
        }
        Commands::Reset => {
            let key = page.app().store().storage_key().to_string();
            page.app_mut().store_mut().reset()?;
            tracing::info!("cleared stored state under {key}");
            println!("cleared {key}");
            Ok(0)
        }
        Commands::Repl => repl(page, opts).await,
        other => {
            let frames = execute(&mut page, &other).await?;
            opts.printer.print(&frames);
            let failed = frames
                .iter()
                .any(|f| matches!(f, Frame::Toast(n) if n.level == NoticeLevel::Error));
            Ok(i32::from(failed))
        }
    }
}

const REPL_HELP: &str = "\
commands:
  render                       re-render the page
  type <text>                  type into the search box (debounced)
  <action> [key=value ...]     click an element carrying data-action
  help                         show this help
  quit                         leave";

async fn repl<A: App>(mut page: Page<A>, opts: ShellOptions) -> Result<i32, CliError> {
    opts.printer.print(&page.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let cmd = match parse_line(&line) {
                    Ok(Some(cmd)) => cmd,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                let frames = match cmd {
                    ReplCommand::Quit => break,
                    ReplCommand::Help => {
                        println!("{REPL_HELP}");
                        continue;
                    }
                    ReplCommand::Render => page.render_all(),
                    ReplCommand::Type(text) => page.handle(&typed(&text)).await,
                    ReplCommand::Click { action, data } => {
                        if !page.dispatcher().handles(&action) {
                            eprintln!("unknown action {action:?}; try `help`");
                            continue;
                        }
                        page.handle(&click(&action, &data)).await
                    }
                };
                opts.printer.print(&frames);
            }
            Some((action, payload)) = page.recv_debounced() => {
                let frames = page.run(&action, &payload).await;
                opts.printer.print(&frames);
            }
            _ = ticker.tick(), if opts.tick_action.is_some() => {
                if let Some(action) = opts.tick_action {
                    opts.printer.print(&page.run(action, &Payload::new()).await);
                }
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli::ActArgs;
    use pagestate_core::config::{AppConfig, StorageBackend};
    use pagestate_plugins::factory;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_repl_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("quit").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(
            parse_line("type  dune ").unwrap(),
            Some(ReplCommand::Type("dune".to_string()))
        );
        assert_eq!(
            parse_line("borrow id=0306406152 member=M001").unwrap(),
            Some(ReplCommand::Click {
                action: "borrow".to_string(),
                data: vec![
                    ("id".to_string(), "0306406152".to_string()),
                    ("member".to_string(), "M001".to_string()),
                ],
            })
        );
        assert!(parse_line("borrow M001").is_err());
    }

    #[test]
    fn click_carries_data_on_the_action_element() {
        let (action, payload) = click("increase", &[("id".to_string(), "2".to_string())])
            .resolve()
            .unwrap();
        assert_eq!(action, "increase");
        assert_eq!(payload.get("id"), Some("2"));
    }

    fn shop_page() -> Page<pagestate_plugins::shop::Shop> {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Memory;
        let kv = factory::build_kv(&cfg).unwrap();
        Page::new(factory::build_shop(&cfg, kv), factory::quiet_period(&cfg))
    }

    #[tokio::test]
    async fn act_runs_the_named_action() {
        let mut page = shop_page();
        let cmd = Commands::Act(ActArgs {
            action: "add-to-cart".to_string(),
            payload: vec![("id".to_string(), "1".to_string())],
        });
        let frames = execute(&mut page, &cmd).await.unwrap();
        assert!(frames
            .iter()
            .any(|f| matches!(f, Frame::Replace { target, .. } if target == "cart")));
        assert_eq!(page.app().store().state().extra.quantity(1), 1);
    }

    #[tokio::test]
    async fn unknown_action_is_a_usage_error() {
        let mut page = shop_page();
        let cmd = Commands::Act(ActArgs {
            action: "teleport".to_string(),
            payload: Vec::new(),
        });
        let err = execute(&mut page, &cmd).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn search_skips_the_debounce() {
        let mut page = shop_page();
        let cmd = Commands::Search {
            query: "mug".to_string(),
        };
        let frames = execute(&mut page, &cmd).await.unwrap();
        assert!(!frames.is_empty());
        assert_eq!(page.app().store().state().query(), "mug");
    }
}

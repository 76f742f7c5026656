//! Terminal front end for the flashcard widget.
//!
//! Takes no flags. Reads single-letter commands from stdin:
//!
//! ```text
//! <enter>/f  flip        n  next card      p  pause/resume
//! d a,b      select decks                  i N  interval (1-60 s)
//! l          list decks  r  rescan         c  list remote catalog
//! g a,b      download decks                q  quit
//! ```

use std::process::ExitCode;

use flashdeck::timer::Ticker;
use flashdeck::{AsyncFlashdeck, Effect, Event, Flashdeck};
use tokio::io::{AsyncBufReadExt, BufReader};

enum Command {
    Event(Event),
    ListDecks,
    Rescan,
    Catalog,
    Download(Vec<String>),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let names = || -> Vec<String> {
        rest.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };
    match head {
        "" | "f" => Command::Event(Event::ManualFlip),
        "n" => Command::Event(Event::Next),
        "p" => Command::Event(Event::TogglePause),
        "d" => Command::Event(Event::ActiveDecksChanged(names().into_iter().collect())),
        "i" => match rest.trim().parse::<u64>() {
            Ok(seconds) => Command::Event(Event::IntervalChanged(seconds)),
            Err(_) => Command::Unknown(line.to_string()),
        },
        "l" => Command::ListDecks,
        "r" => Command::Rescan,
        "c" => Command::Catalog,
        "g" => Command::Download(names()),
        "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

fn render(effects: &[Effect], ticker: &mut Ticker) {
    for effect in effects {
        ticker.apply(effect);
        match effect {
            Effect::ShowCard { text, face } => println!("[{:?}] {}", face, text),
            Effect::ShowMessage(message) => println!("{}", message),
            Effect::StartTimer(period) => log::debug!("auto-advance every {:?}", period),
            Effect::StopTimer => println!("(paused)"),
        }
    }
}

async fn run() -> flashdeck::Result<()> {
    let deck = AsyncFlashdeck::build(Flashdeck::builder()).await?;
    let warnings = deck.run(|d| Ok(d.warnings().to_vec())).await?;
    for warning in &warnings {
        eprintln!("{}", warning);
    }

    let mut ticker = Ticker::new();
    render(&deck.start().await?, &mut ticker);
    render(&deck.handle(Event::Next).await?, &mut ticker);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = ticker.next_tick() => {
                render(&deck.handle(event).await?, &mut ticker);
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match parse_command(&line) {
                    Command::Event(event) => match deck.handle(event).await {
                        Ok(effects) => render(&effects, &mut ticker),
                        Err(e) => eprintln!("{}", e),
                    },
                    Command::ListDecks => {
                        for name in deck.deck_names().await? {
                            println!("  {}", name);
                        }
                    }
                    Command::Rescan => match deck.rescan().await {
                        Ok(warnings) => {
                            for warning in warnings {
                                eprintln!("{}", warning);
                            }
                        }
                        Err(e) => eprintln!("Failed to rescan decks: {}", e),
                    },
                    Command::Catalog => match deck.fetch_catalog().await {
                        Ok(names) => {
                            for name in names {
                                println!("  {}", name);
                            }
                        }
                        Err(e) => eprintln!("Failed to fetch repository: {}", e),
                    },
                    Command::Download(names) => match deck.download_decks(names).await {
                        Ok(report) => {
                            for path in &report.added {
                                println!("added {}", path.display());
                            }
                            for warning in &report.warnings {
                                eprintln!("{}", warning);
                            }
                            for failure in &report.failures {
                                eprintln!("{}", failure);
                            }
                        }
                        Err(e) => eprintln!("Failed to download decks: {}", e),
                    },
                    Command::Quit => break,
                    Command::Unknown(input) => eprintln!("unknown command: {}", input),
                }
            }
        }
    }
    ticker.cancel();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("flashdeck: {}", e);
            ExitCode::FAILURE
        }
    }
}

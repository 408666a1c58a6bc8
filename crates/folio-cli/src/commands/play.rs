use std::io::{self, BufRead, Write};
use std::sync::Arc;

use colored::Colorize;

use folio_story::{Answer, EndReason, GameSession, InputSpec, Progress, SessionCommand};

use super::DataArgs;

/// Play from the saved page until the adventure ends or the player stops.
pub fn run(data: &DataArgs) -> Result<(), String> {
    let (story, enemies) = data.load_story()?;
    let mut session = GameSession::load(
        Arc::new(story),
        Arc::new(enemies),
        data.store(),
        &data.player,
        &data.config(),
    )
    .map_err(|e| e.to_string())?;

    println!(
        "  {} {}, page {}",
        "Resuming".bold(),
        session.character().name,
        session.character().current_page
    );
    println!("  Commands: (s)tats, (e)at, (q)uit\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();
    let mut answer = None;

    loop {
        let progress = session.advance(answer.take()).map_err(|e| e.to_string())?;
        if !progress.display().is_empty() {
            println!("{}\n", progress.display());
        }

        let input = match progress {
            Progress::Advanced { .. } | Progress::Noted { .. } => continue,
            Progress::Ended { reason, .. } => {
                print_ending(reason);
                return Ok(());
            }
            Progress::Awaiting { input, .. } => input,
        };

        loop {
            print_input(&input);
            print!("> ");
            io::stdout().flush().map_err(|e| e.to_string())?;

            line.clear();
            if reader.read_line(&mut line).map_err(|e| e.to_string())? == 0 {
                println!();
                println!("{}", session.pause().display());
                return Ok(());
            }

            match parse_answer(line.trim(), &input) {
                Some(a) => {
                    answer = Some(a);
                    break;
                }
                None => println!("{}\n", "Please enter one of the options shown.".yellow()),
            }
        }
    }
}

fn print_input(input: &InputSpec) {
    match input {
        InputSpec::Select { prompt, options } => {
            println!("{}", prompt.bold());
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
        }
        InputSpec::Confirm { prompt } => println!("{} {}", prompt.bold(), "[y/n]".dimmed()),
        InputSpec::Count { prompt } => println!("{}", prompt.bold()),
    }
}

fn print_ending(reason: EndReason) {
    match reason {
        EndReason::Death => println!("{}", "YOU HAVE DIED.".red().bold()),
        EndReason::GameOver => println!("{}", "GAME OVER.".red().bold()),
        EndReason::Victory => println!("{}", "VICTORY!".green().bold()),
        EndReason::Quit | EndReason::Paused => {}
    }
}

/// Map a line of input to an answer for `input`. Options are numbered
/// from 1 on screen.
fn parse_answer(text: &str, input: &InputSpec) -> Option<Answer> {
    let lower = text.to_lowercase();
    match lower.as_str() {
        "s" | "stats" => return Some(Answer::Command(SessionCommand::Stats)),
        "e" | "eat" => return Some(Answer::Command(SessionCommand::Eat)),
        "q" | "quit" => return Some(Answer::Command(SessionCommand::Quit)),
        _ => {}
    }

    match input {
        InputSpec::Select { options, .. } => lower
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| Answer::Select(n - 1)),
        InputSpec::Confirm { .. } => match lower.as_str() {
            "y" | "yes" => Some(Answer::Confirm(true)),
            "n" | "no" => Some(Answer::Confirm(false)),
            _ => None,
        },
        InputSpec::Count { .. } => lower.parse().ok().map(Answer::Count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(n: usize) -> InputSpec {
        InputSpec::Select {
            prompt: "Pick".into(),
            options: (1..=n).map(|i| format!("Option {i}")).collect(),
        }
    }

    #[test]
    fn numbers_select_from_one() {
        assert_eq!(parse_answer("2", &select(3)), Some(Answer::Select(1)));
        assert_eq!(parse_answer("0", &select(3)), None);
        assert_eq!(parse_answer("4", &select(3)), None);
    }

    #[test]
    fn commands_work_everywhere() {
        let confirm = InputSpec::Confirm {
            prompt: "Test your luck?".into(),
        };
        assert_eq!(
            parse_answer("S", &confirm),
            Some(Answer::Command(SessionCommand::Stats))
        );
        assert_eq!(
            parse_answer("quit", &select(2)),
            Some(Answer::Command(SessionCommand::Quit))
        );
        assert_eq!(parse_answer("y", &confirm), Some(Answer::Confirm(true)));
        assert_eq!(parse_answer("maybe", &confirm), None);
    }

    #[test]
    fn counts_parse() {
        let count = InputSpec::Count {
            prompt: "How many?".into(),
        };
        assert_eq!(parse_answer("3", &count), Some(Answer::Count(3)));
        assert_eq!(parse_answer("-1", &count), None);
    }
}

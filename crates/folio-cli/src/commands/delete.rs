use std::io::{self, BufRead, Write};

use colored::Colorize;

use folio_story::CharacterStore;

use super::DataArgs;

/// Delete the saved character, asking first unless `yes` is set.
pub fn run(data: &DataArgs, yes: bool) -> Result<(), String> {
    let character = data.load_character()?;

    if !yes {
        print!("  Delete {}? This cannot be undone. [y/N] ", character.name);
        io::stdout().flush().map_err(|e| e.to_string())?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        if !matches!(line.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    data.store()
        .delete(&data.player)
        .map_err(|e| e.to_string())?;
    println!("  {} {}", "Deleted".red().bold(), character.name);
    Ok(())
}

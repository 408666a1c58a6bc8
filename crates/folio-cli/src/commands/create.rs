use colored::Colorize;

use folio_story::create_character;

use super::DataArgs;

/// Roll a new character and save it.
pub fn run(data: &DataArgs, name: Option<&str>) -> Result<(), String> {
    let store = data.store();
    let character = create_character(&store, &data.player, name.unwrap_or_default(), &data.config())
        .map_err(|e| e.to_string())?;

    println!("  {} {}", "Created".green().bold(), character.name);
    println!();
    println!("{character}");
    println!();
    println!("  Run `folio play` to begin your adventure.");
    Ok(())
}

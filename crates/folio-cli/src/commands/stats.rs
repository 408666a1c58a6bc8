use comfy_table::{ContentArrangement, Table};

use super::DataArgs;

/// Show the saved character as a table.
pub fn run(data: &DataArgs) -> Result<(), String> {
    let character = data.load_character()?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", character.name.as_str()]);
    table.add_row(vec!["SKILL".to_string(), character.skill.to_string()]);
    table.add_row(vec!["STAMINA".to_string(), character.stamina.to_string()]);
    table.add_row(vec!["LUCK".to_string(), character.luck.to_string()]);
    table.add_row(vec!["Gold".to_string(), character.gold.to_string()]);
    table.add_row(vec!["Provisions".to_string(), character.provisions.to_string()]);

    let inventory = if character.inventory.is_empty() {
        "(empty)".to_string()
    } else {
        character.inventory.items().join(", ")
    };
    table.add_row(vec!["Inventory".to_string(), inventory]);
    table.add_row(vec!["Page".to_string(), character.current_page.to_string()]);

    println!("{table}");
    Ok(())
}

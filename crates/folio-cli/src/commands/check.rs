use colored::Colorize;

use folio_story::validate_story;

use super::DataArgs;

/// Validate the story and enemy catalog, printing every issue.
pub fn run(data: &DataArgs) -> Result<(), String> {
    let (story, enemies) = data.load_story()?;
    let issues = validate_story(&story, &enemies);

    for issue in &issues {
        let line = issue.to_string();
        if issue.is_error() {
            eprintln!("  {}", line.red());
        } else {
            eprintln!("  {}", line.yellow());
        }
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.len() - errors;
    if errors > 0 {
        return Err(format!(
            "{} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        ));
    }

    println!("  All checks passed.");
    println!("  {} pages, {} enemies", story.len(), enemies.len());
    if warnings > 0 {
        println!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

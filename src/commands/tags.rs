//! Tags command - global tag vocabulary management

use super::open_session;
use crate::cli::TagsCommands;
use crate::config::Settings;
use crate::session::LibrarySession;
use crate::{FamlibError, output};
use colored::Colorize;

type Result<T> = std::result::Result<T, FamlibError>;

/// Execute the tags management command
///
/// # Errors
/// Returns an error if the library cannot be opened or the settings cannot be saved
pub fn execute(settings: &Settings, command: &TagsCommands, quiet: bool) -> Result<()> {
    let mut session = open_session(settings)?;
    match command {
        TagsCommands::List { unused } => {
            list_tags(&session, *unused, quiet);
            Ok(())
        }
        TagsCommands::Add { tag } => add_tag(&mut session, tag, quiet),
        TagsCommands::Remove { tag } => remove_tag(&mut session, tag, quiet),
    }
}

fn list_tags(session: &LibrarySession, unused: bool, quiet: bool) {
    let tags = if unused {
        session.vocabulary().unused(session.items())
    } else {
        session.vocabulary().tags().to_vec()
    };

    if tags.is_empty() {
        if !quiet {
            println!("No tags found.");
        }
        return;
    }

    if !quiet {
        println!("Tags in vocabulary:");
    }
    let policy = session.filter().policy();
    for tag in &tags {
        let count = session
            .items()
            .iter()
            .filter(|item| item.user_tags.contains(tag))
            .count();
        let line = output::tag_with_count(tag, count, quiet);
        if !quiet && policy.is_banned(tag) {
            println!("{line} {}", "(filter tag)".dimmed());
        } else {
            println!("{line}");
        }
    }
}

fn add_tag(session: &mut LibrarySession, tag: &str, quiet: bool) -> Result<()> {
    match session.add_tag(tag)? {
        Some(added) if !quiet => println!("Added tag: {added}"),
        None if !quiet => println!("Tag '{}' already exists", tag.trim()),
        _ => {}
    }
    Ok(())
}

fn remove_tag(session: &mut LibrarySession, tag: &str, quiet: bool) -> Result<()> {
    let removed = session.remove_tag(tag)?;
    if quiet {
        return Ok(());
    }
    if removed {
        println!("Removed tag: {}", tag.trim());
        let still_used = session
            .items()
            .iter()
            .filter(|item| item.user_tags.contains(tag))
            .count();
        if still_used > 0 {
            println!(
                "{} {still_used} asset(s) still carry '{}'; it returns on the next load",
                "Note:".yellow(),
                tag.trim()
            );
        }
    } else {
        println!("Tag '{}' not found", tag.trim());
    }
    Ok(())
}

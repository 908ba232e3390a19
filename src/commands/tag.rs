//! Tag and untag commands

use super::open_session;
use crate::FamlibError;
use crate::config::Settings;

type Result<T> = std::result::Result<T, FamlibError>;

/// Execute the tag command - add tags to an asset
///
/// # Errors
/// Returns an error if the asset cannot be found or the catalog cannot be written
pub fn execute(settings: &Settings, asset: &str, tags: &[String], quiet: bool) -> Result<()> {
    if tags.is_empty() {
        return Err(FamlibError::InvalidInput("No tags provided".into()));
    }

    let mut session = open_session(settings)?;
    let index = session.find(asset)?;
    let added = session.add_item_tags(index, tags)?;

    if !quiet {
        let name = session
            .item(index)
            .map(|item| item.relative_path.clone())
            .unwrap_or_default();
        if added == 0 {
            println!("{name} already has: {}", tags.join(", "));
        } else {
            println!("Tagged {name} with: {}", tags.join(", "));
        }
    }
    Ok(())
}

/// Execute the untag command - remove tags from an asset
///
/// # Errors
/// Returns an error if the asset cannot be found or the catalog cannot be written
pub fn untag(
    settings: &Settings,
    asset: &str,
    tags: &[String],
    all: bool,
    quiet: bool,
) -> Result<()> {
    let mut session = open_session(settings)?;
    let index = session.find(asset)?;

    let to_remove: Vec<String> = if all {
        session
            .item(index)
            .map(|item| item.user_tags.as_slice().to_vec())
            .unwrap_or_default()
    } else if tags.is_empty() {
        return Err(FamlibError::InvalidInput(
            "No tags provided. Pass tags or --all to remove every tag".into(),
        ));
    } else {
        tags.to_vec()
    };

    let removed = session.remove_item_tags(index, &to_remove)?;
    if !quiet {
        let name = session
            .item(index)
            .map(|item| item.relative_path.clone())
            .unwrap_or_default();
        if all {
            println!("Removed all tags from {name}");
        } else if removed == 0 {
            println!("{name} has none of: {}", tags.join(", "));
        } else {
            println!("Removed tags {} from {name}", tags.join(", "));
        }
    }
    Ok(())
}

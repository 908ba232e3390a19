//! Output formatting for CLI display
//!
//! This module provides utilities for formatting catalog items, tags and
//! run reports in the CLI.

use crate::catalog::CatalogItem;
use crate::indexer::IndexReport;
use crate::thumbnails::ThumbnailReport;
use colored::Colorize;

/// Format a catalog item for display
///
/// Quiet mode prints only the relative path so the output can be piped back
/// into `famlib load`.
#[must_use]
pub fn item_line(item: &CatalogItem, quiet: bool) -> String {
    if quiet {
        return item.relative_path.clone();
    }

    let name = if item.is_loaded_in_workspace {
        format!("{} {}", item.display_name.green().bold(), "(loaded)".green())
    } else {
        item.display_name.bold().to_string()
    };

    let mut line = format!("  {name}");
    if !item.category.is_empty() {
        line.push_str(&format!(" [{}]", item.category.cyan()));
    }
    if !item.format_version.is_empty() {
        line.push_str(&format!(" {}", item.format_version.dimmed()));
    }
    line.push_str(&format!("  {}", item.relative_path.dimmed()));

    if item.user_tags.is_empty() {
        line.push_str(" (no tags)");
    } else {
        let tags: Vec<&str> = item.user_tags.iter().collect();
        line.push_str(&format!(" [{}]", tags.join(", ").yellow()));
    }
    line
}

/// Variant names of an item, one indented line
#[must_use]
pub fn variants_line(item: &CatalogItem) -> Option<String> {
    if item.variant_names.is_empty() {
        return None;
    }
    Some(format!("      {}", item.variant_names.join(" | ").dimmed()))
}

/// Format a tag with usage count
#[must_use]
pub fn tag_with_count(tag: &str, count: usize, quiet: bool) -> String {
    if quiet {
        tag.to_string()
    } else {
        format!("  {tag} (used by {count} asset(s))")
    }
}

/// Print the counters of an index pass
pub fn print_index_report(report: &IndexReport) {
    println!("\n{}", "=== Index Summary ===".bold());
    println!("  {} {}", "Scanned:".bold(), report.scanned);
    println!("  {} {}", "✓ Updated:".green(), report.updated);
    println!("  {} {}", "⊘ Unchanged:".yellow(), report.skipped);
    if report.pruned > 0 {
        println!("  {} {}", "- Pruned:".yellow(), report.pruned);
    }
    if report.failed > 0 {
        println!("  {} {}", "✗ Failed:".red(), report.failed);
    }
}

/// Print the counters of a thumbnail run
pub fn print_thumbnail_report(report: &ThumbnailReport) {
    println!("\n{}", "=== Thumbnail Summary ===".bold());
    println!("  {} {}", "Assets:".bold(), report.assets);
    println!("  {} {}", "✓ Rendered:".green(), report.rendered);
    if report.failed > 0 {
        println!("  {} {}", "✗ Failed:".red(), report.failed);
    }
}

/// Print a message surfaced to the user during a run
pub fn print_notice(message: &str) {
    eprintln!("{} {}", "!".red().bold(), message.red());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            display_name: "Door".into(),
            category: "Doors".into(),
            relative_path: "Doors/Door.rfa".into(),
            format_version: "2022".into(),
            ..CatalogItem::default()
        }
    }

    #[test]
    fn test_quiet_prints_relative_path() {
        assert_eq!(item_line(&item(), true), "Doors/Door.rfa");
    }

    #[test]
    fn test_item_line_mentions_fields() {
        colored::control::set_override(false);
        let mut it = item();
        it.user_tags.insert("EL");
        it.is_loaded_in_workspace = true;
        let line = item_line(&it, false);
        assert!(line.contains("Door (loaded)"));
        assert!(line.contains("[Doors]"));
        assert!(line.contains("2022"));
        assert!(line.contains("[EL]"));
    }

    #[test]
    fn test_untagged_item() {
        colored::control::set_override(false);
        assert!(item_line(&item(), false).ends_with("(no tags)"));
    }

    #[test]
    fn test_variants_line() {
        let mut it = item();
        assert!(variants_line(&it).is_none());
        it.variant_names = vec!["600".into(), "900".into()];
        assert!(variants_line(&it).unwrap_or_default().contains("600"));
    }

    #[test]
    fn test_tag_with_count() {
        assert_eq!(tag_with_count("EL", 3, true), "EL");
        assert_eq!(tag_with_count("EL", 3, false), "  EL (used by 3 asset(s))");
    }
}

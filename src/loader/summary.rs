use colored::Colorize;

/// Counters of one load batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Names of the assets imported, in order
    pub loaded_names: Vec<String>,
    pub error_messages: Vec<String>,
}

impl LoadSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loaded(&mut self, name: &str) {
        self.loaded += 1;
        self.loaded_names.push(name.to_string());
    }

    pub const fn add_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn add_failure(&mut self, msg: String) {
        self.failed += 1;
        self.error_messages.push(msg);
    }

    pub fn print(&self) {
        println!("\n{}", "=== Load Summary ===".bold());
        println!("  {} {}", "✓ Loaded:".green(), self.loaded);
        if self.skipped > 0 {
            println!("  {} {}", "⊘ Skipped:".yellow(), self.skipped);
        }
        if self.failed > 0 {
            println!("  {} {}", "✗ Failed:".red(), self.failed);
            if !self.error_messages.is_empty() {
                println!("\n{}", "Error details:".red().bold());
                for msg in &self.error_messages {
                    println!("  - {msg}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut summary = LoadSummary::new();
        summary.add_loaded("Door");
        summary.add_skip();
        summary.add_failure("missing: x.rfa".into());

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.loaded_names, vec!["Door"]);
    }
}

//! Aggregate run reporting

use std::time::Duration;

/// Aggregate outcome of a harness run
#[derive(Debug, Clone)]
pub struct TrialReport {
    /// Trials started (checked or skipped)
    pub trials_run: u64,
    /// Trials whose post-join read was not exactly 2
    pub violations: u64,
    /// Trials whose tasks were cancelled before completing
    pub skipped: u64,
    /// Wall time for the whole loop
    pub duration: Duration,
}

impl TrialReport {
    /// Trials whose check actually ran
    pub fn checked(&self) -> u64 {
        self.trials_run - self.skipped
    }

    /// True when no checked trial observed a lost update
    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }

    /// Print summary (compact format)
    pub fn print_summary(&self) {
        println!("\n====================================");
        println!("HARNESS COMPLETE");
        println!("====================================");
        println!("Trials run: {}", format_count(self.trials_run));
        println!(
            "Checks passed: {}",
            format_count(self.checked() - self.violations)
        );
        println!("Violations: {}", format_count(self.violations));
        if self.skipped > 0 {
            println!("Skipped (cancelled): {}", format_count(self.skipped));
        }
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
    }
}

/// Format large numbers with thousands separators
/// Examples: 1,234,567 or 987,654
pub fn format_count(value: u64) -> String {
    let s = value.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(1), "1");
        assert_eq!(format_count(123), "123");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(12345), "12,345");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(10000), "10,000");
    }

    #[test]
    fn test_checked_excludes_skipped() {
        let report = TrialReport {
            trials_run: 100,
            violations: 2,
            skipped: 5,
            duration: Duration::from_secs(1),
        };

        assert_eq!(report.checked(), 95);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_report() {
        let report = TrialReport {
            trials_run: 100,
            violations: 0,
            skipped: 0,
            duration: Duration::from_secs(1),
        };

        assert!(report.is_clean());
        assert_eq!(report.checked(), 100);
    }
}

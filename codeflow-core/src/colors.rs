use crate::compare::RiskLevel;
use crate::report::Severity;

/// Dependency-injection seam for severity color mapping.
///
/// Implement this trait to provide custom palettes (e.g. high-contrast or
/// colour-blind-friendly). The built-in implementation is [`DefaultTheme`].
pub trait SeverityTheme: Send + Sync {
    /// Terminal color name accepted by the `colored` crate (e.g. `"red"`).
    fn severity_color(&self, severity: Severity) -> &'static str;
    fn risk_color(&self, level: RiskLevel) -> &'static str;
    /// Color for a security score in `[0, 5]`.
    fn score_color(&self, score: f64) -> &'static str;
}

pub struct DefaultTheme;

impl SeverityTheme for DefaultTheme {
    fn severity_color(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "magenta",
            Severity::High     => "red",
            Severity::Medium   => "yellow",
            Severity::Low      => "cyan",
        }
    }

    fn risk_color(&self, level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::Critical => "magenta",
            RiskLevel::High     => "red",
            RiskLevel::Medium   => "yellow",
            RiskLevel::Low      => "green",
        }
    }

    fn score_color(&self, score: f64) -> &'static str {
        if score >= 4.0 {
            "green"
        } else if score >= 2.0 {
            "yellow"
        } else {
            "red"
        }
    }
}

impl Severity {
    /// Terminal color name (delegates to [`DefaultTheme`]).
    pub fn terminal_color(self) -> &'static str {
        DefaultTheme.severity_color(self)
    }
}

impl RiskLevel {
    /// Terminal color name (delegates to [`DefaultTheme`]).
    pub fn terminal_color(self) -> &'static str {
        DefaultTheme.risk_color(self)
    }
}

//! Comment-mode switching
//!
//! Activates exactly one environment block by toggling `//` markers on its
//! connection lines. Every other line is copied through untouched.

use crate::environment::{block_matches_target, EnvironmentType};
use crate::line::{is_commented, LineClassifier};
use crate::scanner::ScanState;
use serde::Serialize;

/// A header seen during a comment-mode pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    /// Zero-based line index of the header
    pub line_index: usize,
    /// Label assigned to the block
    pub label: String,
    /// Whether the block belongs to the target environment
    pub matches_target: bool,
}

/// Accumulator returned alongside the rewritten lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentSwitchReport {
    /// Headers in file order
    pub blocks: Vec<BlockSummary>,
    /// Lines that gained a `//`
    pub commented: usize,
    /// Lines that lost a `//`
    pub uncommented: usize,
}

impl CommentSwitchReport {
    /// Whether any line was rewritten
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.commented + self.uncommented > 0
    }
}

/// Rewritten lines plus the pass report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSwitchOutput {
    /// New line sequence, same length as the input
    pub lines: Vec<String>,
    /// What the pass saw and did
    pub report: CommentSwitchReport,
}

/// Line-level comment toggler
#[derive(Debug, Clone, Copy)]
pub struct CommentModeSwitcher<'a> {
    classifier: &'a LineClassifier,
}

impl<'a> CommentModeSwitcher<'a> {
    /// Create switcher using the given line classifier
    #[must_use]
    pub fn new(classifier: &'a LineClassifier) -> Self {
        Self { classifier }
    }

    /// Rewrite `lines` so only `target`'s block is active
    pub fn apply<'l, I>(&self, lines: I, target: EnvironmentType) -> CommentSwitchOutput
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut state = ScanState::new("");
        let mut in_target = false;
        let mut report = CommentSwitchReport::default();
        let mut out = Vec::new();

        for (line_index, line) in lines.into_iter().enumerate() {
            if let Some(label) = state.observe_header(line) {
                in_target = block_matches_target(label, target);
                tracing::debug!("Found environment block: {}, target: {}", label, in_target);
                report.blocks.push(BlockSummary {
                    line_index,
                    label: label.to_string(),
                    matches_target: in_target,
                });
                out.push(line.to_string());
                continue;
            }

            if !self.is_entry(line) {
                out.push(line.to_string());
                continue;
            }

            let commented = is_commented(line);
            let rewritten = if in_target && commented {
                report.uncommented += 1;
                tracing::debug!("Uncommented line for {}: {}", target, line.trim());
                uncomment(line)
            } else if !in_target && !commented && !state.current_label().is_empty() {
                report.commented += 1;
                tracing::debug!("Commented line for {}: {}", state.current_label(), line.trim());
                comment_out(line)
            } else {
                line.to_string()
            };
            out.push(rewritten);
        }

        CommentSwitchOutput { lines: out, report }
    }

    /// Connection line whose key can actually be extracted
    fn is_entry(&self, line: &str) -> bool {
        self.classifier.is_connection_line(line) && self.classifier.parse(line).is_some()
    }
}

/// Remove the first `//` in the line, keeping everything around it
#[must_use]
pub fn uncomment(line: &str) -> String {
    line.replacen("//", "", 1)
}

/// Prefix the line with `//` at its current indentation
#[must_use]
pub fn comment_out(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];
    format!("{indent}//{}", line.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(lines: &[&str], target: EnvironmentType) -> CommentSwitchOutput {
        let classifier = LineClassifier::default();
        CommentModeSwitcher::new(&classifier).apply(lines.iter().copied(), target)
    }

    #[test]
    fn activates_target_block_only() {
        let input = [
            "    // Azure Dev",
            r#"    //"DevConnection": "server=a","#,
            "    // Azure Prod",
            r#"    "ProdConnection": "server=b""#,
        ];
        let output = run(&input, EnvironmentType::Development);

        assert_eq!(
            output.lines,
            vec![
                "    // Azure Dev".to_string(),
                r#"    "DevConnection": "server=a","#.to_string(),
                "    // Azure Prod".to_string(),
                r#"    //"ProdConnection": "server=b""#.to_string(),
            ]
        );
        assert_eq!(output.report.uncommented, 1);
        assert_eq!(output.report.commented, 1);
        assert_eq!(output.report.blocks.len(), 2);
        assert!(output.report.blocks[0].matches_target);
        assert!(!output.report.blocks[1].matches_target);
    }

    #[test]
    fn lines_before_first_header_are_untouched() {
        let input = [r#"  "LocalConnection": "server=l","#, "  // QA", r#"  "QAConnection": "q""#];
        let output = run(&input, EnvironmentType::Production);
        assert_eq!(output.lines[0], input[0]);
        assert_eq!(output.lines[2], r#"  //"QAConnection": "q""#);
    }

    #[test]
    fn uncomment_removes_only_first_marker() {
        assert_eq!(
            uncomment(r#"  // "A": "http://x""#),
            r#"   "A": "http://x""#
        );
    }

    #[test]
    fn comment_out_keeps_tab_indent() {
        assert_eq!(comment_out("\t\t\"A\": 1"), "\t\t//\"A\": 1");
    }

    #[test]
    fn rerun_is_stable() {
        let input = [
            "// Development",
            r#"//"DevConnection": "a","#,
            "// Production",
            r#""ProdConnection": "b""#,
        ];
        let once = run(&input, EnvironmentType::Development);
        let refs: Vec<&str> = once.lines.iter().map(String::as_str).collect();
        let twice = run(&refs, EnvironmentType::Development);
        assert_eq!(once.lines, twice.lines);
        assert!(!twice.report.changed());
    }

    #[test]
    fn unparseable_connection_word_line_is_untouched() {
        let input = ["// Production", "  Connection: keep-alive"];
        let output = run(&input, EnvironmentType::Development);
        assert_eq!(output.lines[1], input[1]);
    }
}

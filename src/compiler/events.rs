//! Compiler event reporting.
//!
//! Interprets the compiler's output lines into leveled build log output and
//! tracks whether any compilation error occurred, so `fail_on_error` can turn
//! a finished run into a build failure after everything has been reported.

use crate::log;
use crate::utils::exec::strip_ansi;

/// Sink for compiler events.
#[derive(Debug, Default)]
pub struct CompilerEvents {
    /// compiler error indicator, sticky once set
    had_error: bool,
}

impl CompilerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when any compilation error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// A stylesheet was (re)compiled.
    pub fn stylesheet_updated(&mut self, template: &str, css: &str) {
        log!("sass"; "    >> {template} => {css}");
    }

    /// A generated stylesheet was removed (its template disappeared).
    pub fn stylesheet_deleted(&mut self, css: &str) {
        log!("sass"; "    -- {css} deleted");
    }

    /// Compilation of a template failed.
    pub fn compilation_error(&mut self, detail: &str) {
        self.had_error = true;
        log!("error"; "compilation failed: {detail}");
    }

    /// Watch mode: a template changed on disk.
    pub fn template_modified(&mut self, template: &str) {
        log!("watch"; "file change detected: {template}");
    }

    /// Watch mode: a new template appeared.
    pub fn template_created(&mut self, template: &str) {
        log!("watch"; "new file detected: {template}");
    }

    /// Watch mode: a template was deleted.
    pub fn template_deleted(&mut self, template: &str) {
        log!("watch"; "file delete detected: {template}");
    }

    /// Feed one run's stdout through the event mapping.
    ///
    /// Lines the compiler prints per stylesheet become update/delete events;
    /// anything else non-empty is passed through verbatim.
    pub fn report_stdout(&mut self, stdout: &str) {
        for raw in stdout.lines() {
            let line = strip_ansi(raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some((template, css)) = parse_compiled_line(line) {
                self.stylesheet_updated(template, css);
            } else if let Some(css) = parse_deleted_line(line) {
                self.stylesheet_deleted(css);
            } else {
                log!("sass"; "{line}");
            }
        }
    }

    /// Feed one run's stderr through the event mapping.
    ///
    /// Called for failed runs; the whole trimmed block becomes one
    /// compilation error event.
    pub fn report_stderr(&mut self, stderr: &str) {
        let detail = strip_ansi(stderr.trim());
        if detail.is_empty() {
            self.compilation_error("(no diagnostic output)");
        } else {
            self.compilation_error(&detail);
        }
    }
}

/// Parse a `Compiled <template> to <css>.` line.
fn parse_compiled_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("Compiled ")?;
    let rest = rest.strip_suffix('.').unwrap_or(rest);
    rest.split_once(" to ")
}

/// Parse a `Deleted <css>.` line.
fn parse_deleted_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Deleted ")?;
    Some(rest.strip_suffix('.').unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compiled_line() {
        let line = "Compiled sass/portal.scss to css/portal.css.";
        assert_eq!(
            parse_compiled_line(line),
            Some(("sass/portal.scss", "css/portal.css"))
        );
    }

    #[test]
    fn test_parse_compiled_line_rejects_other_output() {
        assert_eq!(parse_compiled_line("WARNING: 2 repetitive deprecation"), None);
        assert_eq!(parse_compiled_line("Compiled with no target"), None);
    }

    #[test]
    fn test_parse_deleted_line() {
        assert_eq!(parse_deleted_line("Deleted css/old.css."), Some("css/old.css"));
    }

    #[test]
    fn test_error_flag_is_sticky() {
        let mut events = CompilerEvents::new();
        assert!(!events.had_error());
        events.report_stderr("Error: Undefined variable.");
        assert!(events.had_error());
        events.report_stdout("Compiled a.scss to a.css.");
        assert!(events.had_error());
    }

    #[test]
    fn test_report_stdout_does_not_set_error() {
        let mut events = CompilerEvents::new();
        events.report_stdout("Compiled a.scss to a.css.\n\nDeleted b.css.");
        assert!(!events.had_error());
    }
}

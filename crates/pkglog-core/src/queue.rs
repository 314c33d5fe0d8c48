//! Transaction queue: buffers package events and emits display groups.
//!
//! Events are appended as they are parsed. When the pipeline decides a group
//! is complete it calls [`Queue::flush`], which filters the buffered events,
//! justifies package names to the widest surviving name and returns the lines
//! to print. The queue also tracks install/removal history for the net
//! installed report and places the boot marker at its position in time.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::action::ActionKind;
use crate::event::{PackageEvent, TIMESTAMP_FORMAT};
use crate::filter::{ActionFilter, ReportFilter};

/// Width of the delimiter line printed between groups.
pub const DELIMITER_WIDTH: usize = 80;

/// One line of report output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Separator between groups.
    Delimiter,
    /// Marker for the last system boot.
    Boot(NaiveDateTime),
    /// A formatted package event.
    Event { action: ActionKind, text: String },
}

impl OutputLine {
    /// The action that colors this line, if any.
    pub const fn action(&self) -> Option<ActionKind> {
        match self {
            Self::Event { action, .. } => Some(*action),
            Self::Delimiter | Self::Boot(_) => None,
        }
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimiter => write!(f, "{}", "-".repeat(DELIMITER_WIDTH)),
            Self::Boot(boot) => write!(
                f,
                "{} ### LAST SYSTEM BOOT ###",
                boot.format(TIMESTAMP_FORMAT)
            ),
            Self::Event { text, .. } => f.write_str(text),
        }
    }
}

/// Buffer of pending events plus the install history needed to filter them.
#[derive(Debug)]
pub struct Queue {
    filter: ReportFilter,
    events: Vec<PackageEvent>,
    /// Package name to time of its most recent install.
    installed: HashMap<String, NaiveDateTime>,
    /// Package name to time it was last removed.
    removed: HashMap<String, NaiveDateTime>,
    /// Boot time, until its marker has been emitted.
    boot: Option<NaiveDateTime>,
}

impl Queue {
    pub fn new(filter: ReportFilter) -> Self {
        Self {
            filter,
            events: Vec::new(),
            installed: HashMap::new(),
            removed: HashMap::new(),
            boot: None,
        }
    }

    /// Emits a boot marker before the first event later than `boot`.
    #[must_use]
    pub fn with_boot_marker(mut self, boot: NaiveDateTime) -> Self {
        self.boot = Some(boot);
        self
    }

    pub const fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Buffers an event and records install history.
    pub fn append(&mut self, event: PackageEvent) {
        match event.action {
            ActionKind::Installed => {
                self.installed
                    .insert(event.package.clone(), event.timestamp);
            }
            ActionKind::Removed => {
                self.installed.remove(&event.package);
                self.removed.insert(event.package.clone(), event.timestamp);
            }
            _ => {}
        }
        self.events.push(event);
    }

    /// Emits the buffered events as one group and clears the buffer.
    ///
    /// Returns no lines when the buffer is empty or every event is filtered
    /// out.
    pub fn flush(&mut self) -> Vec<OutputLine> {
        let events = std::mem::take(&mut self.events);
        let shown: Vec<&PackageEvent> = events.iter().filter(|e| self.is_shown(e)).collect();

        let width = if self.filter.justify {
            shown
                .iter()
                .map(|e| e.package.chars().count())
                .max()
                .unwrap_or(1)
        } else {
            1
        };
        let delimiters = self.filter.uses_delimiters();

        let mut lines = Vec::with_capacity(shown.len() + 1);
        for (index, event) in shown.into_iter().enumerate() {
            if let Some(boot) = self.boot.filter(|boot| event.timestamp > *boot) {
                self.boot = None;
                if delimiters {
                    lines.push(OutputLine::Delimiter);
                }
                lines.push(OutputLine::Boot(boot));
                if delimiters {
                    lines.push(OutputLine::Delimiter);
                }
            } else if index == 0 && delimiters {
                lines.push(OutputLine::Delimiter);
            }

            lines.push(OutputLine::Event {
                action: event.action,
                text: self.format_event(event, width),
            });
        }

        lines
    }

    /// Final flush at end of input, followed by the boot marker if no event
    /// came after the boot.
    pub fn finish(&mut self) -> Vec<OutputLine> {
        let mut lines = self.flush();
        if let Some(boot) = self.boot.take() {
            if self.filter.uses_delimiters() {
                lines.push(OutputLine::Delimiter);
            }
            lines.push(OutputLine::Boot(boot));
        }
        lines
    }

    fn is_shown(&self, event: &PackageEvent) -> bool {
        if !self.filter.action.accepts(event.action) {
            return false;
        }

        if !self.filter.matches_package(&event.package) {
            return false;
        }

        if let ActionFilter::InstalledNet { grace } = self.filter.action {
            let Some(&installed_at) = self.installed.get(&event.package) else {
                return false;
            };
            if event.timestamp < installed_at {
                return false;
            }
            if let Some(&removed_at) = self.removed.get(&event.package) {
                if installed_at - removed_at < grace {
                    return false;
                }
            }
        }

        true
    }

    fn format_event(&self, event: &PackageEvent, width: usize) -> String {
        let mut text = format!(
            "{} {:<width$} {}",
            event.timestamp.format(TIMESTAMP_FORMAT),
            event.package,
            event.version,
        );
        if !event.action.changes_version() || self.filter.verbose {
            text.push(' ');
            text.push_str(event.action.as_str());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PackageChange;
    use crate::filter::{MatchMode, PackageMatcher};
    use chrono::{Duration, NaiveDate};
    use insta::assert_snapshot;

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn event(minutes: i64, action: ActionKind, package: &str, version: &str) -> PackageEvent {
        PackageChange::new(action, package, version).at(ts(minutes))
    }

    fn render(lines: &[OutputLine]) -> String {
        lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn flush_on_empty_queue_is_noop() {
        let mut queue = Queue::new(ReportFilter::default()).with_boot_marker(ts(0));
        assert!(queue.flush().is_empty());
        assert!(queue.flush().is_empty());
    }

    #[test]
    fn flush_clears_buffer() {
        let mut queue = Queue::new(ReportFilter::default());
        queue.append(event(0, ActionKind::Installed, "foo", "1.0"));
        assert!(!queue.is_empty());
        assert_eq!(queue.flush().len(), 2);
        assert!(queue.is_empty());
        assert!(queue.flush().is_empty());
    }

    #[test]
    fn full_report_group() {
        let mut queue = Queue::new(ReportFilter::default());
        queue.append(event(0, ActionKind::Upgraded, "linux", "6.6.1 -> 6.6.2"));
        queue.append(event(0, ActionKind::Installed, "ripgrep", "14.1.0-1"));
        queue.append(event(1, ActionKind::Removed, "vim", "9.1-1"));

        assert_snapshot!(render(&queue.flush()), @r"
        --------------------------------------------------------------------------------
        2024-01-15 09:00:00 linux   6.6.1 -> 6.6.2
        2024-01-15 09:00:00 ripgrep 14.1.0-1 installed
        2024-01-15 09:01:00 vim     9.1-1 removed
        ");
    }

    #[test]
    fn verbose_appends_action_to_upgrades() {
        let filter = ReportFilter {
            verbose: true,
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Upgraded, "foo", "1.0 -> 2.0"));
        queue.append(event(0, ActionKind::Downgraded, "bar", "2.0 -> 1.0"));

        let lines = queue.flush();
        assert_eq!(lines[1].to_string(), "2024-01-15 09:00:00 foo 1.0 -> 2.0 upgraded");
        assert_eq!(lines[2].to_string(), "2024-01-15 09:00:00 bar 2.0 -> 1.0 downgraded");
    }

    #[test]
    fn upgrade_without_verbose_shows_delta_only() {
        let mut queue = Queue::new(ReportFilter::default());
        queue.append(event(0, ActionKind::Upgraded, "foo", "1.0 -> 2.0"));

        let lines = queue.flush();
        assert_eq!(lines[1].to_string(), "2024-01-15 09:00:00 foo 1.0 -> 2.0");
        assert_eq!(lines[1].action(), Some(ActionKind::Upgraded));
    }

    #[test]
    fn justification_uses_surviving_names_only() {
        let filter = ReportFilter {
            action: ActionFilter::UpdatedOnly,
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Installed, "a-very-long-package-name", "1"));
        queue.append(event(0, ActionKind::Upgraded, "abc", "1 -> 2"));
        queue.append(event(0, ActionKind::Upgraded, "de", "3 -> 4"));

        assert_snapshot!(render(&queue.flush()), @r"
        --------------------------------------------------------------------------------
        2024-01-15 09:00:00 abc 1 -> 2
        2024-01-15 09:00:00 de  3 -> 4
        ");
    }

    #[test]
    fn nojustify_uses_single_space() {
        let filter = ReportFilter {
            justify: false,
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Installed, "longname", "1"));
        queue.append(event(0, ActionKind::Installed, "x", "2"));

        let lines = queue.flush();
        assert_eq!(lines[2].to_string(), "2024-01-15 09:00:00 x 2 installed");
    }

    #[test]
    fn package_filter_hides_delimiters_and_other_packages() {
        let filter = ReportFilter {
            packages: Some(PackageMatcher::new(&["foo", "bar"], MatchMode::Exact).unwrap()),
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Installed, "foo", "1"));
        queue.append(event(0, ActionKind::Installed, "baz", "1"));
        queue.append(event(0, ActionKind::Installed, "bar", "1"));

        assert_snapshot!(render(&queue.flush()), @r"
        2024-01-15 09:00:00 foo 1 installed
        2024-01-15 09:00:00 bar 1 installed
        ");
    }

    #[test]
    fn fully_filtered_group_prints_nothing() {
        let filter = ReportFilter {
            action: ActionFilter::InstalledOnly,
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Upgraded, "foo", "1 -> 2"));
        assert!(queue.flush().is_empty());
    }

    #[test]
    fn boot_marker_precedes_first_group_after_boot() {
        let boot = ts(10);
        let mut queue = Queue::new(ReportFilter::default()).with_boot_marker(boot);
        let mut lines = Vec::new();

        queue.append(event(0, ActionKind::Installed, "a", "1"));
        lines.extend(queue.flush());
        queue.append(event(15, ActionKind::Installed, "b", "1"));
        lines.extend(queue.flush());
        queue.append(event(30, ActionKind::Installed, "c", "1"));
        lines.extend(queue.flush());
        lines.extend(queue.finish());

        let boots: Vec<_> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| matches!(l, OutputLine::Boot(_)))
            .collect();
        assert_eq!(boots.len(), 1);

        assert_snapshot!(render(&lines), @r"
        --------------------------------------------------------------------------------
        2024-01-15 09:00:00 a 1 installed
        --------------------------------------------------------------------------------
        2024-01-15 09:10:00 ### LAST SYSTEM BOOT ###
        --------------------------------------------------------------------------------
        2024-01-15 09:15:00 b 1 installed
        --------------------------------------------------------------------------------
        2024-01-15 09:30:00 c 1 installed
        ");
    }

    #[test]
    fn boot_marker_without_delimiters() {
        let filter = ReportFilter {
            action: ActionFilter::Installed,
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter).with_boot_marker(ts(10));
        queue.append(event(0, ActionKind::Installed, "a", "1"));
        queue.append(event(20, ActionKind::Removed, "b", "1"));

        assert_snapshot!(render(&queue.finish()), @r"
        2024-01-15 09:00:00 a 1 installed
        2024-01-15 09:10:00 ### LAST SYSTEM BOOT ###
        2024-01-15 09:20:00 b 1 removed
        ");
    }

    #[test]
    fn pending_boot_marker_emitted_at_finish() {
        let mut queue = Queue::new(ReportFilter::default()).with_boot_marker(ts(60));
        queue.append(event(0, ActionKind::Installed, "a", "1"));

        assert_snapshot!(render(&queue.finish()), @r"
        --------------------------------------------------------------------------------
        2024-01-15 09:00:00 a 1 installed
        --------------------------------------------------------------------------------
        2024-01-15 10:00:00 ### LAST SYSTEM BOOT ###
        ");
    }

    fn net_installed_lines(reinstall_after: Duration) -> Vec<OutputLine> {
        let filter = ReportFilter {
            action: ActionFilter::InstalledNet {
                grace: Duration::days(2),
            },
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        let removed_at = 60 * 24;
        queue.append(event(0, ActionKind::Installed, "pkga", "1"));
        queue.append(event(removed_at, ActionKind::Removed, "pkga", "1"));
        queue.append(event(
            removed_at + reinstall_after.num_minutes(),
            ActionKind::Installed,
            "pkga",
            "1",
        ));
        queue.append(event(5, ActionKind::Installed, "pkgb", "1"));
        queue.finish()
    }

    #[test]
    fn net_installed_hides_quick_reinstall() {
        let lines = net_installed_lines(Duration::hours(1));
        let texts: Vec<_> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(texts, ["2024-01-15 09:05:00 pkgb 1 installed"]);
    }

    #[test]
    fn net_installed_shows_reinstall_after_grace() {
        let lines = net_installed_lines(Duration::days(3));
        let texts: Vec<_> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            texts,
            [
                "2024-01-19 09:00:00 pkga 1 installed",
                "2024-01-15 09:05:00 pkgb 1 installed",
            ]
        );
    }

    #[test]
    fn net_installed_shows_reinstall_exactly_at_grace() {
        let lines = net_installed_lines(Duration::days(2));
        let texts: Vec<_> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            texts,
            [
                "2024-01-18 09:00:00 pkga 1 installed",
                "2024-01-15 09:05:00 pkgb 1 installed",
            ]
        );
    }

    #[test]
    fn net_installed_hides_removed_packages() {
        let filter = ReportFilter {
            action: ActionFilter::InstalledNet {
                grace: Duration::zero(),
            },
            ..ReportFilter::default()
        };
        let mut queue = Queue::new(filter);
        queue.append(event(0, ActionKind::Installed, "gone", "1"));
        queue.append(event(1, ActionKind::Installed, "kept", "1"));
        queue.append(event(2, ActionKind::Removed, "gone", "1"));

        let texts: Vec<_> = queue.finish().iter().map(ToString::to_string).collect();
        assert_eq!(texts, ["2024-01-15 09:01:00 kept 1 installed"]);
    }
}

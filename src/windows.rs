//! Capturable window snapshot, grouped per process
//!
//! Enumeration itself belongs to the platform collaborator; this module only
//! decides which of the windows it reports are worth offering as capture
//! targets and groups them for a picker. Every call works on a fresh
//! snapshot, nothing is cached between calls.

use crate::config::MIN_CAPTURABLE_WINDOW_SIZE;
use crate::layer::ScreenRect;
use std::collections::{BTreeMap, HashMap};

/// A top-level window as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: u64,
    pub title: String,
    pub pid: u32,
    pub rect: ScreenRect,
}

impl WindowInfo {
    /// Title for a picker, with a fallback for untitled windows
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("Untitled window (ID: {})", self.handle)
        } else {
            self.title.clone()
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({}x{})", self.display_title(), self.rect.width, self.rect.height)
    }
}

/// Raw platform report, before filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub window: WindowInfo,
    pub visible: bool,
    pub minimized: bool,
}

/// Titles never offered for capture
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub prefixes: Vec<String>,
    pub fragments: Vec<String>,
}

impl TitleFilter {
    /// The preview window, the region picker's overlay (titled
    /// `<selector_prefix> <window>`) plus shell and overlay windows
    pub fn with_defaults(own_title: &str, selector_prefix: &str) -> Self {
        let prefixes = [
            own_title,
            selector_prefix,
            "Pasek zadań",
            "python.exe",
            "py.exe",
            "dwm.exe",
            "NVIDIA GeForce Overlay",
            "Program Manager",
            "Default IME",
            "MSCTFIME UI",
            "IME",
        ];
        Self {
            prefixes: prefixes
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|p| p.to_string())
                .collect(),
            fragments: vec!["Windows Defender Notification".to_string()],
        }
    }

    pub fn is_ignored(&self, title: &str) -> bool {
        let trimmed = title.trim();
        self.prefixes.iter().any(|p| trimmed.starts_with(p.as_str()))
            || self.fragments.iter().any(|f| title.contains(f.as_str()))
    }
}

pub fn is_capturable(snapshot: &WindowSnapshot, filter: &TitleFilter) -> bool {
    let rect = snapshot.window.rect;
    snapshot.visible
        && !snapshot.minimized
        && !filter.is_ignored(&snapshot.window.title)
        && rect.width >= MIN_CAPTURABLE_WINDOW_SIZE
        && rect.height >= MIN_CAPTURABLE_WINDOW_SIZE
}

/// Capturable windows belonging to one process name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWindows {
    pub name: String,
    pub pids: Vec<u32>,
    pub windows: Vec<WindowInfo>,
}

impl ProcessWindows {
    /// The only window of a single-window process, picked without asking
    pub fn auto_selected_window(&self) -> Option<&WindowInfo> {
        match self.windows.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Filter a snapshot and group it by process name, sorted case-insensitively.
///
/// Processes missing from `process_names` are listed as `PID_<pid>_UNKNOWN`.
pub fn capturable_processes<I>(
    snapshot: I,
    process_names: &HashMap<u32, String>,
    filter: &TitleFilter,
) -> Vec<ProcessWindows>
where
    I: IntoIterator<Item = WindowSnapshot>,
{
    let mut grouped: BTreeMap<String, ProcessWindows> = BTreeMap::new();
    for entry in snapshot.into_iter().filter(|s| is_capturable(s, filter)) {
        let window = entry.window;
        let name = process_names
            .get(&window.pid)
            .cloned()
            .unwrap_or_else(|| format!("PID_{}_UNKNOWN", window.pid));
        let group = grouped.entry(name.clone()).or_insert_with(|| ProcessWindows {
            name,
            pids: Vec::new(),
            windows: Vec::new(),
        });
        if !group.pids.contains(&window.pid) {
            group.pids.push(window.pid);
        }
        group.windows.push(window);
    }

    let mut processes: Vec<ProcessWindows> = grouped
        .into_values()
        .map(|mut group| {
            group.pids.sort_unstable();
            group
        })
        .collect();
    processes.sort_by_key(|p| p.name.to_lowercase());
    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(handle: u64, title: &str, pid: u32, w: u32, h: u32) -> WindowSnapshot {
        WindowSnapshot {
            window: WindowInfo {
                handle,
                title: title.to_string(),
                pid,
                rect: ScreenRect::new(0, 0, w, h),
            },
            visible: true,
            minimized: false,
        }
    }

    #[test]
    fn test_filters_small_hidden_and_ignored() {
        let filter = TitleFilter::with_defaults("Layer Overlay", "Select capture area in:");
        let mut hidden = snap(3, "Hidden", 1, 400, 300);
        hidden.visible = false;
        let mut minimized = snap(4, "Minimized", 1, 400, 300);
        minimized.minimized = true;

        assert!(is_capturable(&snap(1, "Browser", 1, 800, 600), &filter));
        assert!(!is_capturable(&snap(2, "Tooltip", 1, 49, 600), &filter));
        assert!(!is_capturable(&hidden, &filter));
        assert!(!is_capturable(&minimized, &filter));
        assert!(!is_capturable(&snap(5, "  Layer Overlay preview", 1, 800, 600), &filter));
        assert!(!is_capturable(&snap(6, "Program Manager", 1, 800, 600), &filter));
        assert!(!is_capturable(&snap(8, "Pasek zadań", 1, 1920, 60), &filter));
        assert!(!is_capturable(&snap(9, "Select capture area in: Editor", 1, 800, 600), &filter));
        assert!(is_capturable(&snap(10, "Editor", 1, 800, 600), &filter));
        assert!(!is_capturable(&snap(7, "Alert - Windows Defender Notification", 1, 800, 600), &filter));
    }

    #[test]
    fn test_blank_caller_prefix_ignores_nothing_extra() {
        let filter = TitleFilter::with_defaults("Layer Overlay", "");
        assert!(filter.prefixes.iter().all(|p| !p.is_empty()));
        assert!(!filter.is_ignored("Browser"));
    }

    #[test]
    fn test_groups_by_process_name() {
        let names: HashMap<u32, String> = [
            (10, "zed".to_string()),
            (11, "Alacritty".to_string()),
            (12, "zed".to_string()),
        ]
        .into_iter()
        .collect();
        let snapshot = vec![
            snap(1, "main.rs", 12, 800, 600),
            snap(2, "Terminal", 11, 800, 600),
            snap(3, "lib.rs", 10, 800, 600),
            snap(4, "Orphan", 99, 800, 600),
        ];
        let processes = capturable_processes(snapshot, &names, &TitleFilter::default());
        let order: Vec<_> = processes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["Alacritty", "PID_99_UNKNOWN", "zed"]);

        let zed = &processes[2];
        assert_eq!(zed.pids, vec![10, 12]);
        assert_eq!(zed.windows.len(), 2);
        assert!(zed.auto_selected_window().is_none());
        assert_eq!(processes[0].auto_selected_window().map(|w| w.handle), Some(2));
    }

    #[test]
    fn test_window_labels() {
        let window = snap(77, "", 1, 640, 480).window;
        assert_eq!(window.display_title(), "Untitled window (ID: 77)");
        assert_eq!(window.label(), "Untitled window (ID: 77) (640x480)");
    }
}

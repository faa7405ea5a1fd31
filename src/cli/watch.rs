//! `watch` command: recompile when template directories change.
//!
//! Raw notify events are debounced and deduplicated per path before a
//! recompile runs, with a cooldown so editors that save in bursts trigger
//! one pass instead of many. A polling watcher backend is available for
//! filesystems without native change events (network mounts, some VMs).

use crate::compiler::CompilePlan;
use crate::compiler::events::CompilerEvents;
use crate::config::ProjectConfig;
use crate::log;
use crate::logger::WatchStatus;
use crate::resource;
use crate::utils::path::normalize_path;
use anyhow::{Context, Result};
use notify::{PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;
const RECOMPILE_COOLDOWN_MS: u64 = 800;

/// Ctrl-C flag, set once from the signal handler.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

pub fn run(config: &ProjectConfig) -> Result<()> {
    let locations =
        resource::resolve_all(&config.compile.resources, &config.compile.fallback_spec())?;
    if locations.is_empty() {
        log!("watch"; "no stylesheet directories resolved, nothing to watch");
        return Ok(());
    }

    let plan = CompilePlan::new(&config.compile, locations)?;
    let mut status = WatchStatus::new();

    // Initial pass; watch keeps running even when it fails.
    recompile(&plan, &mut status);

    ctrlc::set_handler(|| SHUTDOWN.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = make_watcher(tx, config.compile.poll)?;

    let roots = plan.source_roots();
    for root in &roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch `{}`", root.display()))?;
    }
    log!(
        "watch";
        "watching {} director{} for changes (Ctrl-C to stop)",
        roots.len(),
        if roots.len() == 1 { "y" } else { "ies" }
    );

    let mut debouncer = Debouncer::new();
    loop {
        if SHUTDOWN.load(Ordering::SeqCst) {
            break;
        }

        let timeout = debouncer.sleep_duration().min(Duration::from_millis(200));
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(err)) => log!("error"; "watch error: {err}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready() {
            report_changes(&changes);
            recompile(&plan, &mut status);
        }
    }

    log!("watch"; "stopping");
    Ok(())
}

/// Build the watcher backend.
fn make_watcher(
    tx: mpsc::Sender<notify::Result<notify::Event>>,
    poll: bool,
) -> Result<Box<dyn Watcher>> {
    let handler = move |res| {
        tx.send(res).ok();
    };

    let watcher: Box<dyn Watcher> = if poll {
        let config = notify::Config::default().with_poll_interval(Duration::from_secs(1));
        Box::new(PollWatcher::new(handler, config).context("failed to create poll watcher")?)
    } else {
        Box::new(
            RecommendedWatcher::new(handler, notify::Config::default())
                .context("failed to create file watcher")?,
        )
    };
    Ok(watcher)
}

fn report_changes(changes: &HashMap<PathBuf, ChangeKind>) {
    let mut events = CompilerEvents::new();
    for (path, kind) in changes {
        let path = path.display().to_string();
        match kind {
            ChangeKind::Created => events.template_created(&path),
            ChangeKind::Modified => events.template_modified(&path),
            ChangeKind::Removed => events.template_deleted(&path),
        }
    }
}

fn recompile(plan: &CompilePlan, status: &mut WatchStatus) {
    let count = plan.locations().count();
    match plan.run_once() {
        Ok(events) if !events.had_error() => {
            status.success(&format!(
                "recompiled {count} stylesheet director{}",
                if count == 1 { "y" } else { "ies" }
            ));
        }
        Ok(_) => {
            status.error("compilation failed", "");
        }
        Err(err) => {
            status.error("compiler could not be run", &format!("{err:#}"));
        }
    }
}

// ============================================================================
// Debouncer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Pure debouncer: only handles timing and event deduplication.
struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    changes: HashMap<PathBuf, ChangeKind>,
    last_event: Option<std::time::Instant>,
    last_compile: Option<std::time::Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            changes: HashMap::new(),
            last_event: None,
            last_compile: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Create/Modify + Remove → Remove (file was deleted)
    /// - Same type events: first event wins
    fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // mtime/atime/chmod noise may trigger endless rebuild loops
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            let path = normalize_path(path);

            if let Some(&existing) = self.changes.get(&path) {
                // State transitions:
                // - Removed -> Created/Modified: restored, use new event
                // - Modified -> Removed: deleted, upgrade to Removed
                // - Created -> Removed: appeared then vanished, discard (no-op)
                // - otherwise: first event wins
                match (existing, kind) {
                    (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                        crate::debug!("watch"; "restore {}->created: {}", existing.label(), path.display());
                        self.changes.insert(path, kind);
                    }
                    (ChangeKind::Modified, ChangeKind::Removed) => {
                        crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                        self.changes.insert(path, ChangeKind::Removed);
                    }
                    (ChangeKind::Created, ChangeKind::Removed) => {
                        crate::debug!("watch"; "discard created+removed: {}", path.display());
                        self.changes.remove(&path);
                    }
                    _ => {
                        continue;
                    }
                }
                self.last_event = Some(std::time::Instant::now());
                continue;
            }

            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            self.last_event = Some(std::time::Instant::now());
        }
    }

    /// Take the deduplicated changes if debounce + cooldown elapsed.
    fn take_if_ready(&mut self) -> Option<HashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;

        if changes.is_empty() {
            return None;
        }

        self.last_compile = Some(std::time::Instant::now());
        Some(changes)
    }

    fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_compile) = self.last_compile
            && last_compile.elapsed() < Duration::from_millis(RECOMPILE_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_compile
            .map(|t| Duration::from_millis(RECOMPILE_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ConfigTable;
use crate::dispatch::{dispatch, DispatchReport};
use crate::input::InputSimulator;
use crate::process_monitor::{resolve, ProcessLister};
use crate::trigger::{read_tip, TipEvent, TriggerError};

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Create(#[source] notify::Error),
    #[error("failed to watch trigger file {}: {source}", path.display())]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Result of handling one tip.
#[derive(Debug)]
pub enum TipOutcome {
    Dispatched {
        target: String,
        amount: i32,
        report: DispatchReport,
    },
    /// No configured game executable is running.
    NoGameRunning,
    /// The running game has no action mapped to this amount.
    NoAction { target: String, amount: i32 },
}

/// Owns the action table and the two host capabilities the loop drives:
/// process listing and input simulation.
pub struct TipEngine<P, I> {
    table: ConfigTable,
    processes: P,
    input: I,
}

impl<P: ProcessLister, I: InputSimulator> TipEngine<P, I> {
    pub fn new(table: ConfigTable, processes: P, input: I) -> Self {
        Self {
            table,
            processes,
            input,
        }
    }

    /// Resolves the running game and runs the action mapped to `tip.amount`.
    pub fn handle_tip(&mut self, tip: &TipEvent) -> TipOutcome {
        let Some(target) = resolve(&self.table, &mut self.processes) else {
            return TipOutcome::NoGameRunning;
        };

        let spec = self
            .table
            .get(&target)
            .and_then(|config| config.action_for(tip.amount));
        match spec {
            Some(spec) => {
                let report = dispatch(spec, &mut self.input);
                TipOutcome::Dispatched {
                    target,
                    amount: tip.amount,
                    report,
                }
            }
            None => TipOutcome::NoAction {
                target,
                amount: tip.amount,
            },
        }
    }

    /// Reads the trigger file and handles the tip it contains.
    pub fn handle_trigger_file(&mut self, path: &Path) -> Result<TipOutcome, TriggerError> {
        let tip = read_tip(path)?;
        tracing::info!(sender = %tip.sender, amount = tip.amount, "tip received");
        Ok(self.handle_tip(&tip))
    }
}

/// A live watch on the trigger file. Dropping it releases the OS watch.
pub struct TriggerSubscription {
    /// Absolute path of the trigger file inside the watched directory.
    path: PathBuf,
    events: mpsc::Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl TriggerSubscription {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Starts watching the trigger file at `path`.
///
/// The watch sits on the file's parent directory rather than the file itself,
/// so it survives the tip source replacing the file (write a temp file, then
/// rename it over the trigger path). The directory must exist; the file may
/// appear later.
pub fn subscribe(path: &Path) -> Result<TriggerSubscription, WatchError> {
    let subscribe_err = |source| WatchError::Subscribe {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| subscribe_err(notify::Error::generic("trigger path has no file name")))?;
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    // Backends report absolute, resolved paths; compare against the same form.
    let watch_dir = parent
        .canonicalize()
        .map_err(|e| subscribe_err(notify::Error::io(e)))?;
    let target = watch_dir.join(file_name);

    let (watch_tx, events) = mpsc::channel::<notify::Result<Event>>(EVENT_CHANNEL_CAPACITY);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = watch_tx.blocking_send(res);
        },
        NotifyConfig::default(),
    )
    .map_err(WatchError::Create)?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(subscribe_err)?;

    Ok(TriggerSubscription {
        path: target,
        events,
        _watcher: watcher,
    })
}

/// Runs the watch loop until the subscription's channel closes, handling one
/// write notification at a time in delivery order.
pub async fn run<P, I>(subscription: TriggerSubscription, mut engine: TipEngine<P, I>)
where
    P: ProcessLister,
    I: InputSimulator,
{
    tracing::info!(path = %subscription.path().display(), "watching trigger file");
    let TriggerSubscription {
        path,
        events,
        _watcher,
    } = subscription;
    process_events(&path, events, &mut engine).await;
    tracing::info!("trigger watch closed");
}

async fn process_events<P, I>(
    target: &Path,
    mut events: mpsc::Receiver<notify::Result<Event>>,
    engine: &mut TipEngine<P, I>,
) where
    P: ProcessLister,
    I: InputSimulator,
{
    while let Some(res) = events.recv().await {
        handle_notification(target, res, engine);
    }
}

fn handle_notification<P, I>(
    target: &Path,
    res: notify::Result<Event>,
    engine: &mut TipEngine<P, I>,
) where
    P: ProcessLister,
    I: InputSimulator,
{
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "file watcher error");
            return;
        }
    };
    if !is_trigger_write(&event, target) {
        return;
    }

    match engine.handle_trigger_file(target) {
        Ok(outcome) => log_outcome(&outcome),
        Err(e) => tracing::warn!(error = %e, "dropping trigger event"),
    }
}

/// Other files in the watched directory are ignored.
fn is_trigger_write(event: &Event, target: &Path) -> bool {
    is_write(&event.kind) && event.paths.iter().any(|p| p == target)
}

/// Content writes, plus a file being renamed onto the path. Creation is left
/// out because every new file is also followed by a data write; metadata and
/// access notifications never change the payload.
fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(
            ModifyKind::Data(_)
                | ModifyKind::Any
                | ModifyKind::Name(RenameMode::To | RenameMode::Any)
        )
    )
}

fn log_outcome(outcome: &TipOutcome) {
    match outcome {
        TipOutcome::Dispatched {
            target,
            amount,
            report,
        } => {
            if !report.is_clean() {
                for e in &report.token_errors {
                    tracing::warn!(game = %target, amount, error = %e, "skipped action token");
                }
                for e in &report.step_failures {
                    tracing::warn!(game = %target, amount, error = %e, "input step failed");
                }
            }
            tracing::info!(game = %target, amount, steps = report.executed, "action dispatched");
        }
        TipOutcome::NoGameRunning => tracing::info!("no game running"),
        TipOutcome::NoAction { target, amount } => {
            tracing::debug!(game = %target, amount, "no action mapped")
        }
    }
}

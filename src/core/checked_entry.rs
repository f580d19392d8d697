//! Pooled record of the cores that agreed to log an entry
//!
//! `Core::check` threads an `Option<CheckedEntry>` through the core tree.
//! The first core that wants the entry pulls a slot from the pool; every
//! interested core appends itself. The caller then writes the entry exactly
//! once and drops the handle, which returns the slot to the pool.

use super::error::MultiError;
use super::field::Field;
use super::log_core::CoreRef;
use super::log_entry::Entry;
use super::log_level::Level;
use super::pool::Pool;
use super::write_syncer::{self, WriteSyncer};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A custom side effect run after an entry has been written.
pub trait CheckWriteHook: Send + Sync {
    fn on_write(&self, entry: &Entry, fields: &[Field]);
}

/// The terminal behaviour attached to an entry.
///
/// Actions are data: [`CheckedEntry::write`] returns the action instead of
/// performing it, and [`CheckWriteAction::apply`] carries it out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CheckWriteAction {
    /// Do nothing after writing.
    #[default]
    WriteThenNoop,
    /// Unwind the current thread after writing.
    WriteThenGoexit,
    /// Panic with the entry message after writing.
    WriteThenPanic,
    /// Exit the process with status 1 after writing.
    WriteThenFatal,
}

/// Panic payload used by [`CheckWriteAction::WriteThenGoexit`].
#[derive(Debug)]
pub struct TaskExit;

impl CheckWriteAction {
    pub fn is_noop(self) -> bool {
        self == CheckWriteAction::WriteThenNoop
    }

    /// Carry out the action. Only `WriteThenNoop` returns.
    pub fn apply(self, message: &str) {
        match self {
            CheckWriteAction::WriteThenNoop => {}
            CheckWriteAction::WriteThenGoexit => std::panic::resume_unwind(Box::new(TaskExit)),
            CheckWriteAction::WriteThenPanic => panic!("{}", message),
            CheckWriteAction::WriteThenFatal => std::process::exit(1),
        }
    }
}

/// What happens once a checked entry has been written.
#[derive(Clone)]
pub enum AfterWrite {
    Action(CheckWriteAction),
    Hook(Arc<dyn CheckWriteHook>),
}

impl AfterWrite {
    /// Whether this does nothing at all.
    pub fn is_noop(&self) -> bool {
        matches!(self, AfterWrite::Action(CheckWriteAction::WriteThenNoop))
    }
}

impl From<CheckWriteAction> for AfterWrite {
    fn from(action: CheckWriteAction) -> Self {
        AfterWrite::Action(action)
    }
}

impl From<Arc<dyn CheckWriteHook>> for AfterWrite {
    fn from(hook: Arc<dyn CheckWriteHook>) -> Self {
        AfterWrite::Hook(hook)
    }
}

impl fmt::Debug for AfterWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AfterWrite::Action(action) => write!(f, "Action({:?})", action),
            AfterWrite::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

#[derive(Default)]
struct Slot {
    entry: Entry,
    error_output: Option<Arc<dyn WriteSyncer>>,
    dirty: bool,
    after: Option<AfterWrite>,
    cores: Vec<CoreRef>,
}

impl Slot {
    /// Clear everything but the entry, whose storage is refilled in place
    /// on the next checkout.
    fn reset(&mut self) {
        self.error_output = None;
        self.dirty = false;
        self.after = None;
        // Drop core handles so an idle slot keeps nothing alive.
        self.cores.clear();
    }

    fn report(&self, message: fmt::Arguments<'_>) {
        let out = self
            .error_output
            .clone()
            .unwrap_or_else(write_syncer::stderr);
        let _ = out.write(message.to_string().as_bytes());
        let _ = out.sync();
    }
}

fn slot_pool() -> &'static Pool<Slot> {
    static POOL: OnceLock<Pool<Slot>> = OnceLock::new();
    POOL.get_or_init(|| {
        Pool::new(|| Slot {
            cores: Vec::with_capacity(4),
            ..Slot::default()
        })
    })
}

/// An entry that some core agreed to log, plus the cores that agreed.
///
/// The handle owns a pooled slot; dropping it returns the slot with every
/// reference cleared.
pub struct CheckedEntry {
    slot: Slot,
}

impl CheckedEntry {
    fn acquire(ce: Option<CheckedEntry>, entry: &Entry) -> CheckedEntry {
        match ce {
            Some(ce) => ce,
            None => {
                let mut slot = slot_pool().get();
                slot.reset();
                slot.entry.clone_from(entry);
                CheckedEntry { slot }
            }
        }
    }

    /// Register `core` as agreeing to log `entry`, checking out a fresh
    /// handle if `ce` is `None`.
    pub fn add_core(ce: Option<CheckedEntry>, entry: &Entry, core: CoreRef) -> CheckedEntry {
        let mut ce = Self::acquire(ce, entry);
        ce.slot.cores.push(core);
        ce
    }

    /// Set what happens after the entry is written, replacing anything set
    /// before. Checks out a fresh handle if `ce` is `None`.
    pub fn after(
        ce: Option<CheckedEntry>,
        entry: &Entry,
        after: impl Into<AfterWrite>,
    ) -> CheckedEntry {
        let mut ce = Self::acquire(ce, entry);
        ce.slot.after = Some(after.into());
        ce
    }

    /// Shorthand for [`CheckedEntry::after`] with a terminal action.
    pub fn should(
        ce: Option<CheckedEntry>,
        entry: &Entry,
        action: CheckWriteAction,
    ) -> CheckedEntry {
        Self::after(ce, entry, action)
    }

    /// Where write failures and misuse diagnostics go. Defaults to stderr.
    pub fn set_error_output(&mut self, out: Arc<dyn WriteSyncer>) {
        self.slot.error_output = Some(out);
    }

    #[must_use]
    pub fn with_error_output(mut self, out: Arc<dyn WriteSyncer>) -> Self {
        self.set_error_output(out);
        self
    }

    pub fn entry(&self) -> &Entry {
        &self.slot.entry
    }

    /// Mutable access for annotating the entry (caller, stack) before it is
    /// written.
    pub fn entry_mut(&mut self) -> &mut Entry {
        &mut self.slot.entry
    }

    /// Number of cores registered so far.
    pub fn core_count(&self) -> usize {
        self.slot.cores.len()
    }

    pub fn after_write(&self) -> Option<&AfterWrite> {
        self.slot.after.as_ref()
    }

    /// Write the entry to every registered core.
    ///
    /// Core failures are reported to the error output, never returned. A
    /// custom hook runs before this returns; a terminal action is returned
    /// for the caller to [`apply`](CheckWriteAction::apply).
    ///
    /// Writing twice is a bug: the second call only reports the misuse and
    /// touches no core.
    pub fn write(&mut self, fields: &[Field]) -> CheckWriteAction {
        let slot = &mut self.slot;
        if slot.dirty {
            slot.report(format_args!(
                "{} Unsafe CheckedEntry re-use near Entry {:?}.\n",
                slot.entry.time, slot.entry
            ));
            return CheckWriteAction::WriteThenNoop;
        }
        slot.dirty = true;

        let mut errors = MultiError::new();
        for core in &slot.cores {
            errors.push_result(core.write(&slot.entry, fields));
        }
        slot.cores.clear();
        if let Err(err) = errors.into_result() {
            slot.report(format_args!("{} write error: {}\n", slot.entry.time, err));
        }

        match &slot.after {
            Some(AfterWrite::Hook(hook)) => {
                hook.on_write(&slot.entry, fields);
                CheckWriteAction::WriteThenNoop
            }
            Some(AfterWrite::Action(action)) => *action,
            None => CheckWriteAction::WriteThenNoop,
        }
    }

    /// Write the entry, release the handle, then carry out any terminal
    /// action.
    pub fn commit(mut self, fields: &[Field]) {
        let action = self.write(fields);
        if action.is_noop() {
            return;
        }
        let message = std::mem::take(&mut self.slot.entry.message);
        drop(self);
        action.apply(&message);
    }
}

impl Drop for CheckedEntry {
    fn drop(&mut self) {
        let mut slot = std::mem::take(&mut self.slot);
        slot.reset();
        slot_pool().put(slot);
    }
}

impl fmt::Debug for CheckedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedEntry")
            .field("entry", &self.slot.entry)
            .field("dirty", &self.slot.dirty)
            .field("after", &self.slot.after)
            .field("cores", &self.slot.cores.len())
            .finish()
    }
}

/// Post-write behaviour for the terminal levels.
///
/// `Panic` and `Fatal` always get a terminal action; `DPanic` only in
/// development. An override replaces the default action unless it is
/// absent or the no-op action, so a no-op override can never suppress a
/// panic or exit.
#[derive(Debug, Clone, Default)]
pub struct TerminalPolicy {
    pub development: bool,
    pub on_panic: Option<AfterWrite>,
    pub on_fatal: Option<AfterWrite>,
}

fn override_or(over: &Option<AfterWrite>, default: CheckWriteAction) -> AfterWrite {
    match over {
        Some(after) if !after.is_noop() => after.clone(),
        _ => AfterWrite::Action(default),
    }
}

impl TerminalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    #[must_use]
    pub fn on_panic(mut self, after: impl Into<AfterWrite>) -> Self {
        self.on_panic = Some(after.into());
        self
    }

    #[must_use]
    pub fn on_fatal(mut self, after: impl Into<AfterWrite>) -> Self {
        self.on_fatal = Some(after.into());
        self
    }

    /// The post-write behaviour for `level`, if it is terminal.
    pub fn resolve(&self, level: Level) -> Option<AfterWrite> {
        match level {
            Level::DPanic if self.development => {
                Some(override_or(&self.on_panic, CheckWriteAction::WriteThenPanic))
            }
            Level::Panic => Some(override_or(&self.on_panic, CheckWriteAction::WriteThenPanic)),
            Level::Fatal => Some(override_or(&self.on_fatal, CheckWriteAction::WriteThenFatal)),
            _ => None,
        }
    }

    /// Attach the terminal behaviour for `entry` to `ce`.
    ///
    /// A terminal entry gets a handle even when no core agreed to log it, so
    /// the panic or exit still happens.
    pub fn attach(&self, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        match self.resolve(entry.level) {
            Some(after) => Some(CheckedEntry::after(ce, entry, after)),
            None => ce,
        }
    }
}

//! Registration table
//!
//! Maps operation ids to indicator entries. Several operations may point at
//! one entry (concurrent requests against the same region); the entry keeps
//! the set of referencing operations and is removed from the table in the
//! same step that finalizes it, so an entry present here is never finalized.
//!
//! The table only does bookkeeping. Timers and visuals are driven by the
//! [`Coordinator`](crate::Coordinator), which owns the table.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::presentation::{PresentationPort, Region};
use crate::scheduler::TimerId;

/// Unique id of one tracked request. Never reused within a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) u64);

impl OpId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Id of one indicator entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Bound to one region of the page.
    Local,
    /// Covers the whole viewport.
    Global,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Global => "global",
        })
    }
}

/// Visual progress of an entry. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryState {
    /// Referenced, nothing shown yet.
    Pending,
    OverlayVisible,
    SpinnerVisible,
    Finalized,
}

/// Shared busy-indicator state for one region or for the page.
pub struct Entry<P: PresentationPort> {
    pub(crate) id: EntryId,
    pub(crate) scope: Scope,
    /// `None` for the global entry.
    pub(crate) target: Option<P::Region>,
    pub(crate) refs: BTreeSet<OpId>,
    pub(crate) overlay: Option<P::Overlay>,
    /// Always nested in `overlay`.
    pub(crate) spinner: Option<P::Spinner>,
    pub(crate) overlay_timer: Option<TimerId>,
    pub(crate) spinner_timer: Option<TimerId>,
    pub(crate) state: EntryState,
}

impl<P: PresentationPort> Entry<P> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn target(&self) -> Option<&P::Region> {
        self.target.as_ref()
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    pub fn is_referenced_by(&self, op: OpId) -> bool {
        self.refs.contains(&op)
    }

    /// Move the state forward; never backwards.
    pub(crate) fn advance(&mut self, state: EntryState) {
        if state > self.state {
            self.state = state;
        }
    }
}

impl<P: PresentationPort> fmt::Debug for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("target", &self.target)
            .field("refs", &self.refs)
            .field("has_overlay", &self.overlay.is_some())
            .field("has_spinner", &self.spinner.is_some())
            .field("state", &self.state)
            .finish()
    }
}

/// Operation id -> entry table, plus the request-handle association.
pub struct Registry<P: PresentationPort, H> {
    entries: HashMap<EntryId, Entry<P>>,
    /// Operation -> entry, plus the request handle it was registered with.
    ops: HashMap<OpId, (EntryId, Option<H>)>,
    /// Request handle -> operation. Lives exactly as long as the operation.
    handles: HashMap<H, (OpId, EntryId)>,
    global: Option<EntryId>,
    next_entry: u64,
}

impl<P: PresentationPort, H: Eq + Hash + Clone> Registry<P, H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ops: HashMap::new(),
            handles: HashMap::new(),
            global: None,
            next_entry: 1,
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry<P>> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry<P>> {
        self.entries.get_mut(&id)
    }

    /// Entry an operation currently references.
    pub fn entry_of(&self, op: OpId) -> Option<EntryId> {
        self.ops.get(&op).map(|(entry, _)| *entry)
    }

    pub fn op_for_handle(&self, handle: &H) -> Option<OpId> {
        self.handles.get(handle).map(|(op, _)| *op)
    }

    /// The live global entry, if any.
    pub fn global(&self) -> Option<EntryId> {
        self.global
    }

    /// Live local entry whose target is this exact node.
    pub fn find_local(&self, target: &P::Region) -> Option<EntryId> {
        self.entries
            .values()
            .filter(|entry| entry.scope == Scope::Local)
            .find(|entry| entry.target.as_ref().is_some_and(|t| t.same_node(target)))
            .map(|entry| entry.id)
    }

    /// Live local entries whose target equals, contains, or sits inside `element`.
    pub fn find_overlapping(&self, element: &P::Region) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self
            .entries
            .values()
            .filter(|entry| entry.scope == Scope::Local)
            .filter(|entry| entry.target.as_ref().is_some_and(|t| t.overlaps(element)))
            .map(|entry| entry.id)
            .collect();
        ids.sort();
        ids
    }

    /// Every live entry id, oldest first.
    pub fn entry_ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry<P>> {
        self.entries.values()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry<P>> {
        self.entries.values_mut()
    }

    /// Create an empty entry. The caller attaches the first operation.
    pub(crate) fn create(&mut self, scope: Scope, target: Option<P::Region>) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry += 1;

        self.entries.insert(
            id,
            Entry {
                id,
                scope,
                target,
                refs: BTreeSet::new(),
                overlay: None,
                spinner: None,
                overlay_timer: None,
                spinner_timer: None,
                state: EntryState::Pending,
            },
        );
        if scope == Scope::Global {
            self.global = Some(id);
        }
        id
    }

    /// Add an operation to an entry's reference set.
    pub(crate) fn attach(&mut self, op: OpId, entry: EntryId, handle: Option<H>) -> bool {
        let Some(slot) = self.entries.get_mut(&entry) else {
            return false;
        };
        slot.refs.insert(op);
        if let Some(handle) = &handle {
            self.handles.insert(handle.clone(), (op, entry));
        }
        self.ops.insert(op, (entry, handle));
        true
    }

    /// Drop an operation from its entry. Returns the entry and its remaining
    /// reference count, or `None` if the operation was not registered.
    pub(crate) fn detach(&mut self, op: OpId) -> Option<(EntryId, usize)> {
        let (entry_id, handle) = self.ops.remove(&op)?;
        if let Some(handle) = handle
            && self.handles.get(&handle).is_some_and(|(owner, _)| *owner == op)
        {
            self.handles.remove(&handle);
        }
        let entry = self.entries.get_mut(&entry_id)?;
        entry.refs.remove(&op);
        Some((entry_id, entry.refs.len()))
    }

    /// Remove an entry and every operation and handle mapping pointing at it.
    /// Returns `None` if the entry was already taken.
    pub(crate) fn take(&mut self, id: EntryId) -> Option<Entry<P>> {
        let entry = self.entries.remove(&id)?;
        self.ops.retain(|_, (entry_id, _)| *entry_id != id);
        self.handles.retain(|_, (_, entry_id)| *entry_id != id);
        if self.global == Some(id) {
            self.global = None;
        }
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.ops.len()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }
}

impl<P: PresentationPort, H: Eq + Hash + Clone> Default for Registry<P, H> {
    fn default() -> Self {
        Self::new()
    }
}

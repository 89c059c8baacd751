//! Shared data sets with transactional, copy-on-write element access.
//!
//! A [`SharedDataSet`] may be accessed from several threads.
//! Each thread opens at most one [`Transaction`] at a time.
//! Writes are made to private clones of element buffers
//! and become visible to everyone else only once the transaction commits,
//! all at once.
//!
//! Conflicts are detected eagerly rather than waited upon:
//! checking out for writing a tag
//! which another open transaction already holds
//! fails with [`TransactionError::BufferLocked`].

use crate::buffer::{BufferError, ElementBuffer};
use crate::dataset::DataSet;
use crate::error::{ErrorKind, Kind};
use crate::header::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, ThreadId};

/// An error type for transactional data set access.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum TransactionError {
    /// Another open transaction holds the element for writing
    #[snafu(display("Element {} is checked out by another transaction", tag))]
    BufferLocked { tag: Tag, backtrace: Backtrace },
    /// This thread already has an open transaction on the data set
    #[snafu(display("Thread already has an open transaction on this data set"))]
    TransactionConflict { backtrace: Backtrace },
    /// Element lookup failed
    #[snafu(display("Could not access element"))]
    Access { source: BufferError },
}

impl Kind for TransactionError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::BufferLocked { .. } => ErrorKind::BufferLocked,
            TransactionError::TransactionConflict { .. } => ErrorKind::TransactionConflict,
            TransactionError::Access { source } => source.kind(),
        }
    }
}

/// Result type for transactional access.
pub type Result<T, E = TransactionError> = std::result::Result<T, E>;

type TxId = u64;

#[derive(Debug, Default)]
struct Checkouts {
    /// tag -> transaction holding it for writing
    tags: HashMap<Tag, TxId>,
    /// threads with an open transaction
    threads: HashSet<ThreadId>,
}

#[derive(Debug, Default)]
struct Shared {
    data: RwLock<DataSet>,
    checkouts: Mutex<Checkouts>,
    generation: AtomicU64,
    next_id: AtomicU64,
}

impl Shared {
    fn checkouts(&self) -> MutexGuard<'_, Checkouts> {
        self.checkouts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A data set shared between threads.
///
/// Cloning the handle is cheap and yields another handle
/// to the same data set.
#[derive(Debug, Clone, Default)]
pub struct SharedDataSet {
    inner: Arc<Shared>,
}

impl From<DataSet> for SharedDataSet {
    fn from(dataset: DataSet) -> Self {
        SharedDataSet::new(dataset)
    }
}

impl SharedDataSet {
    /// Share the given data set.
    pub fn new(dataset: DataSet) -> Self {
        SharedDataSet {
            inner: Arc::new(Shared {
                data: RwLock::new(dataset),
                ..Default::default()
            }),
        }
    }

    /// Open a transaction from the current thread.
    ///
    /// Fails with `TransactionConflict`
    /// if the current thread already has one open on this data set.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        let thread = thread::current().id();
        let mut checkouts = self.inner.checkouts();
        if !checkouts.threads.insert(thread) {
            return TransactionConflictSnafu.fail();
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("opened transaction #{}", id);
        Ok(Transaction {
            shared: &self.inner,
            id,
            thread,
            staged: BTreeMap::new(),
        })
    }

    /// Observe the committed state of the whole data set.
    ///
    /// Commits never interleave with an ongoing view.
    pub fn view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DataSet) -> R,
    {
        let data = self.inner.data.read().unwrap_or_else(PoisonError::into_inner);
        f(&data)
    }

    /// The number of commits applied so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Recover the data set,
    /// or give back the handle if it is still shared elsewhere.
    pub fn try_unwrap(self) -> std::result::Result<DataSet, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(shared) => Ok(shared
                .data
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(SharedDataSet { inner }),
        }
    }
}

/// An open transaction over a [`SharedDataSet`].
///
/// Dropping the transaction without committing discards all staged changes.
#[derive(Debug)]
pub struct Transaction<'a> {
    shared: &'a Shared,
    id: TxId,
    thread: ThreadId,
    /// `None` stages a removal
    staged: BTreeMap<Tag, Option<ElementBuffer>>,
}

impl<'a> Transaction<'a> {
    /// Access an element.
    ///
    /// Changes staged by this transaction are visible here.
    /// A committed element is copied out first,
    /// so that `f` runs without holding any lock on the data set.
    pub fn read<F, R>(&self, tag: Tag, f: F) -> Result<R>
    where
        F: FnOnce(&ElementBuffer) -> R,
    {
        match self.staged.get(&tag) {
            Some(Some(buf)) => Ok(f(buf)),
            Some(None) => Err(BufferError::tag_not_found(tag)).context(AccessSnafu),
            None => {
                let buf = self.committed(tag)?;
                Ok(f(&buf))
            }
        }
    }

    /// Obtain an owned copy of an element.
    pub fn snapshot(&self, tag: Tag) -> Result<ElementBuffer> {
        match self.staged.get(&tag) {
            Some(Some(buf)) => Ok(buf.clone()),
            Some(None) => Err(BufferError::tag_not_found(tag)).context(AccessSnafu),
            None => self.committed(tag),
        }
    }

    /// Check out an existing element for writing.
    ///
    /// The returned buffer is a private copy
    /// until the transaction is committed.
    /// Nothing is checked out if the element cannot be written.
    pub fn write(&mut self, tag: Tag) -> Result<&mut ElementBuffer> {
        let acquired = self.check_out(tag)?;
        let copy = match self.staged.get(&tag) {
            Some(Some(_)) => Ok(None),
            Some(None) => Err(BufferError::tag_not_found(tag)).context(AccessSnafu),
            None => self.committed(tag).map(Some),
        };
        self.stage(tag, acquired, copy)
    }

    /// Check out an element for writing, creating it empty if absent.
    ///
    /// Fails with `WrongVr` if the tag holds a sequence or encapsulated pixel data.
    pub fn write_new(&mut self, tag: Tag, vr: VR) -> Result<&mut ElementBuffer> {
        let acquired = self.check_out(tag)?;
        let copy = match self.staged.get(&tag) {
            Some(Some(_)) => Ok(None),
            Some(None) => Ok(Some(ElementBuffer::empty(tag, vr))),
            None => match self.committed(tag) {
                Ok(buf) => Ok(Some(buf)),
                Err(TransactionError::Access {
                    source: BufferError::TagNotFound { .. },
                }) => Ok(Some(ElementBuffer::empty(tag, vr))),
                Err(e) => Err(e),
            },
        };
        self.stage(tag, acquired, copy)
    }

    /// A copy of the committed element.
    fn committed(&self, tag: Tag) -> Result<ElementBuffer> {
        let data = self.shared.data.read().unwrap_or_else(PoisonError::into_inner);
        data.element(tag).cloned().context(AccessSnafu)
    }

    /// Stage a copy of an element checked out for writing.
    /// On failure, a checkout `acquired` for this write is released.
    fn stage(
        &mut self,
        tag: Tag,
        acquired: bool,
        copy: Result<Option<ElementBuffer>>,
    ) -> Result<&mut ElementBuffer> {
        match copy {
            Ok(Some(buf)) => {
                self.staged.insert(tag, Some(buf));
            }
            Ok(None) => {}
            Err(e) => {
                if acquired {
                    self.shared.checkouts().tags.remove(&tag);
                }
                return Err(e);
            }
        }
        match self.staged.get_mut(&tag) {
            Some(Some(buf)) => Ok(buf),
            _ => Err(BufferError::tag_not_found(tag)).context(AccessSnafu),
        }
    }

    /// Stage the removal of an element.
    pub fn remove(&mut self, tag: Tag) -> Result<()> {
        self.check_out(tag)?;
        self.staged.insert(tag, None);
        Ok(())
    }

    /// The tags with changes staged in this transaction.
    pub fn staged_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.staged.keys().copied()
    }

    /// Apply all staged changes at once and return the new generation.
    pub fn commit(mut self) -> u64 {
        let staged = std::mem::take(&mut self.staged);
        let mut data = self.shared.data.write().unwrap_or_else(PoisonError::into_inner);
        let count = staged.len();
        for (tag, change) in staged {
            match change {
                Some(mut buf) => {
                    buf.mark_committed();
                    data.put(buf);
                }
                None => {
                    data.remove(tag);
                }
            }
        }
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(data);
        tracing::debug!(
            "transaction #{} committed {} change(s), generation {}",
            self.id,
            count,
            generation
        );
        generation
    }

    /// Discard all staged changes.
    pub fn rollback(self) {}

    /// Hold `tag` for writing.
    /// Returns whether it was not held by this transaction before.
    fn check_out(&mut self, tag: Tag) -> Result<bool> {
        let mut checkouts = self.shared.checkouts();
        match checkouts.tags.get(&tag) {
            Some(&holder) if holder != self.id => BufferLockedSnafu { tag }.fail(),
            Some(_) => Ok(false),
            None => {
                checkouts.tags.insert(tag, self.id);
                Ok(true)
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let mut checkouts = self.shared.checkouts();
        let id = self.id;
        checkouts.tags.retain(|_, holder| *holder != id);
        checkouts.threads.remove(&self.thread);
        if !self.staged.is_empty() {
            tracing::trace!("transaction #{} rolled back", id);
        }
    }
}

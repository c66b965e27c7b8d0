//! The mutation worker: one background thread that owns every write.
//!
//! Callers push a [`Mutation`] onto the queue together with a one-shot reply
//! channel and block on the reply. The thread pops requests in arrival order
//! and runs read → apply → write for each before looking at the next, so no
//! two mutations ever interleave their read and write steps.

use crate::entry::{Document, Entry};
use crate::error::{Error, Result};
use crate::persist::DocumentFile;
use crate::store::Policy;
use parking_lot::Mutex;
use std::sync::mpsc;
use std::thread;

/// A single logical change to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mutation {
    Add { word: String, definition: String },
    Remove { word: String },
    Update { word: String, definition: String },
}

impl Mutation {
    fn kind(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Remove { .. } => "remove",
            Mutation::Update { .. } => "update",
        }
    }

    fn word(&self) -> &str {
        match self {
            Mutation::Add { word, .. } | Mutation::Remove { word } | Mutation::Update { word, .. } => word,
        }
    }

    /// Apply to an in-memory snapshot. `Ok(false)` means nothing changed and
    /// there's nothing to write back.
    fn apply_to(self, doc: &mut Document, policy: Policy) -> Result<bool> {
        match self {
            Mutation::Add { word, definition } => {
                if policy == Policy::Strict && doc.contains_key(&word) {
                    return Err(Error::AlreadyExists(word));
                }
                doc.insert(word, Entry::new(definition));
                Ok(true)
            }
            Mutation::Remove { word } => match doc.remove(&word) {
                Some(_) => Ok(true),
                None if policy == Policy::Strict => Err(Error::NotFound(word)),
                None => Ok(false),
            },
            Mutation::Update { word, definition } => {
                if !doc.contains_key(&word) {
                    return Err(Error::NotFound(word));
                }
                doc.insert(word, Entry::new(definition));
                Ok(true)
            }
        }
    }
}

struct Request {
    mutation: Mutation,
    reply: mpsc::SyncSender<Result<()>>,
}

/// Runs one full read-modify-write cycle. A failed read or a failed
/// precondition never reaches the write.
fn run_cycle(file: &DocumentFile, policy: Policy, mutation: Mutation) -> Result<()> {
    let mut doc = file.read()?;
    if mutation.apply_to(&mut doc, policy)? {
        file.write(&doc)?;
    }
    Ok(())
}

/// Background thread plus the queue feeding it. Joins the thread on drop.
pub(crate) struct MutationWorker {
    tx: Mutex<Option<mpsc::Sender<Request>>>,
    join_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl MutationWorker {
    /// Spawn the worker thread for `file`.
    pub(crate) fn start(file: DocumentFile, policy: Policy) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Request>();

        let join_handle = thread::Builder::new()
            .name("json-dict-writer".into())
            .spawn(move || {
                // Ends once every sender is gone and the queue is empty.
                for Request { mutation, reply } in rx {
                    let kind = mutation.kind();
                    let word = mutation.word().to_owned();
                    let outcome = run_cycle(&file, policy, mutation);
                    match &outcome {
                        Ok(()) => tracing::debug!(op = kind, word = %word, "mutation applied"),
                        Err(e) => tracing::warn!(op = kind, word = %word, error = %e, "mutation failed"),
                    }
                    // The caller may have given up waiting; nothing to do then.
                    let _ = reply.send(outcome);
                }
                tracing::debug!(path = %file.path().display(), "mutation queue drained");
            })?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    /// Queue `mutation` and block until the worker reports its outcome.
    pub(crate) fn submit(&self, mutation: Mutation) -> Result<()> {
        let tx = self.tx.lock().clone().ok_or(Error::Closed)?;
        let (reply, outcome) = mpsc::sync_channel(1);
        tx.send(Request { mutation, reply }).map_err(|_| Error::Closed)?;
        drop(tx);
        outcome.recv().map_err(|_| Error::Closed)?
    }

    /// `false` once [`shutdown`](Self::shutdown) has run.
    pub(crate) fn is_running(&self) -> bool {
        self.tx.lock().is_some()
    }

    /// Stop accepting requests, let the queued ones finish, join the thread.
    /// Safe to call more than once.
    pub(crate) fn shutdown(&self) {
        drop(self.tx.lock().take());
        // Held across the join so a concurrent caller also waits for the drain.
        let mut handle = self.join_handle.lock();
        if let Some(h) = handle.take() {
            if h.join().is_err() {
                tracing::error!("mutation worker panicked");
            }
        }
    }
}

impl Drop for MutationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::WriteMode;
    use crate::serializer::JsonSerializer;

    fn add(word: &str, definition: &str) -> Mutation {
        Mutation::Add {
            word: word.into(),
            definition: definition.into(),
        }
    }

    fn remove(word: &str) -> Mutation {
        Mutation::Remove { word: word.into() }
    }

    fn update(word: &str, definition: &str) -> Mutation {
        Mutation::Update {
            word: word.into(),
            definition: definition.into(),
        }
    }

    fn doc_with(word: &str, definition: &str) -> Document {
        let mut doc = Document::new();
        doc.insert(word.into(), Entry::new(definition));
        doc
    }

    #[test]
    fn strict_add_refuses_existing_word() {
        let mut doc = doc_with("a", "old");
        let err = add("a", "new").apply_to(&mut doc, Policy::Strict).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(w) if w == "a"));
        assert_eq!(doc["a"].definition(), "old");
    }

    #[test]
    fn lenient_add_overwrites() {
        let mut doc = doc_with("a", "old");
        assert!(add("a", "new").apply_to(&mut doc, Policy::Lenient).unwrap());
        assert_eq!(doc["a"].definition(), "new");
    }

    #[test]
    fn remove_absent_depends_on_policy() {
        let mut doc = Document::new();
        assert!(!remove("x").apply_to(&mut doc, Policy::Lenient).unwrap());
        let err = remove("x").apply_to(&mut doc, Policy::Strict).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_is_strict_under_both_policies() {
        for policy in [Policy::Strict, Policy::Lenient] {
            let mut doc = Document::new();
            assert!(update("x", "d").apply_to(&mut doc, policy).unwrap_err().is_not_found());
            assert!(doc.is_empty());
        }
    }

    #[test]
    fn requests_apply_in_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = DocumentFile::new(dir.path().join("w.json"), JsonSerializer::new(), WriteMode::Overwrite);
        file.create_if_absent().unwrap();

        let worker = MutationWorker::start(file.clone(), Policy::Strict).unwrap();
        worker.submit(add("w", "one")).unwrap();
        worker.submit(update("w", "two")).unwrap();
        worker.submit(update("w", "three")).unwrap();
        assert_eq!(file.read().unwrap()["w"].definition(), "three");
    }

    #[test]
    fn shutdown_rejects_new_requests_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = DocumentFile::new(dir.path().join("w.json"), JsonSerializer::new(), WriteMode::Overwrite);
        file.create_if_absent().unwrap();

        let worker = MutationWorker::start(file.clone(), Policy::Strict).unwrap();
        assert!(worker.is_running());
        worker.shutdown();
        worker.shutdown();
        assert!(!worker.is_running());

        assert!(matches!(worker.submit(add("late", "d")), Err(Error::Closed)));
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn concurrent_shutdowns_both_wait_for_the_drain() {
        use std::sync::{Arc, Barrier};

        const N: usize = 16;
        let dir = tempfile::tempdir().unwrap();
        let file = DocumentFile::new(dir.path().join("w.json"), JsonSerializer::new(), WriteMode::Atomic);
        file.create_if_absent().unwrap();

        let worker = Arc::new(MutationWorker::start(file.clone(), Policy::Strict).unwrap());
        let barrier = Arc::new(Barrier::new(N + 2));

        let submitters: Vec<_> = (0..N)
            .map(|i| {
                let worker = Arc::clone(&worker);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let _ = worker.submit(add(&format!("w{i}"), "d"));
                })
            })
            .collect();
        let stoppers: Vec<_> = (0..2)
            .map(|_| {
                let worker = Arc::clone(&worker);
                let barrier = Arc::clone(&barrier);
                let file = file.clone();
                thread::spawn(move || {
                    barrier.wait();
                    worker.shutdown();
                    file.read().unwrap().len()
                })
            })
            .collect();

        for s in submitters {
            s.join().unwrap();
        }
        let settled = file.read().unwrap().len();
        for s in stoppers {
            // nothing lands on disk after shutdown returns
            assert_eq!(s.join().unwrap(), settled);
        }
    }
}

//! Dictionary facade and its builder.

use crate::entry::{Document, Entry};
use crate::error::{Error, Result};
use crate::persist::{DocumentFile, WriteMode};
use crate::serializer::JsonSerializer;
use crate::worker::{Mutation, MutationWorker};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How add and remove treat a word that is already present / absent.
///
/// Chosen once per store. [`update`](Dictionary::update) always requires the
/// word to exist, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// `add` fails with [`AlreadyExists`](Error::AlreadyExists) on a defined
    /// word; `remove` fails with [`NotFound`](Error::NotFound) on a missing one.
    #[default]
    Strict,
    /// `add` overwrites silently; `remove` of a missing word is a no-op.
    Lenient,
}

/// Word → definition store persisted to a single JSON file.
///
/// Mutations are funnelled through one background worker and applied one at
/// a time against a fresh read of the file. Reads hit the file directly and
/// may run alongside a mutation; they see either the state before it or the
/// state after it. Once a mutation call has returned, later reads see its
/// effect.
///
/// Share it between threads with an `Arc`. Dropping it shuts the worker down
/// after the queued mutations finish.
pub struct Dictionary {
    file: DocumentFile,
    policy: Policy,
    worker: MutationWorker,
}

impl Dictionary {
    /// Open (or create) a strict dictionary at `path` with compact JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a dictionary. Call
    /// [`.build()`](DictionaryBuilder::build) when ready.
    pub fn builder(path: impl AsRef<Path>) -> DictionaryBuilder {
        DictionaryBuilder::new(path)
    }

    // ---- reads ----

    /// Look up the entry for `word`.
    pub fn get(&self, word: &str) -> Result<Entry> {
        let mut doc = self.file.read()?;
        doc.remove(word).ok_or_else(|| Error::NotFound(word.to_owned()))
    }

    /// Every word (sorted) plus the full mapping, taken from a single read.
    pub fn list(&self) -> Result<(Vec<String>, HashMap<String, Entry>)> {
        let doc: Document = self.file.read()?;
        let mut words: Vec<String> = doc.keys().cloned().collect();
        words.sort();
        Ok((words, doc))
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Policy this store was opened with.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// How rewrites hit the disk.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.file.mode()
    }

    // ---- writes ----

    /// Define `word`. Strict stores refuse words that already exist.
    pub fn add(&self, word: &str, definition: &str) -> Result<()> {
        self.worker.submit(Mutation::Add {
            word: word.to_owned(),
            definition: definition.to_owned(),
        })
    }

    /// Delete `word`. Strict stores fail on missing words, lenient ones don't.
    pub fn remove(&self, word: &str) -> Result<()> {
        self.worker.submit(Mutation::Remove {
            word: word.to_owned(),
        })
    }

    /// Replace the definition of an existing `word`.
    pub fn update(&self, word: &str, definition: &str) -> Result<()> {
        self.worker.submit(Mutation::Update {
            word: word.to_owned(),
            definition: definition.to_owned(),
        })
    }

    // ---- lifecycle ----

    /// Stop taking mutations. Ones already queued are applied first, then the
    /// worker thread is joined; anything submitted afterwards fails with
    /// [`Error::Closed`]. Reads keep working. Calling it twice is harmless.
    pub fn shutdown(&self) {
        if self.worker.is_running() {
            tracing::info!(path = %self.path().display(), "shutting down dictionary");
        }
        self.worker.shutdown();
    }

    /// `false` once [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.worker.is_running()
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("path", &self.file.path())
            .field("policy", &self.policy)
            .field("write_mode", &self.file.mode())
            .field("pretty", &self.file.serializer().is_pretty())
            .field("open", &self.is_open())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`Dictionary`].
///
/// ```rust,no_run
/// use json_dict::{Dictionary, Policy, WriteMode};
///
/// let dict = Dictionary::builder("dictionary.json")
///     .policy(Policy::Lenient)
///     .pretty(true)
///     .write_mode(WriteMode::Atomic)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DictionaryBuilder {
    path: PathBuf,
    policy: Policy,
    pretty: bool,
    write_mode: WriteMode,
}

impl DictionaryBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy: Policy::default(),
            pretty: false,
            write_mode: WriteMode::default(),
        }
    }

    /// Set the add/remove policy (default: [`Policy::Strict`]).
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// How each rewrite hits the disk (default: [`WriteMode::Atomic`]).
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Create the file as `{}` if it's missing, then start the worker.
    ///
    /// An existing file is not validated here; a corrupt one surfaces as
    /// [`Error::CorruptDocument`] on the first read or mutation.
    pub fn build(self) -> Result<Dictionary> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };
        let file = DocumentFile::new(&self.path, serializer, self.write_mode);

        if file.create_if_absent()? {
            tracing::info!(path = %self.path.display(), "created empty dictionary");
        }

        let worker = MutationWorker::start(file.clone(), self.policy)?;
        tracing::info!(
            path = %self.path.display(),
            policy = ?self.policy,
            write_mode = ?self.write_mode,
            "dictionary opened"
        );

        Ok(Dictionary {
            file,
            policy: self.policy,
            worker,
        })
    }
}

//! Change-tracked memo record
//!
//! Every mutation goes through [`Memo::set`]. A mutation that actually
//! changes a value bumps `updated_at` before any observer runs, then
//! notifies observers twice: once for the field, once for `UpdatedAt`.
//! Writing the current value again is a no-op.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Shown in place of an empty or whitespace-only title
pub const UNTITLED: &str = "untitled";

/// `strftime` pattern used for `formatted_updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Stable memo identity (ULID text)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemoId(String);

impl MemoId {
    /// Fresh, unique identity
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fields that can appear in a change notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoField {
    Title,
    Content,
    IsPinned,
    Tags,
    Category,
    Priority,
    /// Maintained automatically; also settable directly
    UpdatedAt,
}

impl MemoField {
    /// Property name reported to bindings
    pub fn name(&self) -> &'static str {
        match self {
            MemoField::Title => "title",
            MemoField::Content => "content",
            MemoField::IsPinned => "is_pinned",
            MemoField::Tags => "tags",
            MemoField::Category => "category",
            MemoField::Priority => "priority",
            MemoField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for MemoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed write to one memo field
///
/// `id` and `created_at` have no variant: they cannot change after creation.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Title(String),
    Content(String),
    Pinned(bool),
    Tags(String),
    Category(String),
    Priority(i32),
    UpdatedAt(DateTime<Utc>),
}

impl FieldUpdate {
    pub fn field(&self) -> MemoField {
        match self {
            FieldUpdate::Title(_) => MemoField::Title,
            FieldUpdate::Content(_) => MemoField::Content,
            FieldUpdate::Pinned(_) => MemoField::IsPinned,
            FieldUpdate::Tags(_) => MemoField::Tags,
            FieldUpdate::Category(_) => MemoField::Category,
            FieldUpdate::Priority(_) => MemoField::Priority,
            FieldUpdate::UpdatedAt(_) => MemoField::UpdatedAt,
        }
    }
}

/// Outcome of [`Memo::set`]: the fields notified, in order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Change {
    fields: SmallVec<[MemoField; 2]>,
}

impl Change {
    /// True if the write replaced a value
    pub fn is_changed(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn fields(&self) -> &[MemoField] {
        &self.fields
    }

    /// True if `updated_at` moved as part of this change
    pub fn touched_timestamp(&self) -> bool {
        self.fields.contains(&MemoField::UpdatedAt)
    }
}

/// Handle returned by [`Memo::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Memo, MemoField) + Send>;

/// Plain copy of a memo's stored fields
///
/// This is what crosses thread boundaries and what stores persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoSnapshot {
    pub id: MemoId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub tags: String,
    pub category: String,
    pub priority: i32,
}

/// A sticky note
///
/// Single-writer: there is no internal locking, so whoever holds
/// `&mut Memo` is the only one mutating it.
pub struct Memo {
    id: MemoId,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_pinned: bool,
    tags: String,
    category: String,
    priority: i32,
    clock: Arc<dyn Clock>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Memo {
    /// Create a memo stamped by the system clock
    pub fn create(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::create_with_clock(title, content, Arc::new(SystemClock))
    }

    /// Create a memo with a fresh id and `created_at == updated_at == now`
    pub fn create_with_clock(
        title: impl Into<String>,
        content: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        Self {
            id: MemoId::generate(),
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
            tags: String::new(),
            category: String::new(),
            priority: 0,
            clock,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Rebuild a memo from stored fields, without notifying or touching timestamps
    pub fn from_snapshot(snapshot: MemoSnapshot) -> Self {
        Self::from_snapshot_with_clock(snapshot, Arc::new(SystemClock))
    }

    pub fn from_snapshot_with_clock(snapshot: MemoSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: snapshot.id,
            title: snapshot.title,
            content: snapshot.content,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            is_pinned: snapshot.is_pinned,
            tags: snapshot.tags,
            category: snapshot.category,
            priority: snapshot.priority,
            clock,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Copy out the stored fields
    pub fn snapshot(&self) -> MemoSnapshot {
        MemoSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_pinned: self.is_pinned,
            tags: self.tags.clone(),
            category: self.category.clone(),
            priority: self.priority,
        }
    }

    /// Apply a field write
    ///
    /// Returns an empty [`Change`] when the new value equals the current one.
    /// Otherwise the field is replaced and, unless the write targets
    /// `updated_at` itself, `updated_at` is set to the clock's now. Both
    /// writes land before observers hear about either.
    pub fn set(&mut self, update: FieldUpdate) -> Change {
        let field = update.field();
        let replaced = match update {
            FieldUpdate::Title(value) => replace_if_changed(&mut self.title, value),
            FieldUpdate::Content(value) => replace_if_changed(&mut self.content, value),
            FieldUpdate::Pinned(value) => replace_if_changed(&mut self.is_pinned, value),
            FieldUpdate::Tags(value) => replace_if_changed(&mut self.tags, value),
            FieldUpdate::Category(value) => replace_if_changed(&mut self.category, value),
            FieldUpdate::Priority(value) => replace_if_changed(&mut self.priority, value),
            FieldUpdate::UpdatedAt(value) => replace_if_changed(&mut self.updated_at, value),
        };

        let mut change = Change::default();
        if !replaced {
            return change;
        }

        change.fields.push(field);
        if field != MemoField::UpdatedAt {
            self.updated_at = self.clock.now();
            change.fields.push(MemoField::UpdatedAt);
        }

        for &notified in change.fields.iter() {
            self.notify(notified);
        }
        change
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Change {
        self.set(FieldUpdate::Title(title.into()))
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Change {
        self.set(FieldUpdate::Content(content.into()))
    }

    pub fn set_pinned(&mut self, pinned: bool) -> Change {
        self.set(FieldUpdate::Pinned(pinned))
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) -> Change {
        self.set(FieldUpdate::Tags(tags.into()))
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Change {
        self.set(FieldUpdate::Category(category.into()))
    }

    pub fn set_priority(&mut self, priority: i32) -> Change {
        self.set(FieldUpdate::Priority(priority))
    }

    /// Register a change observer
    ///
    /// Observers run synchronously inside `set`, in registration order, and
    /// see the memo with both the field and `updated_at` already written.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Memo, MemoField) + Send + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, field: MemoField) {
        // Observers borrow the memo immutably while they run.
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(self, field);
        }
        self.observers = observers;
    }

    pub fn id(&self) -> &MemoId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    /// Raw comma-separated tag text
    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Title, or [`UNTITLED`] when the title is blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// `updated_at` in local time, formatted with [`TIMESTAMP_FORMAT`]
    pub fn formatted_updated_at(&self) -> String {
        self.updated_at
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Tags split on `,` with empty entries dropped
    ///
    /// Tokens are not trimmed: `"a, b"` yields `["a", " b"]`.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split(',').filter(|tag| !tag.is_empty()).collect()
    }

    pub fn has_tags(&self) -> bool {
        self.tags.split(',').any(|tag| !tag.is_empty())
    }

    /// `"{display_title} - {formatted_updated_at}"`
    pub fn summary(&self) -> String {
        format!("{} - {}", self.display_title(), self.formatted_updated_at())
    }
}

impl Clone for Memo {
    /// Deep copy of every field value. Observers stay with the original.
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_pinned: self.is_pinned,
            tags: self.tags.clone(),
            category: self.category.clone(),
            priority: self.priority,
            clock: Arc::clone(&self.clock),
            observers: Vec::new(),
            next_observer: 0,
        }
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("is_pinned", &self.is_pinned)
            .field("tags", &self.tags)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

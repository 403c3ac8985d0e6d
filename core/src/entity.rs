//! Record types for the todoflow data layer.
//!
//! Two persisted record kinds exist: [`Todo`] items and the [`Group`]s that
//! organize them. Records are immutable values; edits produce new records via
//! the `with_*`/`toggled` helpers. Draft types ([`TodoDraft`], [`GroupDraft`])
//! carry user input that has not been assigned a uid yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a todo item.
///
/// Uids are assigned by the store from a session-scoped monotonic counter and
/// are never reused after a deletion within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoUid(i64);

impl TodoUid {
    /// Creates a `TodoUid` from a raw value
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a group.
///
/// Stored groups carry non-negative uids. Any negative value selects the
/// virtual "all groups" view; [`GroupUid::ALL`] is the canonical sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupUid(i64);

impl GroupUid {
    /// The virtual "all groups" selection. Never the uid of a stored group.
    pub const ALL: Self = Self(-1);

    /// Creates a `GroupUid` from a raw value
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true if this uid denotes the virtual "all groups" selection
    #[must_use]
    pub const fn is_all(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for GroupUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub uid: TodoUid,
    /// The group this todo belongs to
    pub group: GroupUid,
    /// First line / title
    pub subject: String,
    /// Remaining free-text body (empty allowed)
    pub content: String,
    /// Whether the todo is completed
    pub checked: bool,
    /// When the todo was created; immutable after creation
    pub create_time: DateTime<Utc>,
    /// Refreshed on every completion toggle
    pub check_time: DateTime<Utc>,
}

impl Todo {
    /// Creates a new unchecked todo with both timestamps set to `at`
    #[must_use]
    pub const fn new(
        uid: TodoUid,
        group: GroupUid,
        subject: String,
        content: String,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            uid,
            group,
            subject,
            content,
            checked: false,
            create_time: at,
            check_time: at,
        }
    }

    /// Returns a copy with `checked` flipped and `check_time` set to `at`.
    ///
    /// This is the only operation that refreshes `check_time`; `create_time`
    /// is carried over untouched.
    #[must_use]
    pub fn toggled(&self, at: DateTime<Utc>) -> Self {
        Self {
            checked: !self.checked,
            check_time: at,
            ..self.clone()
        }
    }

    /// Returns a copy with the editable fields replaced.
    ///
    /// Subject and content are stored trimmed. Uid, checked flag, and both
    /// timestamps are carried over untouched.
    #[must_use]
    pub fn with_edit(&self, group: GroupUid, subject: &str, content: &str) -> Self {
        Self {
            group,
            subject: subject.trim().to_owned(),
            content: content.trim().to_owned(),
            ..self.clone()
        }
    }
}

/// A named, icon-tagged group of todos
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub uid: GroupUid,
    /// Short display glyph, typically a single emoji
    pub icon: String,
    /// Display name; may be empty while the user is still typing it
    pub name: String,
}

impl Group {
    /// Creates a new group
    #[must_use]
    pub const fn new(uid: GroupUid, icon: String, name: String) -> Self {
        Self { uid, icon, name }
    }

    /// Returns a copy with a different icon
    #[must_use]
    pub fn with_icon(&self, icon: &str) -> Self {
        Self {
            icon: icon.to_owned(),
            ..self.clone()
        }
    }

    /// Returns a copy with a different name
    #[must_use]
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..self.clone()
        }
    }
}

/// User input for a todo that has not been stored yet.
///
/// The store assigns the uid and stamps the timestamps with its clock unless
/// they were pre-populated (import paths).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    /// The group the new todo belongs to
    pub group: GroupUid,
    /// First line / title, stored trimmed
    pub subject: String,
    /// Remaining body, stored trimmed
    pub content: String,
    /// Pre-populated creation time, if any
    pub create_time: Option<DateTime<Utc>>,
    /// Pre-populated check time, if any
    pub check_time: Option<DateTime<Utc>>,
}

impl TodoDraft {
    /// Creates a draft with trimmed text fields and no pre-populated timestamps
    #[must_use]
    pub fn new(group: GroupUid, subject: &str, content: &str) -> Self {
        Self {
            group,
            subject: subject.trim().to_owned(),
            content: content.trim().to_owned(),
            create_time: None,
            check_time: None,
        }
    }

    /// Pre-populates both timestamps (import paths)
    #[must_use]
    pub const fn with_timestamps(
        mut self,
        create_time: DateTime<Utc>,
        check_time: DateTime<Utc>,
    ) -> Self {
        self.create_time = Some(create_time);
        self.check_time = Some(check_time);
        self
    }

    /// Converts the draft into a stored record.
    ///
    /// Timestamps the draft did not pre-populate default to `now`.
    #[must_use]
    pub fn into_todo(self, uid: TodoUid, now: DateTime<Utc>) -> Todo {
        Todo {
            uid,
            group: self.group,
            subject: self.subject,
            content: self.content,
            checked: false,
            create_time: self.create_time.unwrap_or(now),
            check_time: self.check_time.unwrap_or(now),
        }
    }
}

/// User input for a group that has not been stored yet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    /// Short display glyph
    pub icon: String,
    /// Display name; empty is allowed (the groups editor creates groups
    /// before the user has typed a name)
    pub name: String,
}

impl GroupDraft {
    /// Creates a group draft
    #[must_use]
    pub fn new(icon: &str, name: &str) -> Self {
        Self {
            icon: icon.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Converts the draft into a stored record
    #[must_use]
    pub fn into_group(self, uid: GroupUid) -> Group {
        Group {
            uid,
            icon: self.icon,
            name: self.name,
        }
    }
}

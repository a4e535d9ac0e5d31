//! Repository and commit data delivered by the hosting system.
//!
//! These are plain values as the event bus hands them over. Templates never
//! see them directly; they are wrapped in the encoded views from
//! [`crate::template`] first.

use serde::{Deserialize, Serialize};

/// A repository that received a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Stable repository id (also the key of its hook store document).
    pub id: String,
    /// Namespace the repository lives in.
    #[serde(default)]
    pub namespace: String,
    /// Repository name.
    pub name: String,
    /// Repository type, e.g. `git` or `hg`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Contact address of the repository owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
    /// Last modification time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl Repository {
    /// Creates a repository with the required identity fields only.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            name: name.into(),
            kind: kind.into(),
            contact: None,
            description: None,
            creation_date: None,
            last_modified: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the contact address.
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Returns `namespace/name`, the form used in log lines.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Author or committer of a changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// E-mail address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
}

impl Person {
    /// Creates a person with name and mail.
    #[must_use]
    pub fn new(name: impl Into<String>, mail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mail: Some(mail.into()),
        }
    }
}

/// A single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    /// Commit id (hash or revision).
    pub id: String,
    /// Commit time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub date: i64,
    /// Author of the commit.
    pub author: Person,
    /// Commit message.
    #[serde(default)]
    pub description: String,
    /// Branches containing the commit.
    #[serde(default)]
    pub branches: Vec<String>,
    /// Parent commit ids.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Tags pointing at the commit.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Changeset {
    /// Creates a changeset without branches, parents or tags.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        date: i64,
        author: Person,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            author,
            description: description.into(),
            branches: Vec::new(),
            parents: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Sets the branch list.
    #[must_use]
    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the parent list.
    #[must_use]
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }
}

/// Wrapper used as the batch-mode payload: all commits of one push.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Changesets<'a> {
    /// The pushed commits, in the order the event delivered them.
    pub changesets: &'a [Changeset],
}

/// "Commits pushed" notification as delivered by the event bus.
///
/// Both fields are optional on the wire: the host may deliver an event for
/// which the repository could not be resolved, or a repository type without
/// changeset support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// The repository that received the push.
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Pushed commits, newest first.
    #[serde(default)]
    pub changesets: Option<Vec<Changeset>>,
}

impl PushEvent {
    /// Creates an event for the given repository and commits.
    #[must_use]
    pub const fn new(repository: Repository, changesets: Vec<Changeset>) -> Self {
        Self {
            repository: Some(repository),
            changesets: Some(changesets),
        }
    }
}

//! Read-only, URL-encoding views over repository and commit data.
//!
//! These are the only objects a URL template can reach. Free-text fields
//! (names, descriptions, mail addresses, branch and tag names) are passed
//! through [`encode`] so the rendered URL stays well formed; identifiers
//! and timestamps are exposed as they are.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::repository::{Changeset, Person, Repository};

use super::encoder::{encode, encode_all};

/// Encoded view of a [`Changeset`].
#[derive(Debug, Clone, Copy)]
pub struct EncodedChangeset<'a>(&'a Changeset);

impl<'a> EncodedChangeset<'a> {
    /// Wraps a changeset.
    #[must_use]
    pub const fn new(changeset: &'a Changeset) -> Self {
        Self(changeset)
    }

    /// Commit id, unencoded.
    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.0.id
    }

    /// Commit time in epoch milliseconds.
    #[must_use]
    pub const fn date(&self) -> i64 {
        self.0.date
    }

    /// Encoded commit message.
    #[must_use]
    pub fn description(&self) -> String {
        encode(&self.0.description)
    }

    /// Encoded author.
    #[must_use]
    pub const fn author(&self) -> EncodedPerson<'a> {
        EncodedPerson(&self.0.author)
    }

    /// Encoded branch names.
    #[must_use]
    pub fn branches(&self) -> EncodedStringList {
        EncodedStringList::new(&self.0.branches)
    }

    /// Encoded parent ids.
    #[must_use]
    pub fn parents(&self) -> EncodedStringList {
        EncodedStringList::new(&self.0.parents)
    }

    /// Encoded tag names.
    #[must_use]
    pub fn tags(&self) -> EncodedStringList {
        EncodedStringList::new(&self.0.tags)
    }
}

impl Serialize for EncodedChangeset<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EncodedChangeset", 7)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("date", &self.date())?;
        state.serialize_field("author", &self.author())?;
        state.serialize_field("description", &self.description())?;
        state.serialize_field("branches", &self.branches())?;
        state.serialize_field("parents", &self.parents())?;
        state.serialize_field("tags", &self.tags())?;
        state.end()
    }
}

/// Encoded view of a [`Person`].
#[derive(Debug, Clone, Copy)]
pub struct EncodedPerson<'a>(&'a Person);

impl<'a> EncodedPerson<'a> {
    /// Wraps a person.
    #[must_use]
    pub const fn new(person: &'a Person) -> Self {
        Self(person)
    }

    /// Encoded name.
    #[must_use]
    pub fn name(&self) -> String {
        encode(&self.0.name)
    }

    /// Encoded mail address, if any.
    #[must_use]
    pub fn mail(&self) -> Option<String> {
        self.0.mail.as_deref().map(encode)
    }
}

impl Serialize for EncodedPerson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EncodedPerson", 2)?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("mail", &self.mail())?;
        state.end()
    }
}

/// Encoded view of a [`Repository`].
#[derive(Debug, Clone, Copy)]
pub struct EncodedRepository<'a>(&'a Repository);

impl<'a> EncodedRepository<'a> {
    /// Wraps a repository.
    #[must_use]
    pub const fn new(repository: &'a Repository) -> Self {
        Self(repository)
    }

    /// Repository id, unencoded.
    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.0.id
    }

    /// Encoded namespace.
    #[must_use]
    pub fn namespace(&self) -> String {
        encode(&self.0.namespace)
    }

    /// Encoded name.
    #[must_use]
    pub fn name(&self) -> String {
        encode(&self.0.name)
    }

    /// Repository type, unencoded.
    #[must_use]
    pub fn kind(&self) -> &'a str {
        &self.0.kind
    }

    /// Encoded contact address, if any.
    #[must_use]
    pub fn contact(&self) -> Option<String> {
        self.0.contact.as_deref().map(encode)
    }

    /// Encoded description, if any.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.0.description.as_deref().map(encode)
    }
}

impl Serialize for EncodedRepository<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EncodedRepository", 8)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("namespace", &self.namespace())?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("type", self.kind())?;
        state.serialize_field("contact", &self.contact())?;
        state.serialize_field("description", &self.description())?;
        state.serialize_field("creationDate", &self.0.creation_date)?;
        state.serialize_field("lastModified", &self.0.last_modified)?;
        state.end()
    }
}

/// Encoded list of strings (branches, parents, tags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStringList(Vec<String>);

impl EncodedStringList {
    /// Encodes every element of `values`.
    #[must_use]
    pub fn new(values: &[String]) -> Self {
        Self(encode_all(values))
    }

    /// Returns the encoded values.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for EncodedStringList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn changeset() -> Changeset {
        Changeset::new(
            "abc123",
            1_700_000_000_000,
            Person::new("Tricia McMillan", "trillian@hitchhiker.com"),
            "fix: handle spaces & slashes/",
        )
        .with_branches(["main", "feature/x"])
        .with_parents(["def456"])
    }

    #[test]
    fn changeset_encodes_free_text_only() {
        let cs = changeset();
        let value = serde_json::to_value(EncodedChangeset::new(&cs)).unwrap();

        assert_eq!(value["id"], "abc123");
        assert_eq!(value["date"], 1_700_000_000_000_i64);
        assert_eq!(value["description"], "fix%3A+handle+spaces+%26+slashes%2F");
        assert_eq!(value["author"]["name"], "Tricia+McMillan");
        assert_eq!(value["author"]["mail"], "trillian%40hitchhiker.com");
        assert_eq!(value["branches"], json!(["main", "feature%2Fx"]));
        assert_eq!(value["parents"], json!(["def456"]));
        assert_eq!(value["tags"], json!([]));
    }

    #[test]
    fn accessors_match_serialized_fields() {
        let cs = changeset();
        let view = EncodedChangeset::new(&cs);

        assert_eq!(view.id(), "abc123");
        assert_eq!(view.author().name(), "Tricia+McMillan");
        assert_eq!(view.branches().as_slice(), ["main", "feature%2Fx"]);
        assert_eq!(view.branches().len(), 2);
        assert!(view.tags().is_empty());
    }

    #[test]
    fn repository_keeps_id_and_type_raw() {
        let repo = Repository::new("42", "hitchhiker", "heart of gold", "git")
            .with_description("Improbability drive")
            .with_contact("zaphod@hitchhiker.com");
        let value = serde_json::to_value(EncodedRepository::new(&repo)).unwrap();

        assert_eq!(value["id"], "42");
        assert_eq!(value["type"], "git");
        assert_eq!(value["name"], "heart+of+gold");
        assert_eq!(value["namespace"], "hitchhiker");
        assert_eq!(value["description"], "Improbability+drive");
        assert_eq!(value["contact"], "zaphod%40hitchhiker.com");
    }

    #[test]
    fn missing_optional_fields_serialize_as_null() {
        let repo = Repository::new("1", "ns", "repo", "git");
        let value = serde_json::to_value(EncodedRepository::new(&repo)).unwrap();

        assert!(value["description"].is_null());
        assert!(value["creationDate"].is_null());
    }

    #[test]
    fn person_without_mail() {
        let person = Person {
            name: "Arthur Dent".to_string(),
            mail: None,
        };
        let view = EncodedPerson::new(&person);

        assert_eq!(view.name(), "Arthur+Dent");
        assert_eq!(view.mail(), None);
    }
}

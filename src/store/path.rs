//! Collection and document paths.
//!
//! Paths alternate collection and document segments, starting with a
//! collection: `users` is a collection, `users/1` a document,
//! `users/1/orders` a sub-collection of that document.

use super::{StoreError, StoreResult};

fn validate_segment(segment: &str) -> StoreResult<()> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(StoreError::InvalidPath(segment.to_string()));
    }
    Ok(())
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Handle on a collection, root-level or nested under a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    /// A root-level collection.
    pub fn root(name: &str) -> StoreResult<Self> {
        validate_segment(name)?;
        Ok(Self {
            path: name.to_string(),
        })
    }

    /// Parses a full collection path such as `users/1/orders`.
    pub fn parse(path: &str) -> StoreResult<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self {
            path: path.to_string(),
        })
    }

    /// The collection's own name (last path segment).
    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The document this collection hangs off, if it is a sub-collection.
    pub fn parent(&self) -> Option<DocumentRef> {
        let (parent, _) = self.path.rsplit_once('/')?;
        Some(DocumentRef {
            path: parent.to_string(),
        })
    }

    pub fn doc(&self, id: &str) -> StoreResult<DocumentRef> {
        validate_segment(id)?;
        Ok(DocumentRef {
            path: format!("{}/{}", self.path, id),
        })
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Handle on a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    /// Parses a full document path such as `users/1`.
    pub fn parse(path: &str) -> StoreResult<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self {
            path: path.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionRef {
        let parent = self
            .path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or_default();
        CollectionRef {
            path: parent.to_string(),
        }
    }

    pub fn collection(&self, name: &str) -> StoreResult<CollectionRef> {
        validate_segment(name)?;
        Ok(CollectionRef {
            path: format!("{}/{}", self.path, name),
        })
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

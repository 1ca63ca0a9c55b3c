//! The ordered collection of directories produced for one buffer.

use crate::directory::Directory;
use crate::tags::DirectoryKind;

/// All tag directories extracted from one byte buffer.
///
/// Directories appear in discovery order, parents before children, and the
/// aggregate is their sole owner. The same kind may legitimately appear more
/// than once (e.g. several thumbnail IFDs), so nothing is deduplicated.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    directories: Vec<Directory>,
}

impl Metadata {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory, preserving discovery order.
    pub fn push(&mut self, directory: Directory) {
        self.directories.push(directory);
    }

    /// All directories, in discovery order.
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Directories of one kind, in discovery order. Empty if none.
    pub fn directories_of_kind(
        &self,
        kind: DirectoryKind,
    ) -> impl Iterator<Item = &Directory> {
        self.directories.iter().filter(move |d| d.kind() == kind)
    }

    /// The first directory of a kind, if any.
    pub fn first_of_kind(&self, kind: DirectoryKind) -> Option<&Directory> {
        self.directories_of_kind(kind).next()
    }

    /// Number of directories.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Returns `true` if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Returns `true` if any directory recorded an error.
    pub fn has_errors(&self) -> bool {
        self.directories.iter().any(Directory::has_errors)
    }
}

impl AsRef<[Directory]> for Metadata {
    fn as_ref(&self) -> &[Directory] {
        &self.directories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_views_and_ordering() {
        let mut metadata = Metadata::new();
        metadata.push(Directory::new(DirectoryKind::Ifd0, None));
        metadata.push(Directory::new(DirectoryKind::ExifSubIfd, Some(0)));
        metadata.push(Directory::new(DirectoryKind::Thumbnail, None));
        metadata.push(Directory::new(DirectoryKind::Thumbnail, None));

        assert_eq!(metadata.len(), 4);
        assert_eq!(
            metadata.directories_of_kind(DirectoryKind::Thumbnail).count(),
            2
        );
        assert!(metadata.first_of_kind(DirectoryKind::Gps).is_none());
        assert_eq!(
            metadata.first_of_kind(DirectoryKind::ExifSubIfd).unwrap().parent(),
            Some(0)
        );
        assert!(!metadata.has_errors());
    }
}

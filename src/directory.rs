//! A decoded tag directory: one IFD's tags, values, and recorded errors.

use std::fmt;

use crate::error::{IfdexError, IfdexResult};
use crate::tags::DirectoryKind;
use crate::value::{Rational, Value};

/// A non-fatal problem recorded while decoding a directory.
///
/// `tag` is `Some` for per-entry decode errors and `None` for
/// directory-level structural errors (malformed or cyclic IFD headers).
#[derive(Debug, Clone, PartialEq)]
pub struct TagError {
    /// The tag the error is attributed to, if any.
    pub tag: Option<u16>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "tag 0x{tag:04x}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The decoded contents of one IFD.
///
/// A directory is an ordered tag→value store: iteration follows first
/// insertion order, and re-encountering a tag code overwrites the stored
/// value in place (last-write-wins, matching single-pass IFD scan order).
/// Decode errors accumulate alongside the entries and never invalidate them.
#[derive(Debug, Clone)]
pub struct Directory {
    kind: DirectoryKind,
    entries: Vec<(u16, Value)>,
    errors: Vec<TagError>,
    parent: Option<usize>,
}

impl Directory {
    /// Create an empty directory of the given kind.
    ///
    /// `parent` is the aggregate index of the directory whose pointer tag
    /// led here; directories do not own their parent.
    pub fn new(kind: DirectoryKind, parent: Option<usize>) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            errors: Vec::new(),
            parent,
        }
    }

    /// The directory kind.
    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    /// Human-readable directory name, e.g. `"Exif SubIFD"`.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Aggregate index of the parent directory, if this is a sub-IFD.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Display name of a tag code within this directory's kind.
    pub fn tag_name(&self, tag: u16) -> Option<&'static str> {
        self.kind.tag_name(tag)
    }

    /// Number of stored tags.
    pub fn tag_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tags were stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(tag, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Value)> {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }

    /// Insert or overwrite a value. Overwriting keeps the tag's original
    /// position in iteration order.
    pub fn set_value(&mut self, tag: u16, value: Value) {
        match self.entries.iter_mut().find(|(code, _)| *code == tag) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// Look up a tag's decoded value. Absence is a normal outcome, not an
    /// error.
    pub fn get(&self, tag: u16) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(code, _)| *code == tag)
            .map(|(_, value)| value)
    }

    /// Returns `true` if the tag is present.
    pub fn contains(&self, tag: u16) -> bool {
        self.get(tag).is_some()
    }

    /// Record a non-fatal decode error. The directory remains usable.
    pub fn add_error(&mut self, tag: Option<u16>, message: impl Into<String>) {
        self.errors.push(TagError {
            tag,
            message: message.into(),
        });
    }

    /// Returns `true` if any errors were recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The recorded errors, in the order they occurred.
    pub fn errors(&self) -> &[TagError] {
        &self.errors
    }

    fn coerced<T>(&self, tag: u16, get: impl Fn(&Value) -> IfdexResult<T>) -> IfdexResult<Option<T>> {
        match self.get(tag) {
            Some(value) => get(value).map(Some),
            None => Ok(None),
        }
    }

    /// The tag's value as an unsigned integer, per the coercion table on
    /// [`Value`].
    pub fn get_uint(&self, tag: u16) -> IfdexResult<Option<u32>> {
        self.coerced(tag, Value::as_uint)
    }

    /// The tag's value as a signed integer.
    pub fn get_int(&self, tag: u16) -> IfdexResult<Option<i32>> {
        self.coerced(tag, Value::as_int)
    }

    /// The tag's value as a float.
    pub fn get_f64(&self, tag: u16) -> IfdexResult<Option<f64>> {
        self.coerced(tag, Value::as_f64)
    }

    /// The tag's value as a string.
    pub fn get_string(&self, tag: u16) -> IfdexResult<Option<String>> {
        self.coerced(tag, |v| v.as_str().map(str::to_owned))
    }

    /// The tag's value as an unsigned rational.
    pub fn get_rational(&self, tag: u16) -> IfdexResult<Option<Rational>> {
        self.coerced(tag, Value::as_rational)
    }

    /// The tag's value as a vector of unsigned integers.
    pub fn get_uint_vec(&self, tag: u16) -> IfdexResult<Option<Vec<u32>>> {
        self.coerced(tag, Value::as_uint_vec)
    }

    /// The tag's value as raw bytes.
    pub fn get_byte_vec(&self, tag: u16) -> IfdexResult<Option<Vec<u8>>> {
        self.coerced(tag, Value::as_byte_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TAG_ORIENTATION;

    #[test]
    fn last_write_wins_keeps_position() {
        let mut dir = Directory::new(DirectoryKind::Ifd0, None);
        dir.set_value(0x010F, Value::Ascii("Canon".into()));
        dir.set_value(TAG_ORIENTATION, Value::Short(1));
        dir.set_value(0x010F, Value::Ascii("Nikon".into()));

        assert_eq!(dir.tag_count(), 2);
        assert_eq!(dir.get_string(0x010F).unwrap().unwrap(), "Nikon");
        let order: Vec<u16> = dir.iter().map(|(tag, _)| tag).collect();
        assert_eq!(order, vec![0x010F, TAG_ORIENTATION]);
    }

    #[test]
    fn absent_is_not_an_error() {
        let dir = Directory::new(DirectoryKind::Gps, None);
        assert!(dir.get(0x0002).is_none());
        assert_eq!(dir.get_uint(0x0002).unwrap(), None);
        assert_eq!(dir.get_string(0x0002).unwrap(), None);
    }

    #[test]
    fn typed_getter_mismatch() {
        let mut dir = Directory::new(DirectoryKind::Ifd0, None);
        dir.set_value(0x010F, Value::Ascii("Canon".into()));
        assert!(matches!(
            dir.get_uint(0x010F),
            Err(IfdexError::TypeMismatch { .. })
        ));
        // Numeric strings still coerce.
        dir.set_value(0x0131, Value::Ascii("42".into()));
        assert_eq!(dir.get_uint(0x0131).unwrap(), Some(42));
    }

    #[test]
    fn errors_are_advisory() {
        let mut dir = Directory::new(DirectoryKind::ExifSubIfd, Some(0));
        dir.set_value(0x829A, Value::Rational(Rational { num: 1, denom: 60 }));
        dir.add_error(Some(0x9286), "truncated value");
        dir.add_error(None, "trailing garbage after entries");

        assert!(dir.has_errors());
        assert_eq!(dir.errors().len(), 2);
        assert_eq!(dir.errors()[0].tag, Some(0x9286));
        assert_eq!(dir.errors()[1].tag, None);
        assert_eq!(dir.get_rational(0x829A).unwrap().unwrap().denom, 60);
        assert_eq!(dir.parent(), Some(0));
        assert_eq!(
            dir.errors()[0].to_string(),
            "tag 0x9286: truncated value"
        );
    }
}

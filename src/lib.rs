#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod directory;
pub mod error;
mod ifd;
mod metadata;
pub mod reader;
pub mod tags;
pub mod value;

pub use directory::{Directory, TagError};
pub use error::{IfdexError, IfdexResult};
pub use ifd::{extract, extract_ifd};
pub use metadata::Metadata;
pub use reader::{ByteOrder, ByteReader};
pub use tags::DirectoryKind;
pub use value::{Rational, SRational, Type, Value};

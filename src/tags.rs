//! Directory kinds, tag-code constants, and the static tag-name tables.
//!
//! Names are display-only; the walker never needs a name to decode a value.

/// Pointer from IFD0/IFD1 to the Exif sub-IFD.
pub const TAG_EXIF_SUB_IFD: u16 = 0x8769;
/// Pointer from IFD0/IFD1 to the GPS IFD.
pub const TAG_GPS_IFD: u16 = 0x8825;
/// Pointer from the Exif sub-IFD to the Interoperability IFD.
pub const TAG_INTEROP_IFD: u16 = 0xA005;

/// Image orientation, in IFD0.
pub const TAG_ORIENTATION: u16 = 0x0112;

/// The kind of tag directory a single IFD decodes into.
///
/// One generic [`Directory`](crate::Directory) type is parameterized by this
/// kind; each kind contributes only a display name and a tag-name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    /// The primary image IFD (IFD0).
    Ifd0,
    /// A thumbnail IFD chained after IFD0 (IFD1 and onwards).
    Thumbnail,
    /// The Exif sub-IFD holding camera capture tags.
    ExifSubIfd,
    /// The GPS IFD.
    Gps,
    /// The Interoperability IFD.
    Interop,
}

impl DirectoryKind {
    /// Human-readable directory name, matching the conventional EXIF
    /// directory naming.
    pub fn name(self) -> &'static str {
        match self {
            DirectoryKind::Ifd0 => "Exif IFD0",
            DirectoryKind::Thumbnail => "Exif Thumbnail",
            DirectoryKind::ExifSubIfd => "Exif SubIFD",
            DirectoryKind::Gps => "GPS",
            DirectoryKind::Interop => "Interoperability",
        }
    }

    /// The child directory designated by a sub-IFD pointer tag in this kind,
    /// if `tag` is registered as a pointer here.
    ///
    /// Pointer tags are resolved and recursed into rather than stored.
    pub fn sub_ifd_target(self, tag: u16) -> Option<DirectoryKind> {
        match (self, tag) {
            (DirectoryKind::Ifd0 | DirectoryKind::Thumbnail, TAG_EXIF_SUB_IFD) => {
                Some(DirectoryKind::ExifSubIfd)
            }
            (DirectoryKind::Ifd0 | DirectoryKind::Thumbnail, TAG_GPS_IFD) => {
                Some(DirectoryKind::Gps)
            }
            (DirectoryKind::ExifSubIfd, TAG_INTEROP_IFD) => Some(DirectoryKind::Interop),
            _ => None,
        }
    }

    /// Returns `true` if this kind follows the trailing next-IFD offset.
    ///
    /// Only the top-level chain does; IFD0 chains to the thumbnail IFD, and
    /// thumbnails chain to further thumbnails. Sub-IFDs ignore theirs.
    pub fn next_ifd_kind(self) -> Option<DirectoryKind> {
        match self {
            DirectoryKind::Ifd0 | DirectoryKind::Thumbnail => Some(DirectoryKind::Thumbnail),
            _ => None,
        }
    }

    /// Look up the display name of a tag code within this directory kind.
    pub fn tag_name(self, tag: u16) -> Option<&'static str> {
        match self {
            DirectoryKind::Ifd0 | DirectoryKind::Thumbnail => ifd0_tag_name(tag),
            DirectoryKind::ExifSubIfd => exif_tag_name(tag),
            DirectoryKind::Gps => gps_tag_name(tag),
            DirectoryKind::Interop => interop_tag_name(tag),
        }
    }
}

fn ifd0_tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x0100 => "Image Width",
        0x0101 => "Image Height",
        0x0102 => "Bits Per Sample",
        0x0103 => "Compression",
        0x0106 => "Photometric Interpretation",
        0x010E => "Image Description",
        0x010F => "Make",
        0x0110 => "Model",
        0x0111 => "Strip Offsets",
        TAG_ORIENTATION => "Orientation",
        0x0115 => "Samples Per Pixel",
        0x0116 => "Rows Per Strip",
        0x0117 => "Strip Byte Counts",
        0x011A => "X Resolution",
        0x011B => "Y Resolution",
        0x0128 => "Resolution Unit",
        0x0131 => "Software",
        0x0132 => "Date/Time",
        0x013B => "Artist",
        0x0201 => "Thumbnail Offset",
        0x0202 => "Thumbnail Length",
        0x0213 => "YCbCr Positioning",
        0x8298 => "Copyright",
        _ => return None,
    })
}

fn exif_tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x829A => "Exposure Time",
        0x829D => "F-Number",
        0x8822 => "Exposure Program",
        0x8827 => "ISO Speed Ratings",
        0x9000 => "Exif Version",
        0x9003 => "Date/Time Original",
        0x9004 => "Date/Time Digitized",
        0x9201 => "Shutter Speed Value",
        0x9202 => "Aperture Value",
        0x9204 => "Exposure Bias Value",
        0x9207 => "Metering Mode",
        0x9209 => "Flash",
        0x920A => "Focal Length",
        0x927C => "Makernote",
        0x9286 => "User Comment",
        0xA000 => "FlashPix Version",
        0xA001 => "Color Space",
        0xA002 => "Exif Image Width",
        0xA003 => "Exif Image Height",
        0xA402 => "Exposure Mode",
        0xA403 => "White Balance",
        0xA405 => "Focal Length 35",
        0xA406 => "Scene Capture Type",
        0xA434 => "Lens Model",
        _ => return None,
    })
}

fn gps_tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x0000 => "GPS Version ID",
        0x0001 => "GPS Latitude Ref",
        0x0002 => "GPS Latitude",
        0x0003 => "GPS Longitude Ref",
        0x0004 => "GPS Longitude",
        0x0005 => "GPS Altitude Ref",
        0x0006 => "GPS Altitude",
        0x0007 => "GPS Time-Stamp",
        0x0012 => "GPS Map Datum",
        0x001D => "GPS Date Stamp",
        _ => return None,
    })
}

fn interop_tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x0001 => "Interoperability Index",
        0x0002 => "Interoperability Version",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_registry() {
        assert_eq!(
            DirectoryKind::Ifd0.sub_ifd_target(TAG_EXIF_SUB_IFD),
            Some(DirectoryKind::ExifSubIfd)
        );
        assert_eq!(
            DirectoryKind::Ifd0.sub_ifd_target(TAG_GPS_IFD),
            Some(DirectoryKind::Gps)
        );
        assert_eq!(
            DirectoryKind::ExifSubIfd.sub_ifd_target(TAG_INTEROP_IFD),
            Some(DirectoryKind::Interop)
        );
        // GPS never nests further and IFD0 does not point at Interop.
        assert_eq!(DirectoryKind::Gps.sub_ifd_target(TAG_EXIF_SUB_IFD), None);
        assert_eq!(DirectoryKind::Ifd0.sub_ifd_target(TAG_INTEROP_IFD), None);
    }

    #[test]
    fn next_ifd_chaining_is_top_level_only() {
        assert_eq!(
            DirectoryKind::Ifd0.next_ifd_kind(),
            Some(DirectoryKind::Thumbnail)
        );
        assert_eq!(
            DirectoryKind::Thumbnail.next_ifd_kind(),
            Some(DirectoryKind::Thumbnail)
        );
        assert_eq!(DirectoryKind::ExifSubIfd.next_ifd_kind(), None);
        assert_eq!(DirectoryKind::Gps.next_ifd_kind(), None);
    }

    #[test]
    fn tag_names() {
        assert_eq!(
            DirectoryKind::Ifd0.tag_name(TAG_ORIENTATION),
            Some("Orientation")
        );
        assert_eq!(
            DirectoryKind::ExifSubIfd.tag_name(0x829A),
            Some("Exposure Time")
        );
        assert_eq!(DirectoryKind::Gps.tag_name(0x0002), Some("GPS Latitude"));
        assert_eq!(DirectoryKind::Ifd0.tag_name(0xFFFF), None);
        assert_eq!(DirectoryKind::Gps.name(), "GPS");
    }
}

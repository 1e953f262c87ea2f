//! Camera metadata embedded in image files, exposed as a tag-name lookup.

use std::collections::HashMap;

use crate::entity::{Entity, FileEntity, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraInfo {
    tags: HashMap<String, String>,
}

impl CameraInfo {
    /// Reads the embedded tags of `file`. A file without readable metadata
    /// gives an empty set of tags, not an error.
    pub fn open(file: &FileEntity) -> Result<Self> {
        Ok(Self {
            tags: reader::read_tags(file.path())?,
        })
    }

    pub fn from_tags(tags: HashMap<String, String>) -> Self {
        Self { tags }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn make(&self) -> Option<&str> {
        self.get("Make")
    }

    pub fn model(&self) -> Option<&str> {
        self.get("Model")
    }

    pub fn orientation(&self) -> Option<&str> {
        self.get("Orientation")
    }

    pub fn x_resolution(&self) -> Option<&str> {
        self.get("XResolution")
    }

    pub fn y_resolution(&self) -> Option<&str> {
        self.get("YResolution")
    }

    pub fn resolution_unit(&self) -> Option<&str> {
        self.get("ResolutionUnit")
    }

    pub fn software(&self) -> Option<&str> {
        self.get("Software")
    }

    pub fn exposure_time(&self) -> Option<&str> {
        self.get("ExposureTime")
    }

    pub fn f_number(&self) -> Option<&str> {
        self.get("FNumber")
    }

    pub fn iso_speed(&self) -> Option<&str> {
        self.get("ISOSpeedRatings")
            .or_else(|| self.get("PhotographicSensitivity"))
    }

    pub fn shutter_speed(&self) -> Option<&str> {
        self.get("ShutterSpeedValue")
    }

    pub fn aperture(&self) -> Option<&str> {
        self.get("ApertureValue")
    }

    pub fn brightness(&self) -> Option<&str> {
        self.get("BrightnessValue")
    }

    pub fn exposure_bias(&self) -> Option<&str> {
        self.get("ExposureBiasValue")
    }

    pub fn max_aperture(&self) -> Option<&str> {
        self.get("MaxApertureValue")
    }

    pub fn metering_mode(&self) -> Option<&str> {
        self.get("MeteringMode")
    }

    pub fn flash(&self) -> Option<&str> {
        self.get("Flash")
    }

    pub fn created_at(&self) -> Option<&str> {
        self.get("DateTime")
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.get("MimeType")
    }
}

#[cfg(feature = "exif")]
mod reader {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use log::debug;

    use crate::entity::Result;

    pub(super) fn read_tags(path: &Path) -> Result<HashMap<String, String>> {
        let mut tags = HashMap::new();
        if !path.is_file() {
            return Ok(tags);
        }

        let mut reader = BufReader::new(File::open(path)?);
        match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => {
                // The primary image comes first; thumbnail tags do not replace it.
                for field in exif.fields() {
                    tags.entry(field.tag.to_string())
                        .or_insert_with(|| tag_value(field));
                }
            }
            Err(e) => {
                debug!("No readable metadata in {}: {}", path.display(), e);
                return Ok(tags);
            }
        }

        if let Ok(reader) = image::ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
            if let Some(format) = reader.format() {
                tags.insert("MimeType".to_string(), format.to_mime_type().to_string());
            }
        }

        Ok(tags)
    }

    /// Text values are stored as written, without the quotes `display_value` adds.
    fn tag_value(field: &exif::Field) -> String {
        match field.value {
            exif::Value::Ascii(ref parts) => parts
                .iter()
                .map(|part| String::from_utf8_lossy(part).trim_end().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            _ => field.display_value().to_string(),
        }
    }
}

#[cfg(not(feature = "exif"))]
mod reader {
    use std::collections::HashMap;
    use std::path::Path;

    use crate::entity::{EntityError, Result};

    pub(super) fn read_tags(_path: &Path) -> Result<HashMap<String, String>> {
        Err(EntityError::MetadataCapabilityUnavailable(
            "built without the `exif` feature".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accessors_read_tags() {
        let mut tags = HashMap::new();
        tags.insert("Make".to_string(), "Canon".to_string());
        tags.insert("ISOSpeedRatings".to_string(), "200".to_string());
        tags.insert("DateTime".to_string(), "2021-03-04 10:11:12".to_string());

        let info = CameraInfo::from_tags(tags);
        assert_eq!(info.make(), Some("Canon"));
        assert_eq!(info.iso_speed(), Some("200"));
        assert_eq!(info.created_at(), Some("2021-03-04 10:11:12"));
        assert_eq!(info.model(), None);
    }

    #[cfg(feature = "exif")]
    #[test]
    fn test_file_without_metadata_gives_empty_tags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.txt");
        std::fs::write(&path, b"no metadata here").unwrap();

        let info = CameraInfo::open(&FileEntity::new(path)).unwrap();
        assert!(info.is_empty());
    }

    /// A JPEG holding only an APP1 segment with `Make` and `Model` in IFD0.
    #[cfg(feature = "exif")]
    fn jpeg_with_camera(make: &[u8], model: &[u8]) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II\x2a\x00");
        tiff.extend_from_slice(&8u32.to_le_bytes());

        let entries = 2u16;
        let data_start = 8 + 2 + 12 * entries as u32 + 4;
        tiff.extend_from_slice(&entries.to_le_bytes());
        let mut data = Vec::new();
        for (tag, value) in [(0x010fu16, make), (0x0110u16, model)] {
            let mut text = value.to_vec();
            text.push(0);
            tiff.extend_from_slice(&tag.to_le_bytes());
            tiff.extend_from_slice(&2u16.to_le_bytes());
            tiff.extend_from_slice(&(text.len() as u32).to_le_bytes());
            tiff.extend_from_slice(&(data_start + data.len() as u32).to_le_bytes());
            data.extend_from_slice(&text);
        }
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&data);

        let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
        jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xff, 0xd9]);
        jpeg
    }

    #[cfg(feature = "exif")]
    #[test]
    fn test_text_tags_are_unquoted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        std::fs::write(&path, jpeg_with_camera(b"Canon", b"EOS 5D  ")).unwrap();

        let info = CameraInfo::open(&FileEntity::new(path)).unwrap();
        assert_eq!(info.make(), Some("Canon"));
        assert_eq!(info.model(), Some("EOS 5D"));
        assert_eq!(info.mime_type(), Some("image/jpeg"));
    }

    #[cfg(not(feature = "exif"))]
    #[test]
    fn test_missing_capability_is_reported() {
        use crate::entity::EntityError;

        let temp = TempDir::new().unwrap();
        let file = FileEntity::new(temp.path().join("photo.jpg"));
        assert!(matches!(
            CameraInfo::open(&file),
            Err(EntityError::MetadataCapabilityUnavailable(_))
        ));
    }
}

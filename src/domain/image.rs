use std::path::Path;

use image::ImageFormat;

/// Image file received from an upload form, fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client supplied file name, used only to derive the extension.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased file extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Format sniffed from the contents, `None` unless the bytes fully decode.
    pub fn decoded_format(&self) -> Option<ImageFormat> {
        let format = image::guess_format(&self.bytes).ok()?;
        image::load_from_memory_with_format(&self.bytes, format).ok()?;
        Some(format)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("encode image");
        bytes
    }

    #[test]
    fn extension_is_lowercased() {
        let image = ImageUpload::new("Photo.JPG", vec![1]);
        assert_eq!(image.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn extension_missing_for_bare_names() {
        let image = ImageUpload::new("photo", vec![1]);
        assert!(image.extension().is_none());
    }

    #[test]
    fn decoded_format_reads_contents_not_name() {
        let image = ImageUpload::new("photo.jpg", encoded(ImageFormat::Png));
        assert_eq!(image.decoded_format(), Some(ImageFormat::Png));
    }

    #[test]
    fn decoded_format_rejects_junk_and_truncated_files() {
        let junk = ImageUpload::new("photo.png", vec![1, 2, 3]);
        assert!(junk.decoded_format().is_none());

        let mut bytes = encoded(ImageFormat::Png);
        bytes.truncate(16);
        let truncated = ImageUpload::new("photo.png", bytes);
        assert!(truncated.decoded_format().is_none());
    }
}

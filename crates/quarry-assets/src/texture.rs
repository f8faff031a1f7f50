use quarry_core::AssetDescriptor;

use crate::error::AssetError;

/// Pixel format of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
}

/// A loaded texture asset with raw pixel data.
#[derive(Debug, Clone)]
pub struct Texture2D {
    pub descriptor: AssetDescriptor,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: TextureFormat,
}

/// Decode an encoded image (PNG, JPEG, ...) into an RGBA8 texture.
pub fn decode_texture(descriptor: &AssetDescriptor, bytes: &[u8]) -> Result<Texture2D, AssetError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetError::parse(descriptor.identity(), e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Texture2D {
        descriptor: descriptor.clone(),
        width,
        height,
        data: rgba.into_raw(),
        format: TextureFormat::Rgba8,
    })
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encoding");
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::AssetType;

    #[test]
    fn decodes_png_to_rgba() {
        let desc = AssetDescriptor::new(AssetType::Texture2D, "stone.png", 0);
        let tex = decode_texture(&desc, &encode_png(4, 2)).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.format, TextureFormat::Rgba8);
        assert_eq!(tex.data.len(), 4 * 2 * 4);
        assert_eq!(&tex.data[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let desc = AssetDescriptor::new(AssetType::Texture2D, "broken.png", 0);
        match decode_texture(&desc, b"not an image") {
            Err(AssetError::Parse { identity, .. }) => assert_eq!(&identity, desc.identity()),
            other => panic!("expected Parse, got: {:?}", other.map(|t| t.width)),
        }
    }
}

use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageFormat, Luma, LumaA, RgbImage, RgbaImage};

use crate::capture::frame::{PixelFormat, VideoFrame};
use crate::{DepthEncoding, Error, Result};

/// Encode a frame as PNG, honoring its stride and native pixel format
pub fn write_png(frame: &VideoFrame, path: &Path, depth_encoding: DepthEncoding) -> Result<()> {
    frame
        .validate()
        .map_err(|reason| Error::invalid_frame(frame.stream, reason))?;

    let (w, h) = (frame.width, frame.height);
    let mut pixels = frame.packed_data();
    let too_short = || Error::invalid_frame(frame.stream, "buffer shorter than image");

    let saved = match frame.format {
        PixelFormat::Rgb8 => RgbImage::from_raw(w, h, pixels)
            .ok_or_else(too_short)?
            .save_with_format(path, ImageFormat::Png),
        PixelFormat::Bgr8 => {
            pixels.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
            RgbImage::from_raw(w, h, pixels)
                .ok_or_else(too_short)?
                .save_with_format(path, ImageFormat::Png)
        }
        PixelFormat::Rgba8 => RgbaImage::from_raw(w, h, pixels)
            .ok_or_else(too_short)?
            .save_with_format(path, ImageFormat::Png),
        PixelFormat::Bgra8 => {
            pixels.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
            RgbaImage::from_raw(w, h, pixels)
                .ok_or_else(too_short)?
                .save_with_format(path, ImageFormat::Png)
        }
        PixelFormat::Y8 => GrayImage::from_raw(w, h, pixels)
            .ok_or_else(too_short)?
            .save_with_format(path, ImageFormat::Png),
        PixelFormat::Z16 => match depth_encoding {
            // Two bytes per pixel go through untouched, as gray + alpha
            DepthEncoding::RawBytes => ImageBuffer::<LumaA<u8>, Vec<u8>>::from_raw(w, h, pixels)
                .ok_or_else(too_short)?
                .save_with_format(path, ImageFormat::Png),
            DepthEncoding::Gray16 => {
                let values = frame.depth_values().unwrap_or_default();
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w, h, values)
                    .ok_or_else(too_short)?
                    .save_with_format(path, ImageFormat::Png)
            }
        },
    };

    saved.map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })
}

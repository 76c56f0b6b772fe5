// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use coretest_hal::TensorShape;
use image::imageops::FilterType;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

/// Interleaved 8-bit image layout as sent by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDims {
    pub height: usize,
    pub width: usize,
    pub depth: usize,
}

impl ImageDims {
    /// Byte length, or `None` when it does not fit in `usize`
    pub fn len(&self) -> Option<usize> {
        self.height.checked_mul(self.width)?.checked_mul(self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0 || self.depth == 0
    }
}

fn to_dynamic(pixels: Vec<u8>, width: u32, height: u32, depth: usize) -> Option<DynamicImage> {
    match depth {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        _ => None,
    }
}

fn into_pixels(image: DynamicImage, depth: usize) -> Vec<u8> {
    match depth {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        4 => image.into_rgba8().into_raw(),
        _ => image.into_rgb8().into_raw(),
    }
}

/// Bilinear resize of `source` into the input tensor `target`
///
/// Channel count must match; only the spatial size changes.
pub fn resize_into(
    source: &[u8],
    source_dims: ImageDims,
    target: &mut [u8],
    target_shape: TensorShape,
) -> Result<(), String> {
    if source_dims.depth != target_shape.depth {
        return Err(format!(
            "image depth {} does not match input depth {}",
            source_dims.depth, target_shape.depth
        ));
    }
    if source_dims.is_empty() || target_shape.is_empty() {
        return Err("empty image".to_string());
    }
    let source_len = source_dims
        .len()
        .ok_or_else(|| format!("image dimensions {:?} are too large", source_dims))?;
    let target_len = target_shape
        .len()
        .ok_or_else(|| format!("input shape {:?} is too large", target_shape))?;

    let pixels = source.get(..source_len).ok_or_else(|| {
        format!(
            "image resource holds {} bytes, expected {}",
            source.len(),
            source_len
        )
    })?;
    if target.len() != target_len {
        return Err(format!(
            "input tensor holds {} bytes, expected {}",
            target.len(),
            target_len
        ));
    }

    if source_dims.height == target_shape.height && source_dims.width == target_shape.width {
        target.copy_from_slice(pixels);
        return Ok(());
    }

    let dim = |v: usize| u32::try_from(v).map_err(|_| format!("dimension {} too large", v));
    let image = to_dynamic(
        pixels.to_vec(),
        dim(source_dims.width)?,
        dim(source_dims.height)?,
        source_dims.depth,
    )
    .ok_or_else(|| format!("unsupported image depth {}", source_dims.depth))?;

    let resized = image.resize_exact(
        dim(target_shape.width)?,
        dim(target_shape.height)?,
        FilterType::Triangle,
    );
    target.copy_from_slice(&into_pixels(resized, source_dims.depth));
    Ok(())
}

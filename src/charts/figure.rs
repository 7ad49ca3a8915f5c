//! Figure Module
//! Rendered chart handle: RGB pixels plus the labels and data that produced them.

use super::plotter::ChartData;
use super::renderer::RenderError;
use crate::config::CanvasSize;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

/// Title, axis labels and category order of one chart panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Category labels in axis order; empty for continuous axes.
    pub categories: Vec<String>,
}

/// A rendered chart.
#[derive(Debug, Clone)]
pub struct Figure {
    size: CanvasSize,
    pixels: Vec<u8>,
    panels: Vec<Panel>,
    legend: Vec<String>,
    data: ChartData,
}

impl Figure {
    pub(crate) fn new(
        size: CanvasSize,
        pixels: Vec<u8>,
        panels: Vec<Panel>,
        legend: Vec<String>,
        data: ChartData,
    ) -> Self {
        Self {
            size,
            pixels,
            panels,
            legend,
            data,
        }
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Row-major RGB8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Legend entries in display order.
    pub fn legend(&self) -> &[String] {
        &self.legend
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn to_image(&self) -> Result<RgbImage, RenderError> {
        RgbImage::from_raw(self.size.width, self.size.height, self.pixels.clone())
            .ok_or(RenderError::BufferSize)
    }

    /// Encode as PNG in memory.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            &self.pixels,
            self.size.width,
            self.size.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(bytes)
    }

    /// Write the figure as a PNG file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_png_bytes()?)?;
        Ok(())
    }
}

use std::future::Future;

use super::surface::{PaintCommand, Surface};
use crate::entity::Rgba;
use crate::error::ExportError;

/// Largest accepted scale factor; keeps a typo from allocating gigabytes.
pub const MAX_SCALE: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOptions {
    /// Output pixels per logical pixel.
    pub scale: u32,
    /// Fill applied behind the capture wherever the surface is transparent.
    pub background: String,
}

/// An RGBA8 pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    /// Source-over blend of `color` onto the pixel at (x, y); out of bounds is clipped.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let sa = color.a as u32;
        if sa == 0 {
            return;
        }
        let inv = 255 - sa;
        let dst = &mut self.pixels[i..i + 4];
        dst[0] = ((color.r as u32 * sa + dst[0] as u32 * inv) / 255) as u8;
        dst[1] = ((color.g as u32 * sa + dst[1] as u32 * inv) / 255) as u8;
        dst[2] = ((color.b as u32 * sa + dst[2] as u32 * inv) / 255) as u8;
        dst[3] = (sa + dst[3] as u32 * inv / 255) as u8;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba) {
        for py in y..y + height as i64 {
            for px in x..x + width as i64 {
                self.blend(px, py, color);
            }
        }
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }
}

/// Turns a visual surface into pixels. Rendering may take a while, hence async.
pub trait Rasterizer {
    fn rasterize(
        &self,
        surface: &Surface,
        options: &RasterOptions,
    ) -> impl Future<Output = Result<RasterImage, ExportError>> + Send;
}

/// Built-in software rasterizer. Text is drawn as one solid block per glyph;
/// there is no font engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelRasterizer;

impl PixelRasterizer {
    pub fn render(surface: &Surface, options: &RasterOptions) -> Result<RasterImage, ExportError> {
        if options.scale == 0 || options.scale > MAX_SCALE {
            return Err(ExportError::Render(format!(
                "scale must be between 1 and {}, got {}",
                MAX_SCALE, options.scale
            )));
        }
        if surface.width == 0 || surface.height == 0 {
            return Err(ExportError::Render("surface has no area".to_string()));
        }

        let background = parse_color(&options.background)?;
        let s = options.scale as i64;
        let mut image = RasterImage::filled(
            surface.width * options.scale,
            surface.height * options.scale,
            background,
        );

        for command in &surface.commands {
            match command {
                PaintCommand::SolidRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                    opacity,
                } => {
                    let c = parse_color(color)?.with_opacity(*opacity);
                    image.fill_rect(
                        *x as i64 * s,
                        *y as i64 * s,
                        width * options.scale,
                        height * options.scale,
                        c,
                    );
                }
                PaintCommand::Ring {
                    x,
                    y,
                    diameter,
                    stroke,
                    color,
                    opacity,
                } => {
                    let c = parse_color(color)?.with_opacity(*opacity);
                    draw_ring(
                        &mut image,
                        *x as i64 * s,
                        *y as i64 * s,
                        (diameter * options.scale) as i64,
                        (stroke * options.scale) as i64,
                        c,
                    );
                }
                PaintCommand::Text {
                    x,
                    y,
                    size,
                    text,
                    color,
                    opacity,
                } => {
                    let c = parse_color(color)?.with_opacity(*opacity);
                    draw_block_text(
                        &mut image,
                        *x as i64 * s,
                        *y as i64 * s,
                        size * options.scale,
                        text,
                        c,
                    );
                }
            }
        }

        Ok(image)
    }
}

impl Rasterizer for PixelRasterizer {
    async fn rasterize(
        &self,
        surface: &Surface,
        options: &RasterOptions,
    ) -> Result<RasterImage, ExportError> {
        Self::render(surface, options)
    }
}

fn parse_color(value: &str) -> Result<Rgba, ExportError> {
    Rgba::parse_hex(value)
        .ok_or_else(|| ExportError::Render(format!("unsupported colour '{}'", value)))
}

fn draw_ring(image: &mut RasterImage, x: i64, y: i64, diameter: i64, stroke: i64, color: Rgba) {
    // Work in doubled coordinates so the centre lands on pixel centres.
    let r2 = diameter;
    let inner2 = (diameter - stroke * 2).max(0);
    let c2x = x * 2 + diameter;
    let c2y = y * 2 + diameter;
    for py in y..y + diameter {
        for px in x..x + diameter {
            let dx = px * 2 + 1 - c2x;
            let dy = py * 2 + 1 - c2y;
            let d = dx * dx + dy * dy;
            if d <= r2 * r2 && d >= inner2 * inner2 {
                image.blend(px, py, color);
            }
        }
    }
}

fn draw_block_text(image: &mut RasterImage, x: i64, y: i64, size: u32, text: &str, color: Rgba) {
    let advance = (size as f32 * 0.55).round().max(1.0) as i64;
    let glyph_w = (advance * 7 / 10).max(1) as u32;
    let glyph_h = (size * 7 / 10).max(1);
    let top = y + (size as i64 - glyph_h as i64) / 2 + size as i64 / 5;
    for (i, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        image.fill_rect(x + i as i64 * advance, top, glyph_w, glyph_h, color);
    }
}

//! Heap-backed RGB framebuffer used as a chart panel.
//!
//! Implements `DrawTarget<Color = Rgb888>` so charts can be drawn with
//! embedded-graphics primitives, and exports its contents as a binary PPM
//! image.

use super::frame::BACKGROUND_COLOR;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use std::convert::Infallible;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// In-memory drawing surface for one chart panel
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    /// Allocate a canvas filled with the chart background colour
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND_COLOR; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour at `(x, y)`, or None outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x as usize, y as usize)])
    }

    /// Number of pixels with the given colour
    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    /// Writes the canvas as a binary PPM (P6) image
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|p| [p.r(), p.g(), p.b()])
            .collect();
        writer.write_all(&bytes)?;
        writer.flush()
    }

    pub fn save_ppm(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_ppm(BufWriter::new(file))
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb888) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let idx = self.index(x as usize, y as usize);
            self.pixels[idx] = color;
        }
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

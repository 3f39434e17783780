//! Pixel access
//!
//! Get/set of individual pixels for every supported depth. Pixels are
//! packed MSB-first: pixel 0 of a row occupies the highest bits of word 0.

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    /// Get a pixel value at (x, y), or `None` if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height()`, and may panic if `x` indexes past the
    /// row's words.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        get_pixel_from_line(self.row_data(y), x, self.depth())
    }
}

impl PixMut {
    /// Get a pixel value at (x, y), or `None` if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        let wpl = self.wpl() as usize;
        let start = y as usize * wpl;
        get_pixel_from_line(&self.data()[start..start + wpl], x, self.depth())
    }

    /// Set a pixel value at (x, y).
    ///
    /// The value is truncated to the image depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the coordinates are outside
    /// the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width() as usize,
            });
        }
        if y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height() as usize,
            });
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let wpl = self.wpl() as usize;
        let depth = self.depth();
        let start = y as usize * wpl;
        set_pixel_in_line(&mut self.data_mut()[start..start + wpl], x, val, depth);
    }
}

#[inline]
fn get_pixel_from_line(line: &[u32], x: u32, depth: PixelDepth) -> u32 {
    let x = x as usize;
    match depth {
        PixelDepth::Bit1 => (line[x / 32] >> (31 - x % 32)) & 0x1,
        PixelDepth::Bit2 => (line[x / 16] >> (2 * (15 - x % 16))) & 0x3,
        PixelDepth::Bit4 => (line[x / 8] >> (4 * (7 - x % 8))) & 0xF,
        PixelDepth::Bit8 => (line[x / 4] >> (8 * (3 - x % 4))) & 0xFF,
        PixelDepth::Bit16 => (line[x / 2] >> (16 * (1 - x % 2))) & 0xFFFF,
        PixelDepth::Bit32 => line[x],
    }
}

#[inline]
fn set_pixel_in_line(line: &mut [u32], x: u32, val: u32, depth: PixelDepth) {
    let x = x as usize;
    match depth {
        PixelDepth::Bit1 => {
            let shift = 31 - x % 32;
            line[x / 32] = (line[x / 32] & !(0x1 << shift)) | ((val & 0x1) << shift);
        }
        PixelDepth::Bit2 => {
            let shift = 2 * (15 - x % 16);
            line[x / 16] = (line[x / 16] & !(0x3 << shift)) | ((val & 0x3) << shift);
        }
        PixelDepth::Bit4 => {
            let shift = 4 * (7 - x % 8);
            line[x / 8] = (line[x / 8] & !(0xF << shift)) | ((val & 0xF) << shift);
        }
        PixelDepth::Bit8 => {
            let shift = 8 * (3 - x % 4);
            line[x / 4] = (line[x / 4] & !(0xFF << shift)) | ((val & 0xFF) << shift);
        }
        PixelDepth::Bit16 => {
            let shift = 16 * (1 - x % 2);
            line[x / 2] = (line[x / 2] & !(0xFFFF << shift)) | ((val & 0xFFFF) << shift);
        }
        PixelDepth::Bit32 => line[x] = val,
    }
}

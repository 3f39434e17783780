//! Border add/remove
//!
//! Padding and cropping around the image rectangle. The interior transfer
//! is a single rasterop per call.

use super::{Pix, RopOp};
use crate::error::{Error, Result};

impl Pix {
    /// Add a uniform border of `npix` pixels on all sides, filled with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitmorph_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit1).unwrap();
    /// let bordered = pix.add_border(10, 0).unwrap();
    /// assert_eq!(bordered.width(), 120);
    /// assert_eq!(bordered.height(), 100);
    /// ```
    pub fn add_border(&self, npix: u32, val: u32) -> Result<Pix> {
        if npix == 0 {
            return Ok(self.deep_clone());
        }
        self.add_border_general(npix, npix, npix, npix, val)
    }

    /// Add borders of different widths on each side, filled with `val`.
    pub fn add_border_general(
        &self,
        left: u32,
        right: u32,
        top: u32,
        bot: u32,
        val: u32,
    ) -> Result<Pix> {
        let ws = self.width();
        let hs = self.height();
        let wd = ws + left + right;
        let hd = hs + top + bot;

        let pixd = Pix::new(wd, hd, self.depth())?;
        let mut pixd = pixd.try_into_mut().unwrap();

        // A fresh image is zero-filled; only a nonzero fill needs work
        if val != 0 {
            for y in 0..hd {
                for x in 0..wd {
                    pixd.set_pixel_unchecked(x, y, val);
                }
            }
        }

        pixd.rasterop(
            left as i32,
            top as i32,
            ws as i32,
            hs as i32,
            RopOp::Src,
            self,
            0,
            0,
        );
        Ok(pixd.into())
    }

    /// Remove a uniform border of `npix` pixels from all sides.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing would remain.
    pub fn remove_border(&self, npix: u32) -> Result<Pix> {
        if npix == 0 {
            return Ok(self.deep_clone());
        }
        self.remove_border_general(npix, npix, npix, npix)
    }

    /// Remove borders of different widths from each side.
    pub fn remove_border_general(&self, left: u32, right: u32, top: u32, bot: u32) -> Result<Pix> {
        let ws = self.width();
        let hs = self.height();

        if left + right >= ws {
            return Err(Error::InvalidParameter(format!(
                "border left({}) + right({}) >= width({})",
                left, right, ws
            )));
        }
        if top + bot >= hs {
            return Err(Error::InvalidParameter(format!(
                "border top({}) + bot({}) >= height({})",
                top, bot, hs
            )));
        }

        let wd = ws - left - right;
        let hd = hs - top - bot;

        let pixd = Pix::new(wd, hd, self.depth())?;
        let mut pixd = pixd.try_into_mut().unwrap();
        pixd.rasterop(
            0,
            0,
            wd as i32,
            hd as i32,
            RopOp::Src,
            self,
            left as i32,
            top as i32,
        );
        Ok(pixd.into())
    }
}

//! Image comparison and counting

use super::{row_end_mask, Pix};

impl Pix {
    /// Check whether two images hold identical pixel values.
    ///
    /// Images of different geometry compare unequal. Row padding bits are
    /// ignored.
    pub fn equals(&self, other: &Pix) -> bool {
        if !self.sizes_equal(other) {
            return false;
        }
        let wpl = self.wpl() as usize;
        let end_mask = row_end_mask(self.width(), self.depth());

        for y in 0..self.height() {
            let line1 = self.row_data(y);
            let line2 = other.row_data(y);
            for w in 0..wpl - 1 {
                if line1[w] != line2[w] {
                    return false;
                }
            }
            if (line1[wpl - 1] ^ line2[wpl - 1]) & end_mask != 0 {
                return false;
            }
        }
        true
    }

    /// Count the ON pixels of a 1-bpp image.
    ///
    /// For deeper images this counts set bits, which is rarely what you
    /// want; callers doing foreground statistics pass binary images.
    pub fn count_pixels(&self) -> u64 {
        let wpl = self.wpl() as usize;
        let end_mask = row_end_mask(self.width(), self.depth());
        let mut count = 0u64;
        for y in 0..self.height() {
            let line = self.row_data(y);
            for w in 0..wpl - 1 {
                count += u64::from(line[w].count_ones());
            }
            count += u64::from((line[wpl - 1] & end_mask).count_ones());
        }
        count
    }
}

//! Raster operations
//!
//! A rasterop combines a rectangle of a source image with a rectangle of a
//! destination image under a boolean function of the two, at arbitrary
//! sub-word bit alignment. Signed coordinates are accepted and both
//! rectangles are clipped before any bit is touched: nothing outside the
//! destination image is written, and no bit outside the source image takes
//! part in a combine.
//!
//! Three entry points:
//!
//! - [`PixMut::rasterop`]: source and destination are distinct images
//! - [`PixMut::rasterop_ip`]: source and destination rectangles live in the
//!   same image; the scan direction is chosen so overlapping transfers do
//!   not read already-written words
//! - [`PixMut::clear_region`] / [`PixMut::set_region`] /
//!   [`PixMut::invert_region`]: source-free rectangle fills

use super::{Pix, PixMut};
use crate::error::{Error, Result};

/// Boolean raster operation
///
/// The sixteen boolean functions of (SRC, DST). Any composite op can be
/// written as a lattice combination of [`RopOp::Src`] and [`RopOp::Dst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RopOp {
    /// Clear (write 0)
    Clear,
    /// SRC AND DST
    And,
    /// NOT(SRC) AND DST
    AndInvertSrc,
    /// Keep destination (no-op)
    Dst,
    /// SRC AND NOT(DST)
    AndInvertDst,
    /// Copy source
    Src,
    /// SRC XOR DST
    Xor,
    /// SRC OR DST
    Or,
    /// NOT(SRC OR DST)
    Nor,
    /// NOT(SRC XOR DST)
    Xnor,
    /// Invert destination
    InvertDst,
    /// NOT(SRC) OR DST
    OrInvertSrc,
    /// Copy inverted source
    InvertSrc,
    /// SRC OR NOT(DST)
    OrInvertDst,
    /// NOT(SRC AND DST)
    Nand,
    /// Set (write 1)
    Set,
}

impl RopOp {
    /// Check if this operation reads the source image.
    pub fn requires_source(self) -> bool {
        !matches!(
            self,
            RopOp::Clear | RopOp::Dst | RopOp::InvertDst | RopOp::Set
        )
    }

    /// Apply the boolean function to a word of source and destination bits.
    #[inline]
    pub fn combine(self, src: u32, dst: u32) -> u32 {
        match self {
            RopOp::Clear => 0,
            RopOp::And => src & dst,
            RopOp::AndInvertSrc => !src & dst,
            RopOp::Dst => dst,
            RopOp::AndInvertDst => src & !dst,
            RopOp::Src => src,
            RopOp::Xor => src ^ dst,
            RopOp::Or => src | dst,
            RopOp::Nor => !(src | dst),
            RopOp::Xnor => !(src ^ dst),
            RopOp::InvertDst => !dst,
            RopOp::OrInvertSrc => !src | dst,
            RopOp::InvertSrc => !src,
            RopOp::OrInvertDst => src | !dst,
            RopOp::Nand => !(src & dst),
            RopOp::Set => !0,
        }
    }
}

/// Both rectangles after clipping, in pixel coordinates, all in-bounds.
struct ClippedPair {
    dx: usize,
    dy: usize,
    sx: usize,
    sy: usize,
    w: usize,
    h: usize,
}

/// Clip the transfer against both images.
///
/// Trimming one rectangle moves the matching edge of the other, so source
/// and destination stay in one-to-one correspondence.
fn clip_pair(
    (dw_img, dh_img): (u32, u32),
    (sw_img, sh_img): (u32, u32),
    dx: i32,
    dy: i32,
    w: i32,
    h: i32,
    sx: i32,
    sy: i32,
) -> Option<ClippedPair> {
    let (mut dx, mut dy) = (i64::from(dx), i64::from(dy));
    let (mut sx, mut sy) = (i64::from(sx), i64::from(sy));
    let (mut w, mut h) = (i64::from(w), i64::from(h));

    if dx < 0 {
        w += dx;
        sx -= dx;
        dx = 0;
    }
    if dy < 0 {
        h += dy;
        sy -= dy;
        dy = 0;
    }
    if sx < 0 {
        w += sx;
        dx -= sx;
        sx = 0;
    }
    if sy < 0 {
        h += sy;
        dy -= sy;
        sy = 0;
    }
    w = w.min(i64::from(dw_img) - dx).min(i64::from(sw_img) - sx);
    h = h.min(i64::from(dh_img) - dy).min(i64::from(sh_img) - sy);
    if w <= 0 || h <= 0 {
        return None;
    }

    Some(ClippedPair {
        dx: dx as usize,
        dy: dy as usize,
        sx: sx as usize,
        sy: sy as usize,
        w: w as usize,
        h: h as usize,
    })
}

/// Clip a rectangle against one image.
fn clip_rect(
    (iw, ih): (u32, u32),
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) -> Option<(usize, usize, usize, usize)> {
    let (mut x, mut y) = (i64::from(x), i64::from(y));
    let (mut w, mut h) = (i64::from(w), i64::from(h));

    if x < 0 {
        w += x;
        x = 0;
    }
    if y < 0 {
        h += y;
        y = 0;
    }
    w = w.min(i64::from(iw) - x);
    h = h.min(i64::from(ih) - y);
    if w <= 0 || h <= 0 {
        return None;
    }
    Some((x as usize, y as usize, w as usize, h as usize))
}

/// Mask with MSB-first bits [lo, hi) set; requires lo < hi <= 32.
#[inline]
fn bit_mask(lo: usize, hi: usize) -> u32 {
    let head = !0u32 >> lo;
    let tail = if hi == 32 { !0u32 } else { !(!0u32 >> hi) };
    head & tail
}

/// Fetch 32 bits of a row starting at an arbitrary (possibly negative)
/// bit offset. Bits outside the row read as zero; clipping guarantees
/// such bits never land under a write mask.
#[inline]
fn fetch_word(row: &[u32], off: i64) -> u32 {
    let get = |wi: i64| -> u32 {
        if wi >= 0 && (wi as usize) < row.len() {
            row[wi as usize]
        } else {
            0
        }
    };
    let wi = off.div_euclid(32);
    let b = off.rem_euclid(32) as u32;
    if b == 0 {
        get(wi)
    } else {
        (get(wi) << b) | (get(wi + 1) >> (32 - b))
    }
}

/// Combine `nbits` source bits starting at `sbit` into a destination row
/// starting at `dbit`, one destination word at a time.
fn blit_row(dst: &mut [u32], dbit: usize, src: &[u32], sbit: usize, nbits: usize, op: RopOp) {
    let first = dbit / 32;
    let last = (dbit + nbits - 1) / 32;
    for wi in first..=last {
        let ws = wi * 32;
        let lo = dbit.max(ws) - ws;
        let hi = (dbit + nbits).min(ws + 32) - ws;
        let mask = bit_mask(lo, hi);
        let sword = fetch_word(src, sbit as i64 + ws as i64 - dbit as i64);
        let dword = dst[wi];
        dst[wi] = (dword & !mask) | (op.combine(sword, dword) & mask);
    }
}

/// Same-row combine where source and destination words share one buffer.
/// Reads happen before the write of each word.
#[inline]
fn blit_word_ip(
    data: &mut [u32],
    dbase: usize,
    sbase: usize,
    wpl: usize,
    dbit: usize,
    sbit: usize,
    nbits: usize,
    op: RopOp,
    wi: usize,
) {
    let ws = wi * 32;
    let lo = dbit.max(ws) - ws;
    let hi = (dbit + nbits).min(ws + 32) - ws;
    let mask = bit_mask(lo, hi);
    let sword = fetch_word(&data[sbase..sbase + wpl], sbit as i64 + ws as i64 - dbit as i64);
    let dword = data[dbase + wi];
    data[dbase + wi] = (dword & !mask) | (op.combine(sword, dword) & mask);
}

impl PixMut {
    /// Blit a `w`x`h` rectangle of `src` at (`sx`, `sy`) onto this image at
    /// (`dx`, `dy`) under `op`.
    ///
    /// Coordinates may be negative or extend past either image; the
    /// transfer is clipped accordingly. Source-free ops ignore `src`.
    /// The images must share a depth, else nothing is written.
    pub fn rasterop(
        &mut self,
        dx: i32,
        dy: i32,
        w: i32,
        h: i32,
        op: RopOp,
        src: &Pix,
        sx: i32,
        sy: i32,
    ) {
        if !op.requires_source() {
            self.rasterop_unary(dx, dy, w, h, op);
            return;
        }
        if self.depth() != src.depth() {
            return;
        }
        let Some(r) = clip_pair(
            (self.width(), self.height()),
            (src.width(), src.height()),
            dx,
            dy,
            w,
            h,
            sx,
            sy,
        ) else {
            return;
        };

        let d = self.depth().bits() as usize;
        let dwpl = self.wpl() as usize;
        let swpl = src.wpl() as usize;
        let dbit = r.dx * d;
        let sbit = r.sx * d;
        let nbits = r.w * d;

        let sdata = src.data();
        let ddata = self.data_mut();
        for row in 0..r.h {
            let dstart = (r.dy + row) * dwpl;
            let sstart = (r.sy + row) * swpl;
            blit_row(
                &mut ddata[dstart..dstart + dwpl],
                dbit,
                &sdata[sstart..sstart + swpl],
                sbit,
                nbits,
                op,
            );
        }
    }

    /// Blit a rectangle of this image onto itself.
    ///
    /// Handles overlapping rectangles: rows are scanned upward when the
    /// destination lies below the source, and words right-to-left when the
    /// destination lies to the right of the source within the same rows.
    pub fn rasterop_ip(&mut self, dx: i32, dy: i32, w: i32, h: i32, op: RopOp, sx: i32, sy: i32) {
        if !op.requires_source() {
            self.rasterop_unary(dx, dy, w, h, op);
            return;
        }
        let dims = (self.width(), self.height());
        let Some(r) = clip_pair(dims, dims, dx, dy, w, h, sx, sy) else {
            return;
        };

        let d = self.depth().bits() as usize;
        let wpl = self.wpl() as usize;
        let dbit = r.dx * d;
        let sbit = r.sx * d;
        let nbits = r.w * d;
        let first = dbit / 32;
        let last = (dbit + nbits - 1) / 32;

        let rows_backward = r.dy > r.sy;
        let words_backward = r.dy == r.sy && dbit > sbit;
        let data = self.data_mut();

        for i in 0..r.h {
            let row = if rows_backward { r.h - 1 - i } else { i };
            let dbase = (r.dy + row) * wpl;
            let sbase = (r.sy + row) * wpl;
            if words_backward {
                for wi in (first..=last).rev() {
                    blit_word_ip(data, dbase, sbase, wpl, dbit, sbit, nbits, op, wi);
                }
            } else {
                for wi in first..=last {
                    blit_word_ip(data, dbase, sbase, wpl, dbit, sbit, nbits, op, wi);
                }
            }
        }
    }

    /// Source-free rasterop over one rectangle of this image.
    fn rasterop_unary(&mut self, x: i32, y: i32, w: i32, h: i32, op: RopOp) {
        let Some((x, y, w, h)) = clip_rect((self.width(), self.height()), x, y, w, h) else {
            return;
        };
        let d = self.depth().bits() as usize;
        let wpl = self.wpl() as usize;
        let dbit = x * d;
        let nbits = w * d;
        let first = dbit / 32;
        let last = (dbit + nbits - 1) / 32;

        let data = self.data_mut();
        for row in y..y + h {
            let base = row * wpl;
            for wi in first..=last {
                let ws = wi * 32;
                let lo = dbit.max(ws) - ws;
                let hi = (dbit + nbits).min(ws + 32) - ws;
                let mask = bit_mask(lo, hi);
                match op {
                    RopOp::Clear => data[base + wi] &= !mask,
                    RopOp::Set => data[base + wi] |= mask,
                    RopOp::InvertDst => data[base + wi] ^= mask,
                    _ => {}
                }
            }
        }
    }

    /// Clear a rectangular region to zero.
    pub fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.rasterop_unary(x, y, w, h, RopOp::Clear);
    }

    /// Set all pixels in a rectangular region.
    pub fn set_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.rasterop_unary(x, y, w, h, RopOp::Set);
    }

    /// Invert all pixels in a rectangular region.
    pub fn invert_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.rasterop_unary(x, y, w, h, RopOp::InvertDst);
    }
}

impl Pix {
    /// Bitwise AND with another image of equal geometry.
    pub fn and(&self, other: &Pix) -> Result<Pix> {
        self.binary_op(other, RopOp::And)
    }

    /// Bitwise OR with another image of equal geometry.
    pub fn or(&self, other: &Pix) -> Result<Pix> {
        self.binary_op(other, RopOp::Or)
    }

    /// Bitwise XOR with another image of equal geometry.
    pub fn xor(&self, other: &Pix) -> Result<Pix> {
        self.binary_op(other, RopOp::Xor)
    }

    /// Invert every pixel.
    pub fn invert(&self) -> Pix {
        let mut out = self.to_mut();
        out.rasterop(
            0,
            0,
            self.width() as i32,
            self.height() as i32,
            RopOp::InvertSrc,
            self,
            0,
            0,
        );
        out.into()
    }

    fn binary_op(&self, other: &Pix, op: RopOp) -> Result<Pix> {
        if !self.sizes_equal(other) {
            return Err(Error::DimensionMismatch {
                expected: (self.width(), self.height()),
                actual: (other.width(), other.height()),
            });
        }
        let mut out = self.to_mut();
        out.rasterop(
            0,
            0,
            self.width() as i32,
            self.height() as i32,
            op,
            other,
            0,
            0,
        );
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pix::PixelDepth;

    /// Deterministic binary test pattern with content crossing word
    /// boundaries. Width 50 exercises partial last words.
    fn pattern_pix(w: u32, h: u32) -> Pix {
        let pix = Pix::new(w, h, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        for y in 0..h {
            for x in 0..w {
                if (x * 7 + y * 13) % 5 < 2 || x == y {
                    pm.set_pixel_unchecked(x, y, 1);
                }
            }
        }
        pm.into()
    }

    /// Pixel-at-a-time rasterop used as ground truth.
    fn reference_rasterop(
        dst: &Pix,
        dx: i32,
        dy: i32,
        w: i32,
        h: i32,
        op: RopOp,
        src: &Pix,
        sx: i32,
        sy: i32,
    ) -> Pix {
        let mut out = dst.to_mut();
        for j in 0..h {
            for i in 0..w {
                let (xd, yd) = (dx + i, dy + j);
                let (xs, ys) = (sx + i, sy + j);
                if xd < 0 || yd < 0 || xd >= dst.width() as i32 || yd >= dst.height() as i32 {
                    continue;
                }
                if xs < 0 || ys < 0 || xs >= src.width() as i32 || ys >= src.height() as i32 {
                    continue;
                }
                let s = src.get_pixel_unchecked(xs as u32, ys as u32);
                let d = out.get_pixel_unchecked(xd as u32, yd as u32);
                let v = op.combine(if s != 0 { !0 } else { 0 }, if d != 0 { !0 } else { 0 }) & 1;
                out.set_pixel_unchecked(xd as u32, yd as u32, v);
            }
        }
        out.into()
    }

    const OFFSETS: &[(i32, i32, i32, i32, i32, i32)] = &[
        // (dx, dy, w, h, sx, sy)
        (0, 0, 50, 37, 0, 0),
        (1, 0, 50, 37, 0, 0),
        (0, 0, 50, 37, 1, 0),
        (13, 5, 20, 20, 7, 2),
        (31, 0, 10, 10, 0, 3),
        (-6, -3, 50, 37, 0, 0),
        (0, 0, 50, 37, -6, -3),
        (40, 30, 50, 37, 0, 0),
        (3, 2, 100, 100, 5, 9),
        (-10, 4, 45, 12, 27, -2),
    ];

    #[test]
    fn test_rasterop_src_matches_reference() {
        let src = pattern_pix(50, 37);
        let dst = pattern_pix(50, 37).invert();
        for &(dx, dy, w, h, sx, sy) in OFFSETS {
            let mut out = dst.to_mut();
            out.rasterop(dx, dy, w, h, RopOp::Src, &src, sx, sy);
            let out: Pix = out.into();
            let want = reference_rasterop(&dst, dx, dy, w, h, RopOp::Src, &src, sx, sy);
            assert!(
                out.equals(&want),
                "Src blit at ({},{},{},{},{},{}) differs",
                dx,
                dy,
                w,
                h,
                sx,
                sy
            );
        }
    }

    #[test]
    fn test_rasterop_binary_ops_match_reference() {
        let src = pattern_pix(50, 37);
        let dst = pattern_pix(50, 37).invert();
        for op in [
            RopOp::And,
            RopOp::Or,
            RopOp::Xor,
            RopOp::AndInvertSrc,
            RopOp::InvertSrc,
            RopOp::Nand,
            RopOp::OrInvertSrc,
        ] {
            for &(dx, dy, w, h, sx, sy) in OFFSETS {
                let mut out = dst.to_mut();
                out.rasterop(dx, dy, w, h, op, &src, sx, sy);
                let out: Pix = out.into();
                let want = reference_rasterop(&dst, dx, dy, w, h, op, &src, sx, sy);
                assert!(
                    out.equals(&want),
                    "{:?} blit at ({},{},{},{},{},{}) differs",
                    op,
                    dx,
                    dy,
                    w,
                    h,
                    sx,
                    sy
                );
            }
        }
    }

    #[test]
    fn test_rasterop_fully_clipped_is_noop() {
        let src = pattern_pix(50, 37);
        let dst = pattern_pix(50, 37);
        let mut out = dst.to_mut();
        out.rasterop(-60, 0, 50, 37, RopOp::Src, &src, 0, 0);
        out.rasterop(0, 40, 50, 37, RopOp::Src, &src, 0, 0);
        out.rasterop(0, 0, 50, 37, RopOp::Src, &src, 55, 0);
        out.rasterop(0, 0, 0, 10, RopOp::Src, &src, 0, 0);
        let out: Pix = out.into();
        assert!(out.equals(&dst));
    }

    #[test]
    fn test_rasterop_src_idempotent() {
        let src = pattern_pix(50, 37);
        let dst = Pix::new(50, 37, PixelDepth::Bit1).unwrap();

        let mut once = dst.to_mut();
        once.rasterop(4, 3, 30, 30, RopOp::Src, &src, 2, 1);
        let once: Pix = once.into();

        let mut twice = dst.to_mut();
        twice.rasterop(4, 3, 30, 30, RopOp::Src, &src, 2, 1);
        twice.rasterop(4, 3, 30, 30, RopOp::Src, &src, 2, 1);
        let twice: Pix = twice.into();

        assert!(once.equals(&twice));
    }

    #[test]
    fn test_depth_mismatch_is_noop() {
        let src = Pix::new(10, 10, PixelDepth::Bit8).unwrap();
        let dst = pattern_pix(10, 10);
        let mut out = dst.to_mut();
        out.rasterop(0, 0, 10, 10, RopOp::Src, &src, 0, 0);
        let out: Pix = out.into();
        assert!(out.equals(&dst));
    }

    #[test]
    fn test_unary_regions() {
        let pix = pattern_pix(50, 37);

        let mut cleared = pix.to_mut();
        cleared.clear_region(5, 3, 30, 10);
        let cleared: Pix = cleared.into();

        let mut set = pix.to_mut();
        set.set_region(-4, 30, 40, 100);
        let set: Pix = set.into();

        let mut inverted = pix.to_mut();
        inverted.invert_region(20, 0, 50, 5);
        let inverted: Pix = inverted.into();

        for y in 0..37u32 {
            for x in 0..50u32 {
                let orig = pix.get_pixel_unchecked(x, y);
                let in_clear = (5..35).contains(&x) && (3..13).contains(&y);
                let in_set = x < 36 && y >= 30;
                let in_inv = x >= 20 && y < 5;
                assert_eq!(
                    cleared.get_pixel_unchecked(x, y),
                    if in_clear { 0 } else { orig }
                );
                assert_eq!(set.get_pixel_unchecked(x, y), if in_set { 1 } else { orig });
                assert_eq!(
                    inverted.get_pixel_unchecked(x, y),
                    if in_inv { 1 - orig } else { orig }
                );
            }
        }
    }

    #[test]
    fn test_set_region_keeps_padding_clear() {
        let pix = Pix::new(50, 4, PixelDepth::Bit1).unwrap();
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_region(0, 0, 50, 4);
        let pix: Pix = pm.into();
        for y in 0..4 {
            assert_eq!(pix.row_data(y)[1] & 0x0000_3FFF, 0);
        }
    }

    #[test]
    fn test_rasterop_ip_matches_snapshot_blit() {
        let pix = pattern_pix(50, 37);
        // Overlapping transfers in all four directions plus a diagonal
        let cases: &[(i32, i32, i32, i32, i32, i32)] = &[
            (10, 0, 35, 37, 3, 0),  // right shift, same rows
            (3, 0, 35, 37, 10, 0),  // left shift, same rows
            (0, 9, 50, 25, 0, 2),   // down shift
            (0, 2, 50, 25, 0, 9),   // up shift
            (7, 11, 30, 20, 2, 3),  // diagonal
            (2, 3, 30, 20, 7, 11),  // opposite diagonal
            (0, 0, 50, 37, 0, 0),   // full self-copy
        ];
        for &(dx, dy, w, h, sx, sy) in cases {
            for op in [RopOp::Src, RopOp::Or, RopOp::Xor] {
                let mut inplace = pix.to_mut();
                inplace.rasterop_ip(dx, dy, w, h, op, sx, sy);
                let inplace: Pix = inplace.into();

                // Reading from an untouched snapshot is the ground truth
                let snapshot = pix.deep_clone();
                let mut want = pix.to_mut();
                want.rasterop(dx, dy, w, h, op, &snapshot, sx, sy);
                let want: Pix = want.into();

                assert!(
                    inplace.equals(&want),
                    "{:?} in-place blit at ({},{},{},{},{},{}) differs",
                    op,
                    dx,
                    dy,
                    w,
                    h,
                    sx,
                    sy
                );
            }
        }
    }

    #[test]
    fn test_and_or_xor_invert() {
        let a = pattern_pix(50, 37);
        let b = pattern_pix(50, 37).invert();

        let anded = a.and(&b).unwrap();
        let ored = a.or(&b).unwrap();
        let xored = a.xor(&b).unwrap();

        for y in 0..37u32 {
            for x in 0..50u32 {
                let va = a.get_pixel_unchecked(x, y);
                let vb = b.get_pixel_unchecked(x, y);
                assert_eq!(anded.get_pixel_unchecked(x, y), va & vb);
                assert_eq!(ored.get_pixel_unchecked(x, y), va | vb);
                assert_eq!(xored.get_pixel_unchecked(x, y), va ^ vb);
            }
        }

        assert!(a.invert().invert().equals(&a));
        let mismatched = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        assert!(a.and(&mismatched).is_err());
    }
}

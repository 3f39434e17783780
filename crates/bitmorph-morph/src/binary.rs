//! Binary morphological operations
//!
//! Every operator is a fixed sequence of translated rasterops against
//! scratch bitmaps: dilation OR-accumulates shifted copies of the source,
//! erosion AND-accumulates them with the opposite shift, and the hit-miss
//! transform ANDs shifted copies for hits with inverted shifted copies for
//! misses. Derived operators compose these through intermediate buffers.
//!
//! Each operator comes in two forms: `op(...)` returns a fresh bitmap and
//! `op_into(...)` overwrites a caller-supplied bitmap of the source's
//! geometry. Passing a destination handle that shares the source's buffer
//! (a `Pix::clone`) gives in-place operation; results are always built
//! aside and published at the end, so a shared buffer is never read and
//! written at once, and a failed call leaves the destination untouched.

use crate::{BoundaryCondition, MorphError, MorphResult, Sel, SelElement};
use bitmorph_core::{Pix, PixMut, PixelDepth, RopOp};

/// Binary morphology engine
///
/// Carries the boundary-condition policy applied by erosion and by the
/// safe closing variants. Engines are cheap values; distinct engines with
/// distinct policies can be used concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Morphology {
    boundary: BoundaryCondition,
}

impl Morphology {
    /// Create an engine with the asymmetric boundary condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given boundary condition.
    pub fn with_boundary(boundary: BoundaryCondition) -> Self {
        Morphology { boundary }
    }

    /// Get the boundary condition.
    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Change the boundary condition.
    ///
    /// Must not be called while operators of this engine are in flight;
    /// `&mut self` enforces that.
    pub fn set_boundary_condition(&mut self, boundary: BoundaryCondition) {
        self.boundary = boundary;
    }

    // ------------------------------------------------------------------
    // Generic operators
    // ------------------------------------------------------------------

    /// Dilate using the hits of `sel`.
    ///
    /// The result is ON at p wherever some hit cell, placed with the SEL
    /// origin at p, lands on an ON source pixel.
    pub fn dilate(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        check_binary(src)?;
        let (w, h) = (src.width() as i32, src.height() as i32);
        let (cx, cy) = (sel.origin_x() as i32, sel.origin_y() as i32);

        let mut out = blank_like(src)?;
        for (x, y, e) in sel.cells() {
            if e == SelElement::Hit {
                out.rasterop(x as i32 - cx, y as i32 - cy, w, h, RopOp::Or, src, 0, 0);
            }
        }
        Ok(out.into())
    }

    /// Erode using the hits of `sel`.
    ///
    /// The result is ON at p only if every hit cell, placed with the SEL
    /// origin at p, lands on an ON source pixel. Under the asymmetric
    /// boundary condition the edge regions the SEL reaches across are
    /// cleared afterwards.
    pub fn erode(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        check_binary(src)?;
        let (w, h) = (src.width() as i32, src.height() as i32);
        let (cx, cy) = (sel.origin_x() as i32, sel.origin_y() as i32);

        let mut out = blank_like(src)?;
        out.set_all();
        for (x, y, e) in sel.cells() {
            if e == SelElement::Hit {
                out.rasterop(cx - x as i32, cy - y as i32, w, h, RopOp::And, src, 0, 0);
            }
        }

        if self.boundary == BoundaryCondition::Asymmetric {
            clear_edge_regions(&mut out, sel);
        }
        Ok(out.into())
    }

    /// Hit-miss transform.
    ///
    /// The result is ON at p only if every hit cell lands on an ON source
    /// pixel and every miss cell lands on an OFF one. The edge regions the
    /// SEL's hits reach across are cleared regardless of the boundary
    /// condition: near the edge neither hits nor misses can be vouched for.
    pub fn hit_miss_transform(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        check_binary(src)?;
        let (w, h) = (src.width() as i32, src.height() as i32);
        let (cx, cy) = (sel.origin_x() as i32, sel.origin_y() as i32);

        let mut out = blank_like(src)?;
        let mut first = true;
        for (x, y, e) in sel.cells() {
            let (dx, dy) = (cx - x as i32, cy - y as i32);
            match e {
                SelElement::Hit => {
                    if first {
                        out.clear();
                        out.rasterop(dx, dy, w, h, RopOp::Src, src, 0, 0);
                        first = false;
                    } else {
                        out.rasterop(dx, dy, w, h, RopOp::And, src, 0, 0);
                    }
                }
                SelElement::Miss => {
                    if first {
                        out.set_all();
                        out.rasterop(dx, dy, w, h, RopOp::InvertSrc, src, 0, 0);
                        first = false;
                    } else {
                        out.rasterop(dx, dy, w, h, RopOp::AndInvertSrc, src, 0, 0);
                    }
                }
                SelElement::DontCare => {}
            }
        }

        clear_edge_regions(&mut out, sel);
        Ok(out.into())
    }

    /// Open: erosion followed by dilation with the same hits. Idempotent.
    pub fn open(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        let eroded = self.erode(src, sel)?;
        self.dilate(&eroded, sel)
    }

    /// Close: dilation followed by erosion with the same hits.
    ///
    /// A strict dual of opening under the symmetric boundary condition;
    /// under the asymmetric one, foreground close to the edge can be lost.
    /// See [`Morphology::close_safe`].
    pub fn close(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        let dilated = self.dilate(src, sel)?;
        self.erode(&dilated, sel)
    }

    /// Close without boundary artifacts.
    ///
    /// Under the symmetric boundary condition this is plain closing. Under
    /// the asymmetric one the source is padded with OFF pixels first, far
    /// enough that the interior dilation never clips, and the border is
    /// stripped afterwards. Horizontal padding is rounded up to whole
    /// 32-bit words so the padded rows stay word-aligned; vertical padding
    /// is the exact hit extent on each side.
    pub fn close_safe(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        check_binary(src)?;
        if self.boundary == BoundaryCondition::Symmetric {
            return self.close(src, sel);
        }

        let (xp, yp, xn, yn) = sel.find_max_translations();
        let xbord = 32 * xp.max(xn).div_ceil(32);

        let padded = src.add_border_general(xbord, xbord, yp, yn, 0)?;
        let closed = self.close(&padded, sel)?;
        Ok(closed.remove_border_general(xbord, xbord, yp, yn)?)
    }

    /// Generalized open: hit-miss transform, then dilation by the hits.
    /// Idempotent.
    pub fn open_generalized(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        let matched = self.hit_miss_transform(src, sel)?;
        self.dilate(&matched, sel)
    }

    /// Generalized close: dilation by the hits, then hit-miss transform.
    /// The dual of the generalized open; idempotent.
    pub fn close_generalized(&self, src: &Pix, sel: &Sel) -> MorphResult<Pix> {
        let dilated = self.dilate(src, sel)?;
        self.hit_miss_transform(&dilated, sel)
    }

    // ------------------------------------------------------------------
    // Brick fast path
    // ------------------------------------------------------------------

    /// Dilate by an all-hits `hsize` x `vsize` brick, separably when both
    /// sizes exceed one.
    pub fn dilate_brick(&self, src: &Pix, hsize: u32, vsize: u32) -> MorphResult<Pix> {
        check_binary(src)?;
        check_brick(hsize, vsize)?;

        if hsize == 1 && vsize == 1 {
            return Ok(src.deep_clone());
        }
        if hsize == 1 || vsize == 1 {
            let sel = Sel::create_brick(hsize, vsize)?;
            return self.dilate(src, &sel);
        }

        let selh = Sel::create_horizontal(hsize)?;
        let selv = Sel::create_vertical(vsize)?;
        let tmp = self.dilate(src, &selh)?;
        self.dilate(&tmp, &selv)
    }

    /// Erode by an all-hits brick, separably when both sizes exceed one.
    pub fn erode_brick(&self, src: &Pix, hsize: u32, vsize: u32) -> MorphResult<Pix> {
        check_binary(src)?;
        check_brick(hsize, vsize)?;

        if hsize == 1 && vsize == 1 {
            return Ok(src.deep_clone());
        }
        if hsize == 1 || vsize == 1 {
            let sel = Sel::create_brick(hsize, vsize)?;
            return self.erode(src, &sel);
        }

        let selh = Sel::create_horizontal(hsize)?;
        let selv = Sel::create_vertical(vsize)?;
        let tmp = self.erode(src, &selh)?;
        self.erode(&tmp, &selv)
    }

    /// Open by an all-hits brick.
    ///
    /// The separable form runs both erosions then both dilations,
    /// ping-ponging between two scratch bitmaps.
    pub fn open_brick(&self, src: &Pix, hsize: u32, vsize: u32) -> MorphResult<Pix> {
        check_binary(src)?;
        check_brick(hsize, vsize)?;

        if hsize == 1 && vsize == 1 {
            return Ok(src.deep_clone());
        }
        if hsize == 1 || vsize == 1 {
            let sel = Sel::create_brick(hsize, vsize)?;
            return self.open(src, &sel);
        }

        let selh = Sel::create_horizontal(hsize)?;
        let selv = Sel::create_vertical(vsize)?;
        let mut t = self.erode(src, &selh)?;
        let mut d = self.erode(&t, &selv)?;
        self.dilate_into(&mut t, &d, &selh)?;
        self.dilate_into(&mut d, &t, &selv)?;
        Ok(d)
    }

    /// Close by an all-hits brick.
    pub fn close_brick(&self, src: &Pix, hsize: u32, vsize: u32) -> MorphResult<Pix> {
        check_binary(src)?;
        check_brick(hsize, vsize)?;

        if hsize == 1 && vsize == 1 {
            return Ok(src.deep_clone());
        }
        if hsize == 1 || vsize == 1 {
            let sel = Sel::create_brick(hsize, vsize)?;
            return self.close(src, &sel);
        }

        let selh = Sel::create_horizontal(hsize)?;
        let selv = Sel::create_vertical(vsize)?;
        let mut t = self.dilate(src, &selh)?;
        let mut d = self.dilate(&t, &selv)?;
        self.erode_into(&mut t, &d, &selh)?;
        self.erode_into(&mut d, &t, &selv)?;
        Ok(d)
    }

    /// Close by an all-hits brick without boundary artifacts.
    ///
    /// Pads uniformly on all four sides by the brick half-extent rounded
    /// up to whole 32-bit words, closes separably, then strips the border.
    pub fn close_safe_brick(&self, src: &Pix, hsize: u32, vsize: u32) -> MorphResult<Pix> {
        check_binary(src)?;
        check_brick(hsize, vsize)?;

        if hsize == 1 && vsize == 1 {
            return Ok(src.deep_clone());
        }
        if self.boundary == BoundaryCondition::Symmetric {
            return self.close_brick(src, hsize, vsize);
        }

        let maxtrans = (hsize / 2).max(vsize / 2);
        let bordsize = 32 * maxtrans.div_ceil(32);
        let padded = src.add_border(bordsize, 0)?;

        let closed = if hsize == 1 || vsize == 1 {
            let sel = Sel::create_brick(hsize, vsize)?;
            self.close(&padded, &sel)?
        } else {
            let selh = Sel::create_horizontal(hsize)?;
            let selv = Sel::create_vertical(vsize)?;
            let mut t = self.dilate(&padded, &selh)?;
            let mut d = self.dilate(&t, &selv)?;
            self.erode_into(&mut t, &d, &selh)?;
            self.erode_into(&mut d, &t, &selv)?;
            d
        };

        Ok(closed.remove_border(bordsize)?)
    }

    // ------------------------------------------------------------------
    // Destination variants
    // ------------------------------------------------------------------

    /// Dilate into an existing bitmap of the source's geometry.
    pub fn dilate_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.dilate(src, sel)?;
        Ok(())
    }

    /// Erode into an existing bitmap of the source's geometry.
    pub fn erode_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.erode(src, sel)?;
        Ok(())
    }

    /// Hit-miss transform into an existing bitmap of the source's geometry.
    pub fn hit_miss_transform_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.hit_miss_transform(src, sel)?;
        Ok(())
    }

    /// Open into an existing bitmap of the source's geometry.
    pub fn open_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.open(src, sel)?;
        Ok(())
    }

    /// Close into an existing bitmap of the source's geometry.
    pub fn close_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.close(src, sel)?;
        Ok(())
    }

    /// Safe close into an existing bitmap.
    ///
    /// A destination of the wrong geometry is tolerated with a warning and
    /// replaced wholesale; the safe path allocates fresh buffers anyway.
    pub fn close_safe_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        if !dst.sizes_equal(src) {
            log::warn!(
                "close_safe: destination {}x{} does not match source {}x{}; replacing it",
                dst.width(),
                dst.height(),
                src.width(),
                src.height()
            );
        }
        *dst = self.close_safe(src, sel)?;
        Ok(())
    }

    /// Generalized open into an existing bitmap of the source's geometry.
    pub fn open_generalized_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.open_generalized(src, sel)?;
        Ok(())
    }

    /// Generalized close into an existing bitmap of the source's geometry.
    pub fn close_generalized_into(&self, dst: &mut Pix, src: &Pix, sel: &Sel) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.close_generalized(src, sel)?;
        Ok(())
    }

    /// Brick dilate into an existing bitmap of the source's geometry.
    pub fn dilate_brick_into(
        &self,
        dst: &mut Pix,
        src: &Pix,
        hsize: u32,
        vsize: u32,
    ) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.dilate_brick(src, hsize, vsize)?;
        Ok(())
    }

    /// Brick erode into an existing bitmap of the source's geometry.
    pub fn erode_brick_into(
        &self,
        dst: &mut Pix,
        src: &Pix,
        hsize: u32,
        vsize: u32,
    ) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.erode_brick(src, hsize, vsize)?;
        Ok(())
    }

    /// Brick open into an existing bitmap of the source's geometry.
    pub fn open_brick_into(
        &self,
        dst: &mut Pix,
        src: &Pix,
        hsize: u32,
        vsize: u32,
    ) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.open_brick(src, hsize, vsize)?;
        Ok(())
    }

    /// Brick close into an existing bitmap of the source's geometry.
    pub fn close_brick_into(
        &self,
        dst: &mut Pix,
        src: &Pix,
        hsize: u32,
        vsize: u32,
    ) -> MorphResult<()> {
        check_dst(dst, src)?;
        *dst = self.close_brick(src, hsize, vsize)?;
        Ok(())
    }

    /// Brick safe close into an existing bitmap.
    ///
    /// Like [`Morphology::close_safe_into`], the destination geometry is
    /// not required to match; it is replaced wholesale.
    pub fn close_safe_brick_into(
        &self,
        dst: &mut Pix,
        src: &Pix,
        hsize: u32,
        vsize: u32,
    ) -> MorphResult<()> {
        *dst = self.close_safe_brick(src, hsize, vsize)?;
        Ok(())
    }
}

/// Blank 1-bpp scratch with the source's geometry, ready for accumulation.
fn blank_like(src: &Pix) -> MorphResult<PixMut> {
    let out = Pix::new(src.width(), src.height(), PixelDepth::Bit1)?;
    // A fresh Pix has a single reference
    Ok(out.try_into_mut().unwrap())
}

/// Clear the edge regions the SEL's hits reach across: xp columns on the
/// left, xn on the right, yp rows on top, yn on the bottom.
fn clear_edge_regions(out: &mut PixMut, sel: &Sel) {
    let (xp, yp, xn, yn) = sel.find_max_translations();
    let (w, h) = (out.width() as i32, out.height() as i32);
    if xp > 0 {
        out.clear_region(0, 0, xp as i32, h);
    }
    if xn > 0 {
        out.clear_region(w - xn as i32, 0, xn as i32, h);
    }
    if yp > 0 {
        out.clear_region(0, 0, w, yp as i32);
    }
    if yn > 0 {
        out.clear_region(0, h - yn as i32, w, yn as i32);
    }
}

fn check_binary(pix: &Pix) -> MorphResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(MorphError::UnsupportedDepth {
            expected: "1-bpp binary",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

fn check_brick(hsize: u32, vsize: u32) -> MorphResult<()> {
    if hsize < 1 || vsize < 1 {
        return Err(MorphError::InvalidParameters(
            "brick sizes must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn check_dst(dst: &Pix, src: &Pix) -> MorphResult<()> {
    if !dst.sizes_equal(src) {
        return Err(MorphError::SizeMismatch {
            src: (src.width(), src.height()),
            dst: (dst.width(), dst.height()),
        });
    }
    Ok(())
}

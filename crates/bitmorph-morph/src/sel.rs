//! Structuring elements
//!
//! A structuring element (SEL) is a small grid of cells, each one a hit,
//! a miss, or a don't-care, anchored at an origin cell. The origin is the
//! cell that lines up with the output pixel being computed.

use crate::{MorphError, MorphResult};

/// Cell role in a structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SelElement {
    /// Ignored position
    #[default]
    DontCare = 0,
    /// Must match foreground
    Hit = 1,
    /// Must match background
    Miss = 2,
}

/// Structuring element
///
/// Cell contents are immutable while an operator runs; operators borrow
/// the SEL shared.
#[derive(Debug, Clone)]
pub struct Sel {
    /// Width of the grid
    width: u32,
    /// Height of the grid
    height: u32,
    /// X coordinate of the origin
    cx: u32,
    /// Y coordinate of the origin
    cy: u32,
    /// Cell data (row-major order)
    data: Vec<SelElement>,
    /// Optional name for identification
    name: Option<String>,
}

impl Sel {
    /// Create an all-don't-care structuring element with a centered origin.
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(
                "width and height must be > 0".to_string(),
            ));
        }
        Ok(Sel {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![SelElement::DontCare; (width * height) as usize],
            name: None,
        })
    }

    /// Create a structuring element with every cell set to `elem` and the
    /// origin at (`cx`, `cy`).
    pub fn filled(width: u32, height: u32, cx: u32, cy: u32, elem: SelElement) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(
                "width and height must be > 0".to_string(),
            ));
        }
        if cx >= width || cy >= height {
            return Err(MorphError::InvalidSel(format!(
                "origin ({}, {}) out of bounds for {}x{} SEL",
                cx, cy, width, height
            )));
        }
        Ok(Sel {
            width,
            height,
            cx,
            cy,
            data: vec![elem; (width * height) as usize],
            name: None,
        })
    }

    /// Create a rectangular brick with all hits and a centered origin.
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::filled(width, height, width / 2, height / 2, SelElement::Hit)?;
        sel.name = Some(format!("brick_{}x{}", width, height));
        Ok(sel)
    }

    /// Create a horizontal line of hits, origin at the middle of the line.
    pub fn create_horizontal(length: u32) -> MorphResult<Self> {
        Self::create_brick(length, 1)
    }

    /// Create a vertical line of hits, origin at the middle of the line.
    pub fn create_vertical(length: u32) -> MorphResult<Self> {
        Self::create_brick(1, length)
    }

    /// Create a cross (+) of hits.
    pub fn create_cross(size: u32) -> MorphResult<Self> {
        let mut sel = Self::new(size, size)?;
        let center = size / 2;
        for x in 0..size {
            sel.set_element(x, center, SelElement::Hit);
        }
        for y in 0..size {
            sel.set_element(center, y, SelElement::Hit);
        }
        sel.name = Some(format!("cross_{}", size));
        Ok(sel)
    }

    /// Create a structuring element from a string pattern.
    ///
    /// 'x' marks a hit, 'o' a miss, '.' (or space or '-') a don't-care.
    ///
    /// # Example
    /// ```
    /// use bitmorph_morph::Sel;
    ///
    /// let sel = Sel::from_string(
    ///     "ooo\n\
    ///      oxo\n\
    ///      ooo",
    ///     1, 1,
    /// ).unwrap();
    /// assert_eq!(sel.hit_count(), 1);
    /// assert_eq!(sel.miss_count(), 8);
    /// ```
    pub fn from_string(pattern: &str, origin_x: u32, origin_y: u32) -> MorphResult<Self> {
        let lines: Vec<&str> = pattern.lines().collect();
        if lines.is_empty() {
            return Err(MorphError::InvalidSel("empty pattern".to_string()));
        }

        let height = lines.len() as u32;
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        if width == 0 {
            return Err(MorphError::InvalidSel("empty pattern".to_string()));
        }

        let mut sel = Self::new(width, height)?;
        sel.set_origin(origin_x, origin_y)?;

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let elem = match ch {
                    'x' | 'X' | '1' => SelElement::Hit,
                    'o' | 'O' | '0' => SelElement::Miss,
                    '.' | ' ' | '-' => SelElement::DontCare,
                    _ => continue,
                };
                sel.set_element(x as u32, y as u32, elem);
            }
        }

        Ok(sel)
    }

    /// Get the width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the origin x coordinate.
    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    /// Get the origin y coordinate.
    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Move the origin.
    ///
    /// # Errors
    ///
    /// The origin must lie inside the grid.
    pub fn set_origin(&mut self, cx: u32, cy: u32) -> MorphResult<()> {
        if cx >= self.width || cy >= self.height {
            return Err(MorphError::InvalidSel(
                "origin must be within SEL bounds".to_string(),
            ));
        }
        self.cx = cx;
        self.cy = cy;
        Ok(())
    }

    /// Get the name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get a cell at (x, y), or `None` outside the grid.
    #[inline]
    pub fn get_element(&self, x: u32, y: u32) -> Option<SelElement> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set a cell at (x, y); out-of-grid coordinates are ignored.
    #[inline]
    pub fn set_element(&mut self, x: u32, y: u32, elem: SelElement) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = elem;
        }
    }

    /// Get raw cell data in row-major order.
    pub fn data(&self) -> &[SelElement] {
        &self.data
    }

    /// Iterate cells in row-major order as (x, y, element).
    ///
    /// Operators traverse in this fixed order so their rasterop sequences
    /// are reproducible.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, SelElement)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &e)| (i as u32 % width, i as u32 / width, e))
    }

    /// Iterate hit positions as offsets (dx, dy) from the origin.
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (cx, cy) = (self.cx as i32, self.cy as i32);
        self.cells().filter_map(move |(x, y, e)| {
            (e == SelElement::Hit).then_some((x as i32 - cx, y as i32 - cy))
        })
    }

    /// Count the hit cells.
    pub fn hit_count(&self) -> usize {
        self.data.iter().filter(|&&e| e == SelElement::Hit).count()
    }

    /// Count the miss cells.
    pub fn miss_count(&self) -> usize {
        self.data.iter().filter(|&&e| e == SelElement::Miss).count()
    }

    /// Create the reflected (180-degree rotated) SEL, origin included.
    pub fn reflect(&self) -> Self {
        let mut reflected = Sel {
            width: self.width,
            height: self.height,
            cx: self.width - 1 - self.cx,
            cy: self.height - 1 - self.cy,
            data: vec![SelElement::DontCare; self.data.len()],
            name: self.name.as_ref().map(|n| format!("{}_reflected", n)),
        };
        for (x, y, e) in self.cells() {
            let rx = self.width - 1 - x;
            let ry = self.height - 1 - y;
            reflected.data[(ry * self.width + rx) as usize] = e;
        }
        reflected
    }

    /// How far the hits extend left, up, right and down of the origin,
    /// as (xp, yp, xn, yn), each clamped at zero.
    ///
    /// These extents size the edge regions an erosion cannot vouch for,
    /// and the borders the safe closing pads with.
    pub fn find_max_translations(&self) -> (u32, u32, u32, u32) {
        let (cx, cy) = (self.cx as i64, self.cy as i64);
        let (mut xp, mut yp, mut xn, mut yn) = (0i64, 0i64, 0i64, 0i64);
        for (x, y, e) in self.cells() {
            if e == SelElement::Hit {
                xp = xp.max(cx - x as i64);
                yp = yp.max(cy - y as i64);
                xn = xn.max(x as i64 - cx);
                yn = yn.max(y as i64 - cy);
            }
        }
        (xp as u32, yp as u32, xn as u32, yn as u32)
    }
}

//! bitmorph-morph - binary morphology over packed bitmaps
//!
//! This crate provides:
//!
//! - Structuring elements ([`Sel`]) with hit / miss / don't-care cells
//!   and an origin
//! - The [`Morphology`] engine: dilation, erosion, hit-miss transform,
//!   opening, closing, safe closing, and their generalized forms
//! - Separable fast paths for rectangular (brick) structuring elements
//! - An explicit boundary-condition policy ([`BoundaryCondition`]) carried
//!   by each engine value instead of process-wide state
//!
//! All operators work on 1-bpp images and are built from rasterops: each
//! is a fixed sequence of translated boolean blits against scratch
//! bitmaps.
//!
//! ```
//! use bitmorph_core::{Pix, PixelDepth};
//! use bitmorph_morph::{Morphology, Sel};
//!
//! let pix = Pix::new(64, 64, PixelDepth::Bit1).unwrap();
//! let sel = Sel::create_brick(3, 3).unwrap();
//! let morph = Morphology::new();
//! let dilated = morph.dilate(&pix, &sel).unwrap();
//! assert!(dilated.sizes_equal(&pix));
//! ```

pub mod binary;
mod boundary;
mod error;
pub mod sel;

pub use binary::Morphology;
pub use boundary::{BoundaryCondition, MorphOp};
pub use error::{MorphError, MorphResult};
pub use sel::{Sel, SelElement};

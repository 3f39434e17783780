//! bitmorph-core - packed bitmap container and rasterop engine
//!
//! This crate provides the storage and bit-level primitives that the
//! morphology crate is built on:
//!
//! - [`Pix`]: a reference-counted image of packed pixels (1 to 32 bpp)
//! - [`PixMut`]: its uniquely-owned mutable form
//! - Pixel access, border add/remove, comparison and counting
//! - [`RopOp`] and the rasterop engine: boolean bit-blits between
//!   rectangles at arbitrary sub-word alignment

mod error;
mod pix;

pub use error::{Error, Result};
pub use pix::{Pix, PixMut, PixelDepth, RopOp};

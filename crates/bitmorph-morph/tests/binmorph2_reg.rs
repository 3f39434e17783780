//! Binary morphology regression test 2
//!
//! Algebraic properties of the operators: extensivity and
//! anti-extensivity, De Morgan duality under the symmetric boundary
//! condition, idempotence of the (generalized) openings and closings,
//! the open/close sandwich, and the safe-close border round trip.
//!
//! Run with:
//! ```
//! cargo test -p bitmorph-morph --test binmorph2_reg
//! ```

use bitmorph_core::{Pix, PixelDepth};
use bitmorph_morph::{BoundaryCondition, Morphology, Sel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_pix(w: u32, h: u32, seed: u64, density: f32) -> Pix {
    let mut rng = StdRng::seed_from_u64(seed);
    let pix = Pix::new(w, h, PixelDepth::Bit1).unwrap();
    let mut pm = pix.try_into_mut().unwrap();
    for y in 0..h {
        for x in 0..w {
            if rng.random::<f32>() < density {
                pm.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    pm.into()
}

/// Rectangles of several shapes, an L, and isolated pixels.
fn shapes_pix() -> Pix {
    let pix = Pix::new(48, 40, PixelDepth::Bit1).unwrap();
    let mut pm = pix.try_into_mut().unwrap();
    for y in 5..7u32 {
        for x in 5..8u32 {
            pm.set_pixel_unchecked(x, y, 1);
        }
    }
    for y in 10..14u32 {
        for x in 20..24u32 {
            pm.set_pixel_unchecked(x, y, 1);
        }
    }
    for y in 2..7u32 {
        pm.set_pixel_unchecked(2, y, 1);
    }
    for x in 2..6u32 {
        pm.set_pixel_unchecked(x, 6, 1);
    }
    pm.set_pixel_unchecked(15, 3, 1);
    pm.set_pixel_unchecked(40, 35, 1);
    pm.into()
}

/// a is a subset of b when a AND b reproduces a.
fn is_subset(a: &Pix, b: &Pix) -> bool {
    a.and(b).unwrap().equals(a)
}

#[test]
fn dilation_is_extensive() {
    let pix = random_pix(64, 48, 1, 0.3);
    for bc in [BoundaryCondition::Asymmetric, BoundaryCondition::Symmetric] {
        let morph = Morphology::with_boundary(bc);
        for &(w, h) in &[(3u32, 3u32), (5, 7), (1, 9)] {
            let sel = Sel::create_brick(w, h).unwrap();
            let dilated = morph.dilate(&pix, &sel).unwrap();
            assert!(is_subset(&pix, &dilated), "dilate {}x{} not extensive", w, h);
            assert!(dilated.count_pixels() >= pix.count_pixels());
        }
    }
}

#[test]
fn erosion_is_anti_extensive() {
    let pix = random_pix(64, 48, 2, 0.6);
    for bc in [BoundaryCondition::Asymmetric, BoundaryCondition::Symmetric] {
        let morph = Morphology::with_boundary(bc);
        for &(w, h) in &[(3u32, 3u32), (5, 7), (9, 1)] {
            let sel = Sel::create_brick(w, h).unwrap();
            let eroded = morph.erode(&pix, &sel).unwrap();
            assert!(is_subset(&eroded, &pix), "erode {}x{} not anti-extensive", w, h);
        }
    }
}

#[test]
fn de_morgan_duality_symmetric() {
    // erode(NOT s) == NOT dilate(s, reflected sel) with symmetric borders
    let images = [random_pix(64, 48, 3, 0.4), shapes_pix()];
    let morph = Morphology::with_boundary(BoundaryCondition::Symmetric);

    let mut off_center = Sel::create_brick(3, 3).unwrap();
    off_center.set_origin(0, 2).unwrap();
    let sels = [
        Sel::create_brick(3, 5).unwrap(),
        Sel::create_cross(5).unwrap(),
        off_center,
    ];

    for pix in &images {
        for sel in &sels {
            let lhs = morph.erode(&pix.invert(), sel).unwrap();
            let rhs = morph.dilate(pix, &sel.reflect()).unwrap().invert();
            assert!(
                lhs.equals(&rhs),
                "duality violated for sel {:?}",
                sel.name()
            );
        }
    }
}

#[test]
fn opening_is_idempotent() {
    let images = [random_pix(64, 48, 4, 0.45), shapes_pix()];
    for bc in [BoundaryCondition::Asymmetric, BoundaryCondition::Symmetric] {
        let morph = Morphology::with_boundary(bc);
        for pix in &images {
            for sel in [
                Sel::create_brick(3, 3).unwrap(),
                Sel::create_brick(5, 2).unwrap(),
                Sel::create_cross(3).unwrap(),
            ] {
                let once = morph.open(pix, &sel).unwrap();
                let twice = morph.open(&once, &sel).unwrap();
                assert!(twice.equals(&once), "open not idempotent under {:?}", bc);
            }
        }
    }
}

#[test]
fn closing_is_idempotent_symmetric() {
    let images = [random_pix(64, 48, 5, 0.45), shapes_pix()];
    let morph = Morphology::with_boundary(BoundaryCondition::Symmetric);
    for pix in &images {
        for sel in [
            Sel::create_brick(3, 3).unwrap(),
            Sel::create_brick(2, 5).unwrap(),
            Sel::create_cross(3).unwrap(),
        ] {
            let once = morph.close(pix, &sel).unwrap();
            let twice = morph.close(&once, &sel).unwrap();
            assert!(twice.equals(&once), "symmetric close not idempotent");
        }
    }
}

#[test]
fn close_safe_is_idempotent_asymmetric() {
    let images = [random_pix(64, 48, 6, 0.45), shapes_pix()];
    let morph = Morphology::new();
    for pix in &images {
        for sel in [
            Sel::create_brick(3, 3).unwrap(),
            Sel::create_brick(5, 7).unwrap(),
        ] {
            let once = morph.close_safe(pix, &sel).unwrap();
            let twice = morph.close_safe(&once, &sel).unwrap();
            assert!(twice.equals(&once), "close_safe not idempotent");
        }
    }
}

#[test]
fn open_subset_source_subset_close_safe() {
    let pix = random_pix(64, 48, 7, 0.4);
    let morph = Morphology::new();
    for &(w, h) in &[(3u32, 3u32), (5, 5), (7, 3)] {
        let sel = Sel::create_brick(w, h).unwrap();
        let opened = morph.open(&pix, &sel).unwrap();
        let closed = morph.close_safe(&pix, &sel).unwrap();
        assert!(is_subset(&opened, &pix), "open {}x{} not a subset", w, h);
        assert!(is_subset(&pix, &closed), "source not inside close_safe {}x{}", w, h);
    }

    // Under the symmetric condition plain closing is already extensive
    let morph = Morphology::with_boundary(BoundaryCondition::Symmetric);
    let sel = Sel::create_brick(5, 5).unwrap();
    let closed = morph.close(&pix, &sel).unwrap();
    assert!(is_subset(&pix, &closed));
}

#[test]
fn generalized_opening_is_idempotent() {
    let isolated = Sel::from_string(
        "ooo\n\
         oxo\n\
         ooo",
        1,
        1,
    )
    .unwrap();
    let corner = Sel::from_string(
        "oo.\n\
         oxx\n\
         .xx",
        1,
        1,
    )
    .unwrap();
    let morph = Morphology::new();

    // Isolated-point pattern on noise
    let pix = random_pix(64, 48, 8, 0.25);
    let once = morph.open_generalized(&pix, &isolated).unwrap();
    let twice = morph.open_generalized(&once, &isolated).unwrap();
    assert!(twice.equals(&once));

    // Corner pattern on structured shapes
    let pix = shapes_pix();
    let once = morph.open_generalized(&pix, &corner).unwrap();
    let twice = morph.open_generalized(&once, &corner).unwrap();
    assert!(twice.equals(&once));
}

#[test]
fn generalized_closing_is_idempotent() {
    let isolated = Sel::from_string(
        "ooo\n\
         oxo\n\
         ooo",
        1,
        1,
    )
    .unwrap();
    let corner = Sel::from_string(
        "oo.\n\
         oxx\n\
         .xx",
        1,
        1,
    )
    .unwrap();
    let morph = Morphology::new();

    let pix = random_pix(64, 48, 9, 0.25);
    let once = morph.close_generalized(&pix, &isolated).unwrap();
    let twice = morph.close_generalized(&once, &isolated).unwrap();
    assert!(twice.equals(&once));

    let pix = shapes_pix();
    let once = morph.close_generalized(&pix, &corner).unwrap();
    let twice = morph.close_generalized(&once, &corner).unwrap();
    assert!(twice.equals(&once));
}

#[test]
fn close_safe_equals_padded_close_round_trip() {
    // Padding, closing in the padded frame, and cropping back must be
    // exactly what close_safe computes
    let pix = random_pix(50, 37, 10, 0.4);
    let morph = Morphology::new();
    let sel = Sel::create_brick(5, 7).unwrap();

    let (xp, yp, xn, yn) = sel.find_max_translations();
    let xbord = 32 * xp.max(xn).div_ceil(32);

    let padded = pix.add_border_general(xbord, xbord, yp, yn, 0).unwrap();
    let closed = morph.close(&padded, &sel).unwrap();
    let cropped = closed.remove_border_general(xbord, xbord, yp, yn).unwrap();

    let safe = morph.close_safe(&pix, &sel).unwrap();
    assert!(safe.equals(&cropped));
}

#[test]
fn into_variants_equal_fresh_results() {
    let pix = random_pix(48, 32, 11, 0.4);
    let sel = Sel::create_brick(3, 5).unwrap();
    let morph = Morphology::new();

    let pairs: Vec<(Pix, Pix)> = vec![
        (morph.dilate(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.dilate_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.erode(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.erode_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.open(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.open_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.close(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.close_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.close_safe(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.close_safe_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.hit_miss_transform(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.hit_miss_transform_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.open_generalized(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.open_generalized_into(&mut d, &pix, &sel).unwrap();
            d
        }),
        (morph.close_generalized(&pix, &sel).unwrap(), {
            let mut d = pix.clone();
            morph.close_generalized_into(&mut d, &pix, &sel).unwrap();
            d
        }),
    ];

    for (i, (fresh, inplace)) in pairs.iter().enumerate() {
        assert!(fresh.equals(inplace), "in-place result {} differs", i);
    }
}

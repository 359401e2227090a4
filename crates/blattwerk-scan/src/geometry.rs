// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-geometry engine — converts a raw capture into the correctly cropped,
// correctly oriented page image for a notebook's declared page size.
//
// Everything in this module is pure: identical inputs yield identical
// outputs, nothing here performs I/O or touches the page ledger.

use blattwerk_core::NotebookType;
use image::DynamicImage;

/// Convert a length in millimetres to pixels at the given capture
/// resolution (pixels per inch), rounding up.
pub fn mm_to_px(mm: u32, resolution: u32) -> u32 {
    (f64::from(mm) * f64::from(resolution) / 25.4).ceil() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Portrait,
    Landscape,
}

/// A square extent counts as portrait, so a type and an image of equal
/// sides never trigger a rotation.
fn orientation(width: u32, height: u32) -> Orientation {
    if width <= height {
        Orientation::Portrait
    } else {
        Orientation::Landscape
    }
}

/// Whether `page` is the left (first) member of its pair.
///
/// Pages whose parity matches the notebook's first page number sit on the
/// left of a spread; the rest sit on the right.
pub fn is_left_page(page: u32, first_page_number: u32) -> bool {
    first_page_number % 2 == page % 2
}

/// Whether one raw capture holds both members of a page pair: the type is
/// paired and two page-widths fit into the orientation-aligned capture.
pub fn captures_pair(raw: &DynamicImage, kind: &NotebookType, resolution: u32) -> bool {
    if !kind.pages_paired() {
        return false;
    }
    let target_width = mm_to_px(kind.page_width_mm(), resolution);
    let (width, _) = aligned_dimensions(raw, kind, resolution);
    2 * target_width <= width
}

/// The raw capture's dimensions after aligning its orientation with the
/// declared page orientation (width and height swap when they differ).
fn aligned_dimensions(raw: &DynamicImage, kind: &NotebookType, resolution: u32) -> (u32, u32) {
    let target_width = mm_to_px(kind.page_width_mm(), resolution);
    let target_height = mm_to_px(kind.page_height_mm(), resolution);

    if orientation(target_width, target_height) == orientation(raw.width(), raw.height()) {
        (raw.width(), raw.height())
    } else {
        (raw.height(), raw.width())
    }
}

/// Crop the image of page `page` out of a raw capture.
///
/// The capture is first rotated 90° if its orientation disagrees with the
/// declared page orientation, so the emitted image always matches the
/// type's own aspect. For a non-paired type (or a capture too narrow to
/// hold two pages) the crop is anchored at the top-left corner and clamped
/// to the available image on each axis independently. For a paired capture
/// the left or right page-sized region is cut out according to the parity
/// rule, both regions coming from the same physical scan.
pub fn crop_page(
    page: u32,
    raw: &DynamicImage,
    kind: &NotebookType,
    first_page_number: u32,
    resolution: u32,
) -> DynamicImage {
    let target_width = mm_to_px(kind.page_width_mm(), resolution);
    let target_height = mm_to_px(kind.page_height_mm(), resolution);

    let rotated;
    let aligned: &DynamicImage =
        if orientation(target_width, target_height) == orientation(raw.width(), raw.height()) {
            raw
        } else {
            rotated = raw.rotate90();
            &rotated
        };

    let (width, height) = (aligned.width(), aligned.height());

    if kind.pages_paired() && 2 * target_width <= width {
        let crop_height = target_height.min(height);
        if is_left_page(page, first_page_number) {
            aligned.crop_imm(0, 0, target_width, crop_height)
        } else {
            aligned.crop_imm(width - target_width, 0, target_width, crop_height)
        }
    } else {
        aligned.crop_imm(0, 0, target_width.min(width), target_height.min(height))
    }
}

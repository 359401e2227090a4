// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notebook PDF assembly using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use blattwerk_core::Notebook;
use blattwerk_core::error::Result;

use crate::pages::PageStore;

/// Assembles a notebook's stored page images into one paginated PDF.
///
/// Every PDF page is sized to the notebook type's declared millimetre
/// dimensions; the stored image is placed top-left and scaled to the page
/// at the capture resolution, so an exact-fit crop fills its page edge to
/// edge.
pub struct NotebookPdf {
    /// Capture resolution of the stored page images, in pixels per inch.
    resolution: u32,
    /// Title metadata embedded in the PDF /Info dictionary. Defaults to
    /// the notebook's title.
    title: Option<String>,
}

impl NotebookPdf {
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            title: None,
        }
    }

    /// Override the title embedded in the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Build the PDF for `notebook` from the pages in `store`.
    ///
    /// Pages run from `first_page_number` for `total_pages` pages; a
    /// notebook with no pages yields a single blank page.
    #[instrument(skip(self, notebook, store), fields(notebook = notebook.title()))]
    pub fn assemble(&self, notebook: &Notebook, store: &PageStore) -> Result<Vec<u8>> {
        let kind = notebook.kind();
        let page_w = Mm(kind.page_width_mm() as f32);
        let page_h = Mm(kind.page_height_mm() as f32);
        let title = self.title.as_deref().unwrap_or(notebook.title());

        info!(
            pages = notebook.total_pages(),
            width_mm = kind.page_width_mm(),
            height_mm = kind.page_height_mm(),
            "Assembling notebook PDF"
        );

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::new();

        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let dpi = self.resolution as f32;

        for index in 0..notebook.total_pages() {
            let page_number = notebook.first_page_number() + index;
            let image = store.load(notebook, page_number)?;

            let rgb = image.to_rgb8();
            let (img_w, img_h) = (rgb.width() as usize, rgb.height() as usize);
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: img_w,
                height: img_h,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // Native image size in points at the capture resolution, then
            // scaled to fit the page while preserving aspect ratio.
            let img_w_pt = img_w as f32 / dpi * 72.0;
            let img_h_pt = img_h as f32 / dpi * 72.0;
            let scale = (page_w_pt / img_w_pt).min(page_h_pt / img_h_pt);

            // printpdf's origin is the bottom-left corner; scanned pages
            // anchor to the top-left like the crops they came from.
            let y_offset = page_h_pt - img_h_pt * scale;

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(y_offset)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(dpi),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));
            debug!(page_number, img_w, img_h, scale, "page placed");
        }

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(bytes = output.len(), "notebook PDF assembled");
        Ok(output)
    }

    /// Assemble and write the PDF to the notebook's own path (or any other).
    pub fn write_to_file(
        &self,
        notebook: &Notebook,
        store: &PageStore,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.assemble(notebook, store)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote notebook PDF to {}", path.as_ref().display());
        Ok(())
    }
}

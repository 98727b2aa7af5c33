//! PDF export of tailored text using the standard built-in fonts.

use std::path::Path;

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem, TextMatrix,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::{paginate, FontFamily, Page, PageGeometry};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn builtin_font(font: FontFamily) -> BuiltinFont {
    match font {
        FontFamily::Helvetica => BuiltinFont::Helvetica,
        FontFamily::Courier => BuiltinFont::Courier,
    }
}

/// Draws each page's lines at the positions the paginator chose and serializes the document.
pub fn render_pdf(pages: &[Page], geometry: &PageGeometry, title: &str) -> Result<Vec<u8>, ExportError> {
    let font = builtin_font(geometry.font);
    let mut doc = PdfDocument::new(title);

    for page in pages {
        let mut ops = Vec::with_capacity(page.line_count() + 3);
        ops.push(Op::StartTextSection);
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(geometry.font_size),
            font,
        });
        for line in &page.lines {
            ops.push(Op::SetTextMatrix {
                matrix: TextMatrix::Translate(
                    Pt(geometry.margin_left),
                    Pt(geometry.page_height - line.y),
                ),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font,
            });
        }
        ops.push(Op::EndTextSection);

        doc.pages.push(PdfPage::new(
            Mm::from(Pt(geometry.page_width)),
            Mm::from(Pt(geometry.page_height)),
            ops,
        ));
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "PDF writer reported warnings");
    }
    if bytes.is_empty() {
        return Err(ExportError::Pdf("writer produced no output".to_string()));
    }
    Ok(bytes)
}

/// Paginates `text`, renders it off the async runtime and writes the PDF to `path`.
///
/// Returns the number of pages written.
pub async fn export_pdf(text: &str, geometry: &PageGeometry, path: &Path) -> Result<usize, ExportError> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tailored-resume")
        .to_string();
    let text = text.to_string();
    let geometry = geometry.clone();

    let (page_count, bytes) = tokio::task::spawn_blocking(move || {
        let pages = paginate(&text, &geometry);
        render_pdf(&pages, &geometry, &title).map(|bytes| (pages.len(), bytes))
    })
    .await??;

    tokio::fs::write(path, &bytes).await?;
    info!(path = %path.display(), pages = page_count, bytes = bytes.len(), "PDF exported");
    Ok(page_count)
}

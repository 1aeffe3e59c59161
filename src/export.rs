//! Export pipeline – turns the rendered preview into a paginated,
//! print-accurate PDF.
//!
//! Ordered stages, each attempted exactly once per call:
//!
//! 1. **Serialize** – acquire the single-slot [`ExportGuard`]; overlapping
//!    export calls queue instead of racing on the shared container.
//! 2. **Isolation** – locate the unscaled content node in the preview markup
//!    and deep-clone it into an [`IsolationContainer`] with a fixed pixel
//!    width and an opaque white background. Fails fast when the node is
//!    missing.
//! 3. **Style normalization** – rebuild computed styles from the literal
//!    override table; classes without an override are logged, not raised.
//! 4. **Settle** – run layout passes until the geometry is stable.
//! 5. **Rasterize** – capture the settled boxes as one bitmap at elevated
//!    density, sized to the full content height.
//! 6. **Cleanup** – the container is released on every exit path via `Drop`,
//!    success and failure alike.
//! 7. **Pagination** – window the flattened bitmap across fixed-size pages
//!    at cumulative negative offsets; no re-rasterization per page.
//! 8. **Naming & persistence** – derive the artifact name from the person's
//!    name and emit the PDF.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, XObjectTransform,
};

use crate::doctree::Variant;
use crate::dom::{self, DomNode};
use crate::error::ExportError;
use crate::fonts::FontManager;
use crate::layout::{compute_layout, PositionedBox};
use crate::preview::{render_preview, CONTENT_NODE_ID};
use crate::profile::{Person, ProfileAggregate};
use crate::raster::Rasterizer;
use crate::style::{build_styled_tree, is_supported_class, Color, StyledNode};

/// Fixed content width of the isolation container: A4 width at 96 dpi.
pub const CONTENT_WIDTH_PX: f32 = 794.0;

/// Output page size in page units (millimetres, A4 portrait).
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Tolerance absorbing float drift at exact page boundaries.
const PAGE_EPSILON: f32 = 0.05;

/// Configuration for one export call.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Page width in page units (mm).
    pub page_width_mm: f32,
    /// Page height in page units (mm).
    pub page_height_mm: f32,
    /// Rasterization density multiplier (print sharpness).
    pub density: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Resume".to_string(),
            page_width_mm: PAGE_WIDTH_MM,
            page_height_mm: PAGE_HEIGHT_MM,
            density: 2.0,
        }
    }
}

/// The finished artifact: bytes plus the derived file name.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

// ---------------------------------------------------------------------------
// Stage 1 – serialized unit of work
// ---------------------------------------------------------------------------

static EXPORT_SLOT: Mutex<()> = Mutex::new(());
static LIVE_CONTAINERS: AtomicUsize = AtomicUsize::new(0);

/// Single-slot guard serializing export calls. Held for the whole pipeline;
/// released on drop.
pub struct ExportGuard(#[allow(dead_code)] MutexGuard<'static, ()>);

impl ExportGuard {
    /// Block until the slot is free. A poisoned slot is recovered: the
    /// previous holder's container was already released by its `Drop`.
    pub fn acquire() -> Self {
        Self(EXPORT_SLOT.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Non-blocking variant for callers that prefer to fail fast.
    pub fn try_acquire() -> Option<Self> {
        match EXPORT_SLOT.try_lock() {
            Ok(guard) => Some(Self(guard)),
            Err(TryLockError::Poisoned(p)) => Some(Self(p.into_inner())),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

/// Number of isolation containers currently mounted. Zero whenever no
/// export call is mid-flight.
pub fn live_isolation_containers() -> usize {
    LIVE_CONTAINERS.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Stage 2 – isolation
// ---------------------------------------------------------------------------

/// Off-screen clone of the preview content subtree. Fixed width, opaque
/// background, released on every exit path.
pub struct IsolationContainer {
    subtree: Vec<DomNode>,
    pub width_px: f32,
    pub background: Color,
}

impl IsolationContainer {
    fn mount(subtree: Vec<DomNode>) -> Self {
        LIVE_CONTAINERS.fetch_add(1, Ordering::SeqCst);
        Self {
            subtree,
            width_px: CONTENT_WIDTH_PX,
            background: Color::WHITE,
        }
    }

    pub fn nodes(&self) -> &[DomNode] {
        &self.subtree
    }
}

impl Drop for IsolationContainer {
    fn drop(&mut self) {
        LIVE_CONTAINERS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Locate the unscaled content node (not the scaled wrapper) and clone it
/// into a fresh container.
pub fn isolate(preview_markup: &str) -> Result<IsolationContainer, ExportError> {
    let nodes = dom::parse_markup(preview_markup);
    let content = dom::find_by_id(&nodes, CONTENT_NODE_ID)
        .ok_or(ExportError::ContentNodeMissing(CONTENT_NODE_ID))?;
    Ok(IsolationContainer::mount(vec![DomNode::Element(
        content.clone(),
    )]))
}

// ---------------------------------------------------------------------------
// Stage 3 – style normalization
// ---------------------------------------------------------------------------

/// Rebuild the clone's computed styles from the literal override table.
/// Classes without an override silently degrade exported fidelity; they are
/// surfaced here as warnings and guarded against by the coverage test.
pub fn normalize_styles(container: &IsolationContainer) -> Vec<StyledNode> {
    for class in dom::collect_classes(container.nodes()) {
        if !is_supported_class(&class) {
            log::warn!(
                "class '{class}' has no literal override; exported artifact may diverge from the preview"
            );
        }
    }
    build_styled_tree(container.nodes(), None)
}

// ---------------------------------------------------------------------------
// Stage 4 – settle
// ---------------------------------------------------------------------------

/// Outcome of the settle stage.
#[derive(Debug, Clone, Copy)]
pub struct SettleReport {
    pub passes: u32,
    pub stable: bool,
}

const MAX_SETTLE_PASSES: u32 = 3;

/// Run layout passes until two consecutive passes agree on geometry – an
/// explicit "layout stable" signal instead of a timed delay.
pub fn settle(
    styled: &[StyledNode],
    width_px: f32,
    fonts: &FontManager,
) -> (Vec<PositionedBox>, SettleReport) {
    let mut prev = compute_layout(styled, width_px, fonts);
    let mut passes = 1;
    while passes < MAX_SETTLE_PASSES {
        let next = compute_layout(styled, width_px, fonts);
        passes += 1;
        if geometry_eq(&prev, &next) {
            return (next, SettleReport { passes, stable: true });
        }
        prev = next;
    }
    log::warn!("layout did not settle after {MAX_SETTLE_PASSES} passes; capturing last geometry");
    (prev, SettleReport { passes, stable: false })
}

fn geometry_eq(a: &[PositionedBox], b: &[PositionedBox]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            (x.x - y.x).abs() < 0.01
                && (x.y - y.y).abs() < 0.01
                && (x.width - y.width).abs() < 0.01
                && (x.height - y.height).abs() < 0.01
                && geometry_eq(&x.children, &y.children)
        })
}

// ---------------------------------------------------------------------------
// Stage 7 – pagination
// ---------------------------------------------------------------------------

/// Vertical placement of the full bitmap on one page, in page units. Page 1
/// sits at offset 0; each following page shifts the same image up by one
/// page height so a contiguous slice shows through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub offset_y: f32,
}

/// Compute the page windows for a bitmap of the given pixel dimensions.
///
/// `image_height = bitmap_height * page_width / bitmap_width` (page units).
/// An image that fits yields a single flush top-left placement; otherwise
/// pages are emitted until the running remainder is exhausted, with no
/// spurious trailing page when the height is an exact multiple.
pub fn paginate(
    bitmap_width: u32,
    bitmap_height: u32,
    page_width: f32,
    page_height: f32,
) -> Vec<PageSlice> {
    let image_height = bitmap_height as f32 * page_width / bitmap_width as f32;
    let mut slices = vec![PageSlice { offset_y: 0.0 }];
    if image_height <= page_height + PAGE_EPSILON {
        return slices;
    }

    let mut height_remaining = image_height - page_height;
    let mut offset = 0.0;
    while height_remaining > PAGE_EPSILON {
        offset -= page_height;
        slices.push(PageSlice { offset_y: offset });
        height_remaining -= page_height;
    }
    slices
}

// ---------------------------------------------------------------------------
// Stage 8 – naming & persistence
// ---------------------------------------------------------------------------

/// Derive the artifact file stem from the person's first/last name:
/// lower-cased, internal whitespace collapsed to single underscores, with a
/// generic fallback when no name is present.
pub fn artifact_file_stem(person: &Person) -> String {
    let joined = format!("{} {}", person.first, person.last);
    let parts: Vec<String> = joined
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if parts.is_empty() {
        "untitled".to_string()
    } else {
        parts.join("_")
    }
}

pub fn artifact_file_name(person: &Person) -> String {
    format!("{}_resume.pdf", artifact_file_stem(person))
}

/// Emit the PDF: the bitmap is registered once as an XObject and placed on
/// every page at its window offset – windowed repagination, not
/// re-rasterization.
fn write_document(
    bitmap: &image::RgbImage,
    slices: &[PageSlice],
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(bitmap.clone())
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ExportError::Pdf(format!("bitmap encode error: {e}")))?;

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let raw = RawImage::decode_from_bytes(&png, &mut warnings)
        .map_err(|e| ExportError::Pdf(format!("bitmap embed error: {e}")))?;

    let mut doc = PdfDocument::new(&config.title);
    let xobj_id = doc.add_image(&raw);

    let page_w_pt = config.page_width_mm * MM_TO_PT;
    let image_height_units =
        bitmap.height() as f32 * config.page_width_mm / bitmap.width() as f32;

    let mut pages = Vec::new();
    for slice in slices {
        // PDF origin is bottom-left; the slice offset is top-left based.
        let image_bottom_mm = config.page_height_mm - (slice.offset_y + image_height_units);
        let ops = vec![Op::UseXobject {
            id: xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(image_bottom_mm * MM_TO_PT)),
                // At dpi=72 one px maps to one pt, so scale is pt-per-px.
                dpi: Some(72.0),
                scale_x: Some(page_w_pt / bitmap.width() as f32),
                scale_y: Some(image_height_units * MM_TO_PT / bitmap.height() as f32),
                rotate: None,
            },
        }];
        pages.push(PdfPage::new(
            Mm(config.page_width_mm),
            Mm(config.page_height_mm),
            ops,
        ));
    }

    doc.with_pages(pages);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

// ---------------------------------------------------------------------------
// The pipeline
// ---------------------------------------------------------------------------

/// Full export: preview → isolated clone → normalized styles → settled
/// layout → bitmap → windowed pages → named PDF bytes.
pub fn export_to_document(
    profile: &ProfileAggregate,
    variant: Variant,
    config: &ExportConfig,
) -> Result<ExportArtifact, ExportError> {
    let _slot = ExportGuard::acquire();

    // The unscaled preview is the rasterization source; scale is a display
    // concern and never reaches the artifact.
    let markup = render_preview(profile, variant, 1.0);
    let container = isolate(&markup)?;

    let styled = normalize_styles(&container);
    let fonts = FontManager::new();
    let (boxes, report) = settle(&styled, container.width_px, &fonts);
    log::debug!("layout settled after {} passes", report.passes);

    let mut rasterizer = Rasterizer::new();
    let bitmap = rasterizer.rasterize(&boxes, container.width_px, config.density)?;
    drop(container); // released on error paths too, via Drop

    let slices = paginate(
        bitmap.width(),
        bitmap.height(),
        config.page_width_mm,
        config.page_height_mm,
    );
    let bytes = write_document(&bitmap, &slices, config)?;

    Ok(ExportArtifact {
        file_name: artifact_file_name(&profile.person),
        page_count: slices.len(),
        bytes,
    })
}

/// Export and persist the artifact under `dir`, returning the written path.
pub fn export_to_file(
    profile: &ProfileAggregate,
    variant: Variant,
    config: &ExportConfig,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let artifact = export_to_document(profile, variant, config)?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{normalize, PartialProfile};

    #[test]
    fn paginate_single_page_when_image_fits() {
        let slices = paginate(900, 800, 900.0, 1000.0);
        assert_eq!(slices, vec![PageSlice { offset_y: 0.0 }]);
    }

    #[test]
    fn paginate_emits_cumulative_negative_offsets() {
        let slices = paginate(900, 3000, 900.0, 1000.0);
        let offsets: Vec<f32> = slices.iter().map(|s| s.offset_y).collect();
        assert_eq!(offsets, vec![0.0, -1000.0, -2000.0]);
    }

    #[test]
    fn paginate_exact_multiple_has_no_trailing_page() {
        let slices = paginate(900, 2000, 900.0, 1000.0);
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn paginate_width_normalizes_height() {
        // 1800px tall at 900px wide on a 450-unit-wide page → 900 units.
        let slices = paginate(900, 1800, 450.0, 400.0);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].offset_y, -800.0);
    }

    #[test]
    fn file_stem_collapses_and_lowercases() {
        let mut person = crate::samples::sample_person();
        person.first = "  Ada  ".to_string();
        person.last = " Lovelace ".to_string();
        assert_eq!(artifact_file_stem(&person), "ada_lovelace");
        assert_eq!(artifact_file_name(&person), "ada_lovelace_resume.pdf");
    }

    #[test]
    fn file_stem_falls_back_when_name_absent() {
        let mut person = crate::samples::sample_person();
        person.first.clear();
        person.last.clear();
        assert_eq!(artifact_file_name(&person), "untitled_resume.pdf");
    }

    #[test]
    fn isolate_rejects_markup_without_content_node() {
        let _slot = ExportGuard::acquire();
        let before = live_isolation_containers();
        let err = isolate("<div class=\"resume-preview\"><p>no content id</p></div>");
        assert!(matches!(err, Err(ExportError::ContentNodeMissing(_))));
        assert_eq!(live_isolation_containers(), before);
    }

    #[test]
    fn isolation_container_releases_on_drop() {
        let _slot = ExportGuard::acquire();
        let before = live_isolation_containers();
        let profile = normalize(&PartialProfile::default());
        let markup = render_preview(&profile, Variant::RowBased, 1.0);
        {
            let container = isolate(&markup).unwrap();
            assert_eq!(live_isolation_containers(), before + 1);
            assert_eq!(container.width_px, CONTENT_WIDTH_PX);
            assert!(!container.background.is_transparent());
        }
        assert_eq!(live_isolation_containers(), before);
    }

    #[test]
    fn guard_slot_is_exclusive() {
        let held = ExportGuard::acquire();
        assert!(ExportGuard::try_acquire().is_none());
        drop(held);
        // Blocking re-acquisition must succeed once the slot is free.
        let _reacquired = ExportGuard::acquire();
    }

    #[test]
    fn settle_converges_on_deterministic_layout() {
        let _slot = ExportGuard::acquire();
        let profile = normalize(&PartialProfile::default());
        let markup = render_preview(&profile, Variant::TwoColumn, 1.0);
        let container = isolate(&markup).unwrap();
        let styled = normalize_styles(&container);
        let fonts = FontManager::new();
        let (boxes, report) = settle(&styled, container.width_px, &fonts);
        assert!(report.stable);
        assert_eq!(report.passes, 2);
        assert!(!boxes.is_empty());
    }
}

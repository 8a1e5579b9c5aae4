//! One-page PDF assembly: the blueprint as a vector form XObject at true
//! physical size, overlays on top in layer order.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bag_core::{Blueprint, DiagramFrame, Overlay, OverlayKind, Size};
use pdf_writer::{Chunk, Content, Name, Pdf, Rect, Ref, Str};
use rayon::prelude::*;
use serde::Serialize;
use svg2pdf::ConversionOptions;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{ElementError, ExportError};
use crate::fallback::{self, FallbackText};
use crate::image;
use crate::page::{PageLayout, PageRect};
use crate::text::{self, TextBox};

/// Everything needed for one export, read-only.
#[derive(Clone, Copy, Debug)]
pub struct ExportJob<'a> {
    pub diagram_svg: &'a str,
    pub frame: DiagramFrame,
    /// On-screen pixel size of the diagram container.
    pub container: Size,
    /// Lowest layer first.
    pub overlays: &'a [Overlay],
}

impl<'a> ExportJob<'a> {
    pub fn from_blueprint(
        blueprint: &'a Blueprint,
        container: Size,
        overlays: &'a [Overlay],
    ) -> Self {
        ExportJob {
            diagram_svg: &blueprint.svg,
            frame: blueprint.frame,
            container,
            overlays,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Placement {
    Image,
    RasterText,
    NativeText,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedElement {
    /// Layer index.
    pub index: usize,
    pub id: String,
    pub placement: Placement,
    /// Area covered on the page, inches from the top-left corner. For rotated
    /// raster text this is the expanded canvas.
    pub rect: PageRect,
}

#[derive(Debug)]
pub struct ElementFailure {
    pub index: usize,
    pub id: String,
    pub error: ElementError,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub layout: PageLayout,
    pub file_name: String,
    pub placed: Vec<PlacedElement>,
    pub failures: Vec<ElementFailure>,
}

impl ExportOutcome {
    /// Write the PDF to `dir/file_name`. Goes through a temporary file in
    /// `dir`, so the target either appears complete or not at all.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let target = dir.join(&self.file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
        info!(path = %target.display(), bytes = self.bytes.len(), "export written");
        Ok(target)
    }
}

enum Prepared {
    XObject {
        chunk: Chunk,
        root: Ref,
        rect: PageRect,
        placement: Placement,
    },
    Text {
        text: FallbackText,
        rect: PageRect,
    },
}

/// Long-lived export service. Font databases are loaded once in
/// [`Exporter::new`] and shared by every export.
pub struct Exporter {
    config: ExportConfig,
    raster_fonts: Arc<usvg::fontdb::Database>,
    vector_fonts: Arc<svg2pdf::usvg::fontdb::Database>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        let mut raster = usvg::fontdb::Database::new();
        fonts::install_fonts!(raster, &config.fonts, usvg::fontdb);
        let mut vector = svg2pdf::usvg::fontdb::Database::new();
        fonts::install_fonts!(vector, &config.fonts, svg2pdf::usvg::fontdb);
        info!(
            faces = raster.len(),
            margin_in = config.margin_in(),
            supersample = config.supersample(),
            "exporter ready"
        );
        Exporter {
            config,
            raster_fonts: Arc::new(raster),
            vector_fonts: Arc::new(vector),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub(crate) fn raster_fonts(&self) -> &Arc<usvg::fontdb::Database> {
        &self.raster_fonts
    }

    fn parse_vector(&self, svg: &str) -> Result<svg2pdf::usvg::Tree, String> {
        let mut opt = svg2pdf::usvg::Options::default();
        opt.fontdb = Arc::clone(&self.vector_fonts);
        svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|e| format!("{e:?}"))
    }

    fn image_chunk(&self, href: &str, size: Size) -> Result<(Chunk, Ref), ElementError> {
        let tree = self
            .parse_vector(&image::image_svg(href, size.width, size.height))
            .map_err(ElementError::Image)?;
        // usvg drops images it cannot decode, leaving an empty tree.
        if !tree.root().has_children() {
            return Err(ElementError::Image("no decodable image data".into()));
        }
        svg2pdf::to_chunk(&tree, ConversionOptions::default())
            .map_err(|e| ElementError::Conversion(format!("{e:?}")))
    }

    fn prepare(&self, layout: &PageLayout, overlay: &Overlay) -> Result<Prepared, ElementError> {
        let size = overlay.size;
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(ElementError::EmptyBox {
                width: size.width,
                height: size.height,
            });
        }
        match &overlay.kind {
            OverlayKind::Image { src } => {
                let href = image::resolve_href(src)?;
                let (chunk, root) = self.image_chunk(&href, size)?;
                Ok(Prepared::XObject {
                    chunk,
                    root,
                    rect: layout.map_rect(overlay.position, size),
                    placement: Placement::Image,
                })
            }
            OverlayKind::Text {
                text: content,
                text_style,
            } => {
                let b = TextBox {
                    text: content,
                    style: text_style,
                    position: overlay.position,
                    size,
                    rotation: overlay.rotation,
                };
                let raster = text::rasterize(
                    &b,
                    self.config.supersample(),
                    self.config.max_raster_px,
                    &self.raster_fonts,
                );
                match raster {
                    Ok(r) => {
                        let href = image::data_url("image/png", &r.png);
                        let (chunk, root) = self.image_chunk(&href, r.size)?;
                        Ok(Prepared::XObject {
                            chunk,
                            root,
                            rect: layout.map_rect(r.origin, r.size),
                            placement: Placement::RasterText,
                        })
                    }
                    Err(e) if self.config.text_fallback => {
                        warn!(
                            id = %overlay.id,
                            error = %e,
                            "text rasterization failed, using native text"
                        );
                        let rect = layout.map_rect(overlay.position, size);
                        Ok(Prepared::Text {
                            text: fallback::layout_text(
                                content,
                                text_style,
                                &rect,
                                overlay.rotation,
                                layout,
                            ),
                            rect,
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Build the PDF. Fails only when the page itself cannot be produced;
    /// overlays that cannot be placed are listed in
    /// [`ExportOutcome::failures`].
    pub fn export(&self, job: &ExportJob<'_>) -> Result<ExportOutcome, ExportError> {
        if job.diagram_svg.trim().is_empty() {
            return Err(ExportError::MissingDiagram);
        }
        let layout = PageLayout::compute(&job.frame, job.container, self.config.margin_in())?;
        let diagram = self
            .parse_vector(job.diagram_svg)
            .map_err(ExportError::DiagramParse)?;
        let (diagram_chunk, diagram_root) =
            svg2pdf::to_chunk(&diagram, ConversionOptions::default())
                .map_err(|e| ExportError::DiagramConversion(format!("{e:?}")))?;
        debug!(
            page_w = layout.page_width_in,
            page_h = layout.page_height_in,
            overlays = job.overlays.len(),
            "page laid out"
        );

        // Order-preserving: results come back in layer order.
        let prepared: Vec<Result<Prepared, ElementError>> = job
            .overlays
            .par_iter()
            .map(|o| self.prepare(&layout, o))
            .collect();

        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();
        let page_id = alloc.bump();
        let content_id = alloc.bump();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let mut content = Content::new();
        let mut x_objects: Vec<(String, Ref)> = Vec::new();
        let mut fonts_used: Vec<(&'static str, Ref)> = Vec::new();

        let diagram_ref = embed(&mut pdf, &mut alloc, &diagram_chunk, diagram_root);
        x_objects.push(("D0".to_string(), diagram_ref));
        content.save_state();
        content.transform(layout.placement_matrix(&layout.diagram));
        content.x_object(Name(b"D0"));
        content.restore_state();

        let mut placed = Vec::new();
        let mut failures = Vec::new();
        for (index, (overlay, result)) in job.overlays.iter().zip(prepared).enumerate() {
            match result {
                Ok(Prepared::XObject {
                    chunk,
                    root,
                    rect,
                    placement,
                }) => {
                    let id = embed(&mut pdf, &mut alloc, &chunk, root);
                    let name = format!("X{index}");
                    content.save_state();
                    content.transform(layout.placement_matrix(&rect));
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                    x_objects.push((name, id));
                    placed.push(PlacedElement {
                        index,
                        id: overlay.id.clone(),
                        placement,
                        rect,
                    });
                }
                Ok(Prepared::Text { text, rect }) => {
                    let slot = match fonts_used.iter().position(|(f, _)| *f == text.font) {
                        Some(i) => i,
                        None => {
                            fonts_used.push((text.font, alloc.bump()));
                            fonts_used.len() - 1
                        }
                    };
                    write_text(&mut content, &format!("F{slot}"), &text);
                    placed.push(PlacedElement {
                        index,
                        id: overlay.id.clone(),
                        placement: Placement::NativeText,
                        rect,
                    });
                }
                Err(error) => {
                    warn!(
                        index,
                        id = %overlay.id,
                        kind = overlay.kind_name(),
                        error = %error,
                        "overlay skipped"
                    );
                    failures.push(ElementFailure {
                        index,
                        id: overlay.id.clone(),
                        error,
                    });
                }
            }
        }

        pdf.stream(content_id, &content.finish());
        {
            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(
                0.0,
                0.0,
                layout.page_width_pt(),
                layout.page_height_pt(),
            ));
            page.parent(page_tree_id);
            page.contents(content_id);
            let mut resources = page.resources();
            {
                let mut dict = resources.x_objects();
                for (name, id) in &x_objects {
                    dict.pair(Name(name.as_bytes()), *id);
                }
            }
            if !fonts_used.is_empty() {
                let mut dict = resources.fonts();
                for (slot, (_, id)) in fonts_used.iter().enumerate() {
                    let name = format!("F{slot}");
                    dict.pair(Name(name.as_bytes()), *id);
                }
            }
        }
        for (font, id) in &fonts_used {
            pdf.type1_font(*id)
                .base_font(Name(font.as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let bytes = pdf.finish();
        info!(
            file = %layout.file_name(),
            placed = placed.len(),
            failed = failures.len(),
            "export assembled"
        );
        Ok(ExportOutcome {
            bytes,
            file_name: layout.file_name(),
            layout,
            placed,
            failures,
        })
    }

    /// Export and write into `dir`. Nothing is written when the export fails.
    pub fn export_to(
        &self,
        job: &ExportJob<'_>,
        dir: &Path,
    ) -> Result<(PathBuf, ExportOutcome), ExportError> {
        let outcome = self.export(job)?;
        let path = outcome.write_into(dir)?;
        Ok((path, outcome))
    }
}

/// Copy `chunk` into `pdf` under fresh ids; returns the new id of `root`.
fn embed(pdf: &mut Pdf, alloc: &mut Ref, chunk: &Chunk, root: Ref) -> Ref {
    let mut map = HashMap::new();
    let renumbered = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
    pdf.extend(&renumbered);
    *map.entry(root).or_insert_with(|| alloc.bump())
}

fn write_text(content: &mut Content, font: &str, text: &FallbackText) {
    let (r, g, b) = text.color;
    content.save_state();
    content.set_fill_rgb(r, g, b);
    for line in &text.lines {
        content.begin_text();
        content.set_font(Name(font.as_bytes()), text.size_pt);
        content.set_text_matrix(line.matrix);
        content.show(Str(&line.bytes));
        content.end_text();
    }
    content.restore_state();
}

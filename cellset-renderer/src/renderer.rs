//! FILENAME: cellset-renderer/src/renderer.rs
//! Cell Set Renderer - paints a query result onto a surface, page by page.
//!
//! The renderer keeps the query it was created from untouched and drills on a
//! deep copy of it (the working query). Each page is rendered in three phases:
//! 1. Measure: row height, column header height, rows per page
//! 2. Column headers: one band per hierarchy, stacked downward
//! 3. Row headers and body cells for the page's slice of the row axis
//!
//! Interactive (non-printing) passes also rebuild the member-region map that
//! pointer hit testing runs against. Printing passes leave it alone.

use std::ops::Range;
use std::sync::Arc;

use log::{debug, info, warn};
use olap_engine::{
    deep_copy, toggle_expand_collapse, CellSet, EventChannel, MemberId, OlapBackend, Query,
    SubscriptionId, ToggleOutcome,
};

use crate::error::RendererError;
use crate::geometry::{Point, Rect};
use crate::header::{layout_column_headers, layout_row_headers, AxisLayout};
use crate::number_format::{format_cell, NumberFormat};
use crate::pager::PageGeometry;
use crate::regions::MemberRegionMap;
use crate::settings::RendererSettings;
use crate::style::{Color, Font, HorizontalAlignment, Palette};
use crate::surface::Surface;
use crate::widths::column_widths;

/// Drawn in place of the grid while there is no cell set.
pub const EMPTY_CELL_SET_MESSAGE: &str = "Empty cell set.";

pub type SharedBackend = Arc<dyn OlapBackend + Send + Sync>;

/// What a call to [`CellSetRenderer::render_page`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was filled and more rows remain.
    MorePages,
    /// The page holds the end of the row axis.
    LastPage,
    /// Not even one row fits below the column headers.
    PageTooSmall,
    /// The cell set has no columns or no rows.
    NothingToRender,
    /// No cell set yet; the empty message was drawn.
    Empty,
    /// The last execution failed; its message was drawn.
    Failed,
}

impl PageOutcome {
    pub fn has_more_pages(self) -> bool {
        matches!(self, PageOutcome::MorePages)
    }
}

/// Property changes published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    NameChanged(String),
    SelectedMemberChanged {
        old: Option<MemberId>,
        new: Option<MemberId>,
    },
    CellSetChanged,
    ExecutionFailed(String),
    HeaderFontChanged(Font),
    BodyFontChanged(Font),
    BodyAlignmentChanged(HorizontalAlignment),
    BodyFormatChanged(Option<NumberFormat>),
    PaletteChanged,
}

/// Everything one page pass needs, computed up front.
struct PagePass<'a> {
    cell_set: &'a CellSet,
    widths: &'a [f64],
    header_font: Font,
    body_font: Font,
    body_format: Option<NumberFormat>,
    header_line: f64,
    row_height: f64,
    rows: Range<usize>,
    content: Rect,
    /// Top-left of the body: below the column headers, right of the row headers.
    body_origin: Point,
    printing: bool,
}

pub struct CellSetRenderer {
    name: String,
    backend: SharedBackend,
    original_query: Query,
    working_query: Option<Query>,
    cell_set: Option<Arc<CellSet>>,
    error_message: Option<String>,
    settings: RendererSettings,
    selected_member: Option<MemberId>,
    regions: MemberRegionMap,
    events: EventChannel<RendererEvent>,
    init_done: bool,
}

impl CellSetRenderer {
    pub fn new(query: Query, backend: SharedBackend) -> Self {
        debug!("Initializing a new cell set renderer for '{}'", query.name());
        CellSetRenderer {
            name: query.name().to_string(),
            backend,
            original_query: query,
            working_query: None,
            cell_set: None,
            error_message: None,
            settings: RendererSettings::default(),
            selected_member: None,
            regions: MemberRegionMap::new(),
            events: EventChannel::new(),
            init_done: false,
        }
    }

    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Copies the working query on first use and executes it. Runs at most
    /// once; a failed execution is kept as the error message and can be
    /// retried with [`CellSetRenderer::execute`].
    pub fn init(&mut self) {
        if self.init_done {
            return;
        }
        self.init_done = true;
        if let Err(e) = self.execute() {
            debug!("Initial execution of '{}' failed: {}", self.name, e);
        }
    }

    /// Executes the working query and replaces the cell set wholesale.
    pub fn execute(&mut self) -> Result<(), RendererError> {
        self.init_done = true;
        let query = match self.working_query.take() {
            Some(query) => query,
            None => match deep_copy(&self.original_query) {
                Ok(copy) => copy,
                Err(e) => {
                    self.record_failure(e.to_string());
                    return Err(e.into());
                }
            },
        };
        let result = self.backend.execute(&query);
        self.working_query = Some(query);

        match result {
            Ok(cell_set) => {
                info!(
                    "Query '{}' returned {} columns x {} rows",
                    self.name,
                    cell_set.column_count(),
                    cell_set.row_count()
                );
                self.error_message = None;
                self.set_cell_set(Some(Arc::new(cell_set)));
                Ok(())
            }
            Err(e) => {
                self.record_failure(e.to_string());
                Err(e.into())
            }
        }
    }

    fn record_failure(&mut self, cause: String) {
        warn!("Error while executing query '{}': {}", self.name, cause);
        let message = format!("Error when executing query:\n{}", cause);
        self.error_message = Some(message.clone());
        self.set_cell_set(None);
        self.events.publish(&RendererEvent::ExecutionFailed(message));
    }

    fn set_cell_set(&mut self, cell_set: Option<Arc<CellSet>>) {
        self.cell_set = cell_set;
        self.regions.clear();
        self.events.publish(&RendererEvent::CellSetChanged);
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Renders page `page_index` of the cell set into `content`.
    pub fn render_page(
        &mut self,
        surface: &mut dyn Surface,
        content: Rect,
        page_index: usize,
        printing: bool,
    ) -> PageOutcome {
        self.init();
        let header_font = self.resolve_header_font(&*surface);
        let body_font = self.resolve_body_font(&*surface);
        let header_line = surface.line_height(&header_font);
        surface.set_font(&header_font);

        if let Some(message) = self.error_message.clone() {
            let foreground = self.settings.foreground;
            for (line, text) in message.lines().enumerate() {
                let baseline = content.y + (line as f64 + 1.0) * header_line;
                surface.draw_text(text, content.x, baseline, &header_font, foreground);
            }
            return PageOutcome::Failed;
        }
        let Some(cell_set) = self.cell_set.clone() else {
            let foreground = self.settings.foreground;
            surface.draw_text(
                EMPTY_CELL_SET_MESSAGE,
                content.x,
                content.y + header_line,
                &header_font,
                foreground,
            );
            return PageOutcome::Empty;
        };

        if !printing {
            self.regions.clear();
        }
        if cell_set.column_count() == 0 || cell_set.row_count() == 0 {
            debug!("Nothing to render for '{}'", self.name);
            return PageOutcome::NothingToRender;
        }

        // Phase 1: measure.
        let body_format = self.settings.body_format.clone();
        let widths = column_widths(
            &cell_set,
            surface,
            &header_font,
            &body_font,
            body_format.as_ref(),
        );
        let catalog = Arc::clone(cell_set.catalog());
        let column_layout =
            layout_column_headers(cell_set.columns(), &catalog, header_line, &widths);
        let geometry = PageGeometry::measure(
            header_line,
            surface.line_height(&body_font),
            column_layout.thickness(),
            content.height,
        );
        if !geometry.fits_rows() {
            debug!(
                "Page of height {} is too small for '{}' below {} of headers",
                content.height,
                self.name,
                column_layout.thickness()
            );
            return PageOutcome::PageTooSmall;
        }
        let row_layout = layout_row_headers(
            cell_set.rows(),
            &catalog,
            &*surface,
            &header_font,
            header_line,
            geometry.row_height,
        );

        let pass = PagePass {
            cell_set: &cell_set,
            widths: &widths,
            header_font,
            body_font,
            body_format,
            header_line,
            row_height: geometry.row_height,
            rows: geometry.page_rows(page_index, cell_set.row_count()),
            content,
            body_origin: Point::new(
                content.x + row_layout.thickness(),
                content.y + column_layout.thickness(),
            ),
            printing,
        };

        // Phase 2 and 3: paint.
        self.paint_column_headers(surface, &column_layout, &pass);
        self.paint_row_headers(surface, &row_layout, &pass);
        self.paint_body(surface, &pass);

        debug!(
            "Rendered page {} of '{}' (rows {:?}, printing: {})",
            page_index, self.name, pass.rows, printing
        );
        if geometry.has_more_after(page_index, cell_set.row_count()) {
            PageOutcome::MorePages
        } else {
            PageOutcome::LastPage
        }
    }

    /// Number of pages the current cell set needs in `content`.
    pub fn page_count(&mut self, surface: &dyn Surface, content: Rect) -> usize {
        self.init();
        let Some(cell_set) = self.cell_set.clone() else {
            return 0;
        };
        if cell_set.column_count() == 0 || cell_set.row_count() == 0 {
            return 0;
        }
        let header_font = self.resolve_header_font(surface);
        let body_font = self.resolve_body_font(surface);
        let header_line = surface.line_height(&header_font);
        // Column header height does not depend on column widths.
        let column_layout =
            layout_column_headers(cell_set.columns(), cell_set.catalog(), header_line, &[]);
        PageGeometry::measure(
            header_line,
            surface.line_height(&body_font),
            column_layout.thickness(),
            content.height,
        )
        .page_count(cell_set.row_count())
    }

    fn paint_column_headers(
        &mut self,
        surface: &mut dyn Surface,
        layout: &AxisLayout,
        pass: &PagePass<'_>,
    ) {
        let left = pass.body_origin.x;
        let band_width = (pass.content.right() - left).max(0.0);
        let alignment = self.settings.body_alignment;
        let mut band_top = pass.content.y;

        surface.set_font(&pass.header_font);
        for (index, hierarchy) in layout.hierarchies.iter().enumerate() {
            surface.fill_rect(
                Rect::new(left, band_top, band_width, hierarchy.thickness),
                self.settings.palette.color_for(index),
            );
            for item in &hierarchy.items {
                let bounds = item.bounds.translate(left, band_top);
                let text_width = surface.measure(&pass.header_font, &item.text);
                let x = bounds.x + alignment.offset(bounds.width, text_width);
                let color = self.text_color(item.member);
                surface.draw_text(&item.text, x, bounds.y + pass.header_line, &pass.header_font, color);
                if !pass.printing {
                    self.regions.record(item.member, bounds);
                }
            }
            band_top += hierarchy.thickness;
        }
    }

    fn paint_row_headers(
        &mut self,
        surface: &mut dyn Surface,
        layout: &AxisLayout,
        pass: &PagePass<'_>,
    ) {
        let top = pass.body_origin.y;
        let band_height = (pass.content.bottom() - top).max(0.0);
        let mut band_left = pass.content.x;

        for (index, hierarchy) in layout.hierarchies.iter().enumerate() {
            surface.fill_rect(
                Rect::new(band_left, top, hierarchy.thickness, band_height),
                self.settings.palette.color_for(index),
            );
            for item in &hierarchy.items {
                // A band crossing the page boundary is clipped and repeated.
                let first = item.first_position.max(pass.rows.start);
                let end = (item.first_position + item.span).min(pass.rows.end);
                if first >= end {
                    continue;
                }
                let bounds = Rect::new(
                    band_left + item.bounds.x,
                    top + (first - pass.rows.start) as f64 * pass.row_height,
                    item.bounds.width,
                    (end - first) as f64 * pass.row_height,
                );
                let color = self.text_color(item.member);
                surface.draw_text(
                    &item.text,
                    bounds.x,
                    bounds.y + pass.row_height,
                    &pass.header_font,
                    color,
                );
                if !pass.printing {
                    self.regions.record(item.member, bounds);
                }
            }
            band_left += hierarchy.thickness;
        }
    }

    fn paint_body(&self, surface: &mut dyn Surface, pass: &PagePass<'_>) {
        let alignment = self.settings.body_alignment;
        let foreground = self.settings.foreground;

        surface.set_font(&pass.body_font);
        for (line, row) in pass.rows.clone().enumerate() {
            let baseline = pass.body_origin.y + (line as f64 + 1.0) * pass.row_height;
            let mut x = pass.body_origin.x;
            for (column, width) in pass.widths.iter().enumerate() {
                if let Some(cell) = pass.cell_set.cell(column, row) {
                    let text = format_cell(cell, pass.body_format.as_ref());
                    let shift = alignment.offset(*width, surface.measure(&pass.body_font, &text));
                    surface.draw_text(&text, x + shift, baseline, &pass.body_font, foreground);
                }
                x += width;
            }
        }
    }

    fn text_color(&self, member: MemberId) -> Color {
        if self.selected_member == Some(member) {
            self.settings.selection_color
        } else {
            self.settings.foreground
        }
    }

    fn resolve_header_font(&mut self, surface: &dyn Surface) -> Font {
        match &self.settings.header_font {
            Some(font) => font.clone(),
            None => {
                let font = surface.current_font();
                self.set_header_font(font.clone());
                font
            }
        }
    }

    fn resolve_body_font(&mut self, surface: &dyn Surface) -> Font {
        match &self.settings.body_font {
            Some(font) => font.clone(),
            None => {
                let font = surface.current_font();
                self.set_body_font(font.clone());
                font
            }
        }
    }

    // ========================================================================
    // SELECTION & DRILLING
    // ========================================================================

    /// Selects the header member drawn at `point` in the last interactive
    /// render, or clears the selection if there is none.
    pub fn select_member_at(&mut self, point: Point) -> Option<MemberId> {
        let hit = self.regions.hit_test(point);
        self.set_selected_member(hit);
        hit
    }

    pub fn set_selected_member(&mut self, member: Option<MemberId>) {
        if self.selected_member == member {
            return;
        }
        let old = self.selected_member;
        self.selected_member = member;
        self.events.publish(&RendererEvent::SelectedMemberChanged { old, new: member });
    }

    pub fn selected_member(&self) -> Option<MemberId> {
        self.selected_member
    }

    /// Expands or collapses the selected member on the working query and
    /// re-executes it. A no-op when nothing is selected. If the re-execution
    /// fails the working query is put back as it was and the failure is kept
    /// as the error message.
    pub fn toggle_selected_member(&mut self) -> Result<ToggleOutcome, RendererError> {
        let Some(member) = self.selected_member else {
            return Ok(ToggleOutcome::NothingSelected);
        };
        self.init();
        if self.working_query.is_none() {
            self.working_query = Some(deep_copy(&self.original_query)?);
        }
        let backend = Arc::clone(&self.backend);
        let Some(query) = self.working_query.as_mut() else {
            return Ok(ToggleOutcome::NoEligibleDimension);
        };

        let before = deep_copy(query)?;

        let outcome = toggle_expand_collapse(query, member, &*backend)?;
        if matches!(
            outcome,
            ToggleOutcome::Expanded { .. } | ToggleOutcome::Collapsed { .. }
        ) {
            if let Err(e) = self.execute() {
                // The failure stays visible; the drill step is undone.
                self.working_query = Some(before);
                return Err(e);
            }
        }
        Ok(outcome)
    }

    /// Throws away all drilling by re-copying the original query.
    pub fn reset_working_query(&mut self) -> Result<(), RendererError> {
        self.working_query = Some(deep_copy(&self.original_query)?);
        self.execute()
    }

    /// An independent renderer with the same settings and result. Its working
    /// query is a deep copy, so drilling in one never shows in the other.
    pub fn duplicate(&self) -> Result<Self, RendererError> {
        Ok(CellSetRenderer {
            name: self.name.clone(),
            backend: Arc::clone(&self.backend),
            original_query: deep_copy(&self.original_query)?,
            working_query: self.working_query.as_ref().map(deep_copy).transpose()?,
            cell_set: self.cell_set.clone(),
            error_message: self.error_message.clone(),
            settings: self.settings.clone(),
            selected_member: None,
            regions: MemberRegionMap::new(),
            events: EventChannel::new(),
            init_done: self.init_done,
        })
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the original query; the renderer's name follows it.
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.original_query.rename(name.clone());
        self.name = name.clone();
        self.events.publish(&RendererEvent::NameChanged(name));
    }

    pub fn original_query(&self) -> &Query {
        &self.original_query
    }

    pub fn working_query(&self) -> Option<&Query> {
        self.working_query.as_ref()
    }

    pub fn cell_set(&self) -> Option<&Arc<CellSet>> {
        self.cell_set.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn member_regions(&self) -> &MemberRegionMap {
        &self.regions
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn set_header_font(&mut self, font: Font) {
        self.settings.header_font = Some(font.clone());
        self.events.publish(&RendererEvent::HeaderFontChanged(font));
    }

    pub fn set_body_font(&mut self, font: Font) {
        self.settings.body_font = Some(font.clone());
        self.events.publish(&RendererEvent::BodyFontChanged(font));
    }

    pub fn set_body_alignment(&mut self, alignment: HorizontalAlignment) {
        self.settings.body_alignment = alignment;
        self.events.publish(&RendererEvent::BodyAlignmentChanged(alignment));
    }

    pub fn set_body_format(&mut self, format: Option<NumberFormat>) {
        self.settings.body_format = format.clone();
        self.events.publish(&RendererEvent::BodyFormatChanged(format));
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.settings.palette = palette;
        self.events.publish(&RendererEvent::PaletteChanged);
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&RendererEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

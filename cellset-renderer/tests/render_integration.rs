//! FILENAME: tests/render_integration.rs
//! Integration tests for page rendering, pagination and pointer selection.

mod common;

use std::sync::Arc;

use cellset_renderer::{
    CellSetRenderer, Color, Font, HorizontalAlignment, PageOutcome, Palette, Point, Rect,
    RendererError, RendererSettings, SharedBackend,
};
use common::{surface, FixedBackend, ProductCube, QuarterGrid};
use olap_engine::{
    AxisLocation, BackendError, CellSet, CellSetAxis, Query, QueryError, ToggleOutcome,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Header font 14, body font 12.
fn quarter_settings() -> RendererSettings {
    RendererSettings {
        header_font: Some(Font::new("Mono", 14)),
        body_font: Some(Font::new("Mono", 12)),
        ..RendererSettings::default()
    }
}

const LARGE_PAGE: Rect = Rect::new(0.0, 0.0, 300.0, 200.0);

/// Column header line 10 + ten rows of 10.
const TEN_ROW_PAGE: Rect = Rect::new(0.0, 0.0, 300.0, 110.0);

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn test_two_hierarchy_column_headers() {
    let grid = QuarterGrid::new();
    let mut renderer = grid.renderer().with_settings(quarter_settings());
    let mut s = surface(12);

    let outcome = renderer.render_page(&mut s, LARGE_PAGE, 0, false);
    assert_eq!(outcome, PageOutcome::LastPage);

    // Columns are 18 wide ("JanSales" + 10), row headers 15 ("North" + 10).
    // Each column hierarchy is one 14 high line, so the body starts at 28.
    assert_eq!(s.find_text("Q1").map(|t| (t.0, t.1)), Some((49.0, 14.0)));
    assert_eq!(s.find_text("Q2").map(|t| (t.0, t.1)), Some((67.0, 14.0)));
    assert_eq!(s.find_text("JanSales").map(|t| (t.0, t.1)), Some((25.0, 28.0)));
    assert_eq!(s.find_text("AprSales").map(|t| (t.0, t.1)), Some((61.0, 28.0)));
    assert_eq!(s.find_text("North").map(|t| (t.0, t.1)), Some((0.0, 42.0)));
    assert_eq!(s.find_text("South").map(|t| (t.0, t.1)), Some((0.0, 56.0)));
    assert_eq!(s.find_text("10").map(|t| (t.0, t.1)), Some((31.0, 42.0)));
    assert_eq!(s.find_text("60").map(|t| (t.0, t.1)), Some((67.0, 56.0)));

    let regions = renderer.member_regions();
    assert_eq!(regions.regions_of(grid.q1), &[Rect::new(15.0, 0.0, 36.0, 14.0)]);
    assert_eq!(regions.regions_of(grid.feb_sales), &[Rect::new(33.0, 14.0, 18.0, 14.0)]);
    assert_eq!(regions.regions_of(grid.south), &[Rect::new(0.0, 42.0, 15.0, 14.0)]);
}

#[test]
fn test_header_bands_are_filled_per_hierarchy() {
    let grid = QuarterGrid::new();
    let palette = Palette::new(vec![Color::new(1, 1, 1), Color::new(2, 2, 2)]);
    let mut renderer = grid.renderer().with_settings(RendererSettings {
        palette: palette.clone(),
        ..quarter_settings()
    });
    let mut s = surface(12);
    renderer.render_page(&mut s, LARGE_PAGE, 0, false);

    assert_eq!(
        s.fills(),
        vec![
            (Rect::new(15.0, 0.0, 285.0, 14.0), palette.color_for(0)),
            (Rect::new(15.0, 14.0, 285.0, 14.0), palette.color_for(1)),
            (Rect::new(0.0, 28.0, 15.0, 172.0), palette.color_for(0)),
        ]
    );
}

#[test]
fn test_alignment_moves_body_and_column_headers() {
    let grid = QuarterGrid::new();
    let mut renderer = grid.renderer().with_settings(quarter_settings());
    renderer.set_body_alignment(HorizontalAlignment::Left);
    let mut s = surface(12);
    renderer.render_page(&mut s, LARGE_PAGE, 0, false);

    assert_eq!(s.find_text("Q1").map(|t| t.0), Some(15.0));
    assert_eq!(s.find_text("10").map(|t| t.0), Some(15.0));

    renderer.set_body_alignment(HorizontalAlignment::Center);
    s.clear();
    renderer.render_page(&mut s, LARGE_PAGE, 0, false);
    // (36 - 2) / 2 and (18 - 2) / 2
    assert_eq!(s.find_text("Q1").map(|t| t.0), Some(32.0));
    assert_eq!(s.find_text("10").map(|t| t.0), Some(23.0));
}

#[test]
fn test_content_origin_offsets_everything() {
    let grid = QuarterGrid::new();
    let mut renderer = grid.renderer().with_settings(quarter_settings());
    let mut s = surface(12);
    renderer.render_page(&mut s, Rect::new(100.0, 50.0, 300.0, 200.0), 0, false);

    assert_eq!(s.find_text("Q1").map(|t| (t.0, t.1)), Some((149.0, 64.0)));
    assert_eq!(renderer.select_member_at(Point::new(105.0, 85.0)), Some(grid.north));
}

#[test]
fn test_fonts_default_to_surface_font() {
    let grid = QuarterGrid::new();
    let mut renderer = grid.renderer();
    let mut s = surface(9);
    renderer.render_page(&mut s, LARGE_PAGE, 0, false);

    assert_eq!(renderer.settings().header_font, Some(Font::new("Mono", 9)));
    assert_eq!(renderer.settings().body_font, Some(Font::new("Mono", 9)));
    assert_eq!(s.find_text("Q1").map(|t| t.1), Some(9.0));
}

// ============================================================================
// PAGINATION
// ============================================================================

#[test]
fn test_twenty_five_rows_over_three_pages() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);

    let outcomes: Vec<PageOutcome> = (0..3)
        .map(|page| renderer.render_page(&mut s, TEN_ROW_PAGE, page, true))
        .collect();
    assert_eq!(
        outcomes,
        vec![PageOutcome::MorePages, PageOutcome::MorePages, PageOutcome::LastPage]
    );
    assert!(outcomes[0].has_more_pages());
    assert!(!outcomes[2].has_more_pages());
    assert_eq!(renderer.page_count(&s, TEN_ROW_PAGE), 3);
}

#[test]
fn test_last_page_only_draws_remaining_rows() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 2, false);

    assert!(s.find_text("P20").is_none());
    assert_eq!(s.find_text("P21").map(|t| t.1), Some(20.0));
    assert_eq!(s.find_text("P25").map(|t| t.1), Some(60.0));
    assert_eq!(s.texts().iter().filter(|t| t.0 == "7").count(), 5);
}

#[test]
fn test_spanning_row_header_repeats_on_each_page() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.region_products_query());
    let mut s = surface(10);
    let north = cube.member("[Region].[North]");
    let south = cube.member("[Region].[South]");

    renderer.render_page(&mut s, TEN_ROW_PAGE, 1, false);
    assert_eq!(s.find_text("North").map(|t| t.1), Some(20.0));
    assert_eq!(
        renderer.member_regions().regions_of(north),
        &[Rect::new(0.0, 10.0, 15.0, 100.0)]
    );

    s.clear();
    renderer.render_page(&mut s, TEN_ROW_PAGE, 2, false);
    assert_eq!(
        renderer.member_regions().regions_of(north),
        &[Rect::new(0.0, 10.0, 15.0, 50.0)]
    );
    assert_eq!(
        renderer.member_regions().regions_of(south),
        &[Rect::new(0.0, 60.0, 15.0, 50.0)]
    );
    assert_eq!(renderer.select_member_at(Point::new(5.0, 70.0)), Some(south));
    assert_eq!(renderer.page_count(&s, TEN_ROW_PAGE), 5);
}

#[test]
fn test_row_header_band_fills_short_last_page() {
    let cube = ProductCube::new();
    let palette = Palette::new(vec![Color::new(3, 3, 3)]);
    let mut renderer = cube.renderer(cube.products_query()).with_settings(RendererSettings {
        palette: palette.clone(),
        ..RendererSettings::default()
    });
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 2, false);

    // Five rows remain, but the band runs to the bottom of the page.
    assert_eq!(
        s.fills().last(),
        Some(&(Rect::new(0.0, 10.0, 13.0, 100.0), palette.color_for(0)))
    );
}

#[test]
fn test_page_too_small_for_one_row() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    let outcome = renderer.render_page(&mut s, Rect::new(0.0, 0.0, 300.0, 15.0), 0, false);
    assert_eq!(outcome, PageOutcome::PageTooSmall);
    assert!(!outcome.has_more_pages());
}

// ============================================================================
// EMPTY AND FAILED RESULTS
// ============================================================================

#[test]
fn test_result_without_rows_renders_nothing() {
    let grid = QuarterGrid::new();
    let empty = CellSet::new(
        Arc::clone(&grid.catalog),
        grid.cell_set().columns().clone(),
        CellSetAxis::empty(AxisLocation::Rows),
        Vec::new(),
    )
    .unwrap();
    let backend: SharedBackend = Arc::new(FixedBackend::new(empty));
    let mut renderer =
        CellSetRenderer::new(Query::new("Empty", Arc::clone(&grid.catalog)), backend);
    let mut s = surface(12);

    let outcome = renderer.render_page(&mut s, LARGE_PAGE, 0, false);
    assert_eq!(outcome, PageOutcome::NothingToRender);
    assert!(s.ops().is_empty());
    assert!(renderer.member_regions().is_empty());
    assert_eq!(renderer.page_count(&s, LARGE_PAGE), 0);
}

#[test]
fn test_execution_failure_is_drawn_instead_of_grid() {
    let cube = ProductCube::new();
    cube.backend
        .set_execution_failure(Some("connection reset".to_string()));
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);

    assert_eq!(
        renderer.render_page(&mut s, TEN_ROW_PAGE, 0, false),
        PageOutcome::Failed
    );
    assert_eq!(
        s.texts(),
        vec![
            ("Error when executing query:", 0.0, 10.0),
            ("Query execution failed: connection reset", 0.0, 20.0),
        ]
    );
    assert!(renderer.cell_set().is_none());
    assert!(renderer.member_regions().is_empty());
}

// ============================================================================
// SELECTION
// ============================================================================

#[test]
fn test_printing_does_not_touch_member_regions() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 0, false);
    let p01 = cube.member("[Product].[P01]");
    let before = renderer.member_regions().regions_of(p01).to_vec();
    assert_eq!(before.len(), 1);

    renderer.render_page(&mut s, TEN_ROW_PAGE, 1, true);
    assert_eq!(renderer.member_regions().regions_of(p01), before.as_slice());
    assert!(renderer
        .member_regions()
        .regions_of(cube.member("[Product].[P11]"))
        .is_empty());
}

#[test]
fn test_hit_inside_and_outside_headers() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 0, false);

    let p02 = cube.member("[Product].[P02]");
    assert_eq!(renderer.select_member_at(Point::new(1.0, 25.0)), Some(p02));
    assert_eq!(renderer.selected_member(), Some(p02));
    // Body cells are not selectable.
    assert_eq!(renderer.select_member_at(Point::new(20.0, 25.0)), None);
    assert_eq!(renderer.selected_member(), None);
}

#[test]
fn test_toggle_member_without_children_reexecutes() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 0, false);
    let sales = cube.member("[Measures].[Sales]");

    // "Sales" header sits right of the 13 wide row headers.
    assert_eq!(renderer.select_member_at(Point::new(14.0, 5.0)), Some(sales));
    let outcome = renderer.toggle_selected_member().unwrap();
    assert_eq!(outcome, ToggleOutcome::Expanded { added: 0 });
    assert_eq!(cube.backend.executions(), 2);
    assert_eq!(renderer.cell_set().unwrap().column_count(), 1);

    // The fresh result starts with an empty region map.
    assert!(renderer.member_regions().is_empty());
}

#[test]
fn test_selection_outside_both_axes_is_reported() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    renderer.set_selected_member(Some(cube.member("[Region].[North]")));
    assert_eq!(
        renderer.toggle_selected_member().unwrap(),
        ToggleOutcome::NoEligibleDimension
    );
    assert_eq!(cube.backend.executions(), 1);
}

#[test]
fn test_child_fetch_failure_keeps_current_result() {
    let cube = ProductCube::new();
    let mut renderer = cube.renderer(cube.products_query());
    let mut s = surface(10);
    renderer.render_page(&mut s, TEN_ROW_PAGE, 0, false);
    renderer.set_selected_member(Some(cube.member("[Measures].[Sales]")));
    cube.backend
        .set_children_failure(Some("cube offline".to_string()));

    let err = renderer.toggle_selected_member().unwrap_err();
    assert_eq!(
        err,
        RendererError::Query(QueryError::Backend(BackendError::Unavailable(
            "cube offline".to_string()
        )))
    );
    assert_eq!(renderer.cell_set().unwrap().row_count(), 25);
    assert!(renderer.error_message().is_none());
    assert_eq!(cube.backend.executions(), 1);
}

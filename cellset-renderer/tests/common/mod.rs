//! FILENAME: tests/common/mod.rs
//! Cubes, backends and surfaces shared by the renderer integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cellset_renderer::{CellSetRenderer, Font, RecordingSurface, SharedBackend};
use olap_engine::{
    AxisLocation, BackendError, Catalog, CatalogBuilder, Cell, CellSet, CellSetAxis, CellValue,
    DimensionId, MemberId, MemoryBackend, OlapBackend, Query, SelectionOperator,
};
use smallvec::smallvec;

/// Monospaced surface: one unit per character, lines as tall as the font size.
pub fn surface(font_size: u16) -> RecordingSurface {
    RecordingSurface::new(Font::new("Mono", font_size), 1.0)
}

// ============================================================================
// PRODUCT CUBE
// ============================================================================

/// One measure, two regions and 25 products, all flat.
pub struct ProductCube {
    pub catalog: Arc<Catalog>,
    pub backend: Arc<MemoryBackend>,
    pub measures: DimensionId,
    pub region: DimensionId,
    pub product: DimensionId,
}

impl ProductCube {
    pub fn new() -> Self {
        let mut b = CatalogBuilder::new("Products");
        let measures = b.add_dimension("[Measures]", "Measures").unwrap();
        let region = b.add_dimension("[Region]", "Region").unwrap();
        let product = b.add_dimension("[Product]", "Product").unwrap();
        b.add_member(measures, None, "[Measures].[Sales]", "Sales").unwrap();
        b.add_member(region, None, "[Region].[North]", "North").unwrap();
        b.add_member(region, None, "[Region].[South]", "South").unwrap();
        for i in 1..=25 {
            let name = format!("P{:02}", i);
            b.add_member(product, None, format!("[Product].[{}]", name), name)
                .unwrap();
        }
        let catalog = b.build();
        let backend = Arc::new(MemoryBackend::new(Arc::clone(&catalog), |_| {
            CellValue::Number(7.0)
        }));
        ProductCube {
            catalog,
            backend,
            measures,
            region,
            product,
        }
    }

    pub fn member(&self, unique_name: &str) -> MemberId {
        self.catalog.find_member(unique_name).unwrap()
    }

    /// Sales by product: 1 column, 25 rows.
    pub fn products_query(&self) -> Query {
        let mut query = Query::new("Products", Arc::clone(&self.catalog));
        query.add_dimension(AxisLocation::Columns, self.measures).unwrap();
        query.add_dimension(AxisLocation::Rows, self.product).unwrap();
        query
            .select(self.member("[Measures].[Sales]"), SelectionOperator::Member)
            .unwrap();
        query
            .select(self.member("[Product].[P01]"), SelectionOperator::Siblings)
            .unwrap();
        query
    }

    /// Sales by region and product: 1 column, 50 rows.
    pub fn region_products_query(&self) -> Query {
        let mut query = Query::new("Regions", Arc::clone(&self.catalog));
        query.add_dimension(AxisLocation::Columns, self.measures).unwrap();
        query.add_dimension(AxisLocation::Rows, self.region).unwrap();
        query.add_dimension(AxisLocation::Rows, self.product).unwrap();
        query
            .select(self.member("[Measures].[Sales]"), SelectionOperator::Member)
            .unwrap();
        query
            .select(self.member("[Region].[North]"), SelectionOperator::Siblings)
            .unwrap();
        query
            .select(self.member("[Product].[P01]"), SelectionOperator::Siblings)
            .unwrap();
        query
    }

    pub fn renderer(&self, query: Query) -> CellSetRenderer {
        let backend: SharedBackend = self.backend.clone();
        CellSetRenderer::new(query, backend)
    }
}

// ============================================================================
// FIXED RESULT
// ============================================================================

/// Returns the same prepared cell set for every execution. Used for result
/// shapes a cross join cannot produce.
pub struct FixedBackend {
    cell_set: CellSet,
}

impl FixedBackend {
    pub fn new(cell_set: CellSet) -> Self {
        FixedBackend { cell_set }
    }
}

impl OlapBackend for FixedBackend {
    fn execute(&self, _query: &Query) -> Result<CellSet, BackendError> {
        Ok(self.cell_set.clone())
    }

    fn children_of(&self, member: MemberId) -> Result<Vec<MemberId>, BackendError> {
        Ok(self.cell_set.catalog().children(member).to_vec())
    }
}

/// Two column hierarchies with positions (Q1, JanSales), (Q1, FebSales),
/// (Q2, AprSales); regions North and South on rows; cells 10 to 60.
pub struct QuarterGrid {
    pub catalog: Arc<Catalog>,
    pub q1: MemberId,
    pub q2: MemberId,
    pub jan_sales: MemberId,
    pub feb_sales: MemberId,
    pub apr_sales: MemberId,
    pub north: MemberId,
    pub south: MemberId,
}

impl QuarterGrid {
    pub fn new() -> Self {
        let mut b = CatalogBuilder::new("Quarters");
        let time = b.add_dimension("[Time]", "Time").unwrap();
        let measures = b.add_dimension("[Measures]", "Measures").unwrap();
        let region = b.add_dimension("[Region]", "Region").unwrap();
        let year = b.add_member(time, None, "[Time].[2024]", "2024").unwrap();
        let q1 = b.add_member(time, Some(year), "[Time].[2024].[Q1]", "Q1").unwrap();
        let q2 = b.add_member(time, Some(year), "[Time].[2024].[Q2]", "Q2").unwrap();
        let jan_sales = b.add_member(measures, None, "[Measures].[JanSales]", "JanSales").unwrap();
        let feb_sales = b.add_member(measures, None, "[Measures].[FebSales]", "FebSales").unwrap();
        let apr_sales = b.add_member(measures, None, "[Measures].[AprSales]", "AprSales").unwrap();
        let north = b.add_member(region, None, "[Region].[North]", "North").unwrap();
        let south = b.add_member(region, None, "[Region].[South]", "South").unwrap();
        QuarterGrid {
            catalog: b.build(),
            q1,
            q2,
            jan_sales,
            feb_sales,
            apr_sales,
            north,
            south,
        }
    }

    pub fn cell_set(&self) -> CellSet {
        let columns = CellSetAxis::new(
            AxisLocation::Columns,
            vec![self.dimension_of(self.q1), self.dimension_of(self.jan_sales)],
            vec![
                smallvec![self.q1, self.jan_sales],
                smallvec![self.q1, self.feb_sales],
                smallvec![self.q2, self.apr_sales],
            ],
        )
        .unwrap();
        let rows = CellSetAxis::new(
            AxisLocation::Rows,
            vec![self.dimension_of(self.north)],
            vec![smallvec![self.north], smallvec![self.south]],
        )
        .unwrap();
        let cells = (1..=6).map(|i| Cell::number(f64::from(i * 10))).collect();
        CellSet::new(Arc::clone(&self.catalog), columns, rows, cells).unwrap()
    }

    pub fn renderer(&self) -> CellSetRenderer {
        let backend: SharedBackend = Arc::new(FixedBackend::new(self.cell_set()));
        CellSetRenderer::new(Query::new("Quarters", Arc::clone(&self.catalog)), backend)
    }

    fn dimension_of(&self, member: MemberId) -> DimensionId {
        self.catalog.member(member).unwrap().dimension
    }
}

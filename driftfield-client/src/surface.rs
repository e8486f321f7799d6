// Driftfield: drawing surfaces
//
// A Surface is what the particle field draws on: sized in pixels, cleared
// every frame, filled with white circles of varying opacity. Canvas is the
// in-memory implementation used by the terminal host and by tests.

/// Drawing target sized to the viewport
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Reset the pixel buffer to new dimensions. Contents are discarded,
    /// not scaled.
    fn resize(&mut self, width: f64, height: f64);

    fn clear(&mut self);

    /// Fill a white circle at `alpha` opacity
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, alpha: f64);
}

/// Coverage raster over a pixel-sized surface.
///
/// Each cell spans `cell_width` x `cell_height` pixels and stores the
/// opacity of white composited onto it, in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
    cell_width: f64,
    cell_height: f64,
    columns: usize,
    rows: usize,
    coverage: Vec<f32>,
}

impl Canvas {
    /// Canvas with one cell per pixel
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_cell_size(width, height, 1.0, 1.0)
    }

    pub fn with_cell_size(width: f64, height: f64, cell_width: f64, cell_height: f64) -> Self {
        let mut canvas = Self {
            width: 0.0,
            height: 0.0,
            cell_width: cell_width.max(f64::MIN_POSITIVE),
            cell_height: cell_height.max(f64::MIN_POSITIVE),
            columns: 0,
            rows: 0,
            coverage: Vec::new(),
        };
        canvas.resize(width, height);
        canvas
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row-major coverage values
    pub fn coverage(&self) -> &[f32] {
        &self.coverage
    }

    pub fn coverage_at(&self, column: usize, row: usize) -> Option<f32> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.coverage.get(row * self.columns + column).copied()
    }

    /// Number of cells with any coverage
    pub fn lit_cells(&self) -> usize {
        self.coverage.iter().filter(|c| **c > 0.0).count()
    }

    fn blend(&mut self, column: usize, row: usize, alpha: f32) {
        let cell = &mut self.coverage[row * self.columns + column];
        *cell += alpha * (1.0 - *cell);
    }
}

impl Surface for Canvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.columns = (self.width / self.cell_width).ceil() as usize;
        self.rows = (self.height / self.cell_height).ceil() as usize;
        self.coverage = vec![0.0; self.columns * self.rows];
    }

    fn clear(&mut self) {
        self.coverage.fill(0.0);
    }

    /// Source-over white onto every cell whose centre lies inside the
    /// circle. The cell holding the centre is always hit, so dots smaller
    /// than a cell stay visible.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, alpha: f64) {
        if self.columns == 0 || self.rows == 0 || radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0) as f32;

        let centre = cell_index(x, self.cell_width, self.columns)
            .zip(cell_index(y, self.cell_height, self.rows));

        let first_col = cell_index((x - radius).max(0.0), self.cell_width, self.columns);
        let last_col = cell_index(x + radius, self.cell_width, self.columns);
        let first_row = cell_index((y - radius).max(0.0), self.cell_height, self.rows);
        let last_row = cell_index(y + radius, self.cell_height, self.rows);

        let (Some(first_col), Some(last_col), Some(first_row), Some(last_row)) =
            (first_col, last_col, first_row, last_row)
        else {
            return;
        };

        let radius_sq = radius * radius;
        for row in first_row..=last_row {
            let cy = (row as f64 + 0.5) * self.cell_height;
            for column in first_col..=last_col {
                let cx = (column as f64 + 0.5) * self.cell_width;
                let inside = (cx - x).powi(2) + (cy - y).powi(2) <= radius_sq;
                if inside || centre == Some((column, row)) {
                    self.blend(column, row, alpha);
                }
            }
        }
    }
}

/// Cell containing pixel coordinate `v`, clamped to the last cell.
/// `None` for coordinates left of / above the surface.
fn cell_index(v: f64, cell: f64, count: usize) -> Option<usize> {
    if v < 0.0 || count == 0 || v.is_nan() {
        return None;
    }
    Some(((v / cell) as usize).min(count - 1))
}

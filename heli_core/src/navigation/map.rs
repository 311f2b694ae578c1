// heli_core/src/navigation/map.rs

use nalgebra::{DMatrix, Vector2};

use crate::error::CoreError;
use crate::navigation::TerrainMap;

/// Heightmap terrain sampled on a unit grid.
///
/// Row `r` lies at `z = -r` and column `c` at `x = c`, so the map grows towards
/// the forward (-Z) direction. Positions outside the grid are clamped to its edge.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationMap {
    heights: DMatrix<f64>,
}

impl NavigationMap {
    /// Builds a map from row-major height values.
    pub fn new(rows: &[Vec<f64>]) -> Result<Self, CoreError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(CoreError::EmptyHeightmap);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(CoreError::RaggedHeightmap {
                row,
                len: r.len(),
                expected,
            });
        }

        let heights = DMatrix::from_fn(rows.len(), expected, |r, c| rows[r][c]);
        Ok(Self { heights })
    }

    /// A level 2x2 map at `altitude`.
    pub fn flat(altitude: f64) -> Self {
        Self {
            heights: DMatrix::from_element(2, 2, altitude),
        }
    }

    pub fn rows(&self) -> usize {
        self.heights.nrows()
    }

    pub fn cols(&self) -> usize {
        self.heights.ncols()
    }
}

impl TerrainMap for NavigationMap {
    fn altitude(&self, map_position: &Vector2<f64>) -> f64 {
        let max_row = (self.rows() - 1) as f64;
        let max_col = (self.cols() - 1) as f64;
        let y = (-map_position.y).clamp(0.0, max_row);
        let x = map_position.x.clamp(0.0, max_col);

        let (y1, y2) = (y.floor(), y.ceil());
        let (x1, x2) = (x.floor(), x.ceil());

        let q = |row: f64, col: f64| self.heights[(row as usize, col as usize)];
        let (q11, q21) = (q(y1, x1), q(y1, x2));
        let (q12, q22) = (q(y2, x1), q(y2, x2));

        // Bilinear; coinciding grid lines split the weight evenly.
        let left = if x2 == x1 { 0.5 } else { (x2 - x) / (x2 - x1) };
        let bottom = if y2 == y1 { 0.5 } else { (y2 - y) / (y2 - y1) };

        let r1 = left * q11 + (1.0 - left) * q21;
        let r2 = left * q12 + (1.0 - left) * q22;
        bottom * r1 + (1.0 - bottom) * r2
    }
}

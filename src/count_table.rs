//! Sparse k-mer count matrix.
//!
//! Rows are sequences, columns are vocabulary entries. Stored in CSR form
//! since a sequence of a few hundred bases touches only a handful of the 4^k
//! possible k-mers.

use sprs::CsMat;

/// A (sequences x features) sparse count matrix.
#[derive(Debug, Clone)]
pub struct CountTable {
    counts: CsMat<f64>,
}

impl CountTable {
    /// Builds a table from per-row `(column, count)` entries.
    ///
    /// Entries within a row may come in any order; columns must be below
    /// `n_features`.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, n_features: usize) -> Self {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        let n_rows = rows.len();
        for mut row in rows {
            row.sort_unstable_by_key(|&(col, _)| col);
            for (col, value) in row {
                debug_assert!(col < n_features);
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }

        CountTable {
            counts: CsMat::new((n_rows, n_features), indptr, indices, data),
        }
    }

    /// Returns the dimensions of the table (sequences, features).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.counts.rows(), self.counts.cols())
    }

    pub fn n_rows(&self) -> usize {
        self.counts.rows()
    }

    pub fn n_features(&self) -> usize {
        self.counts.cols()
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.counts.nnz()
    }

    /// Non-zero `(column, count)` entries of row `i`, in column order.
    pub fn row(&self, i: usize) -> Vec<(usize, f64)> {
        self.counts
            .outer_view(i)
            .map(|row| row.iter().map(|(col, &value)| (col, value)).collect())
            .unwrap_or_default()
    }

    /// A new table holding the given rows in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> CountTable {
        let selected = rows.iter().map(|&i| self.row(i)).collect();
        CountTable::from_rows(selected, self.n_features())
    }
}

//! Writing design results to labelled destinations.
//!
//! A [`ResultSink`] receives named blocks of numbers and persists them on
//! [`ResultSink::commit`]. Two sinks ship with the crate: [`SheetSink`], which
//! locates labels in a worksheet the way a hand-kept design spreadsheet is laid
//! out, and [`ReportSink`], which simply records every write in order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::designer::DesignResults;
use crate::errors::{DesignError, DesignResult};
use crate::units::{meters_to_millimeters, pascals_to_megapascals};

/// A rectangular block of values, row-major.
///
/// Non-finite values (an unbounded fatigue life) are stored as `"inf"`,
/// `"-inf"` or `"nan"` since JSON numbers cannot hold them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultValue {
    #[serde(with = "cells::rows")]
    rows: Vec<Vec<f64>>,
}

impl ResultValue {
    /// A single row.
    #[must_use]
    pub fn row(values: &[f64]) -> Self {
        Self {
            rows: vec![values.to_vec()],
        }
    }

    /// A single column.
    #[must_use]
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.iter().map(|value| vec![*value]).collect(),
        }
    }

    /// A `rows × columns` table filled from `value(row, column)`.
    #[must_use]
    pub fn table(rows: usize, columns: usize, value: impl Fn(usize, usize) -> f64) -> Self {
        Self {
            rows: (0..rows)
                .map(|row| (0..columns).map(|column| value(row, column)).collect())
                .collect(),
        }
    }

    /// Rows of the block.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// `(rows, columns)` of the block; columns of the widest row.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (self.rows.len(), columns)
    }
}

/// Destination for labelled result blocks.
pub trait ResultSink {
    /// Stage `value` under `label`, optionally restricted to table `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::QuantityNotFound`] when the sink has no place for the
    /// label and [`DesignError::SheetOverflow`] when the block does not fit.
    fn write(&mut self, label: &str, value: &ResultValue, scope: Option<u32>) -> DesignResult<()>;

    /// Persist every staged write.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when the destination cannot be written.
    fn commit(&mut self) -> DesignResult<()>;
}

/// Write the eight result blocks in their fixed order, then commit.
///
/// Stresses are exported in megapascals, the centroid and pins in millimetres.
///
/// # Errors
///
/// Returns the first sink error; later blocks are not written and nothing is
/// committed.
pub fn export_results<S: ResultSink + ?Sized>(
    results: &DesignResults,
    sink: &mut S,
) -> DesignResult<()> {
    let [centroid_x, centroid_y, mass, ax, ay, bx, by] = results.static_load.to_array();
    let reactions = results.dynamic.reactions.to_array();
    let forces = results.dynamic.member_forces.matrix();

    let writes = [
        ("PEAKFORCE", ResultValue::row(results.peak_forces.as_slice()), None),
        (
            "CENTX",
            ResultValue::column(&[
                meters_to_millimeters(centroid_x),
                meters_to_millimeters(centroid_y),
                mass,
                ax,
                ay,
                bx,
                by,
            ]),
            None,
        ),
        (
            "AC",
            ResultValue::table(forces.nrows(), forces.ncols(), |row, case| forces[(row, case)]),
            None,
        ),
        (
            "AFX",
            ResultValue::table(4, 3, |row, case| reactions[row][case]),
            None,
        ),
        (
            "BD",
            ResultValue::table(4, 3, |row, case| {
                pascals_to_megapascals(results.nominal_stress[(row, case)])
            }),
            Some(7),
        ),
        (
            "BD",
            ResultValue::column(results.stress_magnification.as_slice()),
            Some(8),
        ),
        (
            "BD",
            ResultValue::table(4, 3, |row, case| {
                pascals_to_megapascals(results.adjusted_stress[(row, case)])
            }),
            Some(9),
        ),
        (
            "LIFE",
            ResultValue::column(&[
                results.life.hours,
                meters_to_millimeters(results.pins.a),
                meters_to_millimeters(results.pins.b),
            ]),
            None,
        ),
    ];

    for (label, value, scope) in &writes {
        sink.write(label, value, *scope)?;
    }
    sink.commit()
}

/// Where [`SheetSink`] looks for labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetSettings {
    /// First row (1-based) searched for a label.
    pub first_row: usize,
    /// Last row (1-based) searched for a label.
    pub search_limit: usize,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            first_row: 1,
            search_limit: 200,
        }
    }
}

/// One worksheet row: an optional quantity label, the table it belongs to and
/// the values written beside it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    /// Quantity label, if the row has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Table number the row belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<u32>,
    /// Values in the row.
    #[serde(default, with = "cells")]
    pub values: Vec<f64>,
}

impl SheetRow {
    /// A labelled row in `table`.
    #[must_use]
    pub fn labelled(label: &str, table: Option<u32>) -> Self {
        Self {
            label: Some(label.to_owned()),
            table,
            values: Vec::new(),
        }
    }

    /// An unlabelled row in `table`.
    #[must_use]
    pub fn blank(table: Option<u32>) -> Self {
        Self {
            label: None,
            table,
            values: Vec::new(),
        }
    }
}

/// A design worksheet stored as JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Rows in sheet order; row 1 is the first element.
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Load a worksheet from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> DesignResult<Self> {
        let source = |reason: String| DesignError::Source {
            source_name: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|err| source(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| source(err.to_string()))
    }

    /// Save the worksheet as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> DesignResult<()> {
        let source = |reason: String| DesignError::Source {
            source_name: path.display().to_string(),
            reason,
        };
        let text = serde_json::to_string_pretty(self).map_err(|err| source(err.to_string()))?;
        fs::write(path, text).map_err(|err| source(err.to_string()))
    }

    /// Blank design worksheet with one labelled row per exported value.
    ///
    /// `members` lists the member force rows, `roles` the K-joint stress rows.
    #[must_use]
    pub fn template(members: &[&str], roles: &[&str]) -> Self {
        let block = |table: u32, labels: &[&str]| -> Vec<SheetRow> {
            labels
                .iter()
                .map(|label| SheetRow::labelled(label, Some(table)))
                .collect()
        };
        let rows = [
            block(2, &["PEAKFORCE"]),
            block(4, &["CENTX", "CENTY", "MASS", "AX", "AY", "BX", "BY"]),
            block(5, members),
            block(6, &["AFX", "AFY", "BFX", "BFY"]),
            block(7, roles),
            block(8, roles),
            block(9, roles),
            block(10, &["LIFE", "PINA", "PINB"]),
        ];
        Self {
            rows: rows.into_iter().flatten().collect(),
        }
    }

    /// Row index (0-based) of the first row labelled `label` within the window.
    fn find(&self, label: &str, scope: Option<u32>, settings: SheetSettings) -> Option<usize> {
        let first = settings.first_row.max(1) - 1;
        let last = settings.search_limit.min(self.rows.len());
        (first..last).find(|&index| {
            let row = &self.rows[index];
            row.label.as_deref() == Some(label) && scope.map_or(true, |table| row.table == Some(table))
        })
    }
}

/// Writes into a [`Sheet`], saving it only when every write has succeeded.
#[derive(Debug)]
pub struct SheetSink {
    committed: Sheet,
    staged: Sheet,
    path: Option<PathBuf>,
    settings: SheetSettings,
}

impl SheetSink {
    /// Sink over an in-memory sheet.
    #[must_use]
    pub fn new(sheet: Sheet, settings: SheetSettings) -> Self {
        Self {
            staged: sheet.clone(),
            committed: sheet,
            path: None,
            settings,
        }
    }

    /// Sink over a JSON worksheet file that is rewritten on commit.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when the file cannot be loaded.
    pub fn open(path: impl Into<PathBuf>, settings: SheetSettings) -> DesignResult<Self> {
        let path = path.into();
        let mut sink = Self::new(Sheet::load(&path)?, settings);
        sink.path = Some(path);
        Ok(sink)
    }

    /// Last committed state of the sheet.
    #[must_use]
    pub fn sheet(&self) -> &Sheet {
        &self.committed
    }
}

impl ResultSink for SheetSink {
    fn write(&mut self, label: &str, value: &ResultValue, scope: Option<u32>) -> DesignResult<()> {
        let start = self
            .staged
            .find(label, scope, self.settings)
            .ok_or_else(|| DesignError::QuantityNotFound {
                label: label.to_owned(),
                scope,
            })?;
        let rows = value.rows().len();
        if start + rows > self.staged.rows.len() {
            return Err(DesignError::SheetOverflow {
                label: label.to_owned(),
                rows,
            });
        }
        for (row, values) in self.staged.rows[start..start + rows]
            .iter_mut()
            .zip(value.rows())
        {
            row.values.clone_from(values);
        }
        debug!(label, ?scope, row = start + 1, rows, "staged sheet block");
        Ok(())
    }

    fn commit(&mut self) -> DesignResult<()> {
        if let Some(path) = &self.path {
            self.staged.save(path)?;
            info!(path = %path.display(), "saved worksheet");
        }
        self.committed = self.staged.clone();
        Ok(())
    }
}

/// One recorded write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Quantity label.
    pub label: String,
    /// Table the write was restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<u32>,
    /// Written block.
    pub value: ResultValue,
}

/// Records every write in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportSink {
    records: Vec<ExportRecord>,
    committed: bool,
}

impl ReportSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes received so far.
    #[must_use]
    pub fn records(&self) -> &[ExportRecord] {
        &self.records
    }

    /// Whether [`ResultSink::commit`] has been called.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Records as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when a value cannot be serialised.
    pub fn to_json(&self) -> DesignResult<String> {
        serde_json::to_string_pretty(&self.records).map_err(|err| DesignError::Source {
            source_name: "report".to_owned(),
            reason: err.to_string(),
        })
    }
}

impl ResultSink for ReportSink {
    fn write(&mut self, label: &str, value: &ResultValue, scope: Option<u32>) -> DesignResult<()> {
        self.records.push(ExportRecord {
            label: label.to_owned(),
            scope,
            value: value.clone(),
        });
        Ok(())
    }

    fn commit(&mut self) -> DesignResult<()> {
        self.committed = true;
        Ok(())
    }
}

/// Serde adapter writing non-finite numbers as text cells.
mod cells {
    use serde::de::{Deserializer, Error};
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    impl From<f64> for Cell {
        fn from(value: f64) -> Self {
            match value {
                v if v.is_finite() => Cell::Number(v),
                v if v.is_nan() => Cell::Text("nan".to_owned()),
                v if v > 0.0 => Cell::Text("inf".to_owned()),
                _ => Cell::Text("-inf".to_owned()),
            }
        }
    }

    fn number<E: Error>(cell: Cell) -> Result<f64, E> {
        match cell {
            Cell::Number(value) => Ok(value),
            Cell::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(E::custom(format!("expected a number, got \"{other}\""))),
            },
        }
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| Cell::from(*value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Cell>::deserialize(deserializer)?
            .into_iter()
            .map(number)
            .collect()
    }

    /// The same encoding for a block of rows.
    pub mod rows {
        use super::{number, Cell};
        use serde::de::Deserializer;
        use serde::ser::Serializer;
        use serde::Deserialize;

        pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(rows.iter().map(|row| {
                row.iter().map(|value| Cell::from(*value)).collect::<Vec<_>>()
            }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Vec<f64>>, D::Error> {
            Vec::<Vec<Cell>>::deserialize(deserializer)?
                .into_iter()
                .map(|row| row.into_iter().map(number).collect())
                .collect()
        }
    }
}

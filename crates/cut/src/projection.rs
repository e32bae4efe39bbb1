//! Projection tables and their resolution into a basis frame
//!
//! A projection is supplied as a small column oriented table with exactly
//! three rows, one per axis of the cut. The accepted schemas are
//!
//! - `{u, v, type}`
//! - `{u, v, offsets, type}`
//! - `{u, v, w, offsets, type}`
//!
//! where `u`, `v`, `w` and `offsets` hold numbers and `type` holds the unit
//! tag of each axis, `"r"` or `"a"`. Offsets are accepted but have no effect
//! on the cut.

// standard library
use std::collections::{BTreeMap, BTreeSet};

// crate modules
use crate::error::{Error, Result};
use crate::frame::{Direction, Frame};
use crate::units::UnitTag;

// mdtools modules
use mdtools_utils::f;

// external crates
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Column names making up each accepted table schema
const SCHEMAS: [&[&str]; 3] = [
    &["type", "u", "v"],
    &["offsets", "type", "u", "v"],
    &["offsets", "type", "u", "v", "w"],
];

/// A single cell of a projection table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<UnitTag> for Cell {
    fn from(value: UnitTag) -> Self {
        Cell::Text(value.symbol().to_string())
    }
}

/// Column oriented projection table as supplied by the user
///
/// Serialises as a plain map of column name to cells.
///
/// ```rust
/// # use mdtools_cut::{ProjectionTable, UnitTag};
/// let table = ProjectionTable::new()
///     .with_column("u", [1.0, 1.0, 0.0])
///     .with_column("v", [-1.0, 1.0, 0.0])
///     .with_units([UnitTag::Rlu; 3]);
///
/// assert_eq!(table.column_names(), ["type", "u", "v"]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectionTable {
    columns: BTreeMap<String, Vec<Cell>>,
}

impl ProjectionTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column
    pub fn add_column<I, C>(&mut self, name: &str, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let cells = cells.into_iter().map(Into::into).collect();
        self.columns.insert(name.to_string(), cells);
    }

    /// Builder version of [ProjectionTable::add_column()]
    pub fn with_column<I, C>(mut self, name: &str, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.add_column(name, cells);
        self
    }

    /// Set the `type` column from unit tags
    pub fn with_units(self, units: [UnitTag; 3]) -> Self {
        self.with_column("type", units)
    }

    /// Sorted column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Cells of a named column, if present
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

/// Validated projection
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionSpec {
    /// No projection given, cut along (H, K, L) in r.l.u.
    #[default]
    Identity,
    /// `u` and `v` given, `w` derived as `v x u`
    Partial {
        u: Direction,
        v: Direction,
        units: Option<[UnitTag; 3]>,
    },
    /// All three basis vectors given
    Full {
        u: Direction,
        v: Direction,
        w: Direction,
        units: Option<[UnitTag; 3]>,
    },
}

impl ProjectionSpec {
    /// Validate an optional projection table
    ///
    /// Checked in order: the set of column names must match one of the
    /// accepted schemas, every column must have 3 rows, the basis and offset
    /// cells must be numbers and the `type` cells valid unit tags.
    ///
    /// ```rust
    /// # use mdtools_cut::{Error, ProjectionSpec, ProjectionTable};
    /// assert_eq!(ProjectionSpec::from_table(None).unwrap(), ProjectionSpec::Identity);
    ///
    /// // No type column
    /// let table = ProjectionTable::new()
    ///     .with_column("u", [1.0, 0.0, 0.0])
    ///     .with_column("v", [0.0, 1.0, 0.0]);
    /// assert!(matches!(
    ///     ProjectionSpec::from_table(Some(&table)),
    ///     Err(Error::InvalidProjection { .. })
    /// ));
    /// ```
    pub fn from_table(table: Option<&ProjectionTable>) -> Result<Self> {
        let Some(table) = table else {
            trace!("No projection table, using identity");
            return Ok(Self::Identity);
        };

        check_schema(table)?;
        check_rows(table)?;

        let u = numeric_column(table, "u")?;
        let v = numeric_column(table, "v")?;
        // offsets must be valid even though they are unused
        if table.column("offsets").is_some() {
            numeric_column(table, "offsets")?;
        }
        let units = Some(unit_column(table)?);

        let spec = match table.column("w") {
            Some(_) => Self::Full {
                u,
                v,
                w: numeric_column(table, "w")?,
                units,
            },
            None => Self::Partial { u, v, units },
        };

        debug!("Projection {spec:?}");
        Ok(spec)
    }

    /// The basis frame and unit tags described by this projection
    ///
    /// Units default to r.l.u. on every axis if not given.
    pub fn resolve(&self) -> (Frame, [UnitTag; 3]) {
        match *self {
            Self::Identity => (Frame::identity(), [UnitTag::Rlu; 3]),
            Self::Partial { u, v, units } => (Frame::from_uv(u, v), units.unwrap_or_default()),
            Self::Full { u, v, w, units } => (Frame::new(u, v, w), units.unwrap_or_default()),
        }
    }
}

/// Validate an optional table and resolve it to a frame and unit tags
pub fn resolve(table: Option<&ProjectionTable>) -> Result<(Frame, [UnitTag; 3])> {
    Ok(ProjectionSpec::from_table(table)?.resolve())
}

fn check_schema(table: &ProjectionTable) -> Result<()> {
    let names = table.column_names().into_iter().collect::<BTreeSet<&str>>();
    let matched = SCHEMAS
        .iter()
        .any(|schema| schema.iter().copied().collect::<BTreeSet<&str>>() == names);

    if matched {
        Ok(())
    } else {
        Err(Error::InvalidProjection {
            reason: f!("table schema is wrong, column names received: {names:?}"),
        })
    }
}

fn check_rows(table: &ProjectionTable) -> Result<()> {
    for (name, cells) in &table.columns {
        if cells.len() != 3 {
            return Err(Error::InvalidProjection {
                reason: f!("expected 3 rows, column \"{name}\" has {}", cells.len()),
            });
        }
    }
    Ok(())
}

fn numeric_column(table: &ProjectionTable, name: &str) -> Result<Direction> {
    let cells = table.column(name).ok_or_else(|| Error::InvalidProjection {
        reason: f!("missing column \"{name}\""),
    })?;

    let mut direction = [0.0; 3];
    for (row, (value, cell)) in direction.iter_mut().zip(cells).enumerate() {
        *value = match cell {
            Cell::Number(n) => *n,
            Cell::Text(text) => {
                return Err(Error::InvalidProjection {
                    reason: f!("column \"{name}\" row {row} is not a number: \"{text}\""),
                })
            }
        };
    }
    Ok(direction)
}

fn unit_column(table: &ProjectionTable) -> Result<[UnitTag; 3]> {
    let cells = table.column("type").ok_or_else(|| Error::InvalidProjection {
        reason: "missing column \"type\"".to_string(),
    })?;

    let mut units = [UnitTag::Rlu; 3];
    for (row, (unit, cell)) in units.iter_mut().zip(cells).enumerate() {
        *unit = match cell {
            Cell::Text(text) => text.parse().map_err(|e| Error::InvalidProjection {
                reason: f!("column \"type\" row {row}: {e}"),
            })?,
            Cell::Number(n) => {
                return Err(Error::InvalidProjection {
                    reason: f!("column \"type\" row {row} is the number {n}"),
                })
            }
        };
    }
    Ok(units)
}

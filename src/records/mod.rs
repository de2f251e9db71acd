//! Student records, the read-only input of the engine.
//!
//! The serde field names follow the grade-sheet wire format used by the
//! data files and the relational schema (`matricula`, `nombre_completo`,
//! `materias`, ...), so existing Spanish-keyed grade sheets load unchanged.

pub mod stores;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall average at or above which a student is passing.
pub const PASSING_AVERAGE: f64 = 70.0;

/// Number of class sessions attendance is reported against.
pub const EXPECTED_SESSIONS: u32 = 47;

/// One student and their grade sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Enrollment identifier (`matricula`), a digit string.
    #[serde(rename = "matricula")]
    pub id: String,
    #[serde(rename = "nombre_completo")]
    pub name: String,
    #[serde(rename = "carrera")]
    pub program: String,
    #[serde(rename = "semestre", default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
    /// `None` when the source omitted it; the fragmenter rejects such records.
    #[serde(rename = "promedio_general", default)]
    pub average: Option<f64>,
    #[serde(rename = "materias", default)]
    pub courses: Vec<CourseEntry>,
}

/// One course line of a grade sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "clave", default)]
    pub code: String,
    #[serde(rename = "calificacion_parcial1")]
    pub partial1: f64,
    #[serde(rename = "calificacion_parcial2")]
    pub partial2: f64,
    #[serde(rename = "calificacion_parcial3")]
    pub partial3: f64,
    #[serde(rename = "asistencias")]
    pub attendance: u32,
    #[serde(rename = "faltas")]
    pub absences: u32,
}

impl CourseEntry {
    pub fn partials(&self) -> [f64; 3] {
        [self.partial1, self.partial2, self.partial3]
    }

    /// Unrounded mean of the three partial scores.
    pub fn mean(&self) -> f64 {
        (self.partial1 + self.partial2 + self.partial3) / 3.0
    }

    /// Course average as shown in composed answers (one decimal).
    pub fn answer_average(&self) -> f64 {
        round_to(self.mean(), 1)
    }

    /// Course average as written into exported reports (two decimals).
    pub fn export_average(&self) -> f64 {
        round_to(self.mean(), 2)
    }
}

/// Academic standing, derived from the overall average at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passing,
    Failing,
}

impl Status {
    pub fn from_average(average: f64) -> Self {
        if average >= PASSING_AVERAGE {
            Status::Passing
        } else {
            Status::Failing
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Passing => f.write_str("Passing"),
            Status::Failing => f.write_str("Failing"),
        }
    }
}

/// Round to `decimals` places, ties to even (`85.25` becomes `85.2`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Render a raw score the way the data files write it: integral values
/// without a fractional part (`80`), everything else in shortest form (`85.5`).
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Render an overall average: always at least one decimal (`90.0`, `85.25`).
pub fn format_average(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

//! Relational record store backed by SQLite.
//!
//! Expected schema (column names match the JSON wire format):
//!
//! ```text
//! estudiantes(matricula, nombre_completo, carrera, semestre, promedio_general, estatus)
//! materias(matricula_estudiante, nombre, clave,
//!          calificacion_parcial1, calificacion_parcial2, calificacion_parcial3,
//!          asistencias, faltas)
//! ```
//!
//! `estatus` is never read; standing is derived from the average.
//! Students come back in insertion order (`rowid`), courses likewise.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use tracing::{info, warn};

use crate::error::AppError;
use crate::records::{CourseEntry, StudentRecord};

#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    db_path: PathBuf,
}

impl SqliteRecordStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self { db_path: db_path.as_ref().to_path_buf() }
    }

    pub fn load(&self) -> Result<Vec<StudentRecord>, AppError> {
        info!(db = %self.db_path.display(), "loading student records from sqlite");
        let Some(conn) = self.open_conn() else {
            return Ok(Vec::new());
        };

        let mut students = read_students(&conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT nombre, clave, calificacion_parcial1, calificacion_parcial2, \
                        calificacion_parcial3, asistencias, faltas \
                 FROM materias WHERE matricula_estudiante = ?1 ORDER BY rowid",
            )
            .map_err(|e| AppError::Store(format!("sqlite: prepare courses query: {e}")))?;

        for student in &mut students {
            let rows = stmt
                .query_map(params![student.id], |row| {
                    Ok(CourseEntry {
                        name: row.get(0)?,
                        code: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        partial1: row.get(2)?,
                        partial2: row.get(3)?,
                        partial3: row.get(4)?,
                        attendance: row.get(5)?,
                        absences: row.get(6)?,
                    })
                })
                .map_err(|e| AppError::Store(format!("sqlite: query courses for {}: {e}", student.id)))?;
            for row in rows {
                student.courses.push(row.map_err(|e| {
                    AppError::DataIntegrity(format!("sqlite: course row for {}: {e}", student.id))
                })?);
            }
        }

        info!(students = students.len(), "sqlite records loaded");
        Ok(students)
    }

    /// Open the database read-only. `None` when the database is unreachable.
    fn open_conn(&self) -> Option<Connection> {
        if !self.db_path.exists() {
            warn!(db = %self.db_path.display(), "database not found, starting with no records");
            return None;
        }
        match Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY) {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(db = %self.db_path.display(), error = %e, "cannot open database, starting with no records");
                None
            }
        }
    }
}

fn read_students(conn: &Connection) -> Result<Vec<StudentRecord>, AppError> {
    let mut stmt = conn
        .prepare(
            "SELECT matricula, nombre_completo, carrera, semestre, promedio_general \
             FROM estudiantes ORDER BY rowid",
        )
        .map_err(|e| AppError::Store(format!("sqlite: prepare students query: {e}")))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(StudentRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                program: row.get(2)?,
                semester: row.get(3)?,
                average: row.get(4)?,
                courses: Vec::new(),
            })
        })
        .map_err(|e| AppError::Store(format!("sqlite: query students: {e}")))?;

    let mut students = Vec::new();
    for row in rows {
        students.push(
            row.map_err(|e| AppError::DataIntegrity(format!("sqlite: student row: {e}")))?,
        );
    }
    Ok(students)
}

//! Grade-report export.
//!
//! Resolves a student by identifier or name, fills a Markdown template and
//! writes `report_{id}.md` into the configured output directory.
//!
//! Template variables use `{{KEY}}` syntax and are substituted once, after
//! the template is loaded:
//!
//! ```text
//! {{INSTITUTION}} {{FULL_NAME}} {{STUDENT_ID}} {{PROGRAM}} {{ISSUE_DATE}}
//! {{OVERALL_AVERAGE}} {{STATUS}} {{COURSE_ROWS}}
//! ```
//!
//! Averages in reports carry two decimals, unlike chat answers.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::knowledge::KnowledgeBase;
use crate::records::{format_score, Status, StudentRecord};

/// Result of an export request. `path` is set only when a file was written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub message: String,
    pub path: Option<PathBuf>,
}

impl ExportOutcome {
    fn failed(message: String) -> Self {
        Self { message, path: None }
    }
}

/// `{{key}}` substitution over a loaded template. Substitution is a single
/// left-to-right pass over the template: inserted values are never rescanned,
/// and unknown placeholders are left as written.
struct ReportTemplate {
    text: String,
    vars: Vec<(&'static str, String)>,
}

impl ReportTemplate {
    fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self { text: fs::read_to_string(path)?, vars: Vec::new() })
    }

    fn var(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.push((key, value.into()));
        self
    }

    fn value(&self, key: &str) -> Option<&str> {
        self.vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    fn build(self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let hit = after
                .find("}}")
                .and_then(|end| self.value(&after[..end]).map(|v| (end, v)));
            match hit {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

pub struct ReportGenerator {
    config: ExportConfig,
}

impl ReportGenerator {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export the report for `key` (identifier or name fragment), dated today.
    pub fn generate(&self, kb: &KnowledgeBase, key: &str) -> ExportOutcome {
        self.generate_on(kb, key, Local::now().date_naive())
    }

    pub fn generate_on(&self, kb: &KnowledgeBase, key: &str, issued: NaiveDate) -> ExportOutcome {
        let Some(student) = resolve(kb, key) else {
            return ExportOutcome::failed(format!("No data found for student '{}'", key.trim()));
        };

        let template = match ReportTemplate::load(&self.config.template) {
            Ok(t) => t,
            Err(e) => {
                warn!(template = %self.config.template.display(), error = %e, "report template unavailable");
                return ExportOutcome::failed(format!(
                    "Report template not found at {}",
                    self.config.template.display()
                ));
            }
        };

        let average = student.average.unwrap_or(0.0);
        let rendered = template
            .var("INSTITUTION", self.config.institution.as_str())
            .var("FULL_NAME", student.name.as_str())
            .var("STUDENT_ID", student.id.as_str())
            .var("PROGRAM", student.program.as_str())
            .var("ISSUE_DATE", issued.format("%d/%m/%Y").to_string())
            .var("OVERALL_AVERAGE", format!("{average:.2}"))
            .var("STATUS", Status::from_average(average).to_string())
            .var("COURSE_ROWS", course_rows(student))
            .build();

        let file_name = format!("report_{}.md", student.id);
        match write_report(&self.config.output_dir, &file_name, &rendered) {
            Ok(path) => {
                info!(student = %student.id, path = %path.display(), "report generated");
                ExportOutcome {
                    message: format!("Report generated: {file_name}"),
                    path: Some(path),
                }
            }
            Err(e) => {
                warn!(dir = %self.config.output_dir.display(), error = %e, "cannot write report");
                ExportOutcome::failed(format!("Could not write report {file_name}: {e}"))
            }
        }
    }
}

/// All-digit keys are identifiers; anything else is a name fragment.
fn resolve<'a>(kb: &'a KnowledgeBase, key: &str) -> Option<&'a StudentRecord> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if key.bytes().all(|b| b.is_ascii_digit()) {
        kb.student_by_id(key)
    } else {
        kb.student_by_name(key)
    }
}

fn course_rows(student: &StudentRecord) -> String {
    student
        .courses
        .iter()
        .map(|c| {
            format!(
                "| {} | {} | {} | {} | {} | {:.2} |",
                c.name,
                c.code,
                format_score(c.partial1),
                format_score(c.partial2),
                format_score(c.partial3),
                c.export_average()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_report(dir: &Path, file_name: &str, content: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    // Best effort: fall back to the joined path if it cannot be canonicalized.
    Ok(fs::canonicalize(&path).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CourseEntry;
    use tempfile::TempDir;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::build(
            vec![StudentRecord {
                id: "2024001".into(),
                name: "María González".into(),
                program: "Sistemas".into(),
                semester: Some(3),
                average: Some(85.0),
                courses: vec![CourseEntry {
                    name: "Matemáticas".into(),
                    code: "MAT101".into(),
                    partial1: 80.0,
                    partial2: 85.0,
                    partial3: 90.0,
                    attendance: 45,
                    absences: 2,
                }],
            }],
            None,
        )
        .unwrap()
    }

    fn generator(dir: &Path, template: &str) -> ReportGenerator {
        let template_path = dir.join("tpl.md");
        fs::write(&template_path, template).unwrap();
        ReportGenerator::new(ExportConfig {
            template: template_path,
            output_dir: dir.join("out"),
            institution: "Instituto Tecnológico X".into(),
        })
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn template_substitutes_all_vars() {
        let tmp = TempDir::new().unwrap();
        let g = generator(
            tmp.path(),
            "{{INSTITUTION}}|{{FULL_NAME}}|{{STUDENT_ID}}|{{PROGRAM}}|{{ISSUE_DATE}}|{{OVERALL_AVERAGE}}|{{STATUS}}\n{{COURSE_ROWS}}",
        );
        let outcome = g.generate_on(&kb(), "2024001", date());
        assert!(outcome.path.is_some(), "{}", outcome.message);
        let text = fs::read_to_string(outcome.path.unwrap()).unwrap();
        assert_eq!(
            text,
            "Instituto Tecnológico X|María González|2024001|Sistemas|07/03/2025|85.00|Passing\n\
             | Matemáticas | MAT101 | 80 | 85 | 90 | 85.00 |"
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = ReportTemplate {
            text: "{{FULL_NAME}} / {{STATUS}} / {{UNKNOWN}} / {{".into(),
            vars: Vec::new(),
        }
        .var("STATUS", "Passing")
        .var("FULL_NAME", "Ana {{STATUS}}")
        .build();
        assert_eq!(out, "Ana {{STATUS}} / Passing / {{UNKNOWN}} / {{");
    }

    #[test]
    fn resolves_by_name_fragment() {
        let tmp = TempDir::new().unwrap();
        let g = generator(tmp.path(), "{{STUDENT_ID}}");
        let outcome = g.generate_on(&kb(), "gonzález", date());
        assert_eq!(outcome.message, "Report generated: report_2024001.md");
        assert!(outcome.path.unwrap().ends_with("report_2024001.md"));
    }

    #[test]
    fn unknown_student_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let g = generator(tmp.path(), "x");
        let outcome = g.generate_on(&kb(), "2099999", date());
        assert!(outcome.path.is_none());
        assert_eq!(outcome.message, "No data found for student '2099999'");
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn missing_template_is_reported() {
        let tmp = TempDir::new().unwrap();
        let g = ReportGenerator::new(ExportConfig {
            template: tmp.path().join("missing.md"),
            output_dir: tmp.path().join("out"),
            institution: String::new(),
        });
        let outcome = g.generate_on(&kb(), "2024001", date());
        assert!(outcome.path.is_none());
        assert!(outcome.message.starts_with("Report template not found"));
    }
}

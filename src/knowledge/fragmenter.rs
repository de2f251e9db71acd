//! Turns student records into retrievable fragments.
//!
//! Output order is student-major, course-minor. Embedding row `i` belongs to
//! fragment `i`, so a malformed record aborts the pass instead of being
//! skipped.

use crate::error::AppError;
use crate::records::{format_average, format_score, CourseEntry, StudentRecord};

use super::{CourseFragment, Fragment, StudentFragment};

/// Produce the fragment list and the parallel list of texts to embed.
pub fn fragment(records: &[StudentRecord]) -> Result<(Vec<Fragment>, Vec<String>), AppError> {
    let total = records.len() + records.iter().map(|r| r.courses.len()).sum::<usize>();
    let mut fragments = Vec::with_capacity(total);
    let mut texts = Vec::with_capacity(total);

    for (pos, record) in records.iter().enumerate() {
        let average = validate_record(pos, record)?;

        let content = format!(
            "Student: {} - ID: {} - Program: {} - Average: {}",
            record.name,
            record.id,
            record.program,
            format_average(average)
        );
        texts.push(content.clone());
        fragments.push(Fragment::Student(StudentFragment {
            id: record.id.clone(),
            name: record.name.clone(),
            program: record.program.clone(),
            average,
            content,
            courses: record.courses.clone(),
        }));

        for course in &record.courses {
            let content = course_summary(course);
            texts.push(content.clone());
            fragments.push(Fragment::Course(CourseFragment {
                student_id: record.id.clone(),
                course_name: course.name.clone(),
                content,
                course: course.clone(),
            }));
        }
    }

    Ok((fragments, texts))
}

fn course_summary(course: &CourseEntry) -> String {
    format!(
        "Course: {} - Scores: P1:{}, P2:{}, P3:{} - Attendance: {} - Absences: {}",
        course.name,
        format_score(course.partial1),
        format_score(course.partial2),
        format_score(course.partial3),
        course.attendance,
        course.absences
    )
}

/// Check the fields fragment rendering relies on; returns the average.
fn validate_record(pos: usize, record: &StudentRecord) -> Result<f64, AppError> {
    let invalid = |what: &str| {
        AppError::DataIntegrity(format!("record #{pos} (id '{}'): {what}", record.id))
    };

    if record.id.trim().is_empty() {
        return Err(invalid("empty identifier"));
    }
    if record.name.trim().is_empty() {
        return Err(invalid("empty name"));
    }
    if record.program.trim().is_empty() {
        return Err(invalid("empty program"));
    }
    let average = match record.average {
        Some(avg) if avg.is_finite() => avg,
        Some(_) => return Err(invalid("non-finite average")),
        None => return Err(invalid("missing average")),
    };
    for (i, course) in record.courses.iter().enumerate() {
        if course.name.trim().is_empty() {
            return Err(invalid(&format!("course #{i} has an empty name")));
        }
        if course.partials().iter().any(|p| !p.is_finite()) {
            return Err(invalid(&format!("course '{}' has a non-finite score", course.name)));
        }
    }
    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::FragmentKind;

    fn course(name: &str) -> CourseEntry {
        CourseEntry {
            name: name.into(),
            code: String::new(),
            partial1: 80.0,
            partial2: 85.0,
            partial3: 90.0,
            attendance: 45,
            absences: 2,
        }
    }

    fn record(id: &str, name: &str, courses: &[&str]) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            name: name.into(),
            program: "Sistemas".into(),
            semester: None,
            average: Some(85.0),
            courses: courses.iter().map(|c| course(c)).collect(),
        }
    }

    #[test]
    fn count_is_students_plus_courses() {
        let records = vec![
            record("2024001", "Ana", &["Matemáticas", "Programación"]),
            record("2024002", "Luis", &[]),
            record("2024003", "Eva", &["Física"]),
        ];
        let (fragments, texts) = fragment(&records).unwrap();
        assert_eq!(fragments.len(), 3 + 3);
        assert_eq!(texts.len(), fragments.len());
    }

    #[test]
    fn order_is_student_major_course_minor() {
        let records = vec![
            record("2024001", "Ana", &["Matemáticas", "Programación"]),
            record("2024003", "Eva", &["Física"]),
        ];
        let (fragments, texts) = fragment(&records).unwrap();
        let kinds: Vec<_> = fragments.iter().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            [
                FragmentKind::Student,
                FragmentKind::Course,
                FragmentKind::Course,
                FragmentKind::Student,
                FragmentKind::Course,
            ]
        );
        let owners: Vec<_> = fragments.iter().map(|f| f.student_id()).collect();
        assert_eq!(owners, ["2024001", "2024001", "2024001", "2024003", "2024003"]);
        for (f, t) in fragments.iter().zip(&texts) {
            assert_eq!(f.content(), t);
        }
    }

    #[test]
    fn student_content_mentions_identity() {
        let (fragments, _) = fragment(&[record("2024001", "Ana Pérez", &[])]).unwrap();
        assert_eq!(
            fragments[0].content(),
            "Student: Ana Pérez - ID: 2024001 - Program: Sistemas - Average: 85.0"
        );
    }

    #[test]
    fn course_content_summarizes_scores() {
        let (fragments, _) = fragment(&[record("2024001", "Ana", &["Física"])]).unwrap();
        assert_eq!(
            fragments[1].content(),
            "Course: Física - Scores: P1:80, P2:85, P3:90 - Attendance: 45 - Absences: 2"
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        let (fragments, texts) = fragment(&[]).unwrap();
        assert!(fragments.is_empty());
        assert!(texts.is_empty());
    }

    #[test]
    fn missing_average_is_rejected() {
        let mut r = record("2024001", "Ana", &[]);
        r.average = None;
        let err = fragment(&[r]).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(ref m) if m.contains("missing average")));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = fragment(&[record("2024001", " ", &[])]).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn bad_course_is_rejected_not_skipped() {
        let mut r = record("2024001", "Ana", &["Física"]);
        r.courses[0].partial2 = f64::NAN;
        assert!(fragment(&[r]).is_err());
    }
}

//! Renders retrieved fragments into the Markdown answer shown to the user.
//!
//! Rendering rules:
//! - empty context → [`NOT_FOUND`];
//! - any student fragment → one student block for the first one, nothing else;
//! - otherwise one block per distinct (student, course) pair, first-seen order.

use std::collections::HashSet;

use crate::knowledge::{CourseFragment, Fragment, StudentFragment};
use crate::records::{format_average, format_score, Status, EXPECTED_SESSIONS};

/// Answer for a query nothing could be retrieved for.
pub const NOT_FOUND: &str = "No information found to answer your query.";

const HEADER: &str = "**Information found:**\n\n";

pub fn compose(context: &[&Fragment]) -> String {
    if context.is_empty() {
        return NOT_FOUND.to_string();
    }

    let mut out = String::from(HEADER);

    if let Some(student) = context.iter().find_map(|f| match f {
        Fragment::Student(s) => Some(s),
        Fragment::Course(_) => None,
    }) {
        render_student(&mut out, student);
        return out;
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for fragment in context {
        if let Fragment::Course(c) = fragment {
            if seen.insert((c.student_id.as_str(), c.course_name.as_str())) {
                render_course(&mut out, c);
            }
        }
    }
    out
}

fn render_student(out: &mut String, s: &StudentFragment) {
    out.push_str(&format!(
        "**Student:** {}\n**ID:** {}\n**Program:** {}\n**Overall average:** {}\n**Status:** {}\n",
        s.name,
        s.id,
        s.program,
        format_average(s.average),
        Status::from_average(s.average)
    ));
}

fn render_course(out: &mut String, c: &CourseFragment) {
    let course = &c.course;
    out.push_str(&format!(
        "**Course:** {}\n**Scores:** P1: {}, P2: {}, P3: {}\n**Average:** {:.1}\n\
         **Attendance:** {}/{EXPECTED_SESSIONS}\n**Absences:** {}\n\n",
        c.course_name,
        format_score(course.partial1),
        format_score(course.partial2),
        format_score(course.partial3),
        course.answer_average(),
        course.attendance,
        course.absences
    ));
}

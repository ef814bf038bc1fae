//! learnlens-report: self-contained HTML pages for learnlens reports.

pub mod html;

pub use html::{generate_class_html, generate_student_html, write_class_html, write_student_html};

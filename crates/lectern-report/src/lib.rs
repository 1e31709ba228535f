//! lectern-report — HTML output for lectern.
//!
//! `html` renders check reports as standalone pages; `document` renders
//! converted markdown blocks and wraps them in a reader page with a table
//! of contents.

pub mod document;
pub mod html;

//! Output generation: HTML cards, the page rewrite, and the JSON snapshot.
//!
//! # Submodules
//!
//! - [`html`]: renders each article as a blog card fragment
//! - [`inject`]: splices the fragments and view total into the index page
//! - [`json`]: optional JSON dump of the aggregated list

pub mod html;
pub mod inject;
pub mod json;

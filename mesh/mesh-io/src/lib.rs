//! Mesh file I/O: triangle sources for STL and STEP.
//!
//! Each reader implements [`mesh_types::TriangleSource`], so any of them can
//! feed [`mesh_types::Mesh::load`]:
//!
//! - **STL** - binary and ASCII reading, binary writing
//! - **STEP** - CAD import boundary; reports [`IoError::CadUnavailable`]
//!   because no tessellation kernel is linked
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{save_stl, StlReader};
//! use mesh_types::Mesh;
//!
//! let mesh = Mesh::from_source(&mut StlReader::from_path("model.stl")).unwrap();
//! save_stl(&mesh, "copy.stl").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod step;
mod stl;

pub use error::{IoError, IoResult};
pub use step::{DEFAULT_ANGULAR_DEFLECTION, DEFAULT_LINEAR_DEFLECTION, StepImporter};
pub use stl::{
    HEADER_SIZE, StlReader, TRIANGLE_SIZE, load_stl, parse_stl, save_stl, write_stl_binary,
};

//! Maps planar images onto a disk hemisphere projection, and packs detail
//! masks and flipbook atlases from sets of PNG files.

pub mod image_pipeline;
pub mod logger;

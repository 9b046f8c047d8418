//! Export of reflections to portable formats.

pub mod csv;

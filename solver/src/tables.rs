//! Phase 0: build the immutable lookup tables.
//!
//! [`Tables::new`] is a pure constructor: it runs the row codec and the
//! symmetry compressor builders and returns a value that is then only ever
//! read, by reference, from every engine and worker.

use std::time::Instant;

use crate::row_codec::RowCodec;
use crate::symmetry::SymmetryTables;

pub struct Tables {
    pub codec: RowCodec,
    pub symmetry: SymmetryTables,
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

impl Tables {
    pub fn new() -> Self {
        let start = Instant::now();
        let codec = RowCodec::new();
        let symmetry = SymmetryTables::new();
        log::debug!(
            "Lookup tables built in {:.2} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self { codec, symmetry }
    }
}

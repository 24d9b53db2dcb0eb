//! irquad - true stereo impulse response layout converter
//!
//! Reverb impulse responses recorded in true stereo come either as two
//! stereo files per position (`"<base> L.wav"` and `"<base> R.wav"`) or as
//! one 4-channel file (`"<base>.wav"`). This crate converts whole directory
//! trees between the two layouts without touching the sample data.
//!
//! # Architecture
//!
//! - [`wav`]: raw-frame WAV container I/O
//! - [`pairing`]: finds L/R pairs among the files of one directory
//! - [`interleave`]: sample interleaving between pairs and quad files
//! - [`walker`]: mirrors an input tree into an output tree

pub mod cli;
pub mod error;
pub mod interleave;
pub mod pairing;
pub mod walker;
pub mod wav;

pub use error::{IrError, Result};
pub use walker::{
    convert, demux_files, mux_files, ConversionReport, ConvertOptions, FailurePolicy, Mode,
};
pub use wav::{AudioParameters, Compression, WavData};

//! Export MNIST-style image classification datasets to a simple IDX-like
//! binary format, and dump example images per class.

pub mod cli;
pub mod dataset;
pub mod export;
pub mod idx;

//! Credential masking for reported command output.

pub mod mask;

pub use mask::OutputMasker;

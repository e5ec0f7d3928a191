//! IR Transformations for liftc
//!
//! This crate contains transformation passes that run on the HIR:
//! - Closure conversion of locally defined types, which lifts classes and
//!   interfaces declared inside functions to the module top level

pub mod local_types;

pub use local_types::{convert_local_types, ConvertedType, ConvertedTypeInfo};

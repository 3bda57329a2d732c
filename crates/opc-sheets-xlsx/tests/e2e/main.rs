//! End-to-end tests for opc-sheets-xlsx.
//!
//! Each test assembles the package it needs in memory with
//! [`common::PackageBuilder`], then reads it back with `WorkbookReader`.

mod common;
mod reading;

pub use common::*;

//! Application layer: the per-page controller and the book router.

pub mod book;
pub mod controller;

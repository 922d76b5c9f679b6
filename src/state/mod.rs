/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Tool parameters and preview adjustments (edit.rs)
/// - The in-memory project library (library.rs)
/// - Screen navigation (screen.rs)
/// - The open editor session and its single-flight guard (session.rs)

pub mod data;
pub mod edit;
pub mod library;
pub mod screen;
pub mod session;

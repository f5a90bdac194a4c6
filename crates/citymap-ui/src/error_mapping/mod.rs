//! Conversions from UI service errors into the core `AppError` hierarchy.

mod weather;

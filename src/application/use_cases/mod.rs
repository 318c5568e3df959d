//! Use case implementations.

mod lazy_image_binder;

pub use lazy_image_binder::LazyImageBinder;

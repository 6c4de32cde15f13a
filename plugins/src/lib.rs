//! The apps shipped with pagestate, each an [`pagestate_core::App`].

pub mod factory;
pub mod library;
pub mod planner;
pub mod shop;
pub mod workout;

pub use factory::AppKind;

//! Pure projections from state to markup. Nothing here takes `&mut` state.

pub mod frame;
pub mod list;
pub mod markup;

pub use frame::{Frame, TextPatch};
pub use list::{render_append, render_list, ItemView};
pub use markup::{escape, Markup};

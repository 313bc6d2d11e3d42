pub mod geom;
pub mod screens;
pub mod theme;
pub mod view;

pub use geom::Rect;
pub use view::{RenderQueue, flush_queue};

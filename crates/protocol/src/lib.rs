pub mod commands;
pub mod ident;
pub mod phase;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, ScrollAlign, ScrollBehavior, ScrollCommand, TextAlign};
pub use ident::Ident;
pub use phase::Phase;
pub use theme::ThemeToken;
pub use types::{Point, Rect, Viewport};

pub mod drag;
pub mod input;
pub mod scene;
pub mod view;

pub use drag::{DragSession, DragTool};
pub use input::InputEvent;
pub use scene::{SceneIndex, ViewScene};
pub use view::DiagramView;

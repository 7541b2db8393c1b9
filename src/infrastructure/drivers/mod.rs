mod camera;
mod display;

pub use camera::{CameraError, DvpCamera, FrameToken};
pub use display::{PanelBus, PanelBusError, PanelSpi, init_panel_bus};

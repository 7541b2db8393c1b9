use camx_pipeline::Pipeline;

use crate::config::PREVIEW_WIDTH;
use crate::infrastructure::drivers::{DvpCamera, PanelBus};

pub type PreviewPipeline = Pipeline<'static, DvpCamera, PanelBus, PREVIEW_WIDTH>;

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";
const COUNT_TEMPLATE: &str = "{spinner} {msg:28} {wide_bar} {pos:>5}/{len}";

pub struct StageStyle;

impl StageStyle {
    pub fn message() -> ProgressStyle {
        ProgressStyle::with_template(MESSAGE_TEMPLATE).unwrap()
    }

    pub fn counter() -> ProgressStyle {
        ProgressStyle::with_template(COUNT_TEMPLATE)
            .unwrap()
            .progress_chars("#>-")
    }
}

pub trait StagedProgress {
    fn add_stage(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar;
}

impl StagedProgress for MultiProgress {
    fn add_stage(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar {
        let pb = self.add(pb);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

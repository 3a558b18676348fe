// Reading progress.
// Percent read and indicator opacity from the scroll offset within a post body.

/// Lower bound of the reported percentage.
pub const MIN_PERCENT: f64 = -2.0;
/// Upper bound of the reported percentage.
pub const MAX_PERCENT: f64 = 104.0;

/// Exponential ease-in on [0, 1].
pub fn ease_in_expo(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * x - 10.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scroll position within a post, tracked in rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingProgress {
    percent: f64,
    content_height: u16,
}

impl ReadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rendered height of the body. Zero disables updates.
    pub fn set_content_height(&mut self, rows: u16) {
        self.content_height = rows;
    }

    pub fn content_height(&self) -> u16 {
        self.content_height
    }

    /// Recompute from the scroll offset. Ignored while the height is unknown.
    pub fn update(&mut self, scroll_y: f64) {
        if self.content_height == 0 {
            return;
        }
        let percent = scroll_y / f64::from(self.content_height) * 100.0;
        self.percent = round2(percent).clamp(MIN_PERCENT, MAX_PERCENT);
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Fades out as the reader nears the end.
    pub fn opacity(&self) -> f64 {
        1.0 - ease_in_expo(self.percent / 100.0)
    }

    pub fn reset(&mut self) {
        self.percent = 0.0;
    }
}

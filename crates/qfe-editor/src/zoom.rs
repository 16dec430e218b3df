//! Discrete zoom steps.

/// Ordered, deduplicated list of zoom factors. Built once from the config
/// and passed by reference to whoever drives the zoom control.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomLevels {
    levels: Vec<f64>,
}

impl ZoomLevels {
    /// Non-positive and non-finite factors are dropped. An empty input
    /// falls back to a single 1:1 level.
    pub fn new(levels: &[f64]) -> Self {
        let mut levels: Vec<f64> = levels
            .iter()
            .copied()
            .filter(|z| z.is_finite() && *z > 0.0)
            .collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        if levels.is_empty() {
            levels.push(1.0);
        }
        Self { levels }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn min(&self) -> f64 {
        self.levels[0]
    }

    pub fn max(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    /// Next level strictly above `current`, or the largest level.
    pub fn zoom_in(&self, current: f64) -> f64 {
        self.levels
            .iter()
            .copied()
            .find(|z| *z > current)
            .unwrap_or_else(|| self.max())
    }

    /// Next level strictly below `current`, or the smallest level.
    pub fn zoom_out(&self, current: f64) -> f64 {
        self.levels
            .iter()
            .rev()
            .copied()
            .find(|z| *z < current)
            .unwrap_or_else(|| self.min())
    }

    /// The level closest to `value`; the lower one wins ties.
    pub fn nearest(&self, value: f64) -> f64 {
        let mut best = self.levels[0];
        for z in &self.levels[1..] {
            if (z - value).abs() < (best - value).abs() {
                best = *z;
            }
        }
        best
    }

    /// `value` limited to the level range. A non-finite value falls back
    /// to the level closest to 1:1.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.nearest(1.0);
        }
        value.clamp(self.min(), self.max())
    }
}

impl Default for ZoomLevels {
    fn default() -> Self {
        Self::new(&crate::config::EditorConfig::default().zoom_levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_through_levels() {
        let zoom = ZoomLevels::new(&[2.0, 0.5, 1.0, 1.0, -3.0]);
        assert_eq!(zoom.levels(), &[0.5, 1.0, 2.0]);
        assert_eq!(zoom.zoom_in(1.0), 2.0);
        assert_eq!(zoom.zoom_in(1.3), 2.0);
        assert_eq!(zoom.zoom_in(2.0), 2.0);
        assert_eq!(zoom.zoom_out(1.0), 0.5);
        assert_eq!(zoom.zoom_out(0.5), 0.5);
    }

    #[test]
    fn nearest_and_clamp() {
        let zoom = ZoomLevels::new(&[0.5, 1.0, 2.0]);
        assert_eq!(zoom.nearest(1.4), 1.0);
        assert_eq!(zoom.nearest(1.6), 2.0);
        assert_eq!(zoom.nearest(0.75), 0.5);
        assert_eq!(zoom.clamp(10.0), 2.0);
        assert_eq!(ZoomLevels::new(&[]).levels(), &[1.0]);
    }

    #[test]
    fn non_finite_zoom_falls_back_to_one() {
        let zoom = ZoomLevels::new(&[0.5, 1.0, 2.0]);
        assert_eq!(zoom.clamp(f64::NAN), 1.0);
        assert_eq!(zoom.clamp(f64::INFINITY), 1.0);
        assert_eq!(ZoomLevels::new(&[3.0, 4.0]).clamp(f64::NEG_INFINITY), 3.0);
    }
}

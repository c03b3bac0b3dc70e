// ============================================
// Autosave Timer - Накопитель времени автосохранения
// ============================================

/// Интервал по умолчанию, секунды
pub const DEFAULT_AUTOSAVE_INTERVAL: f32 = 300.0;

#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: f32,
    elapsed: f32,
    enabled: bool,
}

impl AutosaveTimer {
    pub fn new(interval: f32, enabled: bool) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            elapsed: 0.0,
            enabled,
        }
    }

    /// Прибавить dt; true когда пора сохраняться (счётчик сбрасывается)
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(f32::EPSILON);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.elapsed = 0.0;
    }

    /// Секунд до следующего сохранения
    pub fn remaining(&self) -> f32 {
        (self.interval - self.elapsed).max(0.0)
    }
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_interval() {
        let mut timer = AutosaveTimer::new(10.0, true);
        assert!(!timer.tick(4.0));
        assert!(!timer.tick(5.0));
        assert!(timer.tick(1.5));
        // Счётчик сброшен
        assert!(!timer.tick(9.0));
        assert!((timer.remaining() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_never_fires() {
        let mut timer = AutosaveTimer::new(1.0, false);
        assert!(!timer.tick(100.0));
        timer.set_enabled(true);
        assert!(timer.tick(1.0));
    }

    #[test]
    fn test_default_interval() {
        let timer = AutosaveTimer::default();
        assert_eq!(timer.interval(), 300.0);
        assert!(timer.is_enabled());
    }
}

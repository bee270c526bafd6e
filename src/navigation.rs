use chrono::{Duration, NaiveDate, Weekday};
use serde::Deserialize;

use crate::domain::{ViewMode, ViewWindow};
use crate::window::{compute_window, shift_month};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Today,
}

/// Allowed zoom factors. Zoom scales slot width on screen only.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.25,
        }
    }
}

impl ZoomRange {
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationController {
    anchor: NaiveDate,
    view_mode: ViewMode,
    zoom: f64,
    zoom_range: ZoomRange,
    first_day_of_week: Weekday,
}

impl NavigationController {
    pub fn new(anchor: NaiveDate, view_mode: ViewMode) -> Self {
        Self {
            anchor,
            view_mode,
            zoom: 1.0,
            zoom_range: ZoomRange::default(),
            first_day_of_week: Weekday::Sun,
        }
    }

    pub fn with_first_day_of_week(mut self, first_day_of_week: Weekday) -> Self {
        self.first_day_of_week = first_day_of_week;
        self
    }

    pub fn with_zoom_range(mut self, zoom_range: ZoomRange) -> Self {
        self.zoom_range = zoom_range;
        self.zoom = zoom_range.clamp(self.zoom);
        self
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn window(&self) -> ViewWindow {
        compute_window(self.anchor, self.view_mode, self.first_day_of_week)
    }

    pub fn next(&mut self) {
        self.shift(1);
    }

    pub fn previous(&mut self) {
        self.shift(-1);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.anchor = today;
    }

    pub fn navigate(&mut self, navigation: Navigation, today: NaiveDate) {
        match navigation {
            Navigation::Next => self.next(),
            Navigation::Previous => self.previous(),
            Navigation::Today => self.go_to_today(today),
        }
    }

    /// The anchor is kept as-is; the window is normalized when next computed.
    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn set_zoom(&mut self, value: f64) {
        if value.is_finite() {
            self.zoom = self.zoom_range.clamp(value);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_range.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_range.step);
    }

    fn shift(&mut self, direction: i32) {
        self.anchor = match self.view_mode {
            ViewMode::Week => self.anchor + Duration::days(7 * direction as i64),
            ViewMode::Month => shift_month(self.anchor, direction),
        };
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Weekday};

    use super::{Navigation, NavigationController, ZoomRange};
    use crate::domain::ViewMode;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_navigation_moves_by_seven_days() {
        let mut nav = NavigationController::new(day(2024, 1, 10), ViewMode::Week);
        nav.next();
        assert_eq!(nav.anchor(), day(2024, 1, 17));
        nav.previous();
        nav.previous();
        assert_eq!(nav.anchor(), day(2024, 1, 3));
    }

    #[test]
    fn month_navigation_falls_back_to_last_valid_day() {
        let mut nav = NavigationController::new(day(2024, 1, 31), ViewMode::Month);
        nav.next();
        assert_eq!(nav.anchor(), day(2024, 2, 29));
        nav.next();
        assert_eq!(nav.anchor(), day(2024, 3, 29));
    }

    #[test]
    fn next_then_previous_covers_the_original_anchor() {
        let mut anchor = day(2023, 12, 25);
        let end = day(2024, 3, 5);
        while anchor <= end {
            for mode in [ViewMode::Week, ViewMode::Month] {
                let mut nav = NavigationController::new(anchor, mode);
                nav.next();
                nav.previous();
                assert!(nav.window().contains(anchor), "{mode} round trip from {anchor}");
            }
            anchor += Duration::days(1);
        }
    }

    #[test]
    fn today_uses_the_injected_date() {
        let mut nav = NavigationController::new(day(2020, 5, 5), ViewMode::Month);
        nav.navigate(Navigation::Today, day(2024, 1, 10));
        assert_eq!(nav.anchor(), day(2024, 1, 10));
        nav.navigate(Navigation::Next, day(2030, 1, 1));
        assert_eq!(nav.anchor(), day(2024, 2, 10));
    }

    #[test]
    fn switching_mode_keeps_anchor_unnormalized() {
        let mut nav = NavigationController::new(day(2024, 1, 10), ViewMode::Week);
        nav.set_view_mode(ViewMode::Month);
        assert_eq!(nav.anchor(), day(2024, 1, 10));
        assert_eq!(nav.window().start, day(2024, 1, 1));
        assert_eq!(nav.window().end, day(2024, 1, 31));
    }

    #[test]
    fn window_respects_first_day_of_week() {
        let nav = NavigationController::new(day(2024, 1, 10), ViewMode::Week)
            .with_first_day_of_week(Weekday::Mon);
        assert_eq!(nav.window().start, day(2024, 1, 8));
    }

    #[test]
    fn zoom_is_clamped_and_ignores_nan() {
        let mut nav = NavigationController::new(day(2024, 1, 10), ViewMode::Week);
        nav.set_zoom(5.0);
        assert_eq!(nav.zoom(), 2.0);
        nav.set_zoom(0.1);
        assert_eq!(nav.zoom(), 0.5);
        nav.set_zoom(f64::NAN);
        assert_eq!(nav.zoom(), 0.5);
        nav.zoom_in();
        assert_eq!(nav.zoom(), 0.75);
        for _ in 0..10 {
            nav.zoom_out();
        }
        assert_eq!(nav.zoom(), 0.5);
    }

    #[test]
    fn custom_zoom_range_clamps_current_zoom() {
        let nav = NavigationController::new(day(2024, 1, 10), ViewMode::Week).with_zoom_range(ZoomRange {
            min: 1.5,
            max: 3.0,
            step: 0.5,
        });
        assert_eq!(nav.zoom(), 1.5);
    }
}

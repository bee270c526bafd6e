use chrono::NaiveDate;

use crate::domain::{TimeSlot, ViewWindow};

/// Expands `window` into one slot per day, `start` and `end` included.
pub fn generate_slots(window: &ViewWindow) -> Vec<TimeSlot> {
    let mut slots = Vec::with_capacity(window.day_count());
    let mut current = window.start;
    while current <= window.end {
        slots.push(TimeSlot { date: current });
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    slots
}

pub fn slot_index(slots: &[TimeSlot], date: NaiveDate) -> Option<usize> {
    slots.iter().position(|slot| slot.date == date)
}

pub fn today_slot_index(slots: &[TimeSlot], today: NaiveDate) -> Option<usize> {
    slot_index(slots, today)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Weekday};

    use super::{generate_slots, today_slot_index};
    use crate::domain::{ViewMode, ViewWindow};
    use crate::window::compute_window;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_window_yields_seven_contiguous_slots() {
        let window = ViewWindow {
            start: day(2024, 1, 7),
            end: day(2024, 1, 13),
        };
        let slots = generate_slots(&window);
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0].date, window.start);
        assert_eq!(slots[6].date, window.end);
        for pair in slots.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
        }
    }

    #[test]
    fn slot_count_matches_window_length_for_every_month() {
        for month in 1..=12 {
            let window = compute_window(day(2023, month, 10), ViewMode::Month, Weekday::Sun);
            let slots = generate_slots(&window);
            assert_eq!(slots.len() as i64, (window.end - window.start).num_days() + 1);
            assert!((28..=31).contains(&slots.len()));
        }
    }

    #[test]
    fn generating_twice_gives_the_same_slots() {
        let window = compute_window(day(2024, 2, 15), ViewMode::Month, Weekday::Sun);
        assert_eq!(generate_slots(&window), generate_slots(&window));
    }

    #[test]
    fn single_day_window_has_one_slot() {
        let window = ViewWindow {
            start: day(2024, 5, 1),
            end: day(2024, 5, 1),
        };
        assert_eq!(generate_slots(&window).len(), 1);
    }

    #[test]
    fn finds_today_only_inside_window() {
        let window = compute_window(day(2024, 1, 10), ViewMode::Week, Weekday::Sun);
        let slots = generate_slots(&window);
        assert_eq!(today_slot_index(&slots, day(2024, 1, 10)), Some(3));
        assert_eq!(today_slot_index(&slots, day(2024, 1, 14)), None);
    }
}

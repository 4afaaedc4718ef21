//! Slot semanal de ejecución (UTC).
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    at: NaiveTime,
}

impl WeeklySchedule {
    /// `None` si `hour` no es una hora válida.
    pub fn new(weekday: Weekday, hour: u32) -> Option<Self> {
        Some(Self { weekday,
                    at: NaiveTime::from_hms_opt(hour, 0, 0)? })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Próximo slot estrictamente posterior a `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ahead = (7 + self.weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7;
        let day = now.date_naive() + Days::new(u64::from(ahead));
        let candidate = day.and_time(self.at).and_utc();
        if candidate > now {
            candidate
        } else {
            candidate + Days::new(7)
        }
    }
}

/// Aggregated view of session progress, useful for the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub score: u32,
    pub high_score: u32,
    pub lives_remaining: u32,
    pub rounds_completed: u32,
    pub round_cap: u32,
    pub time_remaining_secs: u32,
    pub total_time_secs: u32,
}

impl SessionProgress {
    /// Elapsed share of the countdown, rounded to a whole percent.
    #[must_use]
    pub fn percent_elapsed(&self) -> u32 {
        if self.total_time_secs == 0 {
            return 100;
        }
        let total = u64::from(self.total_time_secs);
        let elapsed = total.saturating_sub(u64::from(self.time_remaining_secs));
        let percent = (elapsed * 100 + total / 2) / total;
        u32::try_from(percent.min(100)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(time_remaining_secs: u32, total_time_secs: u32) -> SessionProgress {
        SessionProgress {
            score: 0,
            high_score: 0,
            lives_remaining: 3,
            rounds_completed: 0,
            round_cap: 10,
            time_remaining_secs,
            total_time_secs,
        }
    }

    #[test]
    fn percent_elapsed_rounds_to_nearest() {
        assert_eq!(progress(60, 60).percent_elapsed(), 0);
        assert_eq!(progress(30, 60).percent_elapsed(), 50);
        assert_eq!(progress(59, 60).percent_elapsed(), 2);
        assert_eq!(progress(0, 60).percent_elapsed(), 100);
    }
}

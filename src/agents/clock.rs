//! Current date and time handlers.
//!
//! The formatting core is a pure function of an injected timestamp; the
//! dispatcher uses the thin wrappers that read the local clock.

use chrono::{Local, NaiveDateTime};

use super::AgentResponse;

pub fn handle_time() -> AgentResponse {
    time_response(Local::now().naive_local())
}

pub fn handle_date() -> AgentResponse {
    date_response(Local::now().naive_local())
}

pub fn time_response(now: NaiveDateTime) -> AgentResponse {
    AgentResponse::say(format!("It's {} right now.", now.format("%-I:%M %p")))
}

pub fn date_response(now: NaiveDateTime) -> AgentResponse {
    AgentResponse::say(format!("Today is {}.", now.format("%A, %B %-d, %Y")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 7, 24)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn afternoon_time() {
        assert_eq!(time_response(at(15, 4)).fulfillment, "It's 3:04 PM right now.");
    }

    #[test]
    fn morning_time_has_no_leading_zero() {
        assert_eq!(time_response(at(9, 30)).fulfillment, "It's 9:30 AM right now.");
    }

    #[test]
    fn date_is_spelled_out() {
        assert_eq!(
            date_response(at(12, 0)).fulfillment,
            "Today is Friday, July 24, 2020."
        );
    }
}

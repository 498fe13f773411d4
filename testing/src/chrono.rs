use std::cell::Cell;

thread_local! {
    static TIMESTAMP: Cell<i64> = Cell::new(1234567890);
}

/// Sets the timestamp returned by [`Utc::now`] on the current thread.
pub fn set_timestamp(timestamp: i64) {
    TIMESTAMP.with(|ts| ts.set(timestamp));
}

/// Stand-in for `chrono::Utc` with a clock that only moves when told to.
pub struct Utc;

impl Utc {
    pub fn now() -> ::chrono::DateTime<::chrono::Utc> {
        ::chrono::DateTime::from_timestamp(TIMESTAMP.with(Cell::get), 0)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_clock() {
        assert_eq!(Utc::now().timestamp(), 1234567890);
        set_timestamp(1500000000);
        assert_eq!(Utc::now().timestamp(), 1500000000);
    }
}

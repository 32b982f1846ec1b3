use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::core::{
    error::{Error, Result},
    slot::{self, SLOT},
};

/// Half-open `[start, stop)` run of whole slots.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[must_use]
pub struct Period {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
}

impl Debug for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.stop)
    }
}

impl Period {
    pub fn try_new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self> {
        slot::ensure_aligned(&start)?;
        slot::ensure_aligned(&stop)?;
        if stop <= start {
            return Err(Error::InvalidInput(format!("period `{start}..{stop}` is empty")));
        }
        Ok(Self { start, stop })
    }

    pub const fn start(self) -> DateTime<Utc> {
        self.start
    }

    pub const fn stop(self) -> DateTime<Utc> {
        self.stop
    }

    pub fn duration(self) -> TimeDelta {
        self.stop - self.start
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn n_slots(self) -> usize {
        (self.duration().num_seconds() / SLOT.num_seconds()) as usize
    }

    /// Iterate over the slot starts.
    pub fn slots(self) -> impl Iterator<Item = DateTime<Utc>> {
        (0..self.n_slots()).map(move |index| {
            self.start + SLOT * i32::try_from(index).unwrap_or(i32::MAX)
        })
    }
}

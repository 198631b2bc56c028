use serde::Serialize;

const REFERRAL_POINTS: i64 = 2;
const MEETING_POINTS: i64 = 2;
const EVENT_POINTS: i64 = 1;
const ONE_TO_ONE_POINTS: i64 = 3;

const ACTIVE_ABOVE: i64 = 15;
const GROWING_FROM: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub referrals: i64,
    pub meetings: i64,
    pub events: i64,
    pub one_to_ones: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngagementStatus {
    Active,
    Growing,
    Inactive,
}

impl ActivityCounts {
    pub fn points(&self) -> i64 {
        self.referrals * REFERRAL_POINTS
            + self.meetings * MEETING_POINTS
            + self.events * EVENT_POINTS
            + self.one_to_ones * ONE_TO_ONE_POINTS
    }
}

pub fn status_for(points: i64) -> EngagementStatus {
    if points > ACTIVE_ABOVE {
        EngagementStatus::Active
    } else if points >= GROWING_FROM {
        EngagementStatus::Growing
    } else {
        EngagementStatus::Inactive
    }
}

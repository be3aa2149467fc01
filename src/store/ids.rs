use chrono::Utc;

use crate::models::RecordId;

/// Hands out ids for records the backend stored without one.
///
/// Ids are `local-<millis>-<seq>`. `seq` never resets within a session, so two
/// ids never collide even when the clock stalls or steps backwards.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: i64,
    seq: u64,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> RecordId {
        let millis = Utc::now().timestamp_millis().max(self.last_millis);
        self.last_millis = millis;
        self.seq += 1;
        RecordId::new(format!("local-{millis}-{}", self.seq))
    }
}

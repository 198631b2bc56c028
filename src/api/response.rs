use serde::Serialize;
use uuid::Uuid;

use crate::models::referral::Referral;
use crate::models::revenue::Revenue;

/// Records the web client looks up by `_id` as well as `id`
pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Referral {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Revenue {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Serializes `record` with an extra `_id` equal to its `id`
#[derive(Debug, Serialize)]
pub struct WithKey<T> {
    #[serde(rename = "_id")]
    pub key: Uuid,
    #[serde(flatten)]
    pub record: T,
}

impl<T: Keyed> From<T> for WithKey<T> {
    fn from(record: T) -> Self {
        Self {
            key: record.key(),
            record,
        }
    }
}

pub fn keyed<T: Keyed>(records: Vec<T>) -> Vec<WithKey<T>> {
    records.into_iter().map(WithKey::from).collect()
}

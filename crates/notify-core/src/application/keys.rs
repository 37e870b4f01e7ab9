//! Record key layout
//!
//! Every record lives in one flat key space. Partition keys are namespaced
//! by kind so each lookup is a single-partition point or range query:
//!
//! | record          | pk                  | sk                       |
//! |-----------------|---------------------|--------------------------|
//! | business        | `BUSINESS#<id>`     | `METADATA`               |
//! | email index     | `EMAIL#<email>`     | `INDEX`                  |
//! | phone index     | `PHONE#<phone>`     | `INDEX`                  |
//! | api key index   | `APIKEY#<key>`      | `INDEX`                  |
//! | usage period    | `BUSINESS#<id>`     | `USAGE#<period start>`   |
//! | first period    | `BUSINESS#<id>`     | `USAGE_GENESIS`          |
//! | plan            | `PLAN#<id>`         | `METADATA`               |
//! | template        | `TEMPLATE`          | `<template id>`          |

use crate::domain::value_objects::BusinessId;
use crate::ports::outbound::ItemKey;

pub const METADATA_SK: &str = "METADATA";
pub const INDEX_SK: &str = "INDEX";
pub const TEMPLATE_PARTITION: &str = "TEMPLATE";
pub const USAGE_GENESIS_SK: &str = "USAGE_GENESIS";

pub fn business_pk(id: &BusinessId) -> String {
    format!("BUSINESS#{}", id)
}

pub fn business(id: &BusinessId) -> ItemKey {
    ItemKey::new(business_pk(id), METADATA_SK)
}

pub fn usage_period(id: &BusinessId, sort_key: &str) -> ItemKey {
    ItemKey::new(business_pk(id), sort_key)
}

/// Marker claimed by whichever request writes a business's first period
pub fn usage_genesis(id: &BusinessId) -> ItemKey {
    ItemKey::new(business_pk(id), USAGE_GENESIS_SK)
}

pub fn plan(id: &str) -> ItemKey {
    ItemKey::new(format!("PLAN#{}", id), METADATA_SK)
}

pub fn template(id: &str) -> ItemKey {
    ItemKey::new(TEMPLATE_PARTITION, id)
}

use crate::method::Method0;
use std::collections::HashMap;

/// Index name to its snapshot log lines, oldest first.
pub type SnapshotsResponse = HashMap<String, Vec<String>>;

pub struct Snapshots;

impl Method0 for Snapshots {
    const PATH: &'static str = "/api/snapshots";
    type Response = SnapshotsResponse;
}

use crate::method::Method0;
use marketdesk_shared_models::Sample;
use std::collections::HashMap;

/// Index name to its chart samples in arrival order.
pub type ChartDataResponse = HashMap<String, Vec<Sample>>;

pub struct ChartData;

impl Method0 for ChartData {
    const PATH: &'static str = "/api/chartdata";
    type Response = ChartDataResponse;
}

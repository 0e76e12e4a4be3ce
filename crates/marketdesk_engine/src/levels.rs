use marketdesk_shared_models::{LevelName, LevelSet, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub style_tag: &'static str,
}

impl From<Status> for Classification {
    fn from(status: Status) -> Self {
        Self {
            status,
            style_tag: status.style_tag(),
        }
    }
}

/// Where `price` sits relative to `level`. A zero price means no trade seen yet.
///
/// Equality counts as below; only a strictly higher price is above.
pub fn classify(level: Option<f64>, price: f64) -> Classification {
    let status = match level.filter(|l| l.is_finite()) {
        None => Status::Unknown,
        Some(_) if price == 0.0 || !price.is_finite() => Status::Unknown,
        Some(level) if price > level => Status::Above,
        Some(_) => Status::Below,
    };

    status.into()
}

pub fn classify_all(levels: &LevelSet, price: f64) -> [(LevelName, Classification); 8] {
    LevelName::ALL.map(|name| (name, classify(levels.get(name), price)))
}

use crate::method::Method;
use bon::Builder;
use marketdesk_shared_models::LevelSet;

#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct LevelsParams {
    /// Levels file suffix, e.g. `NIFTY_50` for `levels_NIFTY_50.json`.
    pub file_key: String,
}

pub struct Levels;

impl Method for Levels {
    type Response = LevelSet;
    type Params = LevelsParams;

    fn path(params: &Self::Params) -> String {
        format!("/api/levels/levels_{}.json", params.file_key)
    }
}

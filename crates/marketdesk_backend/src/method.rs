use serde::de::DeserializeOwned;

/// An endpoint whose path depends on request parameters.
pub trait Method {
    type Response: DeserializeOwned;
    type Params;

    fn path(params: &Self::Params) -> String;
}

/// A parameterless endpoint.
pub trait Method0 {
    const PATH: &'static str;

    type Response: DeserializeOwned;
}

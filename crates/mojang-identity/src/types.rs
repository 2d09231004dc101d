use serde::Deserialize;

/// Response from `GET /users/by-name/{name}`; `id` is the undashed UUID
#[derive(Debug, Deserialize)]
pub(crate) struct NameLookupResponse {
    pub(crate) id: String,
    #[allow(dead_code)]
    pub(crate) name: String,
}

/// Response from `GET /session/profile/{uuid}`
#[derive(Debug, Deserialize)]
pub(crate) struct SessionProfileResponse {
    #[allow(dead_code)]
    pub(crate) id: String,
    pub(crate) name: String,
}

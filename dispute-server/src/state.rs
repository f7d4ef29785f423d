use crate::{
    api::ws::WsState,
    session,
};

/// Application state handed to the API layer. The session service owns every
/// live room; handlers never touch session state directly.
pub struct Store {
    pub sessions:  session::service::Service,
    pub ws:        WsState,
    pub admin_key: String,
}

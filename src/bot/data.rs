#[derive(Debug)]
pub struct BotData {
    pub client_id: String,
    pub store: crate::auth::store::TokenStore,
    pub options: crate::options::Options,
}

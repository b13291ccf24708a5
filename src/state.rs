use crate::{
    db::{DbPool, OrmConn},
    storage::MediaStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub media: MediaStorage,
}

use std::sync::Arc;

use chrono_tz::Tz;

use crate::application::{board::BoardHandle, generations::RequestGenerations};

#[derive(Clone)]
pub struct HttpState {
    pub board: BoardHandle,
    pub generations: Arc<RequestGenerations>,
    pub timezone: Tz,
}

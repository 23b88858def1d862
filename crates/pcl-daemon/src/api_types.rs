//! Response types for every pcl-daemon HTTP endpoint. `Serialize`-only on
//! purpose: this surface has no request bodies to decode, because it has
//! no write endpoints.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

use rand::RngCore;

use app_api::AppContext;

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
    pub internal_token: String,
}

impl HttpState {
    pub fn new(context: AppContext, internal_token: String) -> Self {
        Self {
            context,
            internal_token,
        }
    }
}

/// Token guarding the admin and internal routes. Printed at startup so
/// operators can call them; never persisted.
pub fn generate_internal_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

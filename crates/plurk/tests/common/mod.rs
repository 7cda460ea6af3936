#![allow(dead_code)]

use std::sync::Once;

use plurk::{PlurkClient, PlurkConfig};
use wiremock::MockServer;

/// Route client logs to the test output; `RUST_LOG=plurk=debug` shows each call.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn client_for(server: &MockServer) -> PlurkClient {
    init_tracing();
    PlurkClient::new(PlurkConfig::new().base_url(server.uri())).expect("client build")
}

//! Installing over an existing global subscriber.

use logging::{LogConfig, init_tracing};
use tracing_subscriber::util::SubscriberInitExt;

#[test]
fn existing_subscriber_is_kept_and_reported() {
    tracing_subscriber::registry().try_init().unwrap();

    let error = init_tracing(LogConfig::default()).unwrap_err();
    assert!(!error.to_string().is_empty());

    // Events still reach the subscriber that was installed first.
    tracing::debug!(target: "argon2::bench", %error, "tracing subscriber already installed");
}

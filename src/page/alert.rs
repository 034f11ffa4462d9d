/// Blocking user-facing notice, used for the wrong-network condition
pub trait Alerter: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr and the log
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAlerter;

impl Alerter for StderrAlerter {
    fn alert(&self, message: &str) {
        tracing::error!(alert = message, "user alert raised");
        eprintln!("\u{26a0} {}", message);
    }
}

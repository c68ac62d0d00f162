/// Outbound port for user-facing warnings.
pub trait Notifier: Send + Sync + 'static {
    fn warn(&self, message: &str);
}

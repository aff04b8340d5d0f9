/// Sink for sanitation warnings (§4.5, §7): accumulates messages rather
/// than printing unconditionally, and supports the "only when warnings are
/// enabled" toggle from §7.
#[derive(Debug, Default)]
pub struct Diagnostics {
    enabled: bool,
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            messages: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        if self.enabled {
            let message = message.into();
            eprintln!("warning: {message}");
            self.messages.push(message);
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

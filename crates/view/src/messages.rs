/// Message keys the view needs from the localization provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageKey {
    /// "This device does not support interactive maps."
    DeviceMapSupport,
    /// "Please ensure your software is up to date."
    EnsureUpToDate,
}

/// Localization provider seam. The actual translation storage lives outside
/// this workspace; the view only ever asks for the two fallback messages.
pub trait Messages {
    fn get(&self, key: MessageKey) -> String;
}

/// English defaults, used when no provider is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishMessages;

impl Messages for EnglishMessages {
    fn get(&self, key: MessageKey) -> String {
        match key {
            MessageKey::DeviceMapSupport => {
                "This device does not support interactive maps.".to_string()
            }
            MessageKey::EnsureUpToDate => {
                "Please ensure your software is up to date.".to_string()
            }
        }
    }
}

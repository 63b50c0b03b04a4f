/// Configuration for the node CSV writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Size in bytes of the CSV encoder's internal buffer
    pub buffer_capacity: usize,

    /// Whether to fsync the output before it replaces the destination.
    /// Turning this off trades durability for speed on scratch outputs.
    pub sync_on_finish: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            // 1MB keeps syscalls rare for ~40 byte rows
            buffer_capacity: 1024 * 1024,
            sync_on_finish: true,
        }
    }
}

impl WriterConfig {
    /// Configuration for throwaway outputs (no fsync)
    pub fn scratch() -> Self {
        Self {
            sync_on_finish: false,
            ..Self::default()
        }
    }
}

/// Which of the two output formats a [`crate::DataVectorLogger`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Append one comma-separated row per `log()` call. Intended for
    /// post-flight analysis of a full run.
    Csv,
    /// Overwrite the file in place on every `log()` call with a
    /// human-readable snapshot, intended to be read with the `watch`
    /// command-line utility.
    Watch,
}

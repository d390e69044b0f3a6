use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

/// Best-effort, optionally labelled writer for human-readable progress.
///
/// A sink either wraps an [`io::Write`] target or is disabled, in which case
/// every line is discarded. Every line is prefixed with the sink's label. The
/// first write error disables the sink and is reported once through
/// `tracing`, because progress output must never abort the work it describes.
///
/// # Examples
///
/// ```
/// use logging::ProgressSink;
///
/// let mut sink = ProgressSink::with_label(Vec::new(), "[libargon2] ");
/// sink.line(format_args!("Selecting {}...", "fill_segment"));
///
/// let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
/// assert_eq!(output, "[libargon2] Selecting fill_segment...\n");
/// ```
///
/// A disabled sink accepts lines silently:
///
/// ```
/// use logging::ProgressSink;
///
/// let mut sink = ProgressSink::<Vec<u8>>::disabled();
/// sink.line(format_args!("ignored"));
/// assert!(!sink.is_enabled());
/// assert!(sink.into_inner().is_none());
/// ```
pub struct ProgressSink<W> {
    writer: Option<W>,
    label: Cow<'static, str>,
}

impl<W> ProgressSink<W> {
    /// A sink that discards everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            writer: None,
            label: Cow::Borrowed(""),
        }
    }

    /// Wraps `writer` without a label.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            label: Cow::Borrowed(""),
        }
    }

    /// Wraps `writer` and prefixes every line with `label`.
    #[must_use]
    pub fn with_label(writer: W, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            writer: Some(writer),
            label: label.into(),
        }
    }

    /// Wraps `writer` when present; a `None` writer yields a disabled sink.
    #[must_use]
    pub fn from_option(writer: Option<W>, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    /// Reports whether lines still reach a writer.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Label prefixed to every line.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consumes the sink and returns the writer, if it is still enabled.
    #[must_use]
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }
}

impl<W: Write> ProgressSink<W> {
    /// Writes one progress line.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        let result = write_line(writer, &self.label, args);
        if let Err(error) = result {
            tracing::warn!(
                target: "argon2::progress",
                %error,
                "progress sink failed; suppressing further progress output"
            );
            self.writer = None;
        }
    }
}

fn write_line<W: Write>(
    writer: &mut W,
    label: &str,
    args: fmt::Arguments<'_>,
) -> io::Result<()> {
    writer.write_all(label.as_bytes())?;
    writer.write_fmt(args)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

impl<W> fmt::Debug for ProgressSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink")
            .field("enabled", &self.is_enabled())
            .field("label", &self.label)
            .finish()
    }
}

impl<W> Default for ProgressSink<W> {
    fn default() -> Self {
        Self::disabled()
    }
}

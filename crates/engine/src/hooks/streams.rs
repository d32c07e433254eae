//! Standard stream routing for hook commands and scripts

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Where one of the standard streams goes
///
/// File streams hold an open handle shared by every command of the instance,
/// so output from consecutive commands accumulates in order.
#[derive(Debug, Clone, Default)]
pub enum Stream {
    /// Use the host process' own stream
    #[default]
    Inherit,
    /// Discard sink: written data is dropped, reads see end of file
    Null,
    /// An open file
    File(Arc<File>),
}

/// Which host stream `Stream::Inherit` stands for when writing in-process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Stdout,
    Stderr,
}

impl Stream {
    /// Append output to a file, creating it if needed
    pub fn append_to<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from(file))
    }

    /// Read input from a file
    pub fn read_from<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from(File::open(path)?))
    }

    /// Check if this is the discard sink
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Write one line from in-process code (script `print`, announcements)
    pub(crate) fn write_line(&self, role: Role, line: &str) -> io::Result<()> {
        match self {
            Self::Inherit => match role {
                Role::Stdout => writeln!(io::stdout().lock(), "{line}"),
                Role::Stderr => writeln!(io::stderr().lock(), "{line}"),
            },
            Self::Null => Ok(()),
            Self::File(file) => {
                let mut file: &File = file;
                writeln!(file, "{line}")
            }
        }
    }

    /// Redirect a child's stdin
    pub(crate) fn attach_stdin(&self, expr: duct::Expression) -> io::Result<duct::Expression> {
        Ok(match self {
            Self::Inherit => expr,
            Self::Null => expr.stdin_null(),
            Self::File(file) => expr.stdin_file(file.try_clone()?),
        })
    }

    /// Redirect a child's stdout
    pub(crate) fn attach_stdout(&self, expr: duct::Expression) -> io::Result<duct::Expression> {
        Ok(match self {
            Self::Inherit => expr,
            Self::Null => expr.stdout_null(),
            Self::File(file) => expr.stdout_file(file.try_clone()?),
        })
    }

    /// Redirect a child's stderr
    pub(crate) fn attach_stderr(&self, expr: duct::Expression) -> io::Result<duct::Expression> {
        Ok(match self {
            Self::Inherit => expr,
            Self::Null => expr.stderr_null(),
            Self::File(file) => expr.stderr_file(file.try_clone()?),
        })
    }
}

impl From<File> for Stream {
    fn from(file: File) -> Self {
        Self::File(Arc::new(file))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_accumulates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let stream = Stream::append_to(&path).unwrap();
        stream.write_line(Role::Stdout, "first").unwrap();
        stream.clone().write_line(Role::Stdout, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_null_drops_everything() {
        let stream = Stream::Null;
        assert!(stream.is_null());
        stream.write_line(Role::Stderr, "gone").unwrap();
    }

    #[test]
    fn test_default_is_inherit() {
        assert!(matches!(Stream::default(), Stream::Inherit));
        assert!(!Stream::default().is_null());
    }

    #[test]
    fn test_read_from_missing_file() {
        assert!(Stream::read_from("/nonexistent/input.txt").is_err());
    }
}

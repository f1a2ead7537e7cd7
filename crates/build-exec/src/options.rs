//! Options that control how a command is executed

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Input for the executed command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Input {
    /// Share the standard input of this process
    #[default]
    Inherit,
    /// No input
    Null,
    /// Get input bytes from a file
    File(PathBuf),
    /// Get input bytes from a byte vector
    Bytes(Vec<u8>),
}

impl Input {
    pub(crate) fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Input::Inherit => Stdio::inherit(),
            Input::Null => Stdio::null(),
            Input::File(path) => Stdio::from(File::open(path)?),
            Input::Bytes(bytes) => {
                let mut file = tempfile::tempfile()?;
                file.write_all(bytes)?;
                file.rewind()?;
                Stdio::from(file)
            }
        })
    }
}

impl From<&[u8]> for Input {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Input {
    fn from(c: Vec<u8>) -> Self {
        Self::Bytes(c)
    }
}

impl From<&str> for Input {
    fn from(str: &str) -> Self {
        Self::Bytes(str.as_bytes().to_vec())
    }
}

impl From<&Path> for Input {
    fn from(p: &Path) -> Self {
        Self::File(p.to_path_buf())
    }
}

impl From<PathBuf> for Input {
    fn from(file: PathBuf) -> Self {
        Self::File(file)
    }
}

/// Where an output stream of the command should go instead of being captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Write straight to the corresponding stream of this process
    Inherit,
    /// Throw the output away
    Null,
    /// Stream the output into a file
    ///
    /// If append is true, then a new file isn't created if one at the path
    /// already exists. and text is appended. Otherwise a new file
    /// is created, replacing any old file.
    File {
        /// The path of the file to emit output to
        path: PathBuf,
        /// whether to append to the file or not
        append: bool,
    },
}

impl Redirect {
    /// Create a new redirect with a file as the target
    pub fn file<P: AsRef<Path>>(path: P, append: bool) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            append,
        }
    }

    pub(crate) fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Redirect::Inherit => Stdio::inherit(),
            Redirect::Null => Stdio::null(),
            Redirect::File { path, append } => {
                let file = File::options()
                    .create(true)
                    .write(true)
                    .append(*append)
                    .truncate(!*append)
                    .open(path)?;
                Stdio::from(file)
            }
        })
    }
}

impl From<&Path> for Redirect {
    fn from(path: &Path) -> Self {
        Self::file(path, false)
    }
}

impl From<PathBuf> for Redirect {
    fn from(path: PathBuf) -> Self {
        Self::File {
            path,
            append: false,
        }
    }
}

/// Options for a single execution.
///
/// Setters come in two flavours, `&mut self` ones for configuring in place and consuming `with_*`
/// ones for chaining.
#[derive(Debug, Default, Clone)]
pub struct ExecOptions {
    /// Run the invocation through the host shell
    pub shell: bool,
    /// Where the command's stdout goes. When set, output is not captured in interactive mode.
    /// Ignored when output is streamed.
    pub stdout: Option<Redirect>,
    /// Where the command's stderr goes in interactive mode. Inherited when unset. Ignored when
    /// output is streamed, since stderr is merged into stdout.
    pub stderr: Option<Redirect>,
    /// The environment variables for the command.
    ///
    /// # Warning
    /// When set, **ONLY** the environment variables in this map will be passed to the command.
    pub env: Option<HashMap<String, String>>,
    /// The working directory of the command. Inherited when unset.
    pub working_dir: Option<PathBuf>,
    /// The standard input of the command
    pub stdin: Input,
}

impl ExecOptions {
    /// Creates the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that run through the host shell
    pub fn shell() -> Self {
        Self::new().with_shell(true)
    }

    /// Sets whether to run through the host shell
    pub fn set_shell(&mut self, shell: bool) -> &mut Self {
        self.shell = shell;
        self
    }

    /// Sets whether to run through the host shell
    pub fn with_shell(mut self, shell: bool) -> Self {
        self.set_shell(shell);
        self
    }

    /// Sets where stdout goes
    pub fn stdout<R: Into<Redirect>>(&mut self, redirect: R) -> &mut Self {
        self.stdout = Some(redirect.into());
        self
    }

    /// Sets where stdout goes
    pub fn with_stdout<R: Into<Redirect>>(mut self, redirect: R) -> Self {
        self.stdout(redirect);
        self
    }

    /// Sets where stderr goes
    pub fn stderr<R: Into<Redirect>>(&mut self, redirect: R) -> &mut Self {
        self.stderr = Some(redirect.into());
        self
    }

    /// Sets where stderr goes
    pub fn with_stderr<R: Into<Redirect>>(mut self, redirect: R) -> Self {
        self.stderr(redirect);
        self
    }

    /// Replaces the environment of the command with the contents of this map.
    pub fn env<I: IntoIterator<Item = (K, V)>, K: Into<String>, V: Into<String>>(
        &mut self,
        env: I,
    ) -> &mut Self {
        self.env = Some(
            env.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Replaces the environment of the command with the contents of this map.
    pub fn with_env<I: IntoIterator<Item = (K, V)>, K: Into<String>, V: Into<String>>(
        mut self,
        env: I,
    ) -> Self {
        self.env(env);
        self
    }

    /// Set the working directory of the command
    pub fn working_dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.working_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the working directory of the command
    pub fn with_working_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.working_dir(path);
        self
    }

    /// Set the standard input of the command
    pub fn stdin<In: Into<Input>>(&mut self, input: In) -> &mut Self {
        self.stdin = input.into();
        self
    }

    /// Set the standard input of the command
    pub fn with_stdin<In: Into<Input>>(mut self, input: In) -> Self {
        self.stdin(input);
        self
    }
}

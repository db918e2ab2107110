//! # CLI Completions Command

use std::io::Write;

use clap::Command;
use clap_complete::Shell;

/// Writes completions for `shell` to `out`.
pub fn completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    clap_complete::generate(shell, cmd, "trellis", out);
}

//! Mnemonic loading.

use std::path::Path;

use ton20::{Ton20Error, Ton20Result};
use ton20_wallet::MNEMONIC_WORDS;

use crate::cli::MnemonicArgs;

/// The mnemonic phrase from `--mnemo` or `--mnemo-file`, words separated by
/// single spaces.
pub fn load_mnemonic(args: &MnemonicArgs) -> Ton20Result<String> {
    match (&args.mnemo, &args.mnemo_file) {
        (Some(phrase), _) => Ok(normalize(phrase)),
        (None, Some(path)) => read_mnemonic_file(path),
        (None, None) => Err(Ton20Error::Config("mnemonic not provided".to_string())),
    }
}

/// Read a mnemonic file. The phrase is normally on the first line; when that
/// line holds fewer than 24 words the whole file is used, so one word per
/// line also works.
pub fn read_mnemonic_file(path: &Path) -> Ton20Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Ton20Error::Config(format!("cannot read mnemonic file {}: {}", path.display(), e))
    })?;
    let first_line = text.lines().next().unwrap_or("");
    if first_line.split_whitespace().count() >= MNEMONIC_WORDS {
        Ok(normalize(first_line))
    } else {
        Ok(normalize(&text))
    }
}

fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

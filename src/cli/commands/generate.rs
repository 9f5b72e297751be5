//! `pwstore gen` — print a random password.

use rand::Rng;
use zeroize::Zeroizing;

use crate::config::{Charset, Settings};
use crate::errors::{PwStoreError, Result};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Execute the `gen` command.
pub fn execute(settings: &Settings, length: Option<usize>) -> Result<()> {
    let length = length.unwrap_or(settings.generate_length);
    if length == 0 {
        return Err(PwStoreError::CommandFailed(
            "length must be at least 1".into(),
        ));
    }

    let password = generate(length, settings.generate_charset);
    println!("{}", password.as_str());
    Ok(())
}

/// Generate `length` random characters from `charset`.
pub fn generate(length: usize, charset: Charset) -> Zeroizing<String> {
    let mut rng = rand::rng();
    let mut out = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        let c = match charset {
            // '!' through '~'.
            Charset::Printable => rng.random_range(0x21u8..=0x7e) as char,
            Charset::Alphanumeric => ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char,
        };
        out.push(c);
    }
    out
}

//! Decoy-masked passphrase capture over arbitrary byte streams.
//!
//! After every keystroke the prompt line is redrawn from a carriage
//! return as a fixed-width field of `_` cells with a single `*` at a
//! random cell.  The field width never changes and the marker position
//! carries no information, so the display leaks neither the passphrase
//! length nor which key was pressed.

use std::io::{self, Read, Write};

use rand::Rng;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PwStoreError, Result};

/// Label drawn in front of the masked field.
pub const PROMPT_LABEL: &str = "Enter Password: ";

/// Number of cells in the masked field.
pub const PROMPT_WIDTH: usize = 20;

/// DEL, sent by most terminals for the backspace key.
const ERASE: u8 = 0x7f;
/// Ctrl-H.
const BACKSPACE: u8 = 0x08;

/// Up-front capacity so the buffer rarely reallocates and leaves copies behind.
const INITIAL_CAPACITY: usize = 256;

/// Read a passphrase one byte at a time from `input`, drawing the masked
/// prompt to `output`.
///
/// LF or CR ends input; the terminator is not part of the result.  DEL or
/// BS removes the last buffered byte (no-op when empty).  End of stream
/// before a terminator is an error.
pub fn read_masked<R, W, G>(input: &mut R, output: &mut W, rng: &mut G) -> Result<Zeroizing<Vec<u8>>>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    G: Rng,
{
    let mut buf = Zeroizing::new(Vec::with_capacity(INITIAL_CAPACITY));
    let mut display = MaskedField::new(output);
    display.draw(rng).map_err(prompt_io)?;

    let mut byte = [0u8; 1];
    let result = loop {
        match input.read(&mut byte) {
            Ok(0) => {
                display.finish().map_err(prompt_io)?;
                break Err(PwStoreError::Prompt("unexpected end of input".into()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(prompt_io(e)),
        }

        match byte[0] {
            b'\n' | b'\r' => {
                display.finish().map_err(prompt_io)?;
                break Ok(());
            }
            ERASE | BACKSPACE => {
                buf.pop();
                display.typed = display.typed.saturating_sub(1);
            }
            b => {
                buf.push(b);
                display.typed += 1;
            }
        }
        display.draw(rng).map_err(prompt_io)?;
    };

    byte.zeroize();
    result.map(|()| buf)
}

fn prompt_io(e: io::Error) -> PwStoreError {
    PwStoreError::Prompt(e.to_string())
}

struct MaskedField<'a, W: Write + ?Sized> {
    out: &'a mut W,
    typed: usize,
}

impl<'a, W: Write + ?Sized> MaskedField<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, typed: 0 }
    }

    fn draw<G: Rng>(&mut self, rng: &mut G) -> io::Result<()> {
        let marker = (self.typed > 0).then(|| rng.random_range(0..PROMPT_WIDTH));

        let mut line = String::with_capacity(1 + PROMPT_LABEL.len() + PROMPT_WIDTH);
        line.push('\r');
        line.push_str(PROMPT_LABEL);
        for cell in 0..PROMPT_WIDTH {
            line.push(if Some(cell) == marker { '*' } else { '_' });
        }

        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn run(input: &[u8]) -> (Result<Zeroizing<Vec<u8>>>, String) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();
        let res = read_masked(&mut Cursor::new(input.to_vec()), &mut out, &mut rng);
        (res, String::from_utf8(out).unwrap())
    }

    /// Split the drawn output into the individual masked fields.
    fn fields(out: &str) -> Vec<&str> {
        out.split('\r')
            .filter(|s| !s.is_empty())
            .map(|s| {
                let s = s.trim_end_matches('\n');
                s.strip_prefix(PROMPT_LABEL).expect("every redraw starts with the label")
            })
            .collect()
    }

    #[test]
    fn returns_bytes_before_terminator() {
        let (res, _) = run(b"secret\n");
        assert_eq!(res.unwrap().as_slice(), b"secret");
    }

    #[test]
    fn carriage_return_also_terminates() {
        let (res, _) = run(b"pw\rignored\n");
        assert_eq!(res.unwrap().as_slice(), b"pw");
    }

    #[test]
    fn erase_removes_last_byte() {
        let (res, _) = run(b"ab\x7fc\n");
        assert_eq!(res.unwrap().as_slice(), b"ac");

        let (res, _) = run(b"xy\x08\n");
        assert_eq!(res.unwrap().as_slice(), b"x");
    }

    #[test]
    fn erase_on_empty_buffer_is_noop() {
        let (res, _) = run(b"\x7f\x7fz\n");
        assert_eq!(res.unwrap().as_slice(), b"z");
    }

    #[test]
    fn empty_passphrase_is_allowed() {
        let (res, out) = run(b"\n");
        assert!(res.unwrap().is_empty());
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (res, _) = run(b"no terminator");
        assert!(matches!(res, Err(PwStoreError::Prompt(_))));
    }

    #[test]
    fn passphrase_is_never_echoed() {
        let (_, out) = run(b"hunter2\n");
        assert!(!out.contains("hunter2"));
        assert!(!out.contains('h'));
    }

    #[test]
    fn every_redraw_has_fixed_width() {
        let (_, out) = run(b"a much longer passphrase than the field\n");
        let drawn = fields(&out);
        // One initial draw plus one per keystroke.
        assert_eq!(drawn.len(), 1 + "a much longer passphrase than the field".len());
        for field in drawn {
            assert_eq!(field.chars().count(), PROMPT_WIDTH);
        }
    }

    #[test]
    fn marker_appears_only_once_something_is_typed() {
        let (_, out) = run(b"ab\x7f\x7f\n");
        let drawn = fields(&out);
        let stars: Vec<usize> = drawn.iter().map(|f| f.matches('*').count()).collect();
        // initial, 'a', 'b', erase, erase
        assert_eq!(stars, vec![0, 1, 1, 1, 0]);
    }

    #[test]
    fn marker_position_varies() {
        let input = [b'x'; 40].iter().copied().chain([b'\n']).collect::<Vec<u8>>();
        let (_, out) = run(&input);
        let positions: std::collections::BTreeSet<usize> = fields(&out)
            .iter()
            .filter_map(|f| f.find('*'))
            .collect();
        assert!(positions.len() > 1, "marker must not sit at a fixed cell");
    }
}

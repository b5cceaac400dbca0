use fsw_errors::{Error, Result};

/// A Controller's two run modes (`spec.md` §4.9, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Safed,
    Enabled,
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(Mode::Safed),
            1 => Ok(Mode::Enabled),
            _ => Err(Error::InvalidEnum),
        }
    }
}

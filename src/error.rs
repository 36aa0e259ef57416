use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Internal = 3,
    // Programmer error in how the UI is built: bad slider range, widget outside of a window, bad scale, etc.
    Usage = 4,
    // Unparsable user input. Widgets recover from these locally, they never abort a frame.
    Format = 6,
    // Push/pop imbalance detected at the end of a frame.
    Sanity = 16,
    // Widget identity path deeper than the maximum.
    TooLong = 20,
    // Icon or other pre-decoded resource not supplied at startup.
    MissingAsset = 29,
}

#[derive(Clone, Debug)]
pub enum ErrorEnum {
    Code(ErrorCode),
}

#[derive(Clone)]
pub struct Error {
    pub error: ErrorEnum,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> ErrorCode { match self.error { ErrorEnum::Code(c) => c } }

    pub fn is_usage(&self) -> bool { match self.error { ErrorEnum::Code(ErrorCode::Usage) => true, _ => false, } }
    pub fn is_too_long(&self) -> bool { match self.error { ErrorEnum::Code(ErrorCode::TooLong) => true, _ => false, } }
    pub fn is_sanity(&self) -> bool { match self.error { ErrorEnum::Code(ErrorCode::Sanity) => true, _ => false, } }
    pub fn is_format(&self) -> bool { match self.error { ErrorEnum::Code(ErrorCode::Format) => true, _ => false, } }
    pub fn is_missing_asset(&self) -> bool { match self.error { ErrorEnum::Code(ErrorCode::MissingAsset) => true, _ => false, } }
}

impl From<std::num::ParseIntError> for Error {
    fn from(error: std::num::ParseIntError) -> Self {
        Error {error: ErrorEnum::Code(ErrorCode::Format), message: format!("{}", error)}
    }
}

// For printing to log.
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error {
            &ErrorEnum::Code(code) => write!(f, "{}: {}", code as i64, self.message),
        }
    }
}

// For showing to the user.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! error {
    ($code:ident, $($arg:tt)*) => (
        $crate::error::Error {error: $crate::error::ErrorEnum::Code($crate::error::ErrorCode::$code), message: format!($($arg)*)}
    );
}

#[macro_export]
macro_rules! err {
    ($code:ident, $($arg:tt)*) => (
        Err($crate::error!($code, $($arg)*))
    );
}

#[cfg(test)]
mod tests {
    use crate::{*, error::*};

    #[test]
    fn error_formatting() {
        let e = error!(Usage, "slider low ({}) must be <= high ({})", 5, 1);
        assert!(e.is_usage());
        assert_eq!(e.code(), ErrorCode::Usage);
        assert_eq!(format!("{}", e), "slider low (5) must be <= high (1)");
        assert_eq!(format!("{:?}", e), "4: slider low (5) must be <= high (1)");

        let r: Result<()> = err!(TooLong, "too deep");
        let e = r.unwrap_err();
        assert!(e.is_too_long() && !e.is_usage());

        let e: Error = "x1".parse::<i64>().unwrap_err().into();
        assert!(e.is_format());
    }
}

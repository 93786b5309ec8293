// Every variant states *where* things went wrong, with the backend's own
// message carried along as context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // creating an overlay or board window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // pushing a pixel buffer to the window failed

    #[error("Capture init error: {0}")]
    CaptureInit(String), // enumerating or opening a monitor failed

    #[error("Note storage error: {0}")]
    Storage(#[from] std::io::Error), // reading or writing the notes file failed

    #[error("Note encoding error: {0}")]
    Encoding(#[from] serde_json::Error), // the notes file held malformed JSON
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_site() {
        let e = Error::WindowInit("no display".into());
        assert_eq!(e.to_string(), "Window init error: no display");

        let e = Error::CaptureInit("no monitors".into());
        assert_eq!(e.to_string(), "Capture init error: no monitors");
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: Error = io.into();
        assert!(matches!(e, Error::Storage(_)));
        assert!(e.to_string().contains("gone"));
    }
}

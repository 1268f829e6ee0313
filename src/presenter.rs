/// What the image operations need from whatever is showing them to the user
///
/// Implemented by the terminal front end in the binary; a windowed toolkit
/// would map these onto its message boxes.
pub trait Presenter {
    /// Report the outcome of an operation
    fn notify(&mut self, success: bool, message: &str);

    /// Ask a yes/no question; `false` means the user declined
    fn confirm(&mut self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext<E> {
    pub context: &'static str,
    pub source: E,
}

impl<E> ErrorContext<E> {
    #[must_use]
    pub const fn new(context: &'static str, source: E) -> Self {
        Self { context, source }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ErrorContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ErrorContext<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub trait ResultExt<T, E> {
    fn with_context(self, context: &'static str) -> Result<T, ErrorContext<E>>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_context(self, context: &'static str) -> Result<T, ErrorContext<E>> {
        self.map_err(|source| ErrorContext::new(context, source))
    }
}

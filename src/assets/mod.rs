pub(crate) mod backdrop;
pub(crate) mod color;

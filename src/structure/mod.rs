pub(crate) mod branch;
